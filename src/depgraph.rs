//! Dependency graph and cycle breaker (§4.6).
//!
//! Tarjan's algorithm finds strongly-connected components on the record
//! graph; each non-trivial component gets a head record chosen by the
//! heuristics spec.md lists, and every other cyclic edge into the component
//! is rewritten to a placeholder plus a post-hoc assignment.

use std::collections::HashMap;

use crate::ids::RecordId;
use crate::record::{ContainerHead, EdgeKind, PlaceholderKind, PlanDescriptorValue, PlanNode, PlanStep, RecordKind, RecordStore};
use crate::value::ValueKind;

/// One strongly-connected component, in the order Tarjan's algorithm
/// produces them (reverse topological order of the condensation).
pub struct Component {
    pub members: Vec<RecordId>,
}

/// Runs Tarjan's SCC algorithm over the record store's dependency edges.
pub fn strongly_connected_components(store: &RecordStore) -> Vec<Component> {
    struct State {
        index_counter: usize,
        stack: Vec<RecordId>,
        on_stack: HashMap<RecordId, bool>,
        index: HashMap<RecordId, usize>,
        lowlink: HashMap<RecordId, usize>,
        components: Vec<Component>,
    }

    fn strongconnect(v: RecordId, store: &RecordStore, s: &mut State) {
        s.index.insert(v, s.index_counter);
        s.lowlink.insert(v, s.index_counter);
        s.index_counter += 1;
        s.stack.push(v);
        s.on_stack.insert(v, true);

        for edge in &store.get(v).out_edges {
            if edge.kind == EdgeKind::PostHoc {
                // Post-hoc edges cannot exist before cycle breaking runs;
                // defensive skip keeps this function idempotent if called
                // again after a partial break.
                continue;
            }
            let w = edge.target;
            if !s.index.contains_key(&w) {
                strongconnect(w, store, s);
                let wl = s.lowlink[&w];
                let vl = s.lowlink[&v];
                s.lowlink.insert(v, vl.min(wl));
            } else if *s.on_stack.get(&w).unwrap_or(&false) {
                let wi = s.index[&w];
                let vl = s.lowlink[&v];
                s.lowlink.insert(v, vl.min(wi));
            }
        }

        if s.lowlink[&v] == s.index[&v] {
            let mut members = Vec::new();
            loop {
                let w = s.stack.pop().unwrap();
                s.on_stack.insert(w, false);
                members.push(w);
                if w == v {
                    break;
                }
            }
            s.components.push(Component { members });
        }
    }

    let mut s = State {
        index_counter: 0,
        stack: Vec::new(),
        on_stack: HashMap::new(),
        index: HashMap::new(),
        lowlink: HashMap::new(),
        components: Vec::new(),
    };

    for id in store.ids() {
        if !s.index.contains_key(&id) {
            strongconnect(id, store, &mut s);
        }
    }

    s.components
}

/// Chooses the head record of a non-trivial component: the record needing
/// no in-component member to construct, else the fewest in-component
/// cyclic entries, else the lowest record id for a deterministic tie-break.
fn choose_head(component: &Component, store: &RecordStore) -> RecordId {
    let member_set: std::collections::HashSet<RecordId> = component.members.iter().copied().collect();

    let cyclic_entry_count = |id: RecordId| -> usize {
        store
            .get(id)
            .out_edges
            .iter()
            .filter(|e| e.kind != EdgeKind::PostHoc && member_set.contains(&e.target))
            .count()
    };

    component
        .members
        .iter()
        .copied()
        .min_by_key(|&id| (cyclic_entry_count(id), id.as_usize()))
        .expect("a component always has at least one member")
}

/// Breaks every non-trivial SCC in `store` by rewriting in-component edges
/// of every non-head member (and every in-component edge of the head) into
/// a placeholder-valued slot plus a post-hoc assignment edge.
///
/// Descriptor-bearing slots with restrictive flags keep their
/// descriptor-definition node but defer it: when the referenced value is
/// itself cyclic, the whole `DefineProperty`/accessor step moves to the
/// post-hoc phase instead of being split into "placeholder then reassign",
/// since a non-configurable property cannot be redefined after the fact.
pub fn break_cycles(store: &mut RecordStore) -> Vec<PostHocAssignment> {
    let components = strongly_connected_components(store);
    let mut post_hoc = Vec::new();

    for component in &components {
        if component.members.len() < 2 && !self_loop(component, store) {
            continue;
        }
        let member_set: std::collections::HashSet<RecordId> = component.members.iter().copied().collect();
        let head = choose_head(component, store);

        for &member in &component.members {
            let cyclic_targets: Vec<RecordId> = store
                .get(member)
                .out_edges
                .iter()
                .filter(|e| e.kind != EdgeKind::PostHoc && member_set.contains(&e.target))
                .map(|e| e.target)
                .collect();
            if member == head {
                // The head may still have cyclic out-edges into the rest of
                // the component; those also need breaking, since the head
                // is chosen to minimize but not necessarily eliminate them.
                for target in cyclic_targets {
                    rewrite_slot(store, member, target, &mut post_hoc);
                }
            } else {
                for target in cyclic_targets {
                    rewrite_slot(store, member, target, &mut post_hoc);
                }
            }
        }
    }

    post_hoc
}

fn self_loop(component: &Component, store: &RecordStore) -> bool {
    component.members.len() == 1
        && store.get(component.members[0]).out_edges.iter().any(|e| e.target == component.members[0])
}

/// A deferred write applied after both the source and target records are
/// bound (spec §3 "Post-hoc assignment").
pub struct PostHocAssignment {
    pub owner: RecordId,
    /// The record this assignment becomes eligible against. Carried
    /// explicitly rather than re-derived from `owner`'s edge list: an owner
    /// with more than one post-hoc assignment (e.g. a fan-out parent whose
    /// two properties both cycle back to it) has one `PostHoc` out-edge per
    /// target, and picking "the first PostHoc edge on owner" would gate the
    /// wrong assignment on the wrong target's readiness.
    pub target: RecordId,
    pub step: PlanStep,
}

fn rewrite_slot(store: &mut RecordStore, owner: RecordId, target: RecordId, post_hoc: &mut Vec<PostHocAssignment>) {
    let plan = store.get_mut(owner).plan.take();
    let Some(plan) = plan else { return };

    let (new_plan, extracted) = match plan {
        PlanNode::Container { head, mut steps } => {
            let mut extracted_step = None;
            for step in steps.iter_mut() {
                if step_targets(step, target) {
                    let placeholder = make_placeholder(store, step);
                    let real_step = replace_with_placeholder(step, target, placeholder);
                    extracted_step = Some((real_step, placeholder));
                    break;
                }
            }
            (PlanNode::Container { head, steps }, extracted_step)
        }
        PlanNode::Function { body_source, captured_scopes, mut extra_steps } => {
            let mut extracted_step = None;
            for step in extra_steps.iter_mut() {
                if step_targets(step, target) {
                    let placeholder = make_placeholder(store, step);
                    let real_step = replace_with_placeholder(step, target, placeholder);
                    extracted_step = Some((real_step, placeholder));
                    break;
                }
            }
            (PlanNode::Function { body_source, captured_scopes, extra_steps }, extracted_step)
        }
        other => (other, None),
    };

    store.set_plan(owner, new_plan);

    if let Some((real_step, placeholder)) = extracted {
        // The original cyclic edge no longer reflects a live reference in the
        // content plan (it was just swapped for a placeholder); only the
        // post-hoc edge should remain so the scheduler sees an acyclic graph.
        store.get_mut(owner).out_edges.retain(|e| !(e.target == target && e.kind != EdgeKind::PostHoc));
        store.get_mut(target).in_edges.retain(|e| !(e.source == owner && e.kind != EdgeKind::PostHoc));

        post_hoc.push(PostHocAssignment { owner, target, step: real_step });
        store.add_edge(crate::record::DependencyEdge {
            source: owner,
            target,
            slot: vec![],
            kind: EdgeKind::PostHoc,
        });
        // The placeholder now sits where `target` used to; give it a real
        // edge so the emitter sees it as owner's one genuine reference
        // instead of an unreferenced record.
        store.add_edge(crate::record::DependencyEdge {
            source: owner,
            target: placeholder,
            slot: vec![],
            kind: EdgeKind::PropertyValue,
        });
    }
}

fn make_placeholder(store: &mut RecordStore, step: &PlanStep) -> RecordId {
    let kind = match step {
        PlanStep::SetPrototype(_) => PlaceholderKind::EmptyContainer(ContainerHead::PlainObject),
        _ => PlaceholderKind::Undefined,
    };
    let id = store.create_anonymous(ValueKind::Undefined, "placeholder".to_string(), RecordKind::Value);
    store.set_plan(id, PlanNode::Placeholder(kind));
    id
}

fn step_targets(step: &PlanStep, target: RecordId) -> bool {
    match step {
        PlanStep::Assign { value, .. } => *value == target,
        PlanStep::DefineProperty { descriptor, .. } => match &descriptor.value {
            PlanDescriptorValue::Data(v) => *v == target,
            PlanDescriptorValue::Accessor { getter, setter } => {
                *getter == Some(target) || *setter == Some(target)
            }
        },
        PlanStep::SetPrototype(v) => *v == target,
        PlanStep::MapSet { key, value } => *key == target || *value == target,
        PlanStep::SetAdd(v) => *v == target,
        PlanStep::Hole => false,
    }
}

/// Returns the original step (to be replayed post-hoc) after overwriting
/// `*step` in place to reference `placeholder` wherever it referenced the
/// cyclic `target`.
///
/// `MapSet`/`SetAdd` cannot be split the way `Assign`/`SetPrototype` can: an
/// array index or object key is a stable slot, so writing a placeholder then
/// overwriting the same slot later is transparent. A `Map`/`Set` has no such
/// slot — its membership is keyed by the value itself, so `m.set(placeholder,
/// v)` followed later by `m.set(real, v)` adds a second entry instead of
/// fixing the first, and `s.add(placeholder)` has no "real" counterpart to
/// overwrite at all. Both defer the whole step to post-hoc instead (mirroring
/// `DefineProperty`, which defers for the same reason when its descriptor is
/// restrictive).
fn replace_with_placeholder(step: &mut PlanStep, target: RecordId, placeholder: RecordId) -> PlanStep {
    let real = step.clone();
    *step = match &real {
        PlanStep::Assign { key, .. } => PlanStep::Assign { key: key.clone(), value: placeholder },
        PlanStep::DefineProperty { .. } => PlanStep::Hole,
        PlanStep::SetPrototype(_) => PlanStep::SetPrototype(placeholder),
        PlanStep::MapSet { key, value } => {
            if *key == target {
                PlanStep::Hole
            } else {
                PlanStep::MapSet { key: *key, value: placeholder }
            }
        }
        PlanStep::SetAdd(_) => PlanStep::Hole,
        PlanStep::Hole => PlanStep::Hole,
    };
    real
}
