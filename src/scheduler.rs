//! Topological scheduler (§4.7).
//!
//! ## Overview
//! Takes the broken (acyclic-by-construction) dependency graph and produces
//! one linear emission order: every record before anything that names it,
//! scope records before the function records that close over them, and
//! post-hoc assignments strictly after every record they touch. This is the
//! last stage before the [`crate::emitter`] decides inlining and naming.
//!
//! ## Ordering within a layer
//! Kahn's algorithm processes zero-in-degree records in FIFO order of
//! discovery (`RecordId` ascending) rather than any other tiebreak, so the
//! emitted program's declaration order tracks trace order wherever the
//! dependency graph leaves a choice — output stays stable across runs on the
//! same input without the scheduler having to special-case anything.
//!
//! ## Post-hoc placement
//! A [`crate::depgraph::PostHocAssignment`] becomes eligible the instant both
//! its owner and its (real) target have been scheduled; it is emitted
//! immediately after the later of the two.

#![forbid(unsafe_code)]

use std::collections::{HashMap, VecDeque};

use crate::depgraph::PostHocAssignment;
use crate::error::{Breadcrumb, Error, Result};
use crate::ids::RecordId;
use crate::record::{EdgeKind, RecordStore};

/// One item of the final schedule.
pub enum ScheduleItem {
    Record(RecordId),
    PostHoc(PostHocAssignment),
}

/// Produces the emission order: a topological sort of `store`'s records by
/// real (non-`PostHoc`) dependency edges, with post-hoc assignments spliced
/// in as soon as both endpoints are available.
///
/// Returns [`Error::UnrewritableCycle`] if the graph still has a real cycle
/// after [`crate::depgraph::break_cycles`] ran — this happens when a cycle
/// passes only through scope and synthetic scope-ordering edges with no
/// underlying content-plan slot to rewrite (mutually self-capturing
/// closures with no intervening plain value in the cycle); see DESIGN.md.
pub fn schedule(store: &RecordStore, post_hoc: Vec<PostHocAssignment>) -> Result<Vec<ScheduleItem>> {
    // indegree[X] counts X's own unresolved prerequisites: the non-`PostHoc`
    // out-edges of X itself (X depends on target, so target must be
    // scheduled first). This is the reverse of "how many things point at
    // X" — a leaf record (no out-edges) starts at 0 and is ready immediately.
    let mut indegree: HashMap<RecordId, usize> = HashMap::new();
    for id in store.ids() {
        let count = store.get(id).out_edges.iter().filter(|e| e.kind != EdgeKind::PostHoc).count();
        indegree.insert(id, count);
    }

    let mut ready: VecDeque<RecordId> = indegree
        .iter()
        .filter(|(_, &deg)| deg == 0)
        .map(|(&id, _)| id)
        .collect();
    ready.make_contiguous().sort_by_key(|id| id.as_usize());

    let mut scheduled: std::collections::HashSet<RecordId> = std::collections::HashSet::new();
    let mut post_hoc_emitted = vec![false; post_hoc.len()];

    let mut order = Vec::with_capacity(store.len() + post_hoc.len());

    while let Some(id) = ready.pop_front() {
        order.push(ScheduleItem::Record(id));
        scheduled.insert(id);

        // Records that depend on `id` (edges pointing at it) may now have
        // one fewer unresolved prerequisite.
        for edge in &store.get(id).in_edges {
            if edge.kind != EdgeKind::PostHoc {
                let dependent = edge.source;
                let deg = indegree.get_mut(&dependent).unwrap();
                *deg -= 1;
                if *deg == 0 {
                    insert_sorted(&mut ready, dependent);
                }
            }
        }

        drain_ready_post_hoc(store, &post_hoc, &scheduled, &mut post_hoc_emitted, &mut order);
    }

    if scheduled.len() != store.len() {
        return Err(Error::UnrewritableCycle { breadcrumb: Breadcrumb::root() });
    }

    Ok(order)
}

fn insert_sorted(ready: &mut VecDeque<RecordId>, id: RecordId) {
    let pos = ready.iter().position(|&r| r.as_usize() > id.as_usize()).unwrap_or(ready.len());
    ready.insert(pos, id);
}

fn drain_ready_post_hoc(
    store: &RecordStore,
    post_hoc: &[PostHocAssignment],
    scheduled: &std::collections::HashSet<RecordId>,
    emitted: &mut [bool],
    order: &mut Vec<ScheduleItem>,
) {
    // Emitting one post-hoc assignment never unlocks another (post-hoc steps
    // carry no further `PostHoc` out-edges of their own), so one linear pass
    // per newly-scheduled record is enough to catch every assignment as soon
    // as its target lands.
    for (i, p) in post_hoc.iter().enumerate() {
        if emitted[i] || !scheduled.contains(&p.owner) {
            continue;
        }
        if scheduled.contains(&p.target) {
            emitted[i] = true;
            order.push(ScheduleItem::PostHoc(clone_assignment(p)));
        }
    }
}

fn clone_assignment(p: &PostHocAssignment) -> PostHocAssignment {
    PostHocAssignment { owner: p.owner, target: p.target, step: p.step.clone() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::PropKey;
    use crate::record::{ContainerHead, DependencyEdge, PlanNode, PlanStep, RecordKind};
    use crate::value::ValueKind;

    #[test]
    fn independent_records_schedule_in_id_order() {
        let mut store = RecordStore::new();
        let a = store.create(1, ValueKind::Integer, "a".into(), RecordKind::Value);
        let b = store.create(2, ValueKind::Integer, "b".into(), RecordKind::Value);

        let order = schedule(&store, Vec::new()).unwrap();
        let ids: Vec<RecordId> = order
            .iter()
            .map(|item| match item {
                ScheduleItem::Record(id) => *id,
                ScheduleItem::PostHoc(_) => panic!("unexpected post-hoc item"),
            })
            .collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn dependency_forces_leaf_before_parent() {
        let mut store = RecordStore::new();
        let leaf = store.create(1, ValueKind::OrderedSequence, "leaf".into(), RecordKind::Value);
        store.set_plan(leaf, PlanNode::Container { head: ContainerHead::Sequence, steps: vec![] });
        let parent = store.create(2, ValueKind::OrderedSequence, "parent".into(), RecordKind::Value);
        store.set_plan(parent, PlanNode::Container { head: ContainerHead::Sequence, steps: vec![PlanStep::Assign { key: PropKey::Index(0), value: leaf }] });
        store.add_edge(DependencyEdge { source: parent, target: leaf, slot: vec![], kind: EdgeKind::PropertyValue });

        let order = schedule(&store, Vec::new()).unwrap();
        let ids: Vec<RecordId> = order
            .iter()
            .map(|item| match item {
                ScheduleItem::Record(id) => *id,
                ScheduleItem::PostHoc(_) => panic!("unexpected post-hoc item"),
            })
            .collect();
        assert_eq!(ids, vec![leaf, parent]);
    }

    #[test]
    fn post_hoc_assignment_lands_after_both_endpoints() {
        let mut store = RecordStore::new();
        let a = store.create(1, ValueKind::OrderedSequence, "a".into(), RecordKind::Value);
        store.set_plan(a, PlanNode::Container { head: ContainerHead::Sequence, steps: vec![] });
        store.add_edge(DependencyEdge { source: a, target: a, slot: vec![], kind: EdgeKind::PostHoc });

        let post_hoc = vec![crate::depgraph::PostHocAssignment {
            owner: a,
            target: a,
            step: PlanStep::Assign { key: PropKey::Index(0), value: a },
        }];

        let order = schedule(&store, post_hoc).unwrap();
        assert_eq!(order.len(), 2);
        assert!(matches!(order[0], ScheduleItem::Record(id) if id == a));
        assert!(matches!(order[1], ScheduleItem::PostHoc(_)));
    }

    /// A single owner with two post-hoc assignments to *different* targets
    /// (a fan-out parent whose two properties both cycle back to it) must
    /// gate each assignment on its own target, not whichever `PostHoc` edge
    /// happens to come first on the owner.
    #[test]
    fn fan_out_post_hoc_assignments_gate_on_their_own_targets() {
        let mut store = RecordStore::new();
        let parent = store.create(1, ValueKind::CompositeObject, "parent".into(), RecordKind::Value);
        store.set_plan(parent, PlanNode::Container { head: ContainerHead::PlainObject, steps: vec![] });
        let b = store.create(2, ValueKind::OrderedSequence, "b".into(), RecordKind::Value);
        store.set_plan(b, PlanNode::Container { head: ContainerHead::Sequence, steps: vec![] });
        let c = store.create(3, ValueKind::OrderedSequence, "c".into(), RecordKind::Value);
        // `c` is not ready until `b` has been scheduled, so the post-hoc
        // assignment targeting `c` must not fire just because `b` (the
        // owner's other target) is already scheduled.
        store.set_plan(c, PlanNode::Container { head: ContainerHead::Sequence, steps: vec![PlanStep::Assign { key: PropKey::Index(0), value: b }] });
        store.add_edge(DependencyEdge { source: c, target: b, slot: vec![], kind: EdgeKind::PropertyValue });
        store.add_edge(DependencyEdge { source: parent, target: b, slot: vec![], kind: EdgeKind::PostHoc });
        store.add_edge(DependencyEdge { source: parent, target: c, slot: vec![], kind: EdgeKind::PostHoc });

        let post_hoc = vec![
            crate::depgraph::PostHocAssignment {
                owner: parent,
                target: b,
                step: PlanStep::Assign { key: PropKey::Named("x".to_string()), value: b },
            },
            crate::depgraph::PostHocAssignment {
                owner: parent,
                target: c,
                step: PlanStep::Assign { key: PropKey::Named("y".to_string()), value: c },
            },
        ];

        let order = schedule(&store, post_hoc).unwrap();
        let positions: HashMap<RecordId, usize> = order
            .iter()
            .enumerate()
            .filter_map(|(i, item)| match item {
                ScheduleItem::Record(id) => Some((*id, i)),
                ScheduleItem::PostHoc(_) => None,
            })
            .collect();
        let post_hoc_positions: Vec<(&PlanStep, usize)> = order
            .iter()
            .enumerate()
            .filter_map(|(i, item)| match item {
                ScheduleItem::PostHoc(p) => Some((&p.step, i)),
                ScheduleItem::Record(_) => None,
            })
            .collect();

        for (step, pos) in post_hoc_positions {
            if let PlanStep::Assign { key: PropKey::Named(name), value } = step {
                if name == "x" {
                    assert!(pos > positions[&b]);
                } else if name == "y" {
                    assert!(pos > positions[&c]);
                }
            }
        }
    }
}
