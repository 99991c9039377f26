//! Emission planner (§4.8): translates the scheduled record sequence into
//! an abstract output plan.
//!
//! The plan (`EmissionPlan`, built from [`Stmt`]/[`Expr`] nodes) is the
//! crate's real deliverable here; per spec §1 the syntax-tree printer that
//! turns a plan into text is an external collaborator. This module also
//! carries a small built-in printer (bottom of the file, `render`) kept only
//! so the crate is testable end-to-end without linking an external one —
//! DESIGN.md marks it as test-support, not core surface.
//!
//! ## Inlining
//! A record is inlined at its single use site when: it is used by exactly
//! one consumer, it is not the owner or target of a post-hoc assignment
//! (both need a stable name to be written to later), `options.inline` is
//! set, and its content plan has no step that requires a statement of its
//! own (`DefineProperty`, `MapSet`, `SetAdd` all imply at least one
//! statement after the literal, so records using them are always named).
//! Functions and scope records are never inlined: a function's body is
//! never "simpler" embedded at a call site, and a scope exists only to be
//! shared, which is the opposite of inlining.
//!
//! ## Scope factories
//! Every produced function is emitted as a named `function` declaration
//! inside its scope's factory body rather than assigned from a returned
//! value — `function` declarations are hoisted and visible to their own
//! body, which is what makes a function that captured *itself* (its
//! `CaptureSlot::value` equal to its own record id) work with no extra
//! wiring: the declaration is already in scope by the time any sibling or
//! itself references it by name. Bindings matching this are simply left out
//! of the factory's parameter list instead of threaded through it.

use std::collections::{HashMap, HashSet};

use crate::allocator::{IdentifierAllocator, ScopeHandle};
use crate::depgraph::PostHocAssignment;
use crate::error::{Error, Result};
use crate::ids::{PropKey, RecordId};
use crate::options::{OutputFormat, SerializeOptions};
use crate::record::{
    ContainerHead, GlobalEntry, GlobalKind, PlaceholderKind, PlanDescriptor, PlanDescriptorValue,
    PlanNode, PlanStep, Record, RecordKind, RecordStore, ScopeRecord,
};
use crate::scheduler::ScheduleItem;
use crate::value::ClassifiedPrimitive;

/// An expression in the abstract output plan.
#[derive(Clone, Debug)]
pub enum Expr {
    Literal(ClassifiedPrimitive),
    Null,
    Undefined,
    Ident(String),
    ArrayLiteral(Vec<Option<Expr>>),
    ObjectLiteral(Vec<(PropLit, Expr)>),
    MapLiteral,
    SetLiteral,
    RegExpLiteral { source: String, flags: String },
    DateLiteral(f64),
    BufferLiteral { bytes: Vec<u8>, shared: bool },
    SymbolLiteral { description: Option<String>, global: bool },
    Member(Box<Expr>, String),
    Index(Box<Expr>, Box<Expr>),
    Call(Box<Expr>, Vec<Expr>),
    GetPrototypeOf(Box<Expr>),
    AccessorOf(Box<Expr>, String, bool),
    Require(String, Option<String>),
    /// An immediately invoked factory expression (a scope): parameters,
    /// the function declarations and plain statements its body holds, and
    /// what it returns.
    Iife { params: Vec<String>, body: Vec<Stmt>, returns: Box<Expr> },
}

#[derive(Clone, Debug)]
pub enum PropLit {
    Named(String),
    Index(u32),
    Computed(Box<Expr>),
}

/// One statement in the abstract output plan.
#[derive(Clone, Debug)]
pub enum Stmt {
    ConstBinding { name: String, value: Expr },
    FunctionDecl { name: String, body_source: String },
    Assign { target: Expr, value: Expr },
    DefineProperty { target: Expr, key: PropLit, descriptor: DescriptorLit },
    SetPrototype { target: Expr, value: Expr },
    MapSet { target: Expr, key: Expr, value: Expr },
    SetAdd { target: Expr, value: Expr },
    Return(Expr),
}

#[derive(Clone, Debug)]
pub struct DescriptorLit {
    pub writable: bool,
    pub enumerable: bool,
    pub configurable: bool,
    pub value: DescriptorValueLit,
}

#[derive(Clone, Debug)]
pub enum DescriptorValueLit {
    Data(Expr),
    Accessor { getter: Option<Expr>, setter: Option<Expr> },
}

/// The finished plan: the statements that must run before the root value is
/// available, the root expression itself, and the formatting options the
/// printer needs.
pub struct EmissionPlan {
    pub prelude: Vec<Stmt>,
    pub root: Expr,
    pub format: OutputFormat,
    pub exec: bool,
    pub compact: bool,
    pub assume_strict_env: bool,
}

enum Resolved {
    Inline(Expr),
    Named(String),
}

/// Builds the emission plan from a finished schedule.
///
/// `allocator`/`root_scope` are the same allocator and root scope the
/// tracer used, so names assigned here never collide with frozen capture
/// names reserved during scope reification.
pub fn plan_emission(
    store: &RecordStore,
    order: Vec<ScheduleItem>,
    root: RecordId,
    allocator: &mut dyn IdentifierAllocator,
    root_scope: ScopeHandle,
    options: &SerializeOptions,
) -> Result<EmissionPlan> {
    let mut force_named: HashSet<RecordId> = HashSet::new();
    let mut post_hocs: Vec<&PostHocAssignment> = Vec::new();
    for item in &order {
        if let ScheduleItem::PostHoc(p) = item {
            force_named.insert(p.owner);
            for t in step_targets(&p.step) {
                force_named.insert(t);
            }
            post_hocs.push(p);
        }
    }

    let mut resolved: HashMap<RecordId, Resolved> = HashMap::new();
    let mut prelude: Vec<Stmt> = Vec::new();

    for item in order {
        match item {
            ScheduleItem::Record(id) => {
                let record = store.get(id);
                match &record.kind {
                    RecordKind::Global(_) => {
                        // Globals are pure syntax; resolved on demand from
                        // their own data, never scheduled a binding.
                        continue;
                    }
                    RecordKind::Scope(scope) => {
                        emit_scope(store, id, scope, allocator, root_scope, options, &mut resolved, &mut prelude)?;
                    }
                    RecordKind::Value => {
                        if let Some(PlanNode::Function { captured_scopes, .. }) = &record.plan {
                            if !captured_scopes.is_empty() {
                                // Declared inside its governing scope's
                                // factory instead (see `emit_scope`); that
                                // may run before or after this schedule slot
                                // since no dependency edge orders the two.
                                continue;
                            }
                        }
                        emit_value(store, id, record, allocator, root_scope, options, &force_named, &mut resolved, &mut prelude)?;
                    }
                }
            }
            ScheduleItem::PostHoc(p) => {
                let stmt = lower_post_hoc_step(store, &resolved, p.owner, &p.step)?;
                prelude.push(stmt);
            }
        }
    }

    let root_expr = resolve_ref(store, &resolved, root)?;

    Ok(EmissionPlan {
        prelude,
        root: root_expr,
        format: options.format,
        exec: options.exec,
        compact: options.compact,
        assume_strict_env: options.assume_strict_env,
    })
}

fn step_targets(step: &PlanStep) -> Vec<RecordId> {
    match step {
        PlanStep::Assign { value, .. } => vec![*value],
        PlanStep::DefineProperty { descriptor, .. } => match &descriptor.value {
            PlanDescriptorValue::Data(v) => vec![*v],
            PlanDescriptorValue::Accessor { getter, setter } => {
                getter.iter().chain(setter.iter()).copied().collect()
            }
        },
        PlanStep::SetPrototype(v) => vec![*v],
        PlanStep::MapSet { key, value } => vec![*key, *value],
        PlanStep::SetAdd(v) => vec![*v],
        PlanStep::Hole => vec![],
    }
}

fn resolve_ref(store: &RecordStore, resolved: &HashMap<RecordId, Resolved>, id: RecordId) -> Result<Expr> {
    if let RecordKind::Global(entry) = &store.get(id).kind {
        return Ok(global_expr(store, entry));
    }
    match resolved.get(&id) {
        Some(Resolved::Inline(e)) => Ok(e.clone()),
        Some(Resolved::Named(n)) => Ok(Expr::Ident(n.clone())),
        None => Err(Error::UnsupportedValue {
            breadcrumb: crate::error::Breadcrumb::root(),
            reason: format!("record {} was referenced before it was scheduled", id.as_usize()),
        }),
    }
}

fn global_expr(store: &RecordStore, entry: &GlobalEntry) -> Expr {
    match &entry.kind {
        GlobalKind::TopLevelName => Expr::Ident(entry.naming_hint.clone()),
        GlobalKind::MemberOf { parent, key } => {
            let parent_expr = global_expr_of(store, *parent);
            Expr::Member(Box::new(parent_expr), key.clone())
        }
        GlobalKind::PrototypeOf { parent } => {
            let parent_expr = global_expr_of(store, *parent);
            Expr::GetPrototypeOf(Box::new(parent_expr))
        }
        GlobalKind::AccessorOf { parent, key, is_setter } => {
            let parent_expr = global_expr_of(store, *parent);
            Expr::AccessorOf(Box::new(parent_expr), key.clone(), *is_setter)
        }
        GlobalKind::ModuleImport { module, export } => Expr::Require(module.clone(), export.clone()),
    }
}

fn global_expr_of(store: &RecordStore, id: RecordId) -> Expr {
    match &store.get(id).kind {
        RecordKind::Global(entry) => global_expr(store, entry),
        _ => unreachable!("global parent reference must itself be a global record"),
    }
}

fn emit_value(
    store: &RecordStore,
    id: RecordId,
    record: &Record,
    allocator: &mut dyn IdentifierAllocator,
    root_scope: ScopeHandle,
    options: &SerializeOptions,
    force_named: &HashSet<RecordId>,
    resolved: &mut HashMap<RecordId, Resolved>,
    prelude: &mut Vec<Stmt>,
) -> Result<()> {
    let Some(plan) = &record.plan else {
        return Err(Error::UnsupportedValue {
            breadcrumb: crate::error::Breadcrumb::root(),
            reason: format!("record {} has no content plan", id.as_usize()),
        });
    };

    match plan {
        PlanNode::Function { .. } => {
            // Functions not captured by any scope (no free variables) are
            // declared directly at top level instead of inside a factory.
            let PlanNode::Function { body_source, extra_steps, .. } = plan else { unreachable!() };
            let name = allocator.allocate(&record.naming_hint, root_scope);
            prelude.push(Stmt::FunctionDecl { name: name.clone(), body_source: body_source.clone() });
            emit_function_extra_steps(store, &Expr::Ident(name.clone()), extra_steps, resolved, prelude)?;
            resolved.insert(id, Resolved::Named(name));
            Ok(())
        }
        _ => {
            let single_use = record.in_edges.len() == 1;
            let inlineable = options.inline
                && single_use
                && !force_named.contains(&id)
                && is_simple_plan(plan);

            if inlineable {
                let expr = build_literal_expr(store, resolved, plan)?;
                resolved.insert(id, Resolved::Inline(expr));
                Ok(())
            } else {
                let name = allocator.allocate(&record.naming_hint, root_scope);
                let head_expr = build_literal_expr(store, resolved, plan)?;
                prelude.push(Stmt::ConstBinding { name: name.clone(), value: head_expr });
                let target = Expr::Ident(name.clone());
                if let PlanNode::Container { steps, .. } = plan {
                    emit_extra_steps(store, &target, steps, resolved, prelude)?;
                }
                resolved.insert(id, Resolved::Named(name));
                Ok(())
            }
        }
    }
}

/// True when `plan`'s steps need nothing beyond the literal head itself —
/// no call-style step (`DefineProperty`/`MapSet`/`SetAdd`) that would force
/// the record to be addressable by name for a follow-up statement.
fn is_simple_plan(plan: &PlanNode) -> bool {
    match plan {
        PlanNode::Literal(_) | PlanNode::Null | PlanNode::Undefined | PlanNode::SymbolLiteral { .. } => true,
        PlanNode::Placeholder(_) => true,
        PlanNode::Container { steps, .. } => steps.iter().all(|s| matches!(s, PlanStep::Assign { .. } | PlanStep::SetPrototype(_) | PlanStep::Hole)),
        PlanNode::Function { .. } | PlanNode::BackReference(_) => false,
    }
}

/// Builds the literal head expression for a plan. For an inlineable
/// container this embeds every `Assign`/`SetPrototype` step directly into
/// the literal (object/array literal with own properties, or a trailing
/// prototype wrap); for a hoisted container it returns just the empty head
/// and the caller appends the remaining steps as statements.
fn build_literal_expr(store: &RecordStore, resolved: &HashMap<RecordId, Resolved>, plan: &PlanNode) -> Result<Expr> {
    match plan {
        PlanNode::Literal(v) => Ok(Expr::Literal(v.clone())),
        PlanNode::Null => Ok(Expr::Null),
        PlanNode::Undefined => Ok(Expr::Undefined),
        PlanNode::SymbolLiteral { description, global } => {
            Ok(Expr::SymbolLiteral { description: description.clone(), global: *global })
        }
        PlanNode::Placeholder(kind) => Ok(placeholder_expr(kind)),
        PlanNode::BackReference(target) => resolve_ref(store, resolved, *target),
        PlanNode::Function { .. } => unreachable!("functions are handled by emit_value directly"),
        PlanNode::Container { head, steps } => build_container_literal(store, resolved, head, steps),
    }
}

fn placeholder_expr(kind: &PlaceholderKind) -> Expr {
    match kind {
        PlaceholderKind::Undefined => Expr::Undefined,
        PlaceholderKind::EmptyContainer(head) => empty_head_expr(head),
    }
}

fn empty_head_expr(head: &ContainerHead) -> Expr {
    match head {
        ContainerHead::Sequence => Expr::ArrayLiteral(Vec::new()),
        ContainerHead::Mapping | ContainerHead::WeakMapping => Expr::MapLiteral,
        ContainerHead::Set | ContainerHead::WeakSet => Expr::SetLiteral,
        ContainerHead::Timestamp(millis) => Expr::DateLiteral(*millis),
        ContainerHead::BinaryBuffer { shared } => Expr::BufferLiteral { bytes: Vec::new(), shared: *shared },
        _ => Expr::ObjectLiteral(Vec::new()),
    }
}

fn build_container_literal(
    store: &RecordStore,
    resolved: &HashMap<RecordId, Resolved>,
    head: &ContainerHead,
    steps: &[PlanStep],
) -> Result<Expr> {
    match head {
        ContainerHead::Sequence => {
            let mut items = Vec::with_capacity(steps.len());
            for step in steps {
                match step {
                    PlanStep::Assign { value, .. } => items.push(Some(resolve_ref(store, resolved, *value)?)),
                    PlanStep::Hole => items.push(None),
                    PlanStep::SetPrototype(_) => {}
                    _ => items.push(None),
                }
            }
            Ok(Expr::ArrayLiteral(items))
        }
        ContainerHead::RegExp { source, flags } => Ok(Expr::RegExpLiteral { source: source.clone(), flags: flags.clone() }),
        ContainerHead::Timestamp(millis) => Ok(Expr::DateLiteral(*millis)),
        ContainerHead::BinaryBuffer { bytes, shared } => Ok(Expr::BufferLiteral { bytes: bytes.clone(), shared: *shared }),
        ContainerHead::Mapping | ContainerHead::WeakMapping => Ok(Expr::MapLiteral),
        ContainerHead::Set | ContainerHead::WeakSet => Ok(Expr::SetLiteral),
        _ => {
            let mut props = Vec::new();
            for step in steps {
                if let PlanStep::Assign { key, value } = step {
                    props.push((prop_lit(key), resolve_ref(store, resolved, *value)?));
                }
            }
            Ok(Expr::ObjectLiteral(props))
        }
    }
}

fn prop_lit(key: &PropKey) -> PropLit {
    match key {
        PropKey::Named(n) => PropLit::Named(n.clone()),
        PropKey::Index(i) => PropLit::Index(*i),
        PropKey::Symbol(s) => PropLit::Computed(Box::new(Expr::Ident(format!("__sym_{}", s.as_usize())))),
    }
}

/// Like [`emit_extra_steps`], but for a function record's own properties.
/// A container's `Assign` steps are already folded into its literal by
/// [`build_container_literal`], so `emit_extra_steps` treats them as a
/// no-op; a function has no such literal to fold them into (its "literal"
/// is the fixed `body_source`), so every `Assign` — including the
/// `.prototype` assignment functions and class constructors carry — must
/// become its own statement here instead of being silently dropped.
fn emit_function_extra_steps(
    store: &RecordStore,
    target: &Expr,
    steps: &[PlanStep],
    resolved: &HashMap<RecordId, Resolved>,
    prelude: &mut Vec<Stmt>,
) -> Result<()> {
    for step in steps {
        if let PlanStep::Assign { key, value } = step {
            prelude.push(Stmt::Assign { target: expr_for_key(target.clone(), key), value: resolve_ref(store, resolved, *value)? });
        }
    }
    emit_extra_steps(store, target, steps, resolved, prelude)
}

/// Emits every step of a container/function plan that a literal alone
/// cannot express: non-default descriptors, map/set entries, holes left
/// over from a hoisted (non-inlined) sequence, and an explicit
/// `setPrototypeOf` when the literal head couldn't carry it.
fn emit_extra_steps(
    store: &RecordStore,
    target: &Expr,
    steps: &[PlanStep],
    resolved: &HashMap<RecordId, Resolved>,
    prelude: &mut Vec<Stmt>,
) -> Result<()> {
    for step in steps {
        match step {
            PlanStep::Assign { .. } | PlanStep::Hole => {}
            PlanStep::DefineProperty { key, descriptor } => {
                let value = match &descriptor.value {
                    PlanDescriptorValue::Data(v) => DescriptorValueLit::Data(resolve_ref(store, resolved, *v)?),
                    PlanDescriptorValue::Accessor { getter, setter } => DescriptorValueLit::Accessor {
                        getter: getter.map(|g| resolve_ref(store, resolved, g)).transpose()?,
                        setter: setter.map(|s| resolve_ref(store, resolved, s)).transpose()?,
                    },
                };
                prelude.push(Stmt::DefineProperty {
                    target: target.clone(),
                    key: prop_lit(key),
                    descriptor: DescriptorLit {
                        writable: descriptor.writable,
                        enumerable: descriptor.enumerable,
                        configurable: descriptor.configurable,
                        value,
                    },
                });
            }
            PlanStep::SetPrototype(v) => {
                prelude.push(Stmt::SetPrototype { target: target.clone(), value: resolve_ref(store, resolved, *v)? });
            }
            PlanStep::MapSet { key, value } => {
                prelude.push(Stmt::MapSet {
                    target: target.clone(),
                    key: resolve_ref(store, resolved, *key)?,
                    value: resolve_ref(store, resolved, *value)?,
                });
            }
            PlanStep::SetAdd(v) => {
                prelude.push(Stmt::SetAdd { target: target.clone(), value: resolve_ref(store, resolved, *v)? });
            }
        }
    }
    Ok(())
}

fn lower_post_hoc_step(store: &RecordStore, resolved: &HashMap<RecordId, Resolved>, owner: RecordId, step: &PlanStep) -> Result<Stmt> {
    let target = resolve_ref(store, resolved, owner)?;
    match step {
        PlanStep::Assign { key, value } => Ok(Stmt::Assign {
            target: expr_for_key(target, key),
            value: resolve_ref(store, resolved, *value)?,
        }),
        PlanStep::DefineProperty { key, descriptor } => {
            let value = match &descriptor.value {
                PlanDescriptorValue::Data(v) => DescriptorValueLit::Data(resolve_ref(store, resolved, *v)?),
                PlanDescriptorValue::Accessor { getter, setter } => DescriptorValueLit::Accessor {
                    getter: getter.map(|g| resolve_ref(store, resolved, g)).transpose()?,
                    setter: setter.map(|s| resolve_ref(store, resolved, s)).transpose()?,
                },
            };
            Ok(Stmt::DefineProperty {
                target,
                key: prop_lit(key),
                descriptor: DescriptorLit { writable: descriptor.writable, enumerable: descriptor.enumerable, configurable: descriptor.configurable, value },
            })
        }
        PlanStep::SetPrototype(v) => Ok(Stmt::SetPrototype { target, value: resolve_ref(store, resolved, *v)? }),
        PlanStep::MapSet { key, value } => Ok(Stmt::MapSet {
            target,
            key: resolve_ref(store, resolved, *key)?,
            value: resolve_ref(store, resolved, *value)?,
        }),
        PlanStep::SetAdd(v) => Ok(Stmt::SetAdd { target, value: resolve_ref(store, resolved, *v)? }),
        PlanStep::Hole => Err(Error::UnrewritableCycle { breadcrumb: crate::error::Breadcrumb::root() }),
    }
}

fn expr_for_key(target: Expr, key: &PropKey) -> Expr {
    match key {
        PropKey::Named(n) => Expr::Member(Box::new(target), n.clone()),
        PropKey::Index(i) => Expr::Index(Box::new(target), Box::new(Expr::Literal(ClassifiedPrimitive::Integer(*i as i64)))),
        PropKey::Symbol(s) => Expr::Index(Box::new(target), Box::new(Expr::Ident(format!("__sym_{}", s.as_usize())))),
    }
}

fn emit_scope(
    store: &RecordStore,
    scope_id: RecordId,
    scope: &ScopeRecord,
    allocator: &mut dyn IdentifierAllocator,
    root_scope: ScopeHandle,
    options: &SerializeOptions,
    resolved: &mut HashMap<RecordId, Resolved>,
    prelude: &mut Vec<Stmt>,
) -> Result<()> {
    let produced: HashSet<RecordId> = scope.produces.iter().copied().collect();

    // Captures whose value record is one of this scope's own produced
    // functions need no factory parameter: the function declaration for it
    // will already be in scope by the time anything in this factory body
    // references it by name.
    let mut param_names = Vec::new();
    let mut rewrites: Vec<(String, String)> = Vec::new();
    // A captured `const` binding must keep rejecting reassignment the way it
    // did at the source: the factory's own parameter is an ordinary mutable
    // JS binding, so a closure body that writes to it would otherwise
    // silently succeed. Aliasing the real name through its own `const`
    // declaration inside the factory body (initialized from a
    // differently-named parameter) makes any such write hit a real `const`
    // and throw the same "assignment to constant" error the source would.
    let mut const_aliases: Vec<(String, String)> = Vec::new();
    for capture in &scope.captures {
        if produced.contains(&capture.value) {
            continue;
        }
        let final_name = if capture.frozen {
            allocator.freeze_with_name(&capture.name, root_scope)?;
            capture.name.clone()
        } else {
            allocator.allocate(&capture.name, root_scope)
        };
        if final_name != capture.name {
            rewrites.push((capture.name.clone(), final_name.clone()));
        }
        if capture.is_const {
            let param_name = allocator.allocate(&format!("{final_name}_init"), root_scope);
            const_aliases.push((final_name, param_name.clone()));
            param_names.push(param_name);
        } else {
            param_names.push(final_name);
        }
    }

    let mut body: Vec<Stmt> = const_aliases
        .into_iter()
        .map(|(name, param_name)| Stmt::ConstBinding { name, value: Expr::Ident(param_name) })
        .collect();
    let mut last_name = None;
    for &func_id in &scope.produces {
        let Some(PlanNode::Function { body_source, extra_steps, .. }) = &store.get(func_id).plan else {
            return Err(Error::UnsupportedValue {
                breadcrumb: crate::error::Breadcrumb::root(),
                reason: "scope production is not a function record".to_string(),
            });
        };
        let name = allocator.allocate(&store.get(func_id).naming_hint, root_scope);
        let rewritten = rewrite_free_identifiers(body_source, &rewrites);
        body.push(Stmt::FunctionDecl { name: name.clone(), body_source: rewritten });
        resolved.insert(func_id, Resolved::Named(name.clone()));
        emit_function_extra_steps(store, &Expr::Ident(name.clone()), extra_steps, resolved, &mut body)?;
        last_name = Some(name);
    }

    let returns = match (scope.produces.len(), last_name) {
        (0, _) => Box::new(Expr::Undefined),
        (1, Some(name)) => Box::new(Expr::Ident(name)),
        (_, _) => Box::new(Expr::ArrayLiteral(scope.produces.iter().filter_map(|id| match resolved.get(id) {
            Some(Resolved::Named(n)) => Some(Some(Expr::Ident(n.clone()))),
            _ => None,
        }).collect())),
    };

    let factory = Expr::Iife { params: param_names, body, returns };

    let args = scope
        .captures
        .iter()
        .filter(|c| !produced.contains(&c.value))
        .map(|c| resolve_ref(store, resolved, c.value))
        .collect::<Result<Vec<_>>>()?;

    let call = Expr::Call(Box::new(factory), args);

    if scope.produces.len() > 1 {
        // Multiple siblings: bind the tuple once under a synthetic name so
        // each function reference below is a plain identifier, not a
        // re-invocation of the factory.
        let tuple_name = allocator.allocate("scope", root_scope);
        prelude.push(Stmt::ConstBinding { name: tuple_name.clone(), value: call });
        for (i, &func_id) in scope.produces.iter().enumerate() {
            if let Some(Resolved::Named(n)) = resolved.get(&func_id) {
                let n = n.clone();
                prelude.push(Stmt::ConstBinding {
                    name: n,
                    value: Expr::Index(Box::new(Expr::Ident(tuple_name.clone())), Box::new(Expr::Literal(ClassifiedPrimitive::Integer(i as i64)))),
                });
            }
        }
    } else if let Some(&func_id) = scope.produces.first() {
        if let Some(Resolved::Named(n)) = resolved.get(&func_id) {
            let n = n.clone();
            prelude.push(Stmt::ConstBinding { name: n, value: call });
        }
    } else {
        prelude.push(Stmt::Assign { target: Expr::Undefined, value: call });
    }

    resolved.insert(scope_id, Resolved::Named("__scope_unused".to_string()));
    let _ = options;
    Ok(())
}

/// Best-effort word-boundary substitution of captured-variable names inside
/// raw source text. Not a real parser: it will not distinguish an
/// identifier from the same text inside a string literal or comment. Kept
/// deliberately simple since this crate carries no JS parser in its
/// dependency stack (see DESIGN.md); full AST-aware rewriting belongs to
/// the external printer/instrumentation layer this crate does not own.
fn rewrite_free_identifiers(source: &str, rewrites: &[(String, String)]) -> String {
    if rewrites.is_empty() {
        return source.to_string();
    }
    let mut out = String::with_capacity(source.len());
    let chars: Vec<char> = source.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_ascii_alphabetic() || chars[i] == '_' || chars[i] == '$' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '$') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            match rewrites.iter().find(|(from, _)| *from == word) {
                Some((_, to)) => out.push_str(to),
                None => out.push_str(&word),
            }
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}
