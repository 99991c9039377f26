//! The record arena (§3 "Record", "Dependency edge", "Scope record",
//! "Global entry") and its lifecycle invariants.
//!
//! A record is created exactly once per source value, by identity, and is
//! thereafter only ever mutated by the tracer (filling in its content plan)
//! and the scope reifier (rewriting scope-argument edges). After scheduling
//! begins nothing is added. The arena owns every record; nothing outside it
//! holds a record by value, only by [`RecordId`].

use std::collections::HashMap;

use crate::ids::{PropKey, RecordId, SlotPath};
use crate::value::{ClassifiedPrimitive, Identity, ValueKind};

/// One node in a record's content plan: how to (re)construct its value.
#[derive(Clone, Debug)]
pub enum PlanNode {
    /// An interned primitive literal.
    Literal(ClassifiedPrimitive),
    Null,
    Undefined,
    /// `intern("name")` for a global symbol, or a fresh binding otherwise.
    SymbolLiteral { description: Option<String>, global: bool },
    /// A container built from a literal head (`[]`, `{}`, `new Map()`, ...)
    /// followed by property-set / method-invocation steps.
    Container { head: ContainerHead, steps: Vec<PlanStep> },
    /// A function: body text, the scope record(s) it closes over, and any
    /// own properties beyond what the runtime gives every function for free
    /// (custom statics, an explicit `.prototype` assignment, ...).
    Function { body_source: String, captured_scopes: Vec<RecordId>, extra_steps: Vec<PlanStep> },
    /// Neutral placeholder substituted for a cyclic slot by the cycle
    /// breaker (§4.6); always paired with a post-hoc assignment edge.
    Placeholder(PlaceholderKind),
    /// A reference to another record, resolved at emission time to either
    /// its name or its inline expression.
    BackReference(RecordId),
}

#[derive(Clone, Debug)]
pub enum PlaceholderKind {
    Undefined,
    EmptyContainer(ContainerHead),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ContainerHead {
    PlainObject,
    Sequence,
    Mapping,
    Set,
    WeakMapping,
    WeakSet,
    RegExp { source: String, flags: String },
    Timestamp(f64),
    BinaryBuffer { bytes: Vec<u8>, shared: bool },
    BoxedPrimitive,
    VariadicArguments,
    WeakReference,
    FinalizationRegistry,
    ClassConstructor,
    BoundFunction,
}

/// One step appended after a container's literal head: a property
/// definition or a post-hoc mutating call (`.set(...)`, `.add(...)`).
#[derive(Clone, Debug)]
pub enum PlanStep {
    /// Plain writable/enumerable/configurable assignment: `obj.key = value`.
    Assign { key: PropKey, value: RecordId },
    /// Non-default descriptor: `Object.defineProperty(obj, key, { ... })`.
    DefineProperty { key: PropKey, descriptor: PlanDescriptor },
    SetPrototype(RecordId),
    MapSet { key: RecordId, value: RecordId },
    SetAdd(RecordId),
    /// A sparse-sequence hole (index left undefined, not `undefined`-valued).
    Hole,
}

#[derive(Clone, Debug)]
pub struct PlanDescriptor {
    pub writable: bool,
    pub enumerable: bool,
    pub configurable: bool,
    pub value: PlanDescriptorValue,
}

#[derive(Clone, Debug)]
pub enum PlanDescriptorValue {
    Data(RecordId),
    Accessor { getter: Option<RecordId>, setter: Option<RecordId> },
}

/// Edge kinds of §3 "Dependency edge"; `PostHoc` is the only kind the cycle
/// breaker is allowed to introduce after tracing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    ConstructorArgument,
    PropertyValue,
    Prototype,
    ScopeArgument,
    PostHoc,
}

#[derive(Clone, Debug)]
pub struct DependencyEdge {
    pub source: RecordId,
    pub target: RecordId,
    pub slot: SlotPath,
    pub kind: EdgeKind,
}

/// How a global entry is reached relative to its parent (§3 "Global entry").
#[derive(Clone, Debug)]
pub enum GlobalKind {
    TopLevelName,
    MemberOf { parent: RecordId, key: String },
    PrototypeOf { parent: RecordId },
    AccessorOf { parent: RecordId, key: String, is_setter: bool },
    ModuleImport { module: String, export: Option<String> },
}

#[derive(Clone, Debug)]
pub struct GlobalEntry {
    pub kind: GlobalKind,
    pub naming_hint: String,
}

/// A distinguished record representing one reified captured lexical
/// environment (§3 "Scope record").
#[derive(Clone, Debug)]
pub struct ScopeRecord {
    pub captures: Vec<CaptureSlot>,
    /// Records bound by calling this scope's factory expression.
    pub produces: Vec<RecordId>,
}

#[derive(Clone, Debug)]
pub struct CaptureSlot {
    pub name: String,
    pub is_const: bool,
    pub frozen: bool,
    /// The record holding the captured variable's current value.
    pub value: RecordId,
}

/// What kind of content a record holds; distinguishes ordinary value
/// records from the two record kinds with extra structure.
#[derive(Clone, Debug)]
pub enum RecordKind {
    Value,
    Scope(ScopeRecord),
    Global(GlobalEntry),
}

pub struct Record {
    pub id: RecordId,
    pub value_kind: ValueKind,
    pub naming_hint: String,
    pub plan: Option<PlanNode>,
    pub kind: RecordKind,
    pub out_edges: Vec<DependencyEdge>,
    pub in_edges: Vec<DependencyEdge>,
    /// Filled in during scheduling.
    pub assigned_name: Option<String>,
    /// One use, acyclic, no side-effecting construction.
    pub inlineable: bool,
}

impl Record {
    fn new(id: RecordId, value_kind: ValueKind, naming_hint: String, kind: RecordKind) -> Self {
        Record {
            id,
            value_kind,
            naming_hint,
            plan: None,
            kind,
            out_edges: Vec::new(),
            in_edges: Vec::new(),
            assigned_name: None,
            inlineable: false,
        }
    }
}

/// The per-`serialize()` arena. Owns every record and the identity→record
/// map that guarantees each source value is represented exactly once.
#[derive(Default)]
pub struct RecordStore {
    records: Vec<Record>,
    by_identity: HashMap<Identity, RecordId>,
}

impl RecordStore {
    pub fn new() -> Self {
        RecordStore::default()
    }

    /// Looks up a record already created for `identity`, if any.
    pub fn lookup(&self, identity: Identity) -> Option<RecordId> {
        self.by_identity.get(&identity).copied()
    }

    /// Creates a fresh record for `identity` and inserts it into the map
    /// *before* the caller recurses into its contents — this is what makes
    /// self-references and cycles terminate during tracing.
    ///
    /// Panics if `identity` is already mapped: the value→record map must
    /// never be re-mapped once a value has a record (spec §3 invariant).
    pub fn create(
        &mut self,
        identity: Identity,
        value_kind: ValueKind,
        naming_hint: String,
        kind: RecordKind,
    ) -> RecordId {
        assert!(
            !self.by_identity.contains_key(&identity),
            "record store invariant violated: identity {identity} already has a record"
        );
        let id = RecordId(self.records.len());
        self.records.push(Record::new(id, value_kind, naming_hint, kind));
        self.by_identity.insert(identity, id);
        id
    }

    /// Creates a record with no backing source identity (used for interned
    /// primitives and for global entries, which are keyed by a synthetic
    /// identity derived from the global table, not by the host's object
    /// identity).
    pub fn create_anonymous(
        &mut self,
        value_kind: ValueKind,
        naming_hint: String,
        kind: RecordKind,
    ) -> RecordId {
        let id = RecordId(self.records.len());
        self.records.push(Record::new(id, value_kind, naming_hint, kind));
        id
    }

    pub fn get(&self, id: RecordId) -> &Record {
        &self.records[id.0]
    }

    pub fn get_mut(&mut self, id: RecordId) -> &mut Record {
        &mut self.records[id.0]
    }

    pub fn set_plan(&mut self, id: RecordId, plan: PlanNode) {
        self.records[id.0].plan = Some(plan);
    }

    pub fn add_edge(&mut self, edge: DependencyEdge) {
        self.records[edge.target.0].in_edges.push(edge.clone());
        self.records[edge.source.0].out_edges.push(edge);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = RecordId> {
        (0..self.records.len()).map(RecordId)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }
}
