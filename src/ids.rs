//! Stable integer ids for the record arena.
//!
//! The engine never stores pointers between records — only ids — so the
//! dependency graph and cycle breaker can rewrite edges without fighting the
//! borrow checker. Three newtypes keep the three id spaces (records, scopes,
//! globals) from being mixed up at a call site; `ScopeId` and `GlobalId` are
//! themselves `RecordId`s under the hood (every scope and every global entry
//! is also a record), but the wrapper documents intent at each use site.

/// Identifies one record in the arena, assigned strictly in discovery order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(pub(crate) usize);

impl RecordId {
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0
    }
}

/// Identifies a scope record (a reified captured lexical environment).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(pub RecordId);

impl ScopeId {
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0.as_usize()
    }
}

/// Identifies a global-reference record.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GlobalId(pub RecordId);

impl GlobalId {
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0.as_usize()
    }
}

/// One step in the path from a record's content plan to a dependency.
///
/// Cycle breaking rewrites a `SlotPath` in place (replacing the live
/// reference with a placeholder and adding a post-hoc assignment edge), so
/// this has to be data, not a closure.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SlotStep {
    ConstructorArg(usize),
    PropertyValue(PropKey),
    PropertyGetter(PropKey),
    PropertySetter(PropKey),
    Prototype,
    ScopeArg(usize),
    MapEntry { index: usize, is_key: bool },
    SetEntry(usize),
}

/// A `SlotPath` is the full address of one dependency reference inside a
/// record's content plan; `slot_paths` are usually one or two steps deep.
pub type SlotPath = Vec<SlotStep>;

/// An own-property key: either a string or a symbol record reference.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropKey {
    Named(String),
    Index(u32),
    Symbol(RecordId),
}
