//! Global resolver (§4.4).
//!
//! The table is built once per engine instance (not per `serialize()` call —
//! spec §5 calls it out as a shared, read-only resource an embedder may
//! reuse across concurrent engine instances) and resolved by identity
//! lookup. Which concrete intrinsics populate it is host-runtime dependent
//! (spec §9 Open Questions), so this module exposes a builder rather than a
//! fixed list; a host wires its own top-level names, chained members,
//! prototypes, accessors, and module exports through it at startup.

use std::collections::HashMap;

use crate::value::Identity;

/// How a global entry is reached relative to its parent (mirrors
/// [`crate::record::GlobalKind`], but keyed by identity rather than
/// `RecordId` since it is constructed before any record exists).
#[derive(Clone, Debug)]
pub enum GlobalPath {
    TopLevelName { name: String },
    MemberOf { parent: Identity, key: String },
    PrototypeOf { parent: Identity },
    AccessorOf { parent: Identity, key: String, is_setter: bool },
    ModuleImport { module: String, export: Option<String> },
}

#[derive(Clone, Debug)]
pub struct GlobalRow {
    pub identity: Identity,
    pub path: GlobalPath,
    pub naming_hint: String,
}

/// Immutable table row describing how to reach a host-platform intrinsic or
/// well-known value without serializing it as data (§3 "Global entry").
pub struct GlobalTable {
    by_identity: HashMap<Identity, GlobalRow>,
}

impl GlobalTable {
    pub fn builder() -> GlobalTableBuilder {
        GlobalTableBuilder { rows: Vec::new() }
    }

    /// Resolution is by identity lookup, same as the record store.
    pub fn resolve(&self, identity: Identity) -> Option<&GlobalRow> {
        self.by_identity.get(&identity)
    }

    pub fn len(&self) -> usize {
        self.by_identity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_identity.is_empty()
    }
}

/// Populates a [`GlobalTable`] at engine initialization. Once `.build()` is
/// called the table is immutable for the lifetime of the engine; no
/// mutation protocol is required past that point (spec §9).
pub struct GlobalTableBuilder {
    rows: Vec<GlobalRow>,
}

impl GlobalTableBuilder {
    pub fn top_level(mut self, identity: Identity, name: impl Into<String>) -> Self {
        let name = name.into();
        self.rows.push(GlobalRow {
            identity,
            naming_hint: name.clone(),
            path: GlobalPath::TopLevelName { name },
        });
        self
    }

    pub fn member(mut self, identity: Identity, parent: Identity, key: impl Into<String>) -> Self {
        let key = key.into();
        self.rows.push(GlobalRow {
            identity,
            naming_hint: key.clone(),
            path: GlobalPath::MemberOf { parent, key },
        });
        self
    }

    pub fn prototype_of(mut self, identity: Identity, parent: Identity, hint: impl Into<String>) -> Self {
        self.rows.push(GlobalRow {
            identity,
            naming_hint: hint.into(),
            path: GlobalPath::PrototypeOf { parent },
        });
        self
    }

    pub fn accessor(
        mut self,
        identity: Identity,
        parent: Identity,
        key: impl Into<String>,
        is_setter: bool,
    ) -> Self {
        let key = key.into();
        self.rows.push(GlobalRow {
            identity,
            naming_hint: key.clone(),
            path: GlobalPath::AccessorOf { parent, key, is_setter },
        });
        self
    }

    pub fn module_import(
        mut self,
        identity: Identity,
        module: impl Into<String>,
        export: Option<String>,
    ) -> Self {
        let module = module.into();
        let hint = export.clone().unwrap_or_else(|| module.clone());
        self.rows.push(GlobalRow { identity, naming_hint: hint, path: GlobalPath::ModuleImport { module, export } });
        self
    }

    pub fn build(self) -> GlobalTable {
        let mut by_identity = HashMap::with_capacity(self.rows.len());
        for row in self.rows {
            by_identity.insert(row.identity, row);
        }
        GlobalTable { by_identity }
    }
}
