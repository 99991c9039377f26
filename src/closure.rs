//! Closure registry collaborator and the scope reifier (§4.5).
//!
//! The registry is the interface the out-of-scope source instrumentation
//! pass publishes to: it is how captured variables become observable at
//! all. This module treats it purely as data in, `ScopeRecord`s out — it is
//! oblivious to how a host registers functions with it (spec §9).

use std::collections::HashMap;

use crate::allocator::{IdentifierAllocator, ScopeHandle};
use crate::error::Result;
use crate::ids::RecordId;
use crate::record::{CaptureSlot, RecordKind, RecordStore, ScopeRecord};
use crate::value::ValueHandle;

/// One binding captured by a lexical environment.
///
/// `current_value` is the live value the binding holds right now; the
/// engine traces it like any other structural reference so that two
/// closures sharing a frame end up sharing one captured record, not two
/// independent copies of "the same" value.
pub struct CapturedBinding {
    pub name: String,
    pub is_const: bool,
    pub frozen: bool,
    pub current_value: ValueHandle,
}

/// One captured lexical environment, innermost-to-outermost order within a
/// function's chain. `hash_id` identifies the *frame*, not the binding list
/// — two functions that closed over the same runtime frame report the same
/// `hash_id`, which is exactly what lets the reifier deduplicate them into
/// one [`ScopeRecord`].
pub struct CapturedEnvEntry {
    pub hash_id: u64,
    pub bindings: Vec<CapturedBinding>,
}

/// What the registry knows about one function value.
pub struct ClosureInfo {
    pub body_source: String,
    pub param_names: Vec<String>,
    pub captured_env_chain: Vec<CapturedEnvEntry>,
    /// True if a dynamic-code-evaluation construct anywhere in this
    /// function's chain could observe its own parameters by name, forcing
    /// the identifier allocator to freeze them too (spec §4.5).
    pub own_params_frozen: bool,
}

/// External collaborator mapping a function value to its closure layout
/// (spec §4.5, §6). `identity` is the same identity the value introspector
/// reports for the function.
pub trait ClosureRegistry {
    fn lookup(&self, identity: crate::value::Identity) -> Option<ClosureInfo>;
}

/// Reifies captured environments into shared [`ScopeRecord`]s and tracks
/// which frame hashes have already produced one, so that functions which
/// shared a frame in the source share the scope record in the output too.
pub struct ScopeReifier {
    scope_by_frame: HashMap<u64, RecordId>,
    scope_handle_by_frame: HashMap<u64, ScopeHandle>,
}

impl ScopeReifier {
    pub fn new() -> Self {
        ScopeReifier { scope_by_frame: HashMap::new(), scope_handle_by_frame: HashMap::new() }
    }

    /// Looks up (or lazily allocates) the scope record for `frame`. The
    /// caller supplies the already-traced `RecordId`s of each binding's
    /// current value, in the same order as `frame.bindings`, because
    /// tracing a value requires the tracer's recursion machinery, which
    /// this module does not have access to.
    pub fn reify_frame(
        &mut self,
        frame: &CapturedEnvEntry,
        binding_record_ids: &[RecordId],
        store: &mut RecordStore,
        allocator: &mut dyn IdentifierAllocator,
        enclosing_scope: Option<ScopeHandle>,
    ) -> Result<(RecordId, ScopeHandle, bool)> {
        debug_assert_eq!(frame.bindings.len(), binding_record_ids.len());

        if let Some(&existing) = self.scope_by_frame.get(&frame.hash_id) {
            let handle = self.scope_handle_by_frame[&frame.hash_id];
            return Ok((existing, handle, false));
        }

        let handle = allocator.new_scope(enclosing_scope);
        let mut captures = Vec::with_capacity(frame.bindings.len());
        for (binding, &value_id) in frame.bindings.iter().zip(binding_record_ids) {
            if binding.frozen {
                allocator.freeze_with_name(&binding.name, handle)?;
            }
            captures.push(CaptureSlot {
                name: binding.name.clone(),
                is_const: binding.is_const,
                frozen: binding.frozen,
                value: value_id,
            });
        }

        let scope_record_id =
            store.create_anonymous(crate::value::ValueKind::Unknown, "scope".to_string(), RecordKind::Scope(ScopeRecord { captures, produces: Vec::new() }));

        self.scope_by_frame.insert(frame.hash_id, scope_record_id);
        self.scope_handle_by_frame.insert(frame.hash_id, handle);
        Ok((scope_record_id, handle, true))
    }

    /// Registers `function_record` as one of the values produced by
    /// `scope_record`'s factory expression.
    pub fn attach_product(&self, scope_record: RecordId, function_record: RecordId, store: &mut RecordStore) {
        if let RecordKind::Scope(scope) = &mut store.get_mut(scope_record).kind {
            scope.produces.push(function_record);
        }
    }
}

impl Default for ScopeReifier {
    fn default() -> Self {
        Self::new()
    }
}
