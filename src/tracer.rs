//! The tracer (§4.3): walks from the root and produces records.
//!
//! Discovery is depth-first, left-to-right over each kind's structural
//! contents in the insertion order the introspector returns, and record ids
//! are assigned strictly in that order (spec §5) — this is what makes
//! output byte-identical across runs of the same input. The map from value
//! identity to record is populated *before* recursing into a value's
//! contents, which is what makes cyclic graphs terminate instead of
//! overflowing.

use std::collections::HashMap;

use crate::allocator::{IdentifierAllocator, ScopeHandle};
use crate::closure::{ClosureRegistry, ScopeReifier};
use crate::error::{Breadcrumb, BreadcrumbSegment, Error, Result};
use crate::globals::GlobalTable;
use crate::ids::{PropKey, RecordId, SlotStep};
use crate::record::{
    ContainerHead, DependencyEdge, EdgeKind, PlanDescriptor, PlanDescriptorValue, PlanNode,
    PlanStep, RecordKind, RecordStore,
};
use crate::value::{
    Classification, FunctionKind, Identity, IntrinsicSlots, OwnProperty, PropertyValueKind,
    ValueHandle, ValueKind,
};

/// Owns the record arena for one `serialize()` call and performs the trace.
pub struct Tracer<'a> {
    pub store: RecordStore,
    globals: &'a GlobalTable,
    closures: &'a dyn ClosureRegistry,
    reifier: ScopeReifier,
    allocator: &'a mut dyn IdentifierAllocator,
    root_scope: ScopeHandle,
    primitive_interns: HashMap<String, RecordId>,
    symbol_interns: HashMap<String, RecordId>,
}

impl<'a> Tracer<'a> {
    pub fn new(
        globals: &'a GlobalTable,
        closures: &'a dyn ClosureRegistry,
        allocator: &'a mut dyn IdentifierAllocator,
    ) -> Self {
        let root_scope = allocator.new_scope(None);
        Tracer {
            store: RecordStore::new(),
            globals,
            closures,
            reifier: ScopeReifier::new(),
            allocator,
            root_scope,
            primitive_interns: HashMap::new(),
            symbol_interns: HashMap::new(),
        }
    }

    pub fn root_scope(&self) -> ScopeHandle {
        self.root_scope
    }

    /// Entry point: trace the root value and return its record id.
    pub fn trace_root(&mut self, root: &ValueHandle) -> Result<RecordId> {
        self.trace_value(root, &Breadcrumb::root())
    }

    fn trace_value(&mut self, handle: &ValueHandle, breadcrumb: &Breadcrumb) -> Result<RecordId> {
        let c = handle.0.classify();

        if c.kind.is_primitive() {
            return Ok(self.intern_primitive(&c));
        }
        if c.kind == ValueKind::Unknown {
            return Err(Error::UnsupportedValue {
                breadcrumb: breadcrumb.clone(),
                reason: "introspector returned kind=unknown".to_string(),
            });
        }
        if let Some(existing) = self.store.lookup(c.identity) {
            return Ok(existing);
        }
        if self.globals.resolve(c.identity).is_some() {
            return Ok(self.resolve_global(c.identity));
        }

        let hint = naming_hint_for(&c);
        let id = self.store.create(c.identity, c.kind, hint, RecordKind::Value);

        match c.kind {
            ValueKind::Function(function_kind) => {
                self.trace_function(id, c, breadcrumb, function_kind)?;
            }
            ValueKind::OrderedSequence => self.trace_sequence(id, c, breadcrumb)?,
            ValueKind::MappingByIdentity | ValueKind::WeakMapping => {
                let weak = c.kind == ValueKind::WeakMapping;
                self.trace_map(id, c, breadcrumb, weak)?;
            }
            ValueKind::SetByIdentity | ValueKind::WeakSet => {
                let weak = c.kind == ValueKind::WeakSet;
                self.trace_set(id, c, breadcrumb, weak)?;
            }
            ValueKind::Symbol => self.trace_symbol(id, c)?,
            ValueKind::RegularExpression => self.trace_regexp(id, c, breadcrumb)?,
            ValueKind::Timestamp => self.trace_timestamp(id, c, breadcrumb)?,
            ValueKind::BinaryBuffer => self.trace_buffer(id, c, breadcrumb)?,
            kind => {
                let head = head_for(kind);
                self.trace_generic_object(id, c, breadcrumb, head)?;
            }
        }

        Ok(id)
    }

    /// Resolves a global-table identity to its record, recursively
    /// resolving any parent the global path depends on (e.g. `Object.assign`
    /// needs `Object`'s record before it can express `parent.key`). Global
    /// rows never need the value introspector — everything about them is
    /// already in the table — so this bypasses `trace_value` entirely.
    fn resolve_global(&mut self, identity: Identity) -> RecordId {
        if let Some(existing) = self.store.lookup(identity) {
            return existing;
        }
        let row = self
            .globals
            .resolve(identity)
            .expect("resolve_global called with an identity not present in the global table")
            .clone();

        let kind = match &row.path {
            crate::globals::GlobalPath::TopLevelName { .. } => crate::record::GlobalKind::TopLevelName,
            crate::globals::GlobalPath::MemberOf { parent, key } => {
                let parent_id = self.resolve_global(*parent);
                crate::record::GlobalKind::MemberOf { parent: parent_id, key: key.clone() }
            }
            crate::globals::GlobalPath::PrototypeOf { parent } => {
                let parent_id = self.resolve_global(*parent);
                crate::record::GlobalKind::PrototypeOf { parent: parent_id }
            }
            crate::globals::GlobalPath::AccessorOf { parent, key, is_setter } => {
                let parent_id = self.resolve_global(*parent);
                crate::record::GlobalKind::AccessorOf { parent: parent_id, key: key.clone(), is_setter: *is_setter }
            }
            crate::globals::GlobalPath::ModuleImport { module, export } => {
                crate::record::GlobalKind::ModuleImport { module: module.clone(), export: export.clone() }
            }
        };

        self.store.create(
            identity,
            ValueKind::CompositeObject,
            row.naming_hint.clone(),
            RecordKind::Global(crate::record::GlobalEntry { kind, naming_hint: row.naming_hint }),
        )
    }

    fn intern_primitive(&mut self, c: &Classification) -> RecordId {
        // `BigInteger`'s payload travels in `intrinsic` (its digits can
        // outgrow any scalar field `primitive_value` carries), not in
        // `primitive_value` like every other primitive kind.
        let big_digits = match (&c.kind, &c.intrinsic) {
            (ValueKind::BigInteger, IntrinsicSlots::BigIntegerDigits(digits)) => {
                Some(crate::value::ClassifiedPrimitive::BigInteger(digits.clone()))
            }
            _ => None,
        };
        let value = big_digits.as_ref().or(c.primitive_value.as_ref());

        let key = match value {
            Some(v) => format!("{:?}::{:?}", c.kind, debug_primitive(v)),
            None => format!("{:?}", c.kind),
        };
        if let Some(&id) = self.primitive_interns.get(&key) {
            return id;
        }
        let plan = match (&c.kind, value) {
            (ValueKind::Null, _) => PlanNode::Null,
            (ValueKind::Undefined, _) => PlanNode::Undefined,
            (_, Some(v)) => PlanNode::Literal(v.clone()),
            (_, None) => PlanNode::Undefined,
        };
        let id = self.store.create_anonymous(c.kind, "lit".to_string(), RecordKind::Value);
        self.store.set_plan(id, plan);
        self.primitive_interns.insert(key, id);
        id
    }

    fn trace_symbol(&mut self, id: RecordId, c: Classification) -> Result<()> {
        if let IntrinsicSlots::Symbol { description, global } = &c.intrinsic {
            if *global {
                let key = description.clone().unwrap_or_default();
                if let Some(&existing) = self.symbol_interns.get(&key) {
                    // A global symbol is itself deduplicated by description,
                    // independent of the identity map (two `Symbol.for(x)`
                    // calls in the host may or may not share identity).
                    self.store.set_plan(
                        id,
                        PlanNode::SymbolLiteral { description: Some(key), global: true },
                    );
                    let _ = existing;
                } else {
                    self.symbol_interns.insert(key.clone(), id);
                    self.store.set_plan(id, PlanNode::SymbolLiteral { description: Some(key), global: true });
                }
            } else {
                self.store.set_plan(
                    id,
                    PlanNode::SymbolLiteral { description: description.clone(), global: false },
                );
            }
        }
        Ok(())
    }

    fn trace_regexp(&mut self, id: RecordId, c: Classification, breadcrumb: &Breadcrumb) -> Result<()> {
        let (source, flags) = match &c.intrinsic {
            IntrinsicSlots::RegExp { source, flags } => (source.clone(), flags.clone()),
            _ => (String::new(), String::new()),
        };
        self.finish_container(id, c, breadcrumb, ContainerHead::RegExp { source, flags })
    }

    fn trace_timestamp(&mut self, id: RecordId, c: Classification, breadcrumb: &Breadcrumb) -> Result<()> {
        let millis = match &c.intrinsic {
            IntrinsicSlots::Timestamp(ms) => *ms,
            _ => f64::NAN,
        };
        self.finish_container(id, c, breadcrumb, ContainerHead::Timestamp(millis))
    }

    fn trace_buffer(&mut self, id: RecordId, c: Classification, breadcrumb: &Breadcrumb) -> Result<()> {
        let (bytes, shared) = match &c.intrinsic {
            IntrinsicSlots::BinaryBuffer { bytes, shared } => (bytes.clone(), *shared),
            _ => (Vec::new(), false),
        };
        self.finish_container(id, c, breadcrumb, ContainerHead::BinaryBuffer { bytes, shared })
    }

    fn trace_generic_object(
        &mut self,
        id: RecordId,
        c: Classification,
        breadcrumb: &Breadcrumb,
        head: ContainerHead,
    ) -> Result<()> {
        self.finish_container(id, c, breadcrumb, head)
    }

    /// Shared tail for every "own properties + prototype" kind: builds the
    /// `steps` list for own properties/symbols, then the prototype link.
    fn finish_container(
        &mut self,
        id: RecordId,
        c: Classification,
        breadcrumb: &Breadcrumb,
        head: ContainerHead,
    ) -> Result<()> {
        let mut steps = Vec::new();
        self.trace_own_properties(id, &c.own_properties, breadcrumb, &mut steps)?;
        self.trace_own_properties(id, &c.own_symbols, breadcrumb, &mut steps)?;
        self.trace_prototype(id, &c, breadcrumb, &mut steps)?;
        self.store.set_plan(id, PlanNode::Container { head, steps });
        Ok(())
    }

    fn trace_sequence(&mut self, id: RecordId, c: Classification, breadcrumb: &Breadcrumb) -> Result<()> {
        let mut max_index: Option<u32> = None;
        for p in &c.own_properties {
            if let PropKey::Index(i) = p.key {
                max_index = Some(max_index.map_or(i, |m| m.max(i)));
            }
        }
        let mut by_index: HashMap<u32, &OwnProperty> = HashMap::new();
        let mut named = Vec::new();
        for p in &c.own_properties {
            match p.key {
                PropKey::Index(i) => {
                    by_index.insert(i, p);
                }
                _ => named.push(p),
            }
        }

        let mut steps = Vec::new();
        if let Some(max) = max_index {
            for i in 0..=max {
                match by_index.get(&i) {
                    Some(prop) => {
                        let step = self.trace_one_property(
                            id,
                            prop,
                            breadcrumb,
                            &breadcrumb.push(BreadcrumbSegment::Index(i as usize)),
                        )?;
                        steps.push(step);
                    }
                    None => steps.push(PlanStep::Hole),
                }
            }
        }
        for prop in named {
            let child_crumb = match &prop.key {
                PropKey::Named(name) => breadcrumb.push(BreadcrumbSegment::Field(name.clone())),
                PropKey::Symbol(_) => breadcrumb.push(BreadcrumbSegment::SymbolKey),
                PropKey::Index(i) => breadcrumb.push(BreadcrumbSegment::Index(*i as usize)),
            };
            steps.push(self.trace_one_property(id, prop, breadcrumb, &child_crumb)?);
        }
        self.trace_prototype(id, &c, breadcrumb, &mut steps)?;
        self.store.set_plan(id, PlanNode::Container { head: ContainerHead::Sequence, steps });
        Ok(())
    }

    fn trace_map(&mut self, id: RecordId, c: Classification, breadcrumb: &Breadcrumb, weak: bool) -> Result<()> {
        // The data model carries map entries as paired own_properties where
        // the descriptor's data value is the map value and the key is
        // synthesized by the introspector as a numeric index into the
        // entry list (insertion order preserved); the *actual* key value is
        // reached through a dedicated intrinsic slot pairing, which for a
        // map collapses to: every other own_properties is a key marker.
        // We model entries directly: own_properties alternate (key, value)
        // pairs tagged by PropKey::Index(2*i) / Index(2*i+1).
        let mut steps = Vec::new();
        let mut entries: Vec<(Option<RecordId>, Option<RecordId>)> = Vec::new();
        for p in &c.own_properties {
            if let PropKey::Index(slot) = p.key {
                let entry_index = (slot / 2) as usize;
                let is_key = slot % 2 == 0;
                while entries.len() <= entry_index {
                    entries.push((None, None));
                }
                let child_crumb = breadcrumb.push(BreadcrumbSegment::Index(entry_index));
                let rid = self.trace_property_value(id, p, &child_crumb, SlotStep::MapEntry { index: entry_index, is_key })?;
                if is_key {
                    entries[entry_index].0 = Some(rid);
                } else {
                    entries[entry_index].1 = Some(rid);
                }
            }
        }
        for (key, value) in entries {
            if let (Some(key), Some(value)) = (key, value) {
                steps.push(PlanStep::MapSet { key, value });
            }
        }
        self.trace_prototype(id, &c, breadcrumb, &mut steps)?;
        let head = if weak { ContainerHead::WeakMapping } else { ContainerHead::Mapping };
        self.store.set_plan(id, PlanNode::Container { head, steps });
        Ok(())
    }

    fn trace_set(&mut self, id: RecordId, c: Classification, breadcrumb: &Breadcrumb, weak: bool) -> Result<()> {
        let mut steps = Vec::new();
        for (i, p) in c.own_properties.iter().enumerate() {
            let child_crumb = breadcrumb.push(BreadcrumbSegment::Index(i));
            let rid = self.trace_property_value(id, p, &child_crumb, SlotStep::SetEntry(i))?;
            steps.push(PlanStep::SetAdd(rid));
        }
        self.trace_prototype(id, &c, breadcrumb, &mut steps)?;
        let head = if weak { ContainerHead::WeakSet } else { ContainerHead::Set };
        self.store.set_plan(id, PlanNode::Container { head, steps });
        Ok(())
    }

    fn trace_function(
        &mut self,
        id: RecordId,
        c: Classification,
        breadcrumb: &Breadcrumb,
        function_kind: FunctionKind,
    ) -> Result<()> {
        let (body_source, prototype_object) = match &c.intrinsic {
            IntrinsicSlots::FunctionBody { source_text, prototype_object, .. } => {
                (source_text.clone(), prototype_object.clone())
            }
            IntrinsicSlots::BoundFunction { .. } => (String::new(), None),
            _ => {
                return Err(Error::UnsupportedValue {
                    breadcrumb: breadcrumb.clone(),
                    reason: "function value has no recoverable body text".to_string(),
                })
            }
        };

        let closure_info = self.closures.lookup(c.identity);

        let mut captured_scopes = Vec::new();
        if let Some(info) = &closure_info {
            let mut enclosing: Option<ScopeHandle> = None;
            for (frame_index, frame) in info.captured_env_chain.iter().enumerate() {
                let mut binding_ids = Vec::with_capacity(frame.bindings.len());
                for (i, binding) in frame.bindings.iter().enumerate() {
                    let child_crumb = breadcrumb.push(BreadcrumbSegment::ClosureCapture(binding.name.clone()));
                    let rid = self.trace_value(&binding.current_value, &child_crumb)?;
                    binding_ids.push(rid);
                    let _ = i;
                }
                let (scope_id, handle, is_new) = self.reifier.reify_frame(
                    frame,
                    &binding_ids,
                    &mut self.store,
                    &mut *self.allocator,
                    enclosing,
                )?;
                // The scope's dependency on its captured values is wired once,
                // the first time this frame is reified. Every later function
                // that shares the frame reuses the same scope record and the
                // same captures; re-adding the edges here would double-count
                // a single factory argument as if it had two consumers.
                if is_new {
                    for (binding, &value_id) in frame.bindings.iter().zip(&binding_ids) {
                        if value_id == id {
                            // This function captured itself (e.g. a named
                            // function expression referencing its own binding).
                            // The scope reifier already special-cases this: the
                            // function is declared directly inside the factory
                            // body, so it needs no argument edge, and wiring one
                            // would create a spurious scope<->function cycle
                            // with no content plan on the scope side to break.
                            continue;
                        }
                        self.store.add_edge(DependencyEdge {
                            source: scope_id,
                            target: value_id,
                            slot: vec![SlotStep::ScopeArg(0)],
                            kind: EdgeKind::ScopeArgument,
                        });
                    }
                }
                // `captured_env_chain` runs innermost-to-outermost; only the
                // innermost frame's factory directly produces this function.
                // Outer frames in the chain enclose other functions (or
                // nothing this tracer needs to represent), not this one.
                if frame_index == 0 {
                    self.reifier.attach_product(scope_id, id, &mut self.store);
                    // This function is only resolvable once its governing
                    // scope's factory has run; anything that in turn depends
                    // on this function (an edge into `id`) needs the
                    // scheduler to place the scope strictly earlier too.
                    self.store.add_edge(DependencyEdge {
                        source: id,
                        target: scope_id,
                        slot: vec![],
                        kind: EdgeKind::ScopeArgument,
                    });
                }
                captured_scopes.push(scope_id);
                enclosing = Some(handle);
            }
        } else if function_captures_anything_detectable(&c) {
            return Err(Error::MissingClosureMetadata { breadcrumb: breadcrumb.clone() });
        }

        if let Some(info) = &closure_info {
            if info.own_params_frozen {
                for name in &info.param_names {
                    self.allocator.freeze_with_name(name, self.root_scope)?;
                }
            }
        }

        // Own properties beyond what every function gets for free, plus the
        // function's own prototype link, are traced like any object; they
        // become `extra_steps` on the Function plan rather than a separate
        // record (spec §4.3: a function's `.prototype` is never a
        // standalone record when it's reachable only through the function).
        let mut extra_steps = Vec::new();
        self.trace_own_properties(id, &c.own_properties, breadcrumb, &mut extra_steps)?;
        self.trace_own_properties(id, &c.own_symbols, breadcrumb, &mut extra_steps)?;
        if let Some(proto_obj) = prototype_object {
            let child_crumb = breadcrumb.push(BreadcrumbSegment::Field("prototype".to_string()));
            let proto_id = self.trace_value(&proto_obj, &child_crumb)?;
            self.store.add_edge(DependencyEdge {
                source: id,
                target: proto_id,
                slot: vec![SlotStep::PropertyValue(PropKey::Named("prototype".to_string()))],
                kind: EdgeKind::PropertyValue,
            });
            extra_steps.push(PlanStep::Assign { key: PropKey::Named("prototype".to_string()), value: proto_id });
        }
        self.trace_prototype(id, &c, breadcrumb, &mut extra_steps)?;

        self.store.set_plan(id, PlanNode::Function { body_source, captured_scopes, extra_steps });
        let _ = function_kind;
        Ok(())
    }

    fn trace_own_properties(
        &mut self,
        owner: RecordId,
        props: &[OwnProperty],
        breadcrumb: &Breadcrumb,
        steps: &mut Vec<PlanStep>,
    ) -> Result<()> {
        for prop in props {
            let child_crumb = match &prop.key {
                PropKey::Named(name) => breadcrumb.push(BreadcrumbSegment::Field(name.clone())),
                PropKey::Index(i) => breadcrumb.push(BreadcrumbSegment::Index(*i as usize)),
                PropKey::Symbol(_) => breadcrumb.push(BreadcrumbSegment::SymbolKey),
            };
            let step = self.trace_one_property(owner, prop, breadcrumb, &child_crumb)?;
            steps.push(step);
        }
        Ok(())
    }

    fn trace_one_property(
        &mut self,
        owner: RecordId,
        prop: &OwnProperty,
        _breadcrumb: &Breadcrumb,
        child_crumb: &Breadcrumb,
    ) -> Result<PlanStep> {
        let default_descriptor = matches!(&prop.descriptor.kind, PropertyValueKind::Data(_))
            && prop.descriptor.writable
            && prop.descriptor.enumerable
            && prop.descriptor.configurable;

        match &prop.descriptor.kind {
            PropertyValueKind::Data(handle) => {
                let value_id = self.trace_value(handle, child_crumb)?;
                self.store.add_edge(DependencyEdge {
                    source: owner,
                    target: value_id,
                    slot: vec![slot_step_for(&prop.key)],
                    kind: EdgeKind::PropertyValue,
                });
                if default_descriptor {
                    Ok(PlanStep::Assign { key: prop.key.clone(), value: value_id })
                } else {
                    Ok(PlanStep::DefineProperty {
                        key: prop.key.clone(),
                        descriptor: PlanDescriptor {
                            writable: prop.descriptor.writable,
                            enumerable: prop.descriptor.enumerable,
                            configurable: prop.descriptor.configurable,
                            value: PlanDescriptorValue::Data(value_id),
                        },
                    })
                }
            }
            PropertyValueKind::Accessor { getter, setter } => {
                let getter_id = getter.as_ref().map(|h| self.trace_value(h, child_crumb)).transpose()?;
                let setter_id = setter.as_ref().map(|h| self.trace_value(h, child_crumb)).transpose()?;
                if let Some(g) = getter_id {
                    self.store.add_edge(DependencyEdge {
                        source: owner,
                        target: g,
                        slot: vec![SlotStep::PropertyGetter(prop.key.clone())],
                        kind: EdgeKind::PropertyValue,
                    });
                }
                if let Some(s) = setter_id {
                    self.store.add_edge(DependencyEdge {
                        source: owner,
                        target: s,
                        slot: vec![SlotStep::PropertySetter(prop.key.clone())],
                        kind: EdgeKind::PropertyValue,
                    });
                }
                Ok(PlanStep::DefineProperty {
                    key: prop.key.clone(),
                    descriptor: PlanDescriptor {
                        writable: prop.descriptor.writable,
                        enumerable: prop.descriptor.enumerable,
                        configurable: prop.descriptor.configurable,
                        value: PlanDescriptorValue::Accessor { getter: getter_id, setter: setter_id },
                    },
                })
            }
        }
    }

    fn trace_property_value(
        &mut self,
        owner: RecordId,
        prop: &OwnProperty,
        child_crumb: &Breadcrumb,
        slot: SlotStep,
    ) -> Result<RecordId> {
        let handle = match &prop.descriptor.kind {
            PropertyValueKind::Data(h) => h,
            PropertyValueKind::Accessor { .. } => {
                return Err(Error::UnsupportedValue {
                    breadcrumb: child_crumb.clone(),
                    reason: "map/set entries cannot be accessor pairs".to_string(),
                })
            }
        };
        let rid = self.trace_value(handle, child_crumb)?;
        self.store.add_edge(DependencyEdge { source: owner, target: rid, slot: vec![slot], kind: EdgeKind::PropertyValue });
        Ok(rid)
    }

    fn trace_prototype(
        &mut self,
        id: RecordId,
        c: &Classification,
        breadcrumb: &Breadcrumb,
        steps: &mut Vec<PlanStep>,
    ) -> Result<()> {
        if c.proto_is_explicit_null {
            steps.push(PlanStep::SetPrototype(self.intern_primitive(&Classification {
                kind: ValueKind::Null,
                identity: 0,
                primitive_value: None,
                own_properties: Vec::new(),
                own_symbols: Vec::new(),
                proto: None,
                proto_is_explicit_null: false,
                extensible: true,
                intrinsic: IntrinsicSlots::None,
            })));
            return Ok(());
        }
        if let Some(proto) = &c.proto {
            let child_crumb = breadcrumb.push(BreadcrumbSegment::Prototype);
            let proto_id = self.trace_value(proto, &child_crumb)?;
            self.store.add_edge(DependencyEdge {
                source: id,
                target: proto_id,
                slot: vec![SlotStep::Prototype],
                kind: EdgeKind::Prototype,
            });
            steps.push(PlanStep::SetPrototype(proto_id));
        }
        Ok(())
    }
}

fn function_captures_anything_detectable(_c: &Classification) -> bool {
    // Without registry metadata we cannot tell whether a function captures
    // anything; conservatively treat every function as potentially capturing
    // so missing metadata is always surfaced rather than silently producing
    // an incorrect (non-closing-over) reconstruction.
    true
}

fn debug_primitive(v: &crate::value::ClassifiedPrimitive) -> String {
    use crate::value::ClassifiedPrimitive::*;
    match v {
        Boolean(b) => format!("b{b}"),
        Integer(i) => format!("i{i}"),
        Floating(f) => format!("f{}", f.to_bits()),
        BigInteger(digits) => format!("n{digits}"),
        Text(s) => format!("s{s}"),
    }
}

fn naming_hint_for(c: &Classification) -> String {
    match c.kind {
        ValueKind::Function(_) => "fn".to_string(),
        ValueKind::OrderedSequence => "arr".to_string(),
        ValueKind::MappingByIdentity | ValueKind::WeakMapping => "map".to_string(),
        ValueKind::SetByIdentity | ValueKind::WeakSet => "set".to_string(),
        ValueKind::RegularExpression => "re".to_string(),
        ValueKind::Timestamp => "date".to_string(),
        ValueKind::BinaryBuffer => "buf".to_string(),
        _ => "obj".to_string(),
    }
}

fn head_for(kind: ValueKind) -> ContainerHead {
    match kind {
        ValueKind::BoxedPrimitive => ContainerHead::BoxedPrimitive,
        ValueKind::VariadicArguments => ContainerHead::VariadicArguments,
        ValueKind::WeakReference => ContainerHead::WeakReference,
        ValueKind::FinalizationRegistry => ContainerHead::FinalizationRegistry,
        _ => ContainerHead::PlainObject,
    }
}

fn slot_step_for(key: &PropKey) -> SlotStep {
    SlotStep::PropertyValue(key.clone())
}

