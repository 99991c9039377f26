//! A small in-memory stand-in for a host runtime's reflection layer.
//!
//! Real embedders implement [`IntrospectedValue`]/[`ClosureRegistry`] against
//! their own object model; these mocks exist purely so the seed scenarios can
//! drive the engine end-to-end without one. Sharing and cycles are expressed
//! the straightforward way: a mock holds its fields behind a `RefCell` and
//! hands out `ValueHandle`s that clone the same `Rc`, so two references to
//! "the same" value really are the same value, identity included.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use valuegraph::{
    ClassifiedPrimitive, Classification, ClosureInfo, Identity, IntrinsicSlots, IntrospectedValue,
    PropKey, PropertyDescriptor, PropertyValueKind, ValueHandle, ValueKind,
};

/// One own property plus its descriptor flags, built with sensible
/// (writable/enumerable/configurable) defaults and explicit overrides where a
/// scenario cares about them.
pub struct PropEntry {
    pub key: PropKey,
    pub descriptor: PropertyDescriptor,
}

pub fn data_prop(key: PropKey, value: ValueHandle) -> PropEntry {
    PropEntry {
        key,
        descriptor: PropertyDescriptor {
            writable: true,
            enumerable: true,
            configurable: true,
            kind: PropertyValueKind::Data(value),
        },
    }
}

pub fn data_prop_with_flags(
    key: PropKey,
    value: ValueHandle,
    writable: bool,
    enumerable: bool,
    configurable: bool,
) -> PropEntry {
    PropEntry {
        key,
        descriptor: PropertyDescriptor {
            writable,
            enumerable,
            configurable,
            kind: PropertyValueKind::Data(value),
        },
    }
}

/// A primitive integer leaf. Two `MockInt`s with the same value intern to the
/// same record regardless of `identity` (the tracer dedups primitives by
/// value, not by identity), so `identity` only needs to be distinct among
/// non-primitive siblings.
pub struct MockInt(pub i64, pub Identity);

impl IntrospectedValue for MockInt {
    fn classify(&self) -> Classification {
        Classification {
            kind: ValueKind::Integer,
            identity: self.1,
            primitive_value: Some(ClassifiedPrimitive::Integer(self.0)),
            own_properties: Vec::new(),
            own_symbols: Vec::new(),
            proto: None,
            proto_is_explicit_null: false,
            extensible: true,
            intrinsic: IntrinsicSlots::None,
        }
    }
}

pub fn int(value: i64, identity: Identity) -> ValueHandle {
    ValueHandle::new(MockInt(value, identity))
}

/// An array-like, index-addressed sequence. `RefCell` lets the same `Rc` be
/// reached twice (shared reference) or point back at itself (a direct
/// cycle), which is how the self-referential seed scenarios are built —
/// no special-casing needed beyond ordinary `Rc` cloning.
pub struct MockArray {
    identity: Identity,
    items: RefCell<Vec<Option<ValueHandle>>>,
    proto: RefCell<Option<ValueHandle>>,
}

impl MockArray {
    pub fn new(identity: Identity) -> Rc<Self> {
        Rc::new(MockArray { identity, items: RefCell::new(Vec::new()), proto: RefCell::new(None) })
    }

    pub fn push(self: &Rc<Self>, item: ValueHandle) {
        self.items.borrow_mut().push(Some(item));
    }

    pub fn set_proto(self: &Rc<Self>, proto: ValueHandle) {
        *self.proto.borrow_mut() = Some(proto);
    }

    pub fn handle(self: &Rc<Self>) -> ValueHandle {
        ValueHandle(self.clone())
    }
}

impl IntrospectedValue for MockArray {
    fn classify(&self) -> Classification {
        let own_properties = self
            .items
            .borrow()
            .iter()
            .enumerate()
            .filter_map(|(i, item)| item.clone().map(|h| data_prop(PropKey::Index(i as u32), h)))
            .collect();
        Classification {
            kind: ValueKind::OrderedSequence,
            identity: self.identity,
            primitive_value: None,
            own_properties,
            own_symbols: Vec::new(),
            proto: self.proto.borrow().clone(),
            proto_is_explicit_null: false,
            extensible: true,
            intrinsic: IntrinsicSlots::None,
        }
    }
}

/// A plain mapping keyed by identity (the spec's `Mapping`, e.g. JS `Map`).
pub struct MockMap {
    identity: Identity,
    entries: RefCell<Vec<(ValueHandle, ValueHandle)>>,
    proto: RefCell<Option<ValueHandle>>,
}

impl MockMap {
    pub fn new(identity: Identity) -> Rc<Self> {
        Rc::new(MockMap { identity, entries: RefCell::new(Vec::new()), proto: RefCell::new(None) })
    }

    pub fn set(self: &Rc<Self>, key: ValueHandle, value: ValueHandle) {
        self.entries.borrow_mut().push((key, value));
    }

    pub fn handle(self: &Rc<Self>) -> ValueHandle {
        ValueHandle(self.clone())
    }
}

impl IntrospectedValue for MockMap {
    fn classify(&self) -> Classification {
        let mut own_properties = Vec::new();
        for (i, (key, value)) in self.entries.borrow().iter().enumerate() {
            own_properties.push(data_prop(PropKey::Index(2 * i as u32), key.clone()));
            own_properties.push(data_prop(PropKey::Index(2 * i as u32 + 1), value.clone()));
        }
        Classification {
            kind: ValueKind::MappingByIdentity,
            identity: self.identity,
            primitive_value: None,
            own_properties,
            own_symbols: Vec::new(),
            proto: self.proto.borrow().clone(),
            proto_is_explicit_null: false,
            extensible: true,
            intrinsic: IntrinsicSlots::None,
        }
    }
}

/// A plain composite object: a bag of properties plus a prototype link.
pub struct MockObject {
    identity: Identity,
    props: RefCell<Vec<(PropKey, PropertyDescriptor)>>,
    proto: RefCell<Option<ValueHandle>>,
}

impl MockObject {
    pub fn new(identity: Identity) -> Rc<Self> {
        Rc::new(MockObject { identity, props: RefCell::new(Vec::new()), proto: RefCell::new(None) })
    }

    pub fn set_prop(self: &Rc<Self>, entry: PropEntry) {
        self.props.borrow_mut().push((entry.key, entry.descriptor));
    }

    pub fn set_proto(self: &Rc<Self>, proto: ValueHandle) {
        *self.proto.borrow_mut() = Some(proto);
    }

    pub fn handle(self: &Rc<Self>) -> ValueHandle {
        ValueHandle(self.clone())
    }
}

impl IntrospectedValue for MockObject {
    fn classify(&self) -> Classification {
        let own_properties = self
            .props
            .borrow()
            .iter()
            .map(|(key, descriptor)| valuegraph::OwnProperty { key: key.clone(), descriptor: descriptor.clone() })
            .collect();
        Classification {
            kind: ValueKind::CompositeObject,
            identity: self.identity,
            primitive_value: None,
            own_properties,
            own_symbols: Vec::new(),
            proto: self.proto.borrow().clone(),
            proto_is_explicit_null: false,
            extensible: true,
            intrinsic: IntrinsicSlots::None,
        }
    }
}

/// A function value: fixed source text, an optional `.prototype` object
/// (for constructors/methods that need one reachable), and any extra own
/// properties (static members, etc).
pub struct MockFunction {
    identity: Identity,
    body_source: String,
    prototype_object: RefCell<Option<ValueHandle>>,
    extra_props: RefCell<Vec<(PropKey, PropertyDescriptor)>>,
    proto: RefCell<Option<ValueHandle>>,
}

impl MockFunction {
    pub fn new(identity: Identity, body_source: impl Into<String>) -> Rc<Self> {
        Rc::new(MockFunction {
            identity,
            body_source: body_source.into(),
            prototype_object: RefCell::new(None),
            extra_props: RefCell::new(Vec::new()),
            proto: RefCell::new(None),
        })
    }

    pub fn set_prototype_object(self: &Rc<Self>, proto_obj: ValueHandle) {
        *self.prototype_object.borrow_mut() = Some(proto_obj);
    }

    pub fn set_prop(self: &Rc<Self>, entry: PropEntry) {
        self.extra_props.borrow_mut().push((entry.key, entry.descriptor));
    }

    pub fn handle(self: &Rc<Self>) -> ValueHandle {
        ValueHandle(self.clone())
    }
}

impl IntrospectedValue for MockFunction {
    fn classify(&self) -> Classification {
        let own_properties = self
            .extra_props
            .borrow()
            .iter()
            .map(|(key, descriptor)| valuegraph::OwnProperty { key: key.clone(), descriptor: descriptor.clone() })
            .collect();
        Classification {
            kind: ValueKind::Function(valuegraph::FunctionKind::Plain),
            identity: self.identity,
            primitive_value: None,
            own_properties,
            own_symbols: Vec::new(),
            proto: self.proto.borrow().clone(),
            proto_is_explicit_null: false,
            extensible: true,
            intrinsic: IntrinsicSlots::FunctionBody {
                source_text: self.body_source.clone(),
                is_named: false,
                prototype_object: self.prototype_object.borrow().clone(),
            },
        }
    }
}

/// A `ClosureRegistry` backed by per-identity closures, so each `lookup`
/// freshly builds its `ClosureInfo` (capturing `ValueHandle`s by clone,
/// which is cheap `Rc` bookkeeping, not a deep copy). This is what lets two
/// functions report the same captured frame (`hash_id`) across independent
/// `lookup` calls.
pub struct MapRegistry(HashMap<Identity, Box<dyn Fn() -> ClosureInfo>>);

impl MapRegistry {
    pub fn new() -> Self {
        MapRegistry(HashMap::new())
    }

    pub fn insert(&mut self, identity: Identity, f: impl Fn() -> ClosureInfo + 'static) {
        self.0.insert(identity, Box::new(f));
    }

    /// Registers a function that captures nothing: every function the
    /// tracer visits must resolve to *some* `ClosureInfo`, even an empty one,
    /// or the engine treats the missing metadata as fatal (spec §7 kind 2).
    pub fn insert_empty(&mut self, identity: Identity) {
        self.insert(identity, || ClosureInfo {
            body_source: String::new(),
            param_names: Vec::new(),
            captured_env_chain: Vec::new(),
            own_params_frozen: false,
        });
    }
}

impl valuegraph::ClosureRegistry for MapRegistry {
    fn lookup(&self, identity: Identity) -> Option<ClosureInfo> {
        self.0.get(&identity).map(|f| f())
    }
}
