use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt::Debug;
use std::rc::Rc;

use bitflags::bitflags;
use cinder_middle::interner::sym;

use crate::localscope::LocalScope;
use crate::throw;

use super::ops::conversions::ValueConversion;
use super::propertymap::PropertyMap;
use super::string::JsString;
use super::symbol::JsSymbol;
use super::{Typeof, Value, ValueContext};

/// A shared reference to a runtime object.
///
/// Identity (`==`, hashing) is pointer identity, which is what script
/// object identity means.
#[derive(Clone)]
pub struct Handle(Rc<dyn Object>);

impl Handle {
    pub fn new(object: Rc<dyn Object>) -> Self {
        Self(object)
    }

    pub fn from_object<O: Object + 'static>(object: O) -> Self {
        Self(Rc::new(object))
    }

    fn data_ptr(&self) -> *const () {
        Rc::as_ptr(&self.0) as *const ()
    }

    pub fn downgrade(&self) -> std::rc::Weak<dyn Object> {
        Rc::downgrade(&self.0)
    }

    pub fn get_property(&self, sc: &mut LocalScope<'_>, key: PropertyKey) -> Result<Value, Value> {
        Object::get_property(&*self.0, sc, Value::Object(self.clone()), key)
    }

    pub fn get_own_property(&self, sc: &mut LocalScope<'_>, key: PropertyKey) -> Result<Value, Value> {
        Object::get_own_property(&*self.0, sc, Value::Object(self.clone()), key)
    }

    pub fn apply(&self, sc: &mut LocalScope<'_>, this: Value, args: Vec<Value>) -> Result<Value, Value> {
        let callee = self.clone();
        Object::apply(&*self.0, sc, callee, this, args)
    }

    pub fn construct(&self, sc: &mut LocalScope<'_>, this: Value, args: Vec<Value>) -> Result<Value, Value> {
        let callee = self.clone();
        Object::construct(&*self.0, sc, callee, this, args)
    }

    /// Sets the prototype after checking that doing so would not create a
    /// cycle; a would-be cycle is a `TypeError`.
    pub fn set_prototype_checked(&self, sc: &mut LocalScope<'_>, value: Value) -> Result<(), Value> {
        let mut cursor = value.clone();
        while let Value::Object(link) = cursor {
            if link == *self {
                throw!(sc, TypeError, "Cyclic __proto__ value");
            }
            cursor = link.get_prototype(sc)?;
        }
        self.set_prototype(sc, value)
    }

    /// Makes every own property non-configurable, and for `Frozen` also
    /// non-writable. Clears the extensible flag.
    pub fn set_integrity_level(&self, sc: &mut LocalScope<'_>, level: IntegrityLevel) -> Result<(), Value> {
        self.prevent_extensions();
        let keys = self.own_keys(sc)?;
        for key in keys {
            let key = PropertyKey::from_value(sc, key)?;
            if let Some(mut desc) = self.get_own_property_descriptor(sc, key.clone())? {
                desc.descriptor.remove(PropertyDataDescriptor::CONFIGURABLE);
                if let IntegrityLevel::Frozen = level {
                    if let PropertyValueKind::Static(_) = desc.kind {
                        desc.descriptor.remove(PropertyDataDescriptor::WRITABLE);
                    }
                }
                self.define_own_property(sc, key, desc)?;
            }
        }
        Ok(())
    }

    /// Whether every own property satisfies the given integrity level.
    pub fn test_integrity_level(&self, sc: &mut LocalScope<'_>, level: IntegrityLevel) -> Result<bool, Value> {
        if self.is_extensible() {
            return Ok(false);
        }
        let keys = self.own_keys(sc)?;
        for key in keys {
            let key = PropertyKey::from_value(sc, key)?;
            if let Some(desc) = self.get_own_property_descriptor(sc, key)? {
                if desc.descriptor.contains(PropertyDataDescriptor::CONFIGURABLE) {
                    return Ok(false);
                }
                if let IntegrityLevel::Frozen = level {
                    if let PropertyValueKind::Static(_) = desc.kind {
                        if desc.descriptor.contains(PropertyDataDescriptor::WRITABLE) {
                            return Ok(false);
                        }
                    }
                }
            }
        }
        Ok(true)
    }
}

impl std::ops::Deref for Handle {
    type Target = dyn Object;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.data_ptr(), other.data_ptr())
    }
}

impl Eq for Handle {}

impl std::hash::Hash for Handle {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.data_ptr().hash(state);
    }
}

impl Debug for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Handle({:?})", self.0)
    }
}

pub enum IntegrityLevel {
    Sealed,
    Frozen,
}

/// The object protocol. Everything scripts can observe about an object goes
/// through these methods; wrapper objects delegate the parts they don't
/// override with the `delegate!` macro.
pub trait Object: Debug {
    fn get_own_property_descriptor(
        &self,
        sc: &mut LocalScope<'_>,
        key: PropertyKey,
    ) -> Result<Option<PropertyValue>, Value>;

    fn get_property_descriptor(
        &self,
        sc: &mut LocalScope<'_>,
        key: PropertyKey,
    ) -> Result<Option<PropertyValue>, Value> {
        let own = self.get_own_property_descriptor(sc, key.clone())?;
        if own.is_some() {
            return Ok(own);
        }

        match self.get_prototype(sc)? {
            Value::Object(object) => object.get_property_descriptor(sc, key),
            Value::Null | Value::Undefined => Ok(None),
            _ => Ok(None),
        }
    }

    fn get_own_property(&self, sc: &mut LocalScope<'_>, this: Value, key: PropertyKey) -> Result<Value, Value> {
        delegate_get_own_property(self, this, sc, key)
    }

    fn get_property(&self, sc: &mut LocalScope<'_>, this: Value, key: PropertyKey) -> Result<Value, Value> {
        delegate_get_property(self, this, sc, key)
    }

    /// Ordinary `Put` semantics: respects writability, invokes setters
    /// found on the receiver or its prototype chain.
    fn set_property(&self, sc: &mut LocalScope<'_>, key: PropertyKey, value: PropertyValue) -> Result<(), Value>;

    /// `Object.defineProperty` semantics: installs the descriptor verbatim
    /// (subject to configurability).
    fn define_own_property(
        &self,
        sc: &mut LocalScope<'_>,
        key: PropertyKey,
        value: PropertyValue,
    ) -> Result<(), Value> {
        self.set_property(sc, key, value)
    }

    /// Returns whether the property was removed (or did not exist).
    fn delete_property(&self, sc: &mut LocalScope<'_>, key: PropertyKey) -> Result<bool, Value>;

    fn set_prototype(&self, sc: &mut LocalScope<'_>, value: Value) -> Result<(), Value>;

    fn get_prototype(&self, sc: &mut LocalScope<'_>) -> Result<Value, Value>;

    fn apply(
        &self,
        sc: &mut LocalScope<'_>,
        callee: Handle,
        this: Value,
        args: Vec<Value>,
    ) -> Result<Value, Value>;

    fn construct(
        &self,
        sc: &mut LocalScope<'_>,
        callee: Handle,
        this: Value,
        args: Vec<Value>,
    ) -> Result<Value, Value> {
        self.apply(sc, callee, this, args)
    }

    fn as_any(&self) -> &dyn Any;

    /// Own keys in insertion order, string keys before symbol keys.
    fn own_keys(&self, sc: &mut LocalScope<'_>) -> Result<Vec<Value>, Value>;

    fn type_of(&self) -> Typeof {
        Typeof::Object
    }

    /// Short diagnostic name (`"Object"`, `"Array"`, `"Function"`, …).
    fn class_name(&self) -> &'static str {
        "Object"
    }

    fn is_extensible(&self) -> bool {
        true
    }

    fn prevent_extensions(&self) {}
}

/// Generates forwarding impls of `Object` methods to a field.
#[macro_export]
macro_rules! delegate {
    (override $field:ident, get_own_property_descriptor) => {
        fn get_own_property_descriptor(
            &self,
            sc: &mut $crate::localscope::LocalScope<'_>,
            key: $crate::value::object::PropertyKey,
        ) -> Result<Option<$crate::value::object::PropertyValue>, $crate::value::Value> {
            self.$field.get_own_property_descriptor(sc, key)
        }
    };
    (override $field:ident, get_property) => {
        fn get_property(
            &self,
            sc: &mut $crate::localscope::LocalScope<'_>,
            this: $crate::value::Value,
            key: $crate::value::object::PropertyKey,
        ) -> Result<$crate::value::Value, $crate::value::Value> {
            $crate::value::object::Object::get_property(&self.$field, sc, this, key)
        }
    };
    (override $field:ident, get_property_descriptor) => {
        fn get_property_descriptor(
            &self,
            sc: &mut $crate::localscope::LocalScope<'_>,
            key: $crate::value::object::PropertyKey,
        ) -> Result<Option<$crate::value::object::PropertyValue>, $crate::value::Value> {
            self.$field.get_property_descriptor(sc, key)
        }
    };
    (override $field:ident, set_property) => {
        fn set_property(
            &self,
            sc: &mut $crate::localscope::LocalScope<'_>,
            key: $crate::value::object::PropertyKey,
            value: $crate::value::object::PropertyValue,
        ) -> Result<(), $crate::value::Value> {
            self.$field.set_property(sc, key, value)
        }
    };
    (override $field:ident, define_own_property) => {
        fn define_own_property(
            &self,
            sc: &mut $crate::localscope::LocalScope<'_>,
            key: $crate::value::object::PropertyKey,
            value: $crate::value::object::PropertyValue,
        ) -> Result<(), $crate::value::Value> {
            self.$field.define_own_property(sc, key, value)
        }
    };
    (override $field:ident, delete_property) => {
        fn delete_property(
            &self,
            sc: &mut $crate::localscope::LocalScope<'_>,
            key: $crate::value::object::PropertyKey,
        ) -> Result<bool, $crate::value::Value> {
            self.$field.delete_property(sc, key)
        }
    };
    (override $field:ident, set_prototype) => {
        fn set_prototype(
            &self,
            sc: &mut $crate::localscope::LocalScope<'_>,
            value: $crate::value::Value,
        ) -> Result<(), $crate::value::Value> {
            self.$field.set_prototype(sc, value)
        }
    };
    (override $field:ident, get_prototype) => {
        fn get_prototype(
            &self,
            sc: &mut $crate::localscope::LocalScope<'_>,
        ) -> Result<$crate::value::Value, $crate::value::Value> {
            self.$field.get_prototype(sc)
        }
    };
    (override $field:ident, as_any) => {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    };
    (override $field:ident, own_keys) => {
        fn own_keys(
            &self,
            sc: &mut $crate::localscope::LocalScope<'_>,
        ) -> Result<Vec<$crate::value::Value>, $crate::value::Value> {
            self.$field.own_keys(sc)
        }
    };
    (override $field:ident, apply) => {
        fn apply(
            &self,
            sc: &mut $crate::localscope::LocalScope<'_>,
            callee: $crate::value::object::Handle,
            this: $crate::value::Value,
            args: Vec<$crate::value::Value>,
        ) -> Result<$crate::value::Value, $crate::value::Value> {
            $crate::value::object::Object::apply(&self.$field, sc, callee, this, args)
        }
    };
    (override $field:ident, construct) => {
        fn construct(
            &self,
            sc: &mut $crate::localscope::LocalScope<'_>,
            callee: $crate::value::object::Handle,
            this: $crate::value::Value,
            args: Vec<$crate::value::Value>,
        ) -> Result<$crate::value::Value, $crate::value::Value> {
            $crate::value::object::Object::construct(&self.$field, sc, callee, this, args)
        }
    };
    (override $field:ident, type_of) => {
        fn type_of(&self) -> $crate::value::Typeof {
            self.$field.type_of()
        }
    };
    (override $field:ident, class_name) => {
        fn class_name(&self) -> &'static str {
            self.$field.class_name()
        }
    };

    ($field:ident, $($method:ident),* $(,)?) => {
        $(
            $crate::delegate!(override $field, $method);
        )*
    };
}

/// A property key: an interned string or a symbol.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum PropertyKey {
    String(JsString),
    Symbol(JsSymbol),
}

impl PropertyKey {
    pub fn as_string(&self) -> Option<JsString> {
        match self {
            PropertyKey::String(s) => Some(*s),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Value {
        match self {
            PropertyKey::String(s) => Value::String(*s),
            PropertyKey::Symbol(s) => Value::Symbol(s.clone()),
        }
    }

    pub fn from_value(sc: &mut LocalScope<'_>, value: Value) -> Result<Self, Value> {
        match value {
            Value::Symbol(s) => Ok(PropertyKey::Symbol(s)),
            other => Ok(PropertyKey::String(other.to_js_string(sc)?)),
        }
    }

    pub fn to_display_string(&self, sc: &LocalScope<'_>) -> String {
        match self {
            PropertyKey::String(s) => s.res(sc).to_owned(),
            PropertyKey::Symbol(s) => s.to_string(),
        }
    }

    /// For array-like objects, the normalized integer form of the key.
    pub fn array_index(&self, sc: &LocalScope<'_>) -> Option<usize> {
        let s = self.as_string()?;
        parse_array_index(s.res(sc))
    }
}

impl From<JsString> for PropertyKey {
    fn from(value: JsString) -> Self {
        PropertyKey::String(value)
    }
}

impl From<cinder_middle::interner::Symbol> for PropertyKey {
    fn from(value: cinder_middle::interner::Symbol) -> Self {
        PropertyKey::String(value.into())
    }
}

impl From<JsSymbol> for PropertyKey {
    fn from(value: JsSymbol) -> Self {
        PropertyKey::Symbol(value)
    }
}

/// Parses a canonical array index ("0", "17", but not "01" or "-3").
pub fn parse_array_index(s: &str) -> Option<usize> {
    if s.is_empty() || (s.len() > 1 && s.starts_with('0')) {
        return None;
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct PropertyDataDescriptor: u8 {
        const CONFIGURABLE = 1 << 0;
        const ENUMERABLE = 1 << 1;
        const WRITABLE = 1 << 2;
    }
}

impl Default for PropertyDataDescriptor {
    fn default() -> Self {
        Self::CONFIGURABLE | Self::ENUMERABLE | Self::WRITABLE
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyValue {
    pub kind: PropertyValueKind,
    pub descriptor: PropertyDataDescriptor,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValueKind {
    /// Accessor property
    Trap { get: Option<Handle>, set: Option<Handle> },
    /// Static value property
    Static(Value),
}

impl PropertyValue {
    pub fn new(kind: PropertyValueKind, descriptor: PropertyDataDescriptor) -> Self {
        Self { kind, descriptor }
    }

    /// A static property with the default descriptor (all bits set).
    pub fn static_default(value: Value) -> Self {
        Self::new(PropertyValueKind::Static(value), Default::default())
    }

    /// A static property with an empty descriptor (all bits clear).
    pub fn static_empty(value: Value) -> Self {
        Self::new(PropertyValueKind::Static(value), PropertyDataDescriptor::empty())
    }

    /// A static, non-enumerable property (what built-ins use).
    pub fn static_non_enumerable(value: Value) -> Self {
        Self::new(
            PropertyValueKind::Static(value),
            PropertyDataDescriptor::WRITABLE | PropertyDataDescriptor::CONFIGURABLE,
        )
    }

    pub fn getter_default(get: Handle) -> Self {
        Self::new(
            PropertyValueKind::Trap {
                get: Some(get),
                set: None,
            },
            Default::default(),
        )
    }

    pub fn setter_default(set: Handle) -> Self {
        Self::new(
            PropertyValueKind::Trap {
                get: None,
                set: Some(set),
            },
            Default::default(),
        )
    }

    pub fn accessor(get: Option<Handle>, set: Option<Handle>, descriptor: PropertyDataDescriptor) -> Self {
        Self::new(PropertyValueKind::Trap { get, set }, descriptor)
    }

    pub fn kind(&self) -> &PropertyValueKind {
        &self.kind
    }

    pub fn into_kind(self) -> PropertyValueKind {
        self.kind
    }

    /// Reads the property's value: a static value directly, an accessor by
    /// invoking its getter with `this`.
    pub fn get_or_apply(&self, sc: &mut LocalScope<'_>, this: Value) -> Result<Value, Value> {
        match &self.kind {
            PropertyValueKind::Static(value) => Ok(value.clone()),
            PropertyValueKind::Trap { get, .. } => match get {
                Some(handle) => handle.apply(sc, this, Vec::new()),
                None => Ok(Value::undefined()),
            },
        }
    }

    /// Reflects this descriptor as a script object (for
    /// `Object.getOwnPropertyDescriptor`).
    pub fn to_descriptor_value(&self, sc: &mut LocalScope<'_>) -> Result<Value, Value> {
        let obj = NamedObject::new(sc);

        match &self.kind {
            PropertyValueKind::Static(value) => {
                obj.set_property(sc, sym::VALUE.into(), PropertyValue::static_default(value.clone()))?;
            }
            PropertyValueKind::Trap { get, set } => {
                let get = get.as_ref().map(|v| Value::Object(v.clone())).unwrap_or_undefined();
                let set = set.as_ref().map(|v| Value::Object(v.clone())).unwrap_or_undefined();
                obj.set_property(sc, sym::GET.into(), PropertyValue::static_default(get))?;
                obj.set_property(sc, sym::SET.into(), PropertyValue::static_default(set))?;
            }
        }

        for (flag, name) in [
            (PropertyDataDescriptor::WRITABLE, sym::WRITABLE),
            (PropertyDataDescriptor::ENUMERABLE, sym::ENUMERABLE),
            (PropertyDataDescriptor::CONFIGURABLE, sym::CONFIGURABLE),
        ] {
            if flag == PropertyDataDescriptor::WRITABLE && !matches!(self.kind, PropertyValueKind::Static(_)) {
                continue;
            }
            obj.set_property(
                sc,
                name.into(),
                PropertyValue::static_default(Value::boolean(self.descriptor.contains(flag))),
            )?;
        }

        Ok(Value::Object(sc.register(obj)))
    }

    /// Builds a descriptor from a script object (for `Object.defineProperty`).
    pub fn from_descriptor_value(sc: &mut LocalScope<'_>, value: Value) -> Result<Self, Value> {
        let mut flags = PropertyDataDescriptor::empty();

        for (flag, name) in [
            (PropertyDataDescriptor::CONFIGURABLE, sym::CONFIGURABLE),
            (PropertyDataDescriptor::ENUMERABLE, sym::ENUMERABLE),
            (PropertyDataDescriptor::WRITABLE, sym::WRITABLE),
        ] {
            let set = value.get_property(sc, name.into())?;
            if set.to_boolean(sc)? {
                flags |= flag;
            }
        }

        let static_value = value.get_property(sc, sym::VALUE.into())?;
        let kind = if let Value::Undefined = static_value {
            let get = match value.get_property(sc, sym::GET.into())? {
                Value::Object(o) => Some(o),
                _ => None,
            };
            let set = match value.get_property(sc, sym::SET.into())? {
                Value::Object(o) => Some(o),
                _ => None,
            };
            if get.is_none() && set.is_none() {
                PropertyValueKind::Static(Value::undefined())
            } else {
                PropertyValueKind::Trap { get, set }
            }
        } else {
            PropertyValueKind::Static(static_value)
        };

        Ok(Self::new(kind, flags))
    }
}

/// The ordinary object: insertion-ordered properties, a prototype link, and
/// an extensibility flag.
#[derive(Debug)]
pub struct NamedObject {
    prototype: RefCell<Option<Handle>>,
    values: RefCell<PropertyMap>,
    extensible: Cell<bool>,
}

impl NamedObject {
    /// An ordinary object whose prototype is `Object.prototype`.
    pub fn new(sc: &LocalScope<'_>) -> Self {
        Self::with_prototype(sc.statics.object_prototype.clone())
    }

    pub fn with_prototype(prototype: Handle) -> Self {
        Self {
            prototype: RefCell::new(Some(prototype)),
            values: RefCell::new(PropertyMap::new()),
            extensible: Cell::new(true),
        }
    }

    /// An empty object with a null prototype.
    pub fn null() -> Self {
        Self {
            prototype: RefCell::new(None),
            values: RefCell::new(PropertyMap::new()),
            extensible: Cell::new(true),
        }
    }

    pub fn get_raw_property(&self, key: &PropertyKey) -> Option<PropertyValue> {
        self.values.borrow().get(key).cloned()
    }
}

impl Object for NamedObject {
    fn get_own_property_descriptor(
        &self,
        sc: &mut LocalScope<'_>,
        key: PropertyKey,
    ) -> Result<Option<PropertyValue>, Value> {
        if let PropertyKey::String(s) = &key {
            if s.sym() == sym::PROTO {
                return Ok(Some(PropertyValue::static_default(self.get_prototype(sc)?)));
            }
        }

        Ok(self.values.borrow().get(&key).cloned())
    }

    fn set_property(&self, sc: &mut LocalScope<'_>, key: PropertyKey, value: PropertyValue) -> Result<(), Value> {
        if let Some(s) = key.as_string() {
            if s.sym() == sym::PROTO {
                return match value.into_kind() {
                    PropertyValueKind::Static(value) => self.set_prototype(sc, value),
                    _ => throw!(sc, TypeError, "Prototype cannot be an accessor"),
                };
            }
        }

        // An own property decides directly. (Bind the lookup first so the
        // table borrow is released before the write below.)
        let existing = self.values.borrow().get(&key).cloned();
        if let Some(existing) = existing {
            match existing.kind {
                PropertyValueKind::Trap { set, .. } => {
                    if let (Some(set), PropertyValueKind::Static(incoming)) = (set, value.kind) {
                        set.apply(sc, Value::undefined(), vec![incoming])?;
                    }
                    return Ok(());
                }
                PropertyValueKind::Static(_) => {
                    if !existing.descriptor.contains(PropertyDataDescriptor::WRITABLE) {
                        // Silent in non-strict code.
                        return Ok(());
                    }
                    let mut values = self.values.borrow_mut();
                    match value.kind {
                        // A plain Put keeps the existing descriptor flags.
                        PropertyValueKind::Static(incoming) => values.insert(
                            key,
                            PropertyValue::new(PropertyValueKind::Static(incoming), existing.descriptor),
                        ),
                        trap => values.insert(key, PropertyValue::new(trap, value.descriptor)),
                    }
                    return Ok(());
                }
            }
        }

        // A prototype accessor with a setter intercepts the write.
        let proto = self.get_prototype(sc)?;
        if let Value::Object(proto) = proto {
            if let Some(PropertyValue {
                kind: PropertyValueKind::Trap { set: Some(set), .. },
                ..
            }) = proto.get_property_descriptor(sc, key.clone())?
            {
                if let PropertyValueKind::Static(incoming) = value.kind {
                    set.apply(sc, Value::undefined(), vec![incoming])?;
                }
                return Ok(());
            }
        }

        if !self.extensible.get() {
            return Ok(());
        }

        self.values.borrow_mut().insert(key, value);
        Ok(())
    }

    fn define_own_property(
        &self,
        sc: &mut LocalScope<'_>,
        key: PropertyKey,
        value: PropertyValue,
    ) -> Result<(), Value> {
        if let Some(existing) = self.values.borrow().get(&key) {
            if !existing.descriptor.contains(PropertyDataDescriptor::CONFIGURABLE)
                && existing != &value
            {
                throw!(sc, TypeError, "Cannot redefine property: {}", key.to_display_string(sc));
            }
        }
        self.values.borrow_mut().insert(key, value);
        Ok(())
    }

    fn delete_property(&self, sc: &mut LocalScope<'_>, key: PropertyKey) -> Result<bool, Value> {
        let _ = sc;
        let mut values = self.values.borrow_mut();
        match values.get(&key) {
            Some(value) if !value.descriptor.contains(PropertyDataDescriptor::CONFIGURABLE) => Ok(false),
            Some(_) => {
                values.remove(&key);
                Ok(true)
            }
            None => Ok(true),
        }
    }

    fn set_prototype(&self, _sc: &mut LocalScope<'_>, value: Value) -> Result<(), Value> {
        match value {
            Value::Null | Value::Undefined => *self.prototype.borrow_mut() = None,
            Value::Object(handle) => *self.prototype.borrow_mut() = Some(handle),
            // Primitive prototypes are ignored, like the language does.
            _ => {}
        }
        Ok(())
    }

    fn get_prototype(&self, _sc: &mut LocalScope<'_>) -> Result<Value, Value> {
        Ok(match &*self.prototype.borrow() {
            Some(handle) => Value::Object(handle.clone()),
            None => Value::null(),
        })
    }

    fn apply(
        &self,
        sc: &mut LocalScope<'_>,
        _callee: Handle,
        _this: Value,
        _args: Vec<Value>,
    ) -> Result<Value, Value> {
        throw!(sc, TypeError, "Object is not a function")
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn own_keys(&self, _: &mut LocalScope<'_>) -> Result<Vec<Value>, Value> {
        let values = self.values.borrow();
        let mut keys: Vec<Value> = Vec::with_capacity(values.len());
        // String keys first, then symbols, both in insertion order.
        for key in values.keys() {
            if matches!(key, PropertyKey::String(_)) {
                keys.push(key.as_value());
            }
        }
        for key in values.keys() {
            if matches!(key, PropertyKey::Symbol(_)) {
                keys.push(key.as_value());
            }
        }
        Ok(keys)
    }

    fn is_extensible(&self) -> bool {
        self.extensible.get()
    }

    fn prevent_extensions(&self) {
        self.extensible.set(false);
    }
}

/// Reads a property via the full descriptor lookup, invoking getters.
pub fn delegate_get_property<T: Object + ?Sized>(
    this: &T,
    this_value: Value,
    sc: &mut LocalScope<'_>,
    key: PropertyKey,
) -> Result<Value, Value> {
    match this.get_property_descriptor(sc, key)? {
        Some(descriptor) => descriptor.get_or_apply(sc, this_value),
        None => Ok(Value::undefined()),
    }
}

/// Reads an own property, invoking getters.
pub fn delegate_get_own_property<T: Object + ?Sized>(
    this: &T,
    this_value: Value,
    sc: &mut LocalScope<'_>,
    key: PropertyKey,
) -> Result<Value, Value> {
    match this.get_own_property_descriptor(sc, key)? {
        Some(descriptor) => descriptor.get_or_apply(sc, this_value),
        None => Ok(Value::undefined()),
    }
}
