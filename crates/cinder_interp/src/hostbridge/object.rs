use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use cinder_middle::interner::sym;
use rustc_hash::FxHashMap;

use crate::localscope::LocalScope;
use crate::throw;
use crate::value::object::{
    Handle, NamedObject, Object, PropertyDataDescriptor, PropertyKey, PropertyValue,
    PropertyValueKind,
};
use crate::value::ops::conversions::ValueConversion;
use crate::value::{Typeof, Value};

use super::convert::{invoke_host_method, select_overload, wrap_host_value};
use super::members::{BeanProperty, Member, MemberRef, Members};
use super::{coerce, HostClass, HostDeleteHook, HostInstance, HostIterFactory, HostType, HostValue};

/// A live, reflective proxy for one host object. Properties are
/// synthesized from the class's member tables: fields become data
/// properties, overload sets become function-valued properties, bean
/// accessor pairs become accessor properties.
#[derive(Debug)]
pub struct HostObject {
    pub instance: HostInstance,
    class: Arc<HostClass>,
    members: Arc<Members>,
    /// Method and accessor functions are created on first touch and kept,
    /// so repeated reads observe the same function object.
    member_cache: RefCell<FxHashMap<String, PropertyValue>>,
    obj: NamedObject,
}

impl HostObject {
    pub fn new(sc: &mut LocalScope<'_>, instance: HostInstance) -> Result<Self, Value> {
        let class = sc.host.registry.get(instance.class);
        let members = class.members(instance.class, &sc.host.registry);
        Ok(Self {
            instance,
            class,
            members,
            member_cache: RefCell::new(FxHashMap::default()),
            obj: NamedObject::with_prototype(sc.statics.object_prototype.clone()),
        })
    }

    fn member_descriptor(&self, sc: &mut LocalScope<'_>, name: &str) -> Result<Option<PropertyValue>, Value> {
        let Some(member) = self.members.instance(name) else {
            return Ok(None);
        };

        // Fields recompute each read; methods and accessors are cached for
        // identity.
        if let Member::Field(field_ref) = member {
            let class = sc.host.registry.get(field_ref.class);
            let field = &class.fields[field_ref.index];
            let raw = (field.get)(Some(&*self.instance.data));
            let value = wrap_host_value(sc, raw)?;
            let mut descriptor = PropertyDataDescriptor::ENUMERABLE;
            if field.set.is_some() {
                descriptor |= PropertyDataDescriptor::WRITABLE;
            }
            return Ok(Some(PropertyValue::new(PropertyValueKind::Static(value), descriptor)));
        }

        if let Some(cached) = self.member_cache.borrow().get(name) {
            return Ok(Some(cached.clone()));
        }

        let descriptor = match member {
            Member::Methods(overloads) => {
                let method = HostMethodFn::new(
                    sc,
                    name.into(),
                    Some(self.instance.clone()),
                    overloads.clone(),
                );
                let handle = sc.register(method);
                PropertyValue::new(
                    PropertyValueKind::Static(Value::Object(handle)),
                    PropertyDataDescriptor::ENUMERABLE,
                )
            }
            Member::Bean(bean) => self.bean_descriptor(sc, name, bean),
            Member::Field(_) => unreachable!(),
        };

        self.member_cache
            .borrow_mut()
            .insert(name.to_owned(), descriptor.clone());
        Ok(Some(descriptor))
    }

    fn bean_descriptor(&self, sc: &mut LocalScope<'_>, name: &str, bean: &BeanProperty) -> PropertyValue {
        let getter = HostMethodFn::new(
            sc,
            format!("get {name}"),
            Some(self.instance.clone()),
            vec![bean.getter],
        );
        let get = sc.register(getter);

        let set = if bean.setters.is_empty() {
            None
        } else {
            let setter = HostMethodFn::new(
                sc,
                format!("set {name}"),
                Some(self.instance.clone()),
                bean.setters.clone(),
            );
            Some(sc.register(setter))
        };

        // Bean properties are not configurable: `delete` refuses them.
        PropertyValue::new(
            PropertyValueKind::Trap { get: Some(get), set },
            PropertyDataDescriptor::ENUMERABLE,
        )
    }
}

impl Object for HostObject {
    fn get_own_property_descriptor(
        &self,
        sc: &mut LocalScope<'_>,
        key: PropertyKey,
    ) -> Result<Option<PropertyValue>, Value> {
        match &key {
            PropertyKey::String(s) => {
                let name = s.to_rc(sc);
                if let Some(descriptor) = self.member_descriptor(sc, &name)? {
                    return Ok(Some(descriptor));
                }
                self.obj.get_own_property_descriptor(sc, key)
            }
            PropertyKey::Symbol(symbol) => {
                // A host iterable participates in `for…of`.
                if *symbol == sc.statics.symbol_iterator {
                    if let Some(factory) = self.class.iterable.clone() {
                        let opener = HostIterableFn {
                            instance: self.instance.clone(),
                            factory,
                            obj: NamedObject::with_prototype(sc.statics.function_prototype.clone()),
                        };
                        let handle = sc.register(opener);
                        return Ok(Some(PropertyValue::new(
                            PropertyValueKind::Static(Value::Object(handle)),
                            PropertyDataDescriptor::empty(),
                        )));
                    }
                }
                self.obj.get_own_property_descriptor(sc, key)
            }
        }
    }

    fn set_property(&self, sc: &mut LocalScope<'_>, key: PropertyKey, value: PropertyValue) -> Result<(), Value> {
        let Some(s) = key.as_string() else {
            throw!(sc, TypeError, "Cannot add properties to host objects");
        };
        let name = s.to_rc(sc);
        let PropertyValueKind::Static(incoming) = value.kind else {
            throw!(sc, TypeError, "Cannot define accessors on host objects");
        };

        match self.members.instance(&name) {
            Some(Member::Field(field_ref)) => {
                let class = sc.host.registry.get(field_ref.class);
                let field = &class.fields[field_ref.index];
                match &field.set {
                    Some(set) => {
                        let converted = coerce(sc, &incoming, &field.ty)?;
                        set(Some(&*self.instance.data), converted);
                        Ok(())
                    }
                    None => throw!(sc, TypeError, "Host field {} is not writable", name),
                }
            }
            Some(Member::Bean(bean)) if !bean.setters.is_empty() => {
                let class_refs = bean.setters.clone();
                let resolved = resolve_refs(sc, &class_refs);
                let candidates: Vec<(MemberRef, &super::HostMethod)> = class_refs
                    .iter()
                    .zip(resolved.iter())
                    .map(|(&m, class)| (m, &class.methods[m.index]))
                    .collect();
                let args = [incoming];
                let (_, method) = select_overload(sc, &name, &candidates, &args)?;
                invoke_host_method(sc, method, Some(&self.instance), &args)?;
                Ok(())
            }
            Some(_) => throw!(sc, TypeError, "Host member {} is not assignable", name),
            None => throw!(sc, TypeError, "Cannot add property {} to host object", name),
        }
    }

    fn delete_property(&self, sc: &mut LocalScope<'_>, key: PropertyKey) -> Result<bool, Value> {
        if let Some(s) = key.as_string() {
            let name = s.to_rc(sc);
            if self.members.instance(&name).is_some() {
                // The class's delete hook observes the deletion and decides
                // whether it is honored. Without one, host members are not
                // configurable.
                if let Some(hook) = &self.class.on_delete {
                    return Ok(hook(Some(&*self.instance.data), &name));
                }
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn set_prototype(&self, sc: &mut LocalScope<'_>, value: Value) -> Result<(), Value> {
        self.obj.set_prototype(sc, value)
    }

    fn get_prototype(&self, sc: &mut LocalScope<'_>) -> Result<Value, Value> {
        self.obj.get_prototype(sc)
    }

    fn apply(
        &self,
        sc: &mut LocalScope<'_>,
        _callee: Handle,
        _this: Value,
        _args: Vec<Value>,
    ) -> Result<Value, Value> {
        throw!(sc, TypeError, "Host object {} is not a function", self.class.name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn own_keys(&self, sc: &mut LocalScope<'_>) -> Result<Vec<Value>, Value> {
        let mut keys = Vec::new();
        for name in self.members.instance_names() {
            let sym = sc.intern(name.as_str());
            keys.push(Value::string(sym.into()));
        }
        Ok(keys)
    }

    fn class_name(&self) -> &'static str {
        "HostObject"
    }
}

/// The static-members / constructor side of a host class, exposed to
/// scripts as a constructable object.
#[derive(Debug)]
pub struct HostClassObject {
    pub class_id: super::HostClassId,
    class: Arc<HostClass>,
    members: Arc<Members>,
    member_cache: RefCell<FxHashMap<String, PropertyValue>>,
    obj: NamedObject,
}

impl HostClassObject {
    pub fn new(sc: &mut LocalScope<'_>, class_id: super::HostClassId) -> Self {
        let class = sc.host.registry.get(class_id);
        let members = class.members(class_id, &sc.host.registry);
        Self {
            class_id,
            class,
            members,
            member_cache: RefCell::new(FxHashMap::default()),
            obj: NamedObject::with_prototype(sc.statics.object_prototype.clone()),
        }
    }
}

impl Object for HostClassObject {
    fn get_own_property_descriptor(
        &self,
        sc: &mut LocalScope<'_>,
        key: PropertyKey,
    ) -> Result<Option<PropertyValue>, Value> {
        let Some(s) = key.as_string() else {
            return self.obj.get_own_property_descriptor(sc, key);
        };
        let name = s.to_rc(sc);

        let Some(member) = self.members.statics(&name) else {
            return self.obj.get_own_property_descriptor(sc, key);
        };

        if let Member::Field(field_ref) = member {
            let class = sc.host.registry.get(field_ref.class);
            let field = &class.fields[field_ref.index];
            let raw = (field.get)(None);
            let value = wrap_host_value(sc, raw)?;
            return Ok(Some(PropertyValue::new(
                PropertyValueKind::Static(value),
                PropertyDataDescriptor::ENUMERABLE,
            )));
        }

        if let Some(cached) = self.member_cache.borrow().get(&*name) {
            return Ok(Some(cached.clone()));
        }

        let descriptor = match member {
            Member::Methods(overloads) => {
                let method = HostMethodFn::new(sc, name.to_string(), None, overloads.clone());
                let handle = sc.register(method);
                PropertyValue::new(
                    PropertyValueKind::Static(Value::Object(handle)),
                    PropertyDataDescriptor::ENUMERABLE,
                )
            }
            Member::Bean(_) | Member::Field(_) => return Ok(None),
        };

        self.member_cache.borrow_mut().insert(name.to_string(), descriptor.clone());
        Ok(Some(descriptor))
    }

    fn set_property(&self, sc: &mut LocalScope<'_>, _key: PropertyKey, _value: PropertyValue) -> Result<(), Value> {
        throw!(sc, TypeError, "Cannot add properties to host class {}", self.class.name)
    }

    fn delete_property(&self, _sc: &mut LocalScope<'_>, _key: PropertyKey) -> Result<bool, Value> {
        Ok(false)
    }

    fn set_prototype(&self, sc: &mut LocalScope<'_>, value: Value) -> Result<(), Value> {
        self.obj.set_prototype(sc, value)
    }

    fn get_prototype(&self, sc: &mut LocalScope<'_>) -> Result<Value, Value> {
        self.obj.get_prototype(sc)
    }

    fn apply(
        &self,
        sc: &mut LocalScope<'_>,
        callee: Handle,
        this: Value,
        args: Vec<Value>,
    ) -> Result<Value, Value> {
        self.construct(sc, callee, this, args)
    }

    fn construct(
        &self,
        sc: &mut LocalScope<'_>,
        _callee: Handle,
        _this: Value,
        args: Vec<Value>,
    ) -> Result<Value, Value> {
        let refs: Vec<MemberRef> = (0..self.class.constructors.len())
            .map(|index| MemberRef {
                class: self.class_id,
                index,
            })
            .collect();
        let candidates: Vec<(MemberRef, &super::HostMethod)> = refs
            .iter()
            .map(|&m| (m, &self.class.constructors[m.index]))
            .collect();
        if candidates.is_empty() {
            throw!(sc, TypeError, "Host class {} has no constructors", self.class.name);
        }
        let (_, constructor) = select_overload(sc, &self.class.name, &candidates, &args)?;
        invoke_host_method(sc, constructor, None, &args)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn own_keys(&self, sc: &mut LocalScope<'_>) -> Result<Vec<Value>, Value> {
        let mut keys = Vec::new();
        for name in self.members.static_names() {
            let sym = sc.intern(name.as_str());
            keys.push(Value::string(sym.into()));
        }
        Ok(keys)
    }

    fn type_of(&self) -> Typeof {
        Typeof::Function
    }

    fn class_name(&self) -> &'static str {
        "HostClass"
    }
}

/// A function value dispatching into a host overload set (also used for
/// bean getters/setters, which are one-element sets).
#[derive(Debug)]
pub struct HostMethodFn {
    name: Rc<str>,
    target: Option<HostInstance>,
    overloads: Vec<MemberRef>,
    obj: NamedObject,
}

impl HostMethodFn {
    pub fn new(sc: &LocalScope<'_>, name: String, target: Option<HostInstance>, overloads: Vec<MemberRef>) -> Self {
        Self {
            name: Rc::from(name),
            target,
            overloads,
            obj: NamedObject::with_prototype(sc.statics.function_prototype.clone()),
        }
    }
}

fn resolve_refs(sc: &LocalScope<'_>, refs: &[MemberRef]) -> Vec<Arc<HostClass>> {
    refs.iter().map(|m| sc.host.registry.get(m.class)).collect()
}

impl Object for HostMethodFn {
    fn get_own_property_descriptor(
        &self,
        sc: &mut LocalScope<'_>,
        key: PropertyKey,
    ) -> Result<Option<PropertyValue>, Value> {
        if let Some(s) = key.as_string() {
            if s.sym() == sym::NAME {
                let name = sc.intern(&*self.name);
                return Ok(Some(PropertyValue::static_non_enumerable(Value::string(name.into()))));
            }
        }
        self.obj.get_own_property_descriptor(sc, key)
    }

    fn set_property(&self, sc: &mut LocalScope<'_>, key: PropertyKey, value: PropertyValue) -> Result<(), Value> {
        self.obj.set_property(sc, key, value)
    }

    fn delete_property(&self, sc: &mut LocalScope<'_>, key: PropertyKey) -> Result<bool, Value> {
        self.obj.delete_property(sc, key)
    }

    fn set_prototype(&self, sc: &mut LocalScope<'_>, value: Value) -> Result<(), Value> {
        self.obj.set_prototype(sc, value)
    }

    fn get_prototype(&self, sc: &mut LocalScope<'_>) -> Result<Value, Value> {
        self.obj.get_prototype(sc)
    }

    fn apply(
        &self,
        sc: &mut LocalScope<'_>,
        _callee: Handle,
        _this: Value,
        args: Vec<Value>,
    ) -> Result<Value, Value> {
        let classes = resolve_refs(sc, &self.overloads);
        let candidates: Vec<(MemberRef, &super::HostMethod)> = self
            .overloads
            .iter()
            .zip(classes.iter())
            .map(|(&m, class)| (m, &class.methods[m.index]))
            .collect();

        let (_, method) = select_overload(sc, &self.name, &candidates, &args)?;
        invoke_host_method(sc, method, self.target.as_ref(), &args)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn own_keys(&self, sc: &mut LocalScope<'_>) -> Result<Vec<Value>, Value> {
        self.obj.own_keys(sc)
    }

    fn type_of(&self) -> Typeof {
        Typeof::Function
    }

    fn class_name(&self) -> &'static str {
        "Function"
    }
}

/// Wraps a host list: an integer-indexed view plus `length`, sharing the
/// generic array method suite through its prototype.
pub struct HostList {
    list: Rc<RefCell<Vec<HostValue>>>,
    on_delete: Option<HostDeleteHook>,
    obj: NamedObject,
}

impl std::fmt::Debug for HostList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostList").field("list", &self.list).finish()
    }
}

impl HostList {
    pub fn new(sc: &LocalScope<'_>, list: Rc<RefCell<Vec<HostValue>>>) -> Self {
        Self {
            list,
            on_delete: None,
            obj: NamedObject::with_prototype(sc.statics.host_list_prototype.clone()),
        }
    }

    /// A list wrapper whose element deletions go through the given hook.
    pub fn with_delete_hook(sc: &LocalScope<'_>, list: Rc<RefCell<Vec<HostValue>>>, hook: HostDeleteHook) -> Self {
        Self {
            on_delete: Some(hook),
            ..Self::new(sc, list)
        }
    }

    pub fn raw(&self) -> &Rc<RefCell<Vec<HostValue>>> {
        &self.list
    }

    fn len(&self) -> usize {
        self.list.borrow().len()
    }
}

impl Object for HostList {
    fn get_own_property_descriptor(
        &self,
        sc: &mut LocalScope<'_>,
        key: PropertyKey,
    ) -> Result<Option<PropertyValue>, Value> {
        if let PropertyKey::Symbol(symbol) = &key {
            if *symbol == sc.statics.symbol_is_concat_spreadable {
                return Ok(Some(PropertyValue::static_empty(Value::boolean(true))));
            }
            return self.obj.get_own_property_descriptor(sc, key);
        }

        if let Some(s) = key.as_string() {
            if s.sym() == sym::LENGTH {
                return Ok(Some(PropertyValue::new(
                    PropertyValueKind::Static(Value::number(self.len() as f64)),
                    PropertyDataDescriptor::WRITABLE,
                )));
            }
        }

        if let Some(index) = key.array_index(sc) {
            let raw = self.list.borrow().get(index).cloned();
            return match raw {
                Some(raw) => {
                    let value = wrap_host_value(sc, raw)?;
                    Ok(Some(PropertyValue::static_default(value)))
                }
                None => Ok(None),
            };
        }

        self.obj.get_own_property_descriptor(sc, key)
    }

    fn set_property(&self, sc: &mut LocalScope<'_>, key: PropertyKey, value: PropertyValue) -> Result<(), Value> {
        if let Some(s) = key.as_string() {
            if s.sym() == sym::LENGTH {
                if let PropertyValueKind::Static(len) = &value.kind {
                    let new_len = len.to_number(sc)? as usize;
                    self.list.borrow_mut().resize(new_len, HostValue::Null);
                }
                return Ok(());
            }
        }

        if let Some(index) = key.array_index(sc) {
            if let PropertyValueKind::Static(incoming) = value.kind {
                // Elements coerce through the raw-value rules; typed lists
                // are the embedder's concern at the descriptor level.
                let converted = coerce(sc, &incoming, &HostType::Value)?;
                let mut list = self.list.borrow_mut();
                if index >= list.len() {
                    list.resize(index + 1, HostValue::Null);
                }
                list[index] = converted;
            }
            return Ok(());
        }

        self.obj.set_property(sc, key, value)
    }

    fn delete_property(&self, sc: &mut LocalScope<'_>, key: PropertyKey) -> Result<bool, Value> {
        if let Some(index) = key.array_index(sc) {
            // Honored deletions null the element out; the list keeps its
            // length, like the indexed view of the underlying host list.
            if let Some(hook) = &self.on_delete {
                if hook(None, &index.to_string()) {
                    let mut list = self.list.borrow_mut();
                    if index < list.len() {
                        list[index] = HostValue::Null;
                    }
                    return Ok(true);
                }
            }
            return Ok(false);
        }
        Ok(true)
    }

    fn set_prototype(&self, sc: &mut LocalScope<'_>, value: Value) -> Result<(), Value> {
        self.obj.set_prototype(sc, value)
    }

    fn get_prototype(&self, sc: &mut LocalScope<'_>) -> Result<Value, Value> {
        self.obj.get_prototype(sc)
    }

    fn apply(
        &self,
        sc: &mut LocalScope<'_>,
        _callee: Handle,
        _this: Value,
        _args: Vec<Value>,
    ) -> Result<Value, Value> {
        throw!(sc, TypeError, "Host list is not a function")
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn own_keys(&self, sc: &mut LocalScope<'_>) -> Result<Vec<Value>, Value> {
        let mut keys = Vec::with_capacity(self.len());
        for index in 0..self.len() {
            let sym = sc.intern_usize(index);
            keys.push(Value::string(sym.into()));
        }
        Ok(keys)
    }

    fn class_name(&self) -> &'static str {
        "HostList"
    }
}

/// Wraps a host map: keyed access over string keys.
pub struct HostMap {
    map: Rc<RefCell<Vec<(Rc<str>, HostValue)>>>,
    on_delete: Option<HostDeleteHook>,
    obj: NamedObject,
}

impl std::fmt::Debug for HostMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostMap").field("map", &self.map).finish()
    }
}

impl HostMap {
    pub fn new(sc: &LocalScope<'_>, map: Rc<RefCell<Vec<(Rc<str>, HostValue)>>>) -> Self {
        Self {
            map,
            on_delete: None,
            obj: NamedObject::with_prototype(sc.statics.host_map_prototype.clone()),
        }
    }

    /// A map wrapper whose entry deletions go through the given hook.
    pub fn with_delete_hook(
        sc: &LocalScope<'_>,
        map: Rc<RefCell<Vec<(Rc<str>, HostValue)>>>,
        hook: HostDeleteHook,
    ) -> Self {
        Self {
            on_delete: Some(hook),
            ..Self::new(sc, map)
        }
    }

    pub fn raw(&self) -> &Rc<RefCell<Vec<(Rc<str>, HostValue)>>> {
        &self.map
    }
}

impl Object for HostMap {
    fn get_own_property_descriptor(
        &self,
        sc: &mut LocalScope<'_>,
        key: PropertyKey,
    ) -> Result<Option<PropertyValue>, Value> {
        let Some(s) = key.as_string() else {
            return self.obj.get_own_property_descriptor(sc, key);
        };
        let name = s.to_rc(sc);
        let found = self
            .map
            .borrow()
            .iter()
            .find(|(k, _)| **k == *name)
            .map(|(_, v)| v.clone());
        match found {
            Some(raw) => {
                let value = wrap_host_value(sc, raw)?;
                Ok(Some(PropertyValue::static_default(value)))
            }
            None => self.obj.get_own_property_descriptor(sc, key),
        }
    }

    fn set_property(&self, sc: &mut LocalScope<'_>, key: PropertyKey, value: PropertyValue) -> Result<(), Value> {
        let Some(s) = key.as_string() else {
            return self.obj.set_property(sc, key, value);
        };
        if let PropertyValueKind::Static(incoming) = value.kind {
            let name = s.to_rc(sc);
            let converted = coerce(sc, &incoming, &HostType::Value)?;
            let mut map = self.map.borrow_mut();
            match map.iter_mut().find(|(k, _)| **k == *name) {
                Some((_, slot)) => *slot = converted,
                None => map.push((name, converted)),
            }
        }
        Ok(())
    }

    fn delete_property(&self, sc: &mut LocalScope<'_>, key: PropertyKey) -> Result<bool, Value> {
        let Some(s) = key.as_string() else {
            return Ok(true);
        };
        let name = s.to_rc(sc);
        if let Some(hook) = &self.on_delete {
            if !hook(None, &name) {
                return Ok(false);
            }
        }
        self.map.borrow_mut().retain(|(k, _)| **k != *name);
        Ok(true)
    }

    fn set_prototype(&self, sc: &mut LocalScope<'_>, value: Value) -> Result<(), Value> {
        self.obj.set_prototype(sc, value)
    }

    fn get_prototype(&self, sc: &mut LocalScope<'_>) -> Result<Value, Value> {
        self.obj.get_prototype(sc)
    }

    fn apply(
        &self,
        sc: &mut LocalScope<'_>,
        _callee: Handle,
        _this: Value,
        _args: Vec<Value>,
    ) -> Result<Value, Value> {
        throw!(sc, TypeError, "Host map is not a function")
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn own_keys(&self, sc: &mut LocalScope<'_>) -> Result<Vec<Value>, Value> {
        let map = self.map.borrow();
        let mut keys = Vec::with_capacity(map.len());
        for (name, _) in map.iter() {
            let sym = sc.intern(&**name);
            keys.push(Value::string(sym.into()));
        }
        Ok(keys)
    }

    fn class_name(&self) -> &'static str {
        "HostMap"
    }
}

/// Adapts a host iterable's elements to the script iterator protocol:
/// `has_next`/`next` fold into `{ value, done }` steps.
#[derive(Debug)]
pub struct HostIterator {
    items: RefCell<std::vec::IntoIter<HostValue>>,
    obj: NamedObject,
}

impl HostIterator {
    pub fn new(sc: &LocalScope<'_>, items: Vec<HostValue>) -> Self {
        Self {
            items: RefCell::new(items.into_iter()),
            obj: NamedObject::with_prototype(sc.statics.iterator_prototype.clone()),
        }
    }

    pub fn step(&self) -> Option<HostValue> {
        self.items.borrow_mut().next()
    }
}

impl Object for HostIterator {
    crate::delegate!(
        obj,
        get_own_property_descriptor,
        set_property,
        define_own_property,
        delete_property,
        set_prototype,
        get_prototype,
        as_any,
        own_keys,
        apply,
    );

    fn class_name(&self) -> &'static str {
        "Host Iterator"
    }
}

/// The function handed out as a host iterable's `@@iterator`: each call
/// opens a fresh iterator over the instance.
struct HostIterableFn {
    instance: HostInstance,
    factory: HostIterFactory,
    obj: NamedObject,
}

impl std::fmt::Debug for HostIterableFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostIterableFn").field("instance", &self.instance).finish()
    }
}

impl Object for HostIterableFn {
    crate::delegate!(
        obj,
        get_own_property_descriptor,
        set_property,
        define_own_property,
        delete_property,
        set_prototype,
        get_prototype,
        as_any,
        own_keys,
    );

    fn apply(
        &self,
        sc: &mut LocalScope<'_>,
        _callee: Handle,
        _this: Value,
        _args: Vec<Value>,
    ) -> Result<Value, Value> {
        let items = (self.factory)(&*self.instance.data);
        let iterator = HostIterator::new(sc, items);
        Ok(Value::Object(sc.register(iterator)))
    }

    fn type_of(&self) -> Typeof {
        Typeof::Function
    }
}
