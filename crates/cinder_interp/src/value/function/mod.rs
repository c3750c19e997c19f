use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use cinder_middle::interner::{sym, Symbol};
use cinder_middle::parser::statement::FunctionDeclaration;

use crate::eval::CompiledScript;
use crate::frame::Frame;
use crate::localscope::LocalScope;
use crate::throw;
use crate::value::object::{Handle, NamedObject, Object, PropertyKey, PropertyValue};
use crate::value::string::JsString;
use crate::value::{Typeof, Value};

/// A native (host-implemented) function.
pub type NativeFunction = fn(cx: CallContext<'_, '_>) -> Result<Value, Value>;

/// What a native function sees when called.
pub struct CallContext<'s, 'c> {
    pub args: Vec<Value>,
    pub scope: &'c mut LocalScope<'s>,
    pub this: Value,
    /// Set when invoked via `new`; carries the constructed function handle.
    pub new_target: Option<Handle>,
}

/// Downcasts a receiver to a concrete object type, or throws the usual
/// incompatible-receiver error.
pub fn this_downcast<'a, T: 'static>(
    this: &'a Value,
    sc: &mut LocalScope<'_>,
    name: &str,
) -> Result<&'a T, Value> {
    match this.downcast_ref::<T>() {
        Some(this) => Ok(this),
        None => throw!(sc, TypeError, "Method {} called on incompatible receiver", name),
    }
}

/// A script-defined function: the shared AST plus the captured environment.
#[derive(Debug)]
pub struct Closure {
    pub script: Rc<CompiledScript>,
    pub decl: Rc<FunctionDeclaration>,
    pub environment: Rc<Frame>,
}

#[derive(Debug)]
pub struct BoundFunction {
    pub target: Handle,
    pub bound_this: Value,
    pub bound_args: Vec<Value>,
}

pub enum FunctionKind {
    Native(NativeFunction),
    Closure(Rc<Closure>),
    Bound(BoundFunction),
}

impl std::fmt::Debug for FunctionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FunctionKind::Native(_) => f.write_str("FunctionKind::Native"),
            FunctionKind::Closure(_) => f.write_str("FunctionKind::Closure"),
            FunctionKind::Bound(_) => f.write_str("FunctionKind::Bound"),
        }
    }
}

#[derive(Debug)]
pub struct Function {
    name: RefCell<Option<JsString>>,
    kind: FunctionKind,
    /// The `.prototype` object instances of this function get; created
    /// lazily for closures.
    fn_prototype: RefCell<Option<Handle>>,
    obj: NamedObject,
}

impl Function {
    pub fn new(sc: &LocalScope<'_>, name: Option<JsString>, kind: FunctionKind) -> Self {
        Self {
            name: RefCell::new(name),
            kind,
            fn_prototype: RefCell::new(None),
            obj: NamedObject::with_prototype(sc.statics.function_prototype.clone()),
        }
    }

    pub fn with_obj(name: Option<JsString>, kind: FunctionKind, obj: NamedObject) -> Self {
        Self {
            name: RefCell::new(name),
            kind,
            fn_prototype: RefCell::new(None),
            obj,
        }
    }

    pub fn kind(&self) -> &FunctionKind {
        &self.kind
    }

    pub fn name(&self) -> Option<JsString> {
        *self.name.borrow()
    }

    pub fn set_name(&self, name: JsString) {
        *self.name.borrow_mut() = Some(name);
    }

    pub fn set_fn_prototype(&self, prototype: Handle) {
        *self.fn_prototype.borrow_mut() = Some(prototype);
    }

    pub fn get_or_create_fn_prototype(&self, sc: &mut LocalScope<'_>) -> Handle {
        let existing = self.fn_prototype.borrow().clone();
        match existing {
            Some(handle) => handle,
            None => {
                let proto = sc.register(NamedObject::new(sc));
                *self.fn_prototype.borrow_mut() = Some(proto.clone());
                proto
            }
        }
    }

    fn param_count(&self) -> usize {
        match &self.kind {
            FunctionKind::Closure(closure) => closure.decl.parameters.len(),
            _ => 0,
        }
    }
}

impl Object for Function {
    fn get_own_property_descriptor(
        &self,
        sc: &mut LocalScope<'_>,
        key: PropertyKey,
    ) -> Result<Option<PropertyValue>, Value> {
        if let PropertyKey::String(s) = &key {
            match s.sym() {
                s if s == sym::NAME => {
                    let name = self.name.borrow().unwrap_or_else(|| sym::EMPTY.into());
                    return Ok(Some(PropertyValue::static_non_enumerable(Value::string(name))));
                }
                s if s == sym::LENGTH => {
                    return Ok(Some(PropertyValue::static_non_enumerable(Value::number(
                        self.param_count() as f64,
                    ))));
                }
                s if s == sym::PROTOTYPE => {
                    if let FunctionKind::Closure(_) = self.kind {
                        let proto = self.get_or_create_fn_prototype(sc);
                        return Ok(Some(PropertyValue::static_non_enumerable(Value::Object(proto))));
                    }
                    if let Some(proto) = self.fn_prototype.borrow().clone() {
                        return Ok(Some(PropertyValue::static_non_enumerable(Value::Object(proto))));
                    }
                }
                _ => {}
            }
        }
        self.obj.get_own_property_descriptor(sc, key)
    }

    fn set_property(&self, sc: &mut LocalScope<'_>, key: PropertyKey, value: PropertyValue) -> Result<(), Value> {
        if let Some(s) = key.as_string() {
            if s.sym() == sym::PROTOTYPE {
                if let crate::value::object::PropertyValueKind::Static(Value::Object(handle)) = value.kind {
                    *self.fn_prototype.borrow_mut() = Some(handle);
                }
                return Ok(());
            }
        }
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
        callee: Handle,
        this: Value,
        args: Vec<Value>,
    ) -> Result<Value, Value> {
        match &self.kind {
            FunctionKind::Native(native) => native(CallContext {
                args,
                scope: sc,
                this,
                new_target: None,
            }),
            FunctionKind::Closure(closure) => crate::eval::invoke_closure(sc, closure, this, args),
            FunctionKind::Bound(bound) => {
                let _ = callee;
                let mut all_args = bound.bound_args.clone();
                all_args.extend(args);
                bound.target.apply(sc, bound.bound_this.clone(), all_args)
            }
        }
    }

    fn construct(
        &self,
        sc: &mut LocalScope<'_>,
        callee: Handle,
        _this: Value,
        args: Vec<Value>,
    ) -> Result<Value, Value> {
        match &self.kind {
            FunctionKind::Native(native) => native(CallContext {
                args,
                scope: sc,
                this: Value::undefined(),
                new_target: Some(callee),
            }),
            FunctionKind::Closure(closure) => {
                if let cinder_middle::parser::statement::FunctionKind::Arrow = closure.decl.kind {
                    throw!(sc, TypeError, "Arrow functions cannot be used as constructors");
                }

                // Allocate, link the prototype, run with the new object as
                // `this`, and keep the object unless the body returns
                // another object.
                let prototype = self.get_or_create_fn_prototype(sc);
                let instance = sc.register(NamedObject::with_prototype(prototype));
                let this = Value::Object(instance.clone());
                let result = crate::eval::invoke_closure(sc, closure, this, args)?;
                Ok(match result {
                    Value::Object(result) => Value::Object(result),
                    _ => Value::Object(instance),
                })
            }
            FunctionKind::Bound(bound) => bound.target.construct(sc, Value::undefined(), args),
        }
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

/// Registers a native function and returns its handle.
pub fn register_native_fn(sc: &mut LocalScope<'_>, name: Symbol, fun: NativeFunction) -> Handle {
    let fun = Function::new(sc, Some(name.into()), FunctionKind::Native(fun));
    sc.register(fun)
}
