use cinder_middle::interner::sym;

use crate::localscope::LocalScope;
use crate::throw;
use crate::value::array::elements_of;
use crate::value::function::{BoundFunction, CallContext, Function, FunctionKind};
use crate::value::object::{Handle, Object};
use crate::value::{Typeof, Value, ValueContext};

use super::{register_ctor, register_fn};

pub fn init(sc: &mut LocalScope<'_>, global: &Handle) {
    let prototype = sc.statics.function_prototype.clone();

    let call_sym = sc.intern("call");
    let apply_sym = sc.intern("apply");
    let bind_sym = sc.intern("bind");
    register_fn(sc, &prototype, call_sym, call);
    register_fn(sc, &prototype, apply_sym, apply);
    register_fn(sc, &prototype, bind_sym, bind);
    register_fn(sc, &prototype, sym::TO_STRING, to_string);

    register_ctor(sc, global, sym::FUNCTION_NAME, constructor, &prototype);
}

pub fn constructor(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    // Compiling source at runtime is out of scope for the embedder surface.
    throw!(cx.scope, TypeError, "The Function constructor is not supported")
}

fn this_function(this: &Value, sc: &mut LocalScope<'_>, name: &str) -> Result<Handle, Value> {
    match this {
        Value::Object(handle) if matches!(handle.type_of(), Typeof::Function) => Ok(handle.clone()),
        _ => throw!(sc, TypeError, "{} called on a non-function", name),
    }
}

pub fn call(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let callee = this_function(&cx.this, cx.scope, "Function.prototype.call")?;
    let this = cx.args.first().unwrap_or_undefined();
    let args = cx.args.get(1..).map(|s| s.to_vec()).unwrap_or_default();
    callee.apply(cx.scope, this, args)
}

pub fn apply(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let callee = this_function(&cx.this, cx.scope, "Function.prototype.apply")?;
    let this = cx.args.first().unwrap_or_undefined();
    let args = match cx.args.get(1) {
        None | Some(Value::Undefined | Value::Null) => Vec::new(),
        Some(list) => elements_of(cx.scope, list)?,
    };
    callee.apply(cx.scope, this, args)
}

pub fn bind(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let callee = this_function(&cx.this, cx.scope, "Function.prototype.bind")?;
    let bound_this = cx.args.first().unwrap_or_undefined();
    let bound_args = cx.args.get(1..).map(|s| s.to_vec()).unwrap_or_default();

    let name = callee
        .as_any()
        .downcast_ref::<Function>()
        .and_then(Function::name);
    let bound = Function::new(
        cx.scope,
        name,
        FunctionKind::Bound(BoundFunction {
            target: callee,
            bound_this,
            bound_args,
        }),
    );
    Ok(Value::Object(cx.scope.register(bound)))
}

pub fn to_string(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let name = cx
        .this
        .downcast_ref::<Function>()
        .and_then(Function::name)
        .map(|n| n.to_rc(cx.scope).to_string())
        .unwrap_or_default();
    let text = format!("function {name}() {{ [native code] }}");
    let sym = cx.scope.intern(&*text);
    Ok(Value::string(sym.into()))
}
