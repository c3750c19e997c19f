use cinder_middle::interner::sym;

use crate::localscope::LocalScope;
use crate::params::ConsoleLevel;
use crate::value::function::CallContext;
use crate::value::object::{Handle, NamedObject};
use crate::value::ops::conversions::ValueConversion;
use crate::value::Value;

use super::{register, register_fn};

pub fn init(sc: &mut LocalScope<'_>, global: &Handle) {
    let console = sc.register(NamedObject::new(sc));

    for (name, fun) in [
        ("log", log as crate::value::function::NativeFunction),
        ("info", info),
        ("warn", warn),
        ("error", error),
        ("debug", debug),
    ] {
        let name = sc.intern(name);
        register_fn(sc, &console, name, fun);
    }

    register(sc, global, sym::CONSOLE, Value::Object(console));
}

/// Renders console arguments the way embedders expect to see them: joined
/// by spaces, strings unquoted.
fn format_args(sc: &mut LocalScope<'_>, args: &[Value]) -> Result<String, Value> {
    let mut out = String::new();
    for (index, arg) in args.iter().enumerate() {
        if index > 0 {
            out.push(' ');
        }
        match arg {
            Value::Symbol(symbol) => {
                let description = symbol
                    .description()
                    .map(|d| d.to_rc(sc).to_string())
                    .unwrap_or_default();
                out.push_str(&format!("Symbol({description})"));
            }
            other => {
                let text = other.to_js_string(sc)?;
                out.push_str(&text.to_rc(sc));
            }
        }
    }
    Ok(out)
}

fn emit(cx: CallContext<'_, '_>, level: ConsoleLevel) -> Result<Value, Value> {
    let message = format_args(cx.scope, &cx.args.clone())?;
    cx.scope.console_emit(level, &message);
    Ok(Value::undefined())
}

pub fn log(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    emit(cx, ConsoleLevel::Log)
}

pub fn info(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    emit(cx, ConsoleLevel::Info)
}

pub fn warn(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    emit(cx, ConsoleLevel::Warn)
}

pub fn error(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    emit(cx, ConsoleLevel::Error)
}

pub fn debug(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    emit(cx, ConsoleLevel::Debug)
}
