use cinder_middle::interner::sym;

use crate::localscope::LocalScope;
use crate::value::error::{Error, ErrorKind};
use crate::value::function::CallContext;
use crate::value::object::Handle;
use crate::value::ops::conversions::ValueConversion;
use crate::value::{Value, ValueContext};

use super::{register_ctor, register_fn};

/// Builds one error constructor per kind; the constructor body only
/// differs in the kind it stamps onto the object.
macro_rules! define_error_ctor {
    ( $( $fn_name:ident, $kind:ident, $proto:ident, $name_sym:ident );* $(;)? ) => {
        $(
            pub fn $fn_name(cx: CallContext<'_, '_>) -> Result<Value, Value> {
                let message = match cx.args.first() {
                    None | Some(Value::Undefined) => String::new(),
                    Some(value) => value.to_js_string(cx.scope)?.to_rc(cx.scope).to_string(),
                };

                // An options bag may carry `cause`.
                let cause = match cx.args.get(1) {
                    Some(options @ Value::Object(_)) => {
                        let cause = options.get_property(cx.scope, sym::CAUSE.into())?;
                        (!cause.is_nullish()).then_some(cause)
                    }
                    _ => None,
                };

                Ok(match cause {
                    Some(cause) => Error::create_with_cause(cx.scope, ErrorKind::$kind, message, cause),
                    None => Error::create(cx.scope, ErrorKind::$kind, message),
                })
            }
        )*

        pub fn init(sc: &mut LocalScope<'_>, global: &Handle) {
            $(
                {
                    let prototype = sc.statics.$proto.clone();
                    register_fn(sc, &prototype, sym::TO_STRING, to_string);
                    register_ctor(sc, global, sym::$name_sym, $fn_name, &prototype);
                }
            )*
        }
    };
}

define_error_ctor!(
    error_ctor, Error, error_prototype, ERROR;
    eval_error_ctor, EvalError, eval_error_prototype, EVAL_ERROR;
    range_error_ctor, RangeError, range_error_prototype, RANGE_ERROR;
    reference_error_ctor, ReferenceError, reference_error_prototype, REFERENCE_ERROR;
    syntax_error_ctor, SyntaxError, syntax_error_prototype, SYNTAX_ERROR;
    type_error_ctor, TypeError, type_error_prototype, TYPE_ERROR;
    uri_error_ctor, URIError, uri_error_prototype, URI_ERROR;
    evaluator_error_ctor, EvaluatorError, evaluator_error_prototype, EVALUATOR_ERROR;
    wrapped_error_ctor, WrappedError, wrapped_error_prototype, WRAPPED_ERROR;
);

pub fn to_string(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let name = cx.this.get_property(cx.scope, sym::NAME.into())?;
    let name = match name {
        Value::Undefined => "Error".to_string(),
        other => other.to_js_string(cx.scope)?.to_rc(cx.scope).to_string(),
    };
    let message = cx.this.get_property(cx.scope, sym::MESSAGE.into())?;
    let message = match message {
        Value::Undefined => String::new(),
        other => other.to_js_string(cx.scope)?.to_rc(cx.scope).to_string(),
    };

    let text = if message.is_empty() {
        name
    } else {
        format!("{name}: {message}")
    };
    let sym = cx.scope.intern(&*text);
    Ok(Value::string(sym.into()))
}
