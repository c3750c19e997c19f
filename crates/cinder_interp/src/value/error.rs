use std::cell::RefCell;
use std::fmt::Write;
use std::rc::Rc;

use cinder_middle::interner::sym;

use crate::localscope::LocalScope;
use crate::value::object::{Handle, NamedObject, Object, PropertyKey, PropertyValue};
use crate::value::Value;

/// The runtime error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Error,
    EvalError,
    RangeError,
    ReferenceError,
    SyntaxError,
    TypeError,
    URIError,
    /// An engine self-check failed.
    EvaluatorError,
    /// A host exception that escaped through a bridged call.
    WrappedError,
}

impl ErrorKind {
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Error => "Error",
            ErrorKind::EvalError => "EvalError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::ReferenceError => "ReferenceError",
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::URIError => "URIError",
            ErrorKind::EvaluatorError => "EvaluatorError",
            ErrorKind::WrappedError => "WrappedError",
        }
    }
}

/// One captured script stack frame.
#[derive(Debug, Clone)]
pub struct StackFrame {
    pub function_name: Option<Rc<str>>,
    pub source_name: Rc<str>,
    pub line: u32,
}

impl StackFrame {
    /// Renders as `\tat <functionName> (<sourceName>:<line>)`.
    pub fn render(&self, out: &mut String) {
        let name = self.function_name.as_deref().unwrap_or("<anonymous>");
        let _ = write!(out, "\tat {} ({}:{})", name, self.source_name, self.line);
    }
}

/// A script error object.
#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: Rc<str>,
    /// The script call stack captured when the error was constructed.
    pub stack: Vec<StackFrame>,
    /// Source position of the throw site, for `(<source>#<line>)` rendering.
    pub position: Option<(Rc<str>, u32)>,
    pub cause: RefCell<Option<Value>>,
    obj: NamedObject,
}

impl Error {
    /// Builds an error of the given kind, capturing the current script
    /// stack, and returns it as a value (ready to be thrown).
    pub fn create(sc: &mut LocalScope<'_>, kind: ErrorKind, message: String) -> Value {
        let error = Self::build(sc, kind, message);
        Value::Object(sc.register(error))
    }

    pub fn create_with_cause(sc: &mut LocalScope<'_>, kind: ErrorKind, message: String, cause: Value) -> Value {
        let error = Self::build(sc, kind, message);
        *error.cause.borrow_mut() = Some(cause);
        Value::Object(sc.register(error))
    }

    fn build(sc: &mut LocalScope<'_>, kind: ErrorKind, message: String) -> Self {
        let stack = sc.capture_stack();
        let position = sc.current_position();
        let prototype = prototype_for(sc, kind);

        Self {
            kind,
            message: Rc::from(message),
            stack,
            position,
            cause: RefCell::new(None),
            obj: NamedObject::with_prototype(prototype),
        }
    }

    /// The rendered stack: the header line plus one line per frame.
    pub fn render_stack(&self) -> String {
        let mut out = String::new();
        let _ = write!(out, "{}: {}", self.kind.name(), self.message);
        for frame in &self.stack {
            out.push('\n');
            frame.render(&mut out);
        }
        out
    }

    /// `"<details> (<source>#<line>)"` when the position is known.
    pub fn message_with_position(&self) -> String {
        match &self.position {
            Some((source, line)) => format!("{} ({}#{})", self.message, source, line),
            None => self.message.to_string(),
        }
    }
}

fn prototype_for(sc: &LocalScope<'_>, kind: ErrorKind) -> Handle {
    match kind {
        ErrorKind::Error => sc.statics.error_prototype.clone(),
        ErrorKind::EvalError => sc.statics.eval_error_prototype.clone(),
        ErrorKind::RangeError => sc.statics.range_error_prototype.clone(),
        ErrorKind::ReferenceError => sc.statics.reference_error_prototype.clone(),
        ErrorKind::SyntaxError => sc.statics.syntax_error_prototype.clone(),
        ErrorKind::TypeError => sc.statics.type_error_prototype.clone(),
        ErrorKind::URIError => sc.statics.uri_error_prototype.clone(),
        ErrorKind::EvaluatorError => sc.statics.evaluator_error_prototype.clone(),
        ErrorKind::WrappedError => sc.statics.wrapped_error_prototype.clone(),
    }
}

impl Object for Error {
    fn get_own_property_descriptor(
        &self,
        sc: &mut LocalScope<'_>,
        key: PropertyKey,
    ) -> Result<Option<PropertyValue>, Value> {
        if let PropertyKey::String(s) = &key {
            match s.sym() {
                s if s == sym::NAME => {
                    let name = sc.intern(self.kind.name());
                    return Ok(Some(PropertyValue::static_non_enumerable(Value::string(name.into()))));
                }
                s if s == sym::MESSAGE => {
                    let message = sc.intern(&*self.message);
                    return Ok(Some(PropertyValue::static_non_enumerable(Value::string(
                        message.into(),
                    ))));
                }
                s if s == sym::STACK => {
                    let stack = sc.intern(&*self.render_stack());
                    return Ok(Some(PropertyValue::static_non_enumerable(Value::string(stack.into()))));
                }
                s if s == sym::CAUSE => {
                    if let Some(cause) = self.cause.borrow().clone() {
                        return Ok(Some(PropertyValue::static_non_enumerable(cause)));
                    }
                }
                _ => {}
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
        _args: Vec<Value>,
    ) -> Result<Value, Value> {
        crate::throw!(sc, TypeError, "Error object is not a function")
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn own_keys(&self, sc: &mut LocalScope<'_>) -> Result<Vec<Value>, Value> {
        self.obj.own_keys(sc)
    }

    fn class_name(&self) -> &'static str {
        "Error"
    }
}
