pub mod array;
pub mod boxed;
pub mod date;
pub mod error;
pub mod function;
pub mod hashtable;
pub mod iterator;
pub mod map;
pub mod object;
pub mod ops;
pub mod propertymap;
pub mod regex;
pub mod set;
pub mod string;
pub mod symbol;

use cinder_middle::interner::{sym, Symbol};

use crate::localscope::LocalScope;
use crate::throw;

use self::object::{Handle, Object, PropertyKey, PropertyValue};
use self::string::JsString;
use self::symbol::JsSymbol;

/// A runtime value: one of the language's primitive kinds or an object
/// reference.
#[derive(Debug, Clone)]
pub enum Value {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(JsString),
    Symbol(JsSymbol),
    Object(Handle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Typeof {
    Undefined,
    Object,
    Boolean,
    Number,
    String,
    Symbol,
    Function,
}

impl Typeof {
    /// The symbol `typeof` evaluates to.
    pub fn as_sym(self) -> Symbol {
        match self {
            Typeof::Undefined => sym::UNDEFINED,
            Typeof::Object => sym::LO_OBJECT,
            Typeof::Boolean => sym::LO_BOOLEAN,
            Typeof::Number => sym::LO_NUMBER,
            Typeof::String => sym::LO_STRING,
            Typeof::Symbol => sym::LO_SYMBOL,
            Typeof::Function => sym::FUNCTION,
        }
    }
}

impl Value {
    pub fn undefined() -> Value {
        Value::Undefined
    }

    pub fn null() -> Value {
        Value::Null
    }

    pub fn number(n: f64) -> Value {
        Value::Number(n)
    }

    pub fn boolean(b: bool) -> Value {
        Value::Boolean(b)
    }

    pub fn string(s: JsString) -> Value {
        Value::String(s)
    }

    pub fn object(handle: Handle) -> Value {
        Value::Object(handle)
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn type_of(&self) -> Typeof {
        match self {
            Value::Undefined => Typeof::Undefined,
            Value::Null => Typeof::Object,
            Value::Boolean(_) => Typeof::Boolean,
            Value::Number(_) => Typeof::Number,
            Value::String(_) => Typeof::String,
            Value::Symbol(_) => Typeof::Symbol,
            Value::Object(handle) => handle.type_of(),
        }
    }

    pub fn as_object(&self) -> Option<&Handle> {
        match self {
            Value::Object(handle) => Some(handle),
            _ => None,
        }
    }

    /// Downcasts an object value to a concrete object type.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        match self {
            Value::Object(handle) => handle.as_any().downcast_ref(),
            _ => None,
        }
    }

    /// A short name for the value's kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Object(handle) => handle.class_name(),
        }
    }

    /// Property lookup through the value. Primitives consult their wrapper
    /// prototype with the primitive itself as receiver.
    pub fn get_property(&self, sc: &mut LocalScope<'_>, key: PropertyKey) -> Result<Value, Value> {
        match self {
            Value::Object(handle) => Object::get_property(&**handle, sc, self.clone(), key),
            Value::String(s) => {
                if let PropertyKey::String(name) = key {
                    if name.sym() == sym::LENGTH {
                        return Ok(Value::number(s.len(sc) as f64));
                    }
                    // Integer keys index code units.
                    if let Ok(index) = name.res(sc).parse::<usize>() {
                        let units = s.code_units(sc);
                        return Ok(match units.get(index) {
                            Some(&unit) => {
                                let text = string::from_code_units(&[unit]);
                                let sym = sc.intern(&*text);
                                Value::string(sym.into())
                            }
                            None => Value::undefined(),
                        });
                    }
                }
                let proto = sc.statics.string_prototype.clone();
                Object::get_property(&*proto, sc, self.clone(), key)
            }
            Value::Number(_) => {
                let proto = sc.statics.number_prototype.clone();
                Object::get_property(&*proto, sc, self.clone(), key)
            }
            Value::Boolean(_) => {
                let proto = sc.statics.boolean_prototype.clone();
                Object::get_property(&*proto, sc, self.clone(), key)
            }
            Value::Symbol(_) => {
                let proto = sc.statics.symbol_prototype.clone();
                Object::get_property(&*proto, sc, self.clone(), key)
            }
            Value::Undefined | Value::Null => {
                let key = key.to_display_string(sc);
                throw!(
                    sc,
                    TypeError,
                    "Cannot read property \"{}\" from {}",
                    key,
                    self.kind_name()
                )
            }
        }
    }

    /// Property assignment. Writes to primitives are silently dropped;
    /// writes through `null`/`undefined` throw.
    pub fn set_property(&self, sc: &mut LocalScope<'_>, key: PropertyKey, value: PropertyValue) -> Result<(), Value> {
        match self {
            Value::Object(handle) => handle.set_property(sc, key, value),
            Value::Undefined | Value::Null => {
                let key = key.to_display_string(sc);
                throw!(
                    sc,
                    TypeError,
                    "Cannot set property \"{}\" on {}",
                    key,
                    self.kind_name()
                )
            }
            _ => Ok(()),
        }
    }

    pub fn delete_property(&self, sc: &mut LocalScope<'_>, key: PropertyKey) -> Result<bool, Value> {
        match self {
            Value::Object(handle) => handle.delete_property(sc, key),
            _ => Ok(true),
        }
    }

    /// Whether the property exists anywhere on the prototype chain (`in`).
    pub fn has_property(&self, sc: &mut LocalScope<'_>, key: PropertyKey) -> Result<bool, Value> {
        match self {
            Value::Object(handle) => Ok(handle
                .get_property_descriptor(sc, key)?
                .is_some()),
            Value::Undefined | Value::Null => {
                throw!(sc, TypeError, "Cannot use 'in' operator on {}", self.kind_name())
            }
            _ => Ok(self.get_property(sc, key).map(|v| !v.is_nullish()).unwrap_or(false)),
        }
    }

    pub fn apply(&self, sc: &mut LocalScope<'_>, this: Value, args: Vec<Value>) -> Result<Value, Value> {
        match self {
            Value::Object(handle) => handle.apply(sc, this, args),
            _ => throw!(sc, TypeError, "{} is not a function", self.kind_name()),
        }
    }

    pub fn construct(&self, sc: &mut LocalScope<'_>, args: Vec<Value>) -> Result<Value, Value> {
        match self {
            Value::Object(handle) => handle.construct(sc, Value::undefined(), args),
            _ => throw!(sc, TypeError, "{} is not a constructor", self.kind_name()),
        }
    }
}

impl PartialEq for Value {
    /// Structural equality, used by descriptors and tests. Script-visible
    /// equality lives in `ops::equality`.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

/// Option-of-value helpers matching how scripts treat missing values.
pub trait ValueContext {
    fn unwrap_or_undefined(self) -> Value;
}

impl ValueContext for Option<Value> {
    fn unwrap_or_undefined(self) -> Value {
        self.unwrap_or(Value::Undefined)
    }
}

impl ValueContext for Option<&Value> {
    fn unwrap_or_undefined(self) -> Value {
        self.cloned().unwrap_or(Value::Undefined)
    }
}
