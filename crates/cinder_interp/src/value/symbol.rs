use std::fmt;
use std::rc::Rc;

use super::string::JsString;

#[derive(Debug)]
struct SymbolData {
    description: Option<JsString>,
}

/// A script symbol. Equality is reference identity: two symbols are equal
/// iff they are the same allocation, regardless of description.
#[derive(Debug, Clone)]
pub struct JsSymbol(Rc<SymbolData>);

impl JsSymbol {
    pub fn new(description: Option<JsString>) -> Self {
        Self(Rc::new(SymbolData { description }))
    }

    pub fn description(&self) -> Option<JsString> {
        self.0.description
    }

    fn data_ptr(&self) -> *const SymbolData {
        Rc::as_ptr(&self.0)
    }
}

impl PartialEq for JsSymbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for JsSymbol {}

impl std::hash::Hash for JsSymbol {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.data_ptr().hash(state);
    }
}

impl fmt::Display for JsSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Symbol(…)")
    }
}
