use std::rc::Rc;

use cinder_middle::interner::Symbol;

use crate::localscope::LocalScope;
use crate::Vm;

/// An interned runtime string.
///
/// All runtime strings live in the context's interner; a `JsString` is a
/// cheap copyable token. String operations address UTF-16 code units, which
/// the helpers below materialize on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JsString {
    sym: Symbol,
}

impl JsString {
    pub fn sym(self) -> Symbol {
        self.sym
    }

    /// Resolves to the string data. The borrow is tied to the scope.
    pub fn res<'a>(self, sc: &'a LocalScope<'_>) -> &'a str {
        sc.interner.resolve(self.sym)
    }

    pub fn res_vm(self, vm: &Vm) -> &str {
        vm.interner.resolve(self.sym)
    }

    /// Resolves to a shared copy, for use across interner mutation.
    pub fn to_rc(self, sc: &LocalScope<'_>) -> Rc<str> {
        sc.interner.resolve_rc(self.sym)
    }

    /// The length in UTF-16 code units (what scripts observe as `length`).
    pub fn len(self, sc: &LocalScope<'_>) -> usize {
        self.res(sc).encode_utf16().count()
    }

    pub fn is_empty(self, sc: &LocalScope<'_>) -> bool {
        self.res(sc).is_empty()
    }

    /// The string as UTF-16 code units.
    pub fn code_units(self, sc: &LocalScope<'_>) -> Vec<u16> {
        self.res(sc).encode_utf16().collect()
    }
}

impl From<Symbol> for JsString {
    fn from(sym: Symbol) -> Self {
        Self { sym }
    }
}

/// Builds a string from UTF-16 code units, mapping unpaired surrogates to
/// the replacement character.
pub fn from_code_units(units: &[u16]) -> String {
    String::from_utf16_lossy(units)
}
