use std::hash::{BuildHasherDefault, Hash, Hasher};
use std::rc::Rc;
use std::{borrow, fmt};

use hashbrown::hash_map::RawEntryMut;
use rustc_hash::FxHasher;

type RawSymbol = u32;

/// An interned string.
///
/// Two symbols compare equal iff they were interned from equal strings
/// in the same interner.
#[derive(Debug, Eq, Hash, PartialEq, Clone, Copy)]
pub struct Symbol(RawSymbol);

impl Symbol {
    /// Prefer passing `Symbol`s around directly wherever possible.
    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn is_keyword(self) -> bool {
        self.0 >= sym::KEYWORD_START.raw() && self.0 <= sym::KEYWORD_END.raw()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if (self.0 as usize) < sym::PREINTERNED.len() {
            write!(f, "{}", sym::PREINTERNED[self.0 as usize].0)
        } else {
            write!(f, "<interned id: {}>", self.0)
        }
    }
}

macro_rules! preinterned {
    ($($name:ident: $lit:literal),* $(,)?) => {
        #[allow(non_camel_case_types)]
        #[repr(u32)]
        enum Tag { $($name),* }

        $(pub const $name: Symbol = Symbol(Tag::$name as u32);)*

        /// Every symbol known at compile time, in tag order. The interner
        /// seeds its table with these so the constants above stay valid.
        pub const PREINTERNED: &[(&str, Symbol)] = &[$(($lit, $name)),*];
    };
}

pub mod sym {
    use super::Symbol;

    preinterned! {
        // Keywords. These must stay contiguous and first; `Symbol::is_keyword`
        // relies on the range check below.
        IF: "if", ELSE: "else", FUNCTION: "function", VAR: "var", LET: "let",
        CONST: "const", RETURN: "return", THROW: "throw", TRY: "try",
        CATCH: "catch", FINALLY: "finally", TRUE_LIT: "true", FALSE_LIT: "false",
        NULL_LIT: "null", NEW: "new", FOR: "for", DO: "do", WHILE: "while",
        IN: "in", INSTANCEOF: "instanceof", DELETE: "delete", VOID: "void",
        TYPEOF: "typeof", CONTINUE: "continue", BREAK: "break",
        DEBUGGER: "debugger", SWITCH: "switch", CASE: "case", DEFAULT: "default",
        WITH: "with", THIS: "this", YIELD: "yield", OF: "of", CLASS: "class",
        EXTENDS: "extends", SUPER: "super", IMPORT: "import", EXPORT: "export",

        // Names the runtime looks up constantly.
        DOLLAR: "$", EMPTY: "", UNDEFINED: "undefined", CONSTRUCTOR: "constructor",
        PROTO: "__proto__", PROTOTYPE: "prototype", NAME: "name", LENGTH: "length",
        MESSAGE: "message", STACK: "stack", CAUSE: "cause", VALUE: "value",
        DONE: "done", NEXT: "next", GLOBAL_THIS: "globalThis",
        INFINITY: "Infinity", NAN: "NaN", ARGUMENTS: "arguments",
        WRITABLE: "writable", ENUMERABLE: "enumerable", CONFIGURABLE: "configurable",
        GET: "get", SET: "set",

        // typeof results ("undefined" and "function" reuse the symbols above).
        LO_OBJECT: "object", LO_BOOLEAN: "boolean",
        LO_NUMBER: "number", LO_STRING: "string", LO_SYMBOL: "symbol",

        // Constructor / prototype names.
        OBJECT: "Object", ARRAY: "Array", FUNCTION_NAME: "Function",
        NUMBER: "Number", STRING: "String", BOOLEAN: "Boolean", SYMBOL: "Symbol",
        MATH: "Math", JSON: "JSON", DATE: "Date", REG_EXP: "RegExp", MAP: "Map",
        SET_NAME: "Set", CONSOLE: "console", ERROR: "Error",
        EVAL_ERROR: "EvalError", RANGE_ERROR: "RangeError",
        REFERENCE_ERROR: "ReferenceError", SYNTAX_ERROR: "SyntaxError",
        TYPE_ERROR: "TypeError", URI_ERROR: "URIError",
        EVALUATOR_ERROR: "EvaluatorError", WRAPPED_ERROR: "WrappedError",

        // Well-known symbol descriptions.
        SYM_ITERATOR: "Symbol.iterator", SYM_TO_PRIMITIVE: "Symbol.toPrimitive",
        SYM_IS_CONCAT_SPREADABLE: "Symbol.isConcatSpreadable",
        SYM_TO_STRING_TAG: "Symbol.toStringTag",

        // Frequent member names.
        TO_STRING: "toString", VALUE_OF: "valueOf", HAS_OWN_PROPERTY: "hasOwnProperty",
        ITERATOR: "iterator", KEYS: "keys", VALUES: "values", ENTRIES: "entries",
        PUSH: "push", POP: "pop", SHIFT: "shift", UNSHIFT: "unshift",
        CONCAT: "concat", JOIN: "join", REVERSE: "reverse", SLICE: "slice",
        SPLICE: "splice", EVERY: "every", SOME: "some", FILTER: "filter",
        MAP_FN: "map", REDUCE: "reduce", REDUCE_RIGHT: "reduceRight",
        FIND: "find", FIND_INDEX: "findIndex", FIND_LAST: "findLast",
        FIND_LAST_INDEX: "findLastIndex", INDEX_OF: "indexOf", INCLUDES: "includes",
        FOR_EACH: "forEach", ADD: "add", HAS: "has",
        CLEAR: "clear", SIZE: "size", ANONYMOUS: "<anonymous>",
        ZERO: "0", ONE: "1",
    }

    pub const KEYWORD_START: Symbol = IF;
    pub const KEYWORD_END: Symbol = EXPORT;
}

#[derive(Debug)]
pub struct StringInterner {
    store: Vec<Rc<str>>,
    mapping: hashbrown::HashMap<Rc<str>, RawSymbol, BuildHasherDefault<FxHasher>>,
}

fn fxhash(s: &str) -> u64 {
    let mut hasher = FxHasher::default();
    s.hash(&mut hasher);
    hasher.finish()
}

impl StringInterner {
    pub fn new() -> Self {
        let mut store = Vec::with_capacity(sym::PREINTERNED.len());
        let mut mapping =
            hashbrown::HashMap::with_capacity_and_hasher(sym::PREINTERNED.len(), BuildHasherDefault::default());

        for (s, index) in sym::PREINTERNED {
            let s: Rc<str> = Rc::from(*s);
            debug_assert!(store.len() == index.raw() as usize);
            mapping.insert(Rc::clone(&s), index.raw());
            store.push(s);
        }

        Self { store, mapping }
    }

    pub fn resolve(&self, symbol: Symbol) -> &str {
        &self.store[symbol.0 as usize]
    }

    /// Resolves a symbol to a shared string, for callers that need to hold
    /// the text across further interner use.
    pub fn resolve_rc(&self, symbol: Symbol) -> Rc<str> {
        Rc::clone(&self.store[symbol.0 as usize])
    }

    pub fn intern(&mut self, value: impl borrow::Borrow<str>) -> Symbol {
        let value = value.borrow();
        let hash = fxhash(value);

        match self.mapping.raw_entry_mut().from_hash(hash, |k| &**k == value) {
            RawEntryMut::Occupied(entry) => Symbol(*entry.get()),
            RawEntryMut::Vacant(entry) => {
                let id = self.store.len() as RawSymbol;
                let value: Rc<str> = Rc::from(value);
                self.store.push(Rc::clone(&value));
                entry.insert_hashed_nocheck(hash, value, id);
                Symbol(id)
            }
        }
    }

    pub fn intern_usize(&mut self, val: usize) -> Symbol {
        let string = val.to_string();
        self.intern(string.as_str())
    }

    pub fn intern_char(&mut self, val: char) -> Symbol {
        let mut buf = [0; 4];
        self.intern(&*val.encode_utf8(&mut buf))
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preinterned_constants_line_up() {
        let interner = StringInterner::new();
        for (text, symbol) in sym::PREINTERNED {
            assert_eq!(interner.resolve(*symbol), *text);
        }
    }

    #[test]
    fn interning_is_idempotent() {
        let mut interner = StringInterner::new();
        let a = interner.intern("hello");
        let b = interner.intern(String::from("hello"));
        assert_eq!(a, b);
        assert_eq!(interner.resolve(a), "hello");
        assert_ne!(a, interner.intern("world"));
    }

    #[test]
    fn keywords_form_a_contiguous_range() {
        assert!(sym::IF.is_keyword());
        assert!(sym::EXPORT.is_keyword());
        assert!(!sym::PROTOTYPE.is_keyword());
    }
}
