use std::cell::Cell;
use std::rc::Rc;

use crate::delegate;
use crate::localscope::LocalScope;
use crate::value::object::{NamedObject, Object};

/// The script `RegExp`. Matching is delegated to the `regex` crate as a
/// black box; patterns the backend cannot express fail at construction.
#[derive(Debug)]
pub struct RegExp {
    source: Rc<str>,
    flags: Rc<str>,
    compiled: regex::Regex,
    pub last_index: Cell<usize>,
    obj: NamedObject,
}

impl RegExp {
    pub fn compile(source: &str) -> Result<regex::Regex, regex::Error> {
        regex::Regex::new(source)
    }

    /// Builds the backend pattern, folding the `i`/`s`/`m` flags into
    /// inline flags.
    pub fn new(sc: &LocalScope<'_>, source: Rc<str>, flags: Rc<str>) -> Result<Self, regex::Error> {
        let mut inline = String::new();
        for flag in flags.chars() {
            match flag {
                'i' => inline.push('i'),
                'm' => inline.push('m'),
                's' => inline.push('s'),
                _ => {}
            }
        }

        let pattern = if inline.is_empty() {
            source.to_string()
        } else {
            format!("(?{inline}){source}")
        };

        Ok(Self {
            compiled: Self::compile(&pattern)?,
            source,
            flags,
            last_index: Cell::new(0),
            obj: NamedObject::with_prototype(sc.statics.regexp_prototype.clone()),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }

    pub fn is_global(&self) -> bool {
        self.flags.contains('g')
    }

    pub fn regex(&self) -> &regex::Regex {
        &self.compiled
    }
}

impl Object for RegExp {
    delegate!(
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
        "RegExp"
    }
}
