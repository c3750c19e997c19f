use crate::value::object::{Handle, NamedObject};
use crate::value::symbol::JsSymbol;

/// The intrinsic objects of a context: every prototype the runtime needs a
/// handle to, plus the well-known symbols.
///
/// `Statics::new` only allocates the bare objects; the standard-library
/// module wires prototype links, methods and constructors when a scope is
/// initialized.
#[derive(Debug)]
pub struct Statics {
    pub object_prototype: Handle,
    pub function_prototype: Handle,
    pub array_prototype: Handle,
    pub string_prototype: Handle,
    pub number_prototype: Handle,
    pub boolean_prototype: Handle,
    pub symbol_prototype: Handle,
    pub date_prototype: Handle,
    pub regexp_prototype: Handle,
    pub map_prototype: Handle,
    pub set_prototype: Handle,
    pub iterator_prototype: Handle,

    pub error_prototype: Handle,
    pub eval_error_prototype: Handle,
    pub range_error_prototype: Handle,
    pub reference_error_prototype: Handle,
    pub syntax_error_prototype: Handle,
    pub type_error_prototype: Handle,
    pub uri_error_prototype: Handle,
    pub evaluator_error_prototype: Handle,
    pub wrapped_error_prototype: Handle,

    pub host_list_prototype: Handle,
    pub host_map_prototype: Handle,

    pub symbol_iterator: JsSymbol,
    pub symbol_to_primitive: JsSymbol,
    pub symbol_is_concat_spreadable: JsSymbol,
    pub symbol_to_string_tag: JsSymbol,
}

fn bare() -> Handle {
    Handle::from_object(NamedObject::null())
}

impl Statics {
    pub fn new() -> Self {
        Self {
            object_prototype: bare(),
            function_prototype: bare(),
            array_prototype: bare(),
            string_prototype: bare(),
            number_prototype: bare(),
            boolean_prototype: bare(),
            symbol_prototype: bare(),
            date_prototype: bare(),
            regexp_prototype: bare(),
            map_prototype: bare(),
            set_prototype: bare(),
            iterator_prototype: bare(),
            error_prototype: bare(),
            eval_error_prototype: bare(),
            range_error_prototype: bare(),
            reference_error_prototype: bare(),
            syntax_error_prototype: bare(),
            type_error_prototype: bare(),
            uri_error_prototype: bare(),
            evaluator_error_prototype: bare(),
            wrapped_error_prototype: bare(),
            host_list_prototype: bare(),
            host_map_prototype: bare(),
            symbol_iterator: JsSymbol::new(Some(cinder_middle::interner::sym::SYM_ITERATOR.into())),
            symbol_to_primitive: JsSymbol::new(Some(cinder_middle::interner::sym::SYM_TO_PRIMITIVE.into())),
            symbol_is_concat_spreadable: JsSymbol::new(Some(
                cinder_middle::interner::sym::SYM_IS_CONCAT_SPREADABLE.into(),
            )),
            symbol_to_string_tag: JsSymbol::new(Some(cinder_middle::interner::sym::SYM_TO_STRING_TAG.into())),
        }
    }
}

impl Default for Statics {
    fn default() -> Self {
        Self::new()
    }
}
