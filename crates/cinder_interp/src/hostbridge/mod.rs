//! The bridge between script values and statically-typed host objects.
//!
//! Hosts register class descriptors (the reflection substitute): typed
//! fields with accessor closures, methods with typed parameter lists and
//! invoke closures, constructors, supertypes, and optional hooks. The
//! bridge synthesizes script-visible members from a descriptor, resolves
//! overloads with LiveConnect-style conversion weights, and memoizes
//! wrappers per context so host-object identity survives round trips.

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::{Arc, OnceLock, RwLock};

use rustc_hash::FxHashMap;

use crate::localscope::LocalScope;
use crate::value::object::{Handle, Object};
use crate::value::Value;

pub mod convert;
pub mod members;
pub mod object;

pub use convert::{coerce, conversion_weight, select_overload, wrap_host_value};
pub use members::{BeanProperty, Member, MemberRef, Members};
pub use object::{HostClassObject, HostIterator, HostList, HostMap, HostObject};

/// Identifies a registered host class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostClassId(pub u32);

/// The static type of a host parameter, field or element.
#[derive(Debug, Clone, PartialEq)]
pub enum HostType {
    Bool,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    String,
    /// Any host reference; everything converts here at low preference.
    Object,
    /// An instance of a specific registered class.
    Class(HostClassId),
    /// A single-method interface; function-shaped script values adapt.
    Interface,
    List(Box<HostType>),
    Array(Box<HostType>),
    /// A raw script value, passed through unconverted.
    Value,
}

impl HostType {
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            HostType::Bool
                | HostType::Byte
                | HostType::Short
                | HostType::Int
                | HostType::Long
                | HostType::Float
                | HostType::Double
                | HostType::Char
        )
    }
}

/// A value crossing the bridge on the host side.
#[derive(Debug, Clone)]
pub enum HostValue {
    Null,
    Undefined,
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    String(Rc<str>),
    List(Rc<RefCell<Vec<HostValue>>>),
    /// String-keyed, insertion-ordered.
    Map(Rc<RefCell<Vec<(Rc<str>, HostValue)>>>),
    Object(HostInstance),
    /// A script function adapted to an interface parameter. The host side
    /// dispatches back into the script by applying the handle.
    Delegate(Handle),
    /// A raw script value.
    Value(Value),
}

/// A host object together with its registered class.
#[derive(Clone)]
pub struct HostInstance {
    pub class: HostClassId,
    pub data: Rc<dyn Any>,
}

impl std::fmt::Debug for HostInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostInstance").field("class", &self.class).finish()
    }
}

impl HostInstance {
    pub fn new(class: HostClassId, data: Rc<dyn Any>) -> Self {
        Self { class, data }
    }

    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.data) as *const () as usize
    }
}

/// Host methods surface failures as messages; the bridge wraps them into
/// script-catchable errors that preserve the message and retain the
/// original as `cause`.
pub type HostMethodResult = Result<HostValue, String>;

pub type HostInvoke = Arc<dyn Fn(&mut LocalScope<'_>, Option<&dyn Any>, Vec<HostValue>) -> HostMethodResult + Send + Sync>;
pub type HostFieldGet = Arc<dyn Fn(Option<&dyn Any>) -> HostValue + Send + Sync>;
pub type HostFieldSet = Arc<dyn Fn(Option<&dyn Any>, HostValue) + Send + Sync>;
/// Produces the elements a host iterable yields.
pub type HostIterFactory = Arc<dyn Fn(&dyn Any) -> Vec<HostValue> + Send + Sync>;
/// Member-name remapping hook supplied by the embedder.
pub type HostNameRemap = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;
/// Consulted when a script `delete` targets a host member or element.
/// Receives the instance (None for statics) and the member name or index;
/// the return value is whether the deletion is honored. Without a hook,
/// host members refuse deletion.
pub type HostDeleteHook = Arc<dyn Fn(Option<&dyn Any>, &str) -> bool + Send + Sync>;

pub struct HostMethod {
    pub name: String,
    pub is_static: bool,
    pub params: Vec<HostType>,
    /// Hierarchy depth of the declaring class; ties between equally-ranked
    /// overloads prefer the most specific (deepest) declaration.
    pub specificity: u32,
    pub invoke: HostInvoke,
}

impl std::fmt::Debug for HostMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostMethod")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}

pub struct HostField {
    pub name: String,
    pub is_static: bool,
    pub ty: HostType,
    pub get: HostFieldGet,
    pub set: Option<HostFieldSet>,
}

impl std::fmt::Debug for HostField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostField")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .finish()
    }
}

/// A registered host class descriptor.
pub struct HostClass {
    pub name: String,
    pub supers: Vec<HostClassId>,
    pub fields: Vec<HostField>,
    pub methods: Vec<HostMethod>,
    pub constructors: Vec<HostMethod>,
    pub iterable: Option<HostIterFactory>,
    pub remap: Option<HostNameRemap>,
    pub on_delete: Option<HostDeleteHook>,
    /// Prefixes stripped from member names before bean collapsing.
    pub prefixes: Vec<String>,
    members: OnceLock<Arc<Members>>,
}

impl std::fmt::Debug for HostClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostClass").field("name", &self.name).finish()
    }
}

impl HostClass {
    /// The synthesized member tables, built once per class and shared.
    pub fn members(&self, id: HostClassId, registry: &HostRegistry) -> Arc<Members> {
        self.members
            .get_or_init(|| Arc::new(members::build(registry, id)))
            .clone()
    }
}

/// The shared class registry. Descriptors are registered once and read
/// from any context; member-table construction is compute-if-absent.
#[derive(Debug, Clone, Default)]
pub struct HostRegistry {
    classes: Arc<RwLock<Vec<Arc<HostClass>>>>,
}

impl HostRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, builder: HostClassBuilder) -> HostClassId {
        let mut classes = self.classes.write().unwrap();
        let id = HostClassId(classes.len() as u32);
        cinder_log::debug!("register host class {}", builder.name);
        classes.push(Arc::new(HostClass {
            name: builder.name,
            supers: builder.supers,
            fields: builder.fields,
            methods: builder.methods,
            constructors: builder.constructors,
            iterable: builder.iterable,
            remap: builder.remap,
            on_delete: builder.on_delete,
            prefixes: builder.prefixes,
            members: OnceLock::new(),
        }));
        id
    }

    pub fn get(&self, id: HostClassId) -> Arc<HostClass> {
        self.classes.read().unwrap()[id.0 as usize].clone()
    }

    /// Whether `value` is an instance of `target`, walking supertypes.
    pub fn is_instance(&self, class: HostClassId, target: HostClassId) -> bool {
        if class == target {
            return true;
        }
        let supers = self.get(class).supers.clone();
        supers.iter().any(|&parent| self.is_instance(parent, target))
    }

    /// The hierarchy depth of a class (used as overload specificity).
    pub fn depth(&self, class: HostClassId) -> u32 {
        let supers = self.get(class).supers.clone();
        supers.iter().map(|&parent| self.depth(parent) + 1).max().unwrap_or(0)
    }
}

/// Builder for host class descriptors.
pub struct HostClassBuilder {
    name: String,
    supers: Vec<HostClassId>,
    fields: Vec<HostField>,
    methods: Vec<HostMethod>,
    constructors: Vec<HostMethod>,
    iterable: Option<HostIterFactory>,
    remap: Option<HostNameRemap>,
    on_delete: Option<HostDeleteHook>,
    prefixes: Vec<String>,
}

impl HostClassBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            supers: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            iterable: None,
            remap: None,
            on_delete: None,
            prefixes: Vec::new(),
        }
    }

    pub fn extends(mut self, parent: HostClassId) -> Self {
        self.supers.push(parent);
        self
    }

    pub fn field(mut self, field: HostField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn method(mut self, method: HostMethod) -> Self {
        self.methods.push(method);
        self
    }

    pub fn constructor(mut self, constructor: HostMethod) -> Self {
        self.constructors.push(constructor);
        self
    }

    pub fn iterable(mut self, factory: HostIterFactory) -> Self {
        self.iterable = Some(factory);
        self
    }

    pub fn remap(mut self, hook: HostNameRemap) -> Self {
        self.remap = Some(hook);
        self
    }

    /// Installs the delete hook consulted when scripts `delete` a member.
    pub fn on_delete(mut self, hook: HostDeleteHook) -> Self {
        self.on_delete = Some(hook);
        self
    }

    pub fn strip_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push(prefix.into());
        self
    }
}

/// Customizes how host values become script values.
pub trait WrapFactory {
    fn wrap(&self, sc: &mut LocalScope<'_>, value: HostValue) -> Result<Value, Value>;
}

/// A per-context type-wrapper registry: entries short-circuit conversion
/// weighting ("nontrivial" match) and take over coercion.
#[derive(Default)]
pub struct TypeWrappers {
    entries: Vec<TypeWrapperEntry>,
}

pub struct TypeWrapperEntry {
    pub target: HostType,
    pub predicate: Rc<dyn Fn(&Value) -> bool>,
    pub wrap: Rc<dyn Fn(&mut LocalScope<'_>, &Value) -> Result<HostValue, Value>>,
}

impl TypeWrappers {
    pub fn register(
        &mut self,
        target: HostType,
        predicate: Rc<dyn Fn(&Value) -> bool>,
        wrap: Rc<dyn Fn(&mut LocalScope<'_>, &Value) -> Result<HostValue, Value>>,
    ) {
        self.entries.push(TypeWrapperEntry { target, predicate, wrap });
    }

    pub fn lookup(&self, target: &HostType, value: &Value) -> Option<&TypeWrapperEntry> {
        self.entries
            .iter()
            .find(|entry| &entry.target == target && (entry.predicate)(value))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-context bridge state: the registry reference, the type-wrapper
/// table, the replaceable wrap factory, and the identity-memoized wrapper
/// cache (weakly held, so dropping script references frees host objects).
#[derive(Default)]
pub struct HostContextState {
    pub registry: HostRegistry,
    pub type_wrappers: TypeWrappers,
    pub wrap_factory: Option<Rc<dyn WrapFactory>>,
    pub(crate) wrappers: RefCell<FxHashMap<usize, Weak<dyn Object>>>,
}

impl HostContextState {
    /// Looks up a live memoized wrapper for a host identity.
    pub(crate) fn cached_wrapper(&self, identity: usize) -> Option<Handle> {
        let mut wrappers = self.wrappers.borrow_mut();
        match wrappers.get(&identity) {
            Some(weak) => match weak.upgrade() {
                Some(object) => Some(Handle::new(object)),
                None => {
                    wrappers.remove(&identity);
                    None
                }
            },
            None => None,
        }
    }

    pub(crate) fn cache_wrapper(&self, identity: usize, handle: &Handle) {
        self.wrappers.borrow_mut().insert(identity, handle.downgrade());
    }
}
