use std::rc::Rc;

use cinder_interp::eval::CompiledScript;
use cinder_interp::hostbridge::{
    HostClassBuilder, HostClassId, HostClassObject, HostInstance, HostValue, TypeWrappers, WrapFactory,
};
use cinder_interp::params::VmParams;
use cinder_interp::value::object::{Handle, Object, PropertyKey, PropertyValue};
use cinder_interp::value::Value;
use cinder_interp::Vm;

use crate::error::ScriptError;

/// A scope scripts run against: a plain script object, usually the one
/// returned by [`Context::init_standard_objects`].
pub type Scope = Handle;

/// The unit of execution. A context owns the evaluator state, the error
/// reporter configuration, the type-wrapper registry and the wrapper
/// caches; all script evaluation happens between entering a context and
/// dropping it.
pub struct Context {
    vm: Vm,
}

/// A compiled script, reusable across executions.
#[derive(Clone)]
pub struct Script {
    inner: Rc<CompiledScript>,
    source: Rc<str>,
    source_name: Rc<str>,
    start_line: u32,
}

impl Script {
    pub fn exec(&self, context: &mut Context, scope: &Scope) -> Result<Value, ScriptError> {
        context.with_scope(scope, |vm| {
            vm.execute_script(&self.inner).map_err(|error| {
                ScriptError::from_eval_error(vm, error, &self.source, &self.source_name, self.start_line)
            })
        })
    }
}

impl Context {
    /// Enters a fresh context. Released when the value drops, on every
    /// path.
    pub fn enter() -> Self {
        Self::enter_with_params(VmParams::default())
    }

    pub fn enter_with_params(params: VmParams) -> Self {
        Self {
            vm: Vm::new(params),
        }
    }

    /// Populates and returns the root scope with the standard built-ins
    /// (`Object`, `Array`, `Function`, `Math`, `JSON`, `Number`, `String`,
    /// `Boolean`, `Date`, `RegExp`, the error hierarchy, `Map`, `Set`,
    /// `Symbol`, `console`).
    pub fn init_standard_objects(&mut self) -> Scope {
        self.vm.init_standard_objects()
    }

    /// Installs a value into a scope under `name`.
    pub fn add_to_scope(&mut self, scope: &Scope, name: &str, value: Value) {
        let mut sc = self.vm.scope();
        let name = sc.intern(name);
        let _ = scope.set_property(
            &mut sc,
            PropertyKey::String(name.into()),
            PropertyValue::static_default(value),
        );
    }

    /// Parses and runs `source`; returns the completion value.
    pub fn evaluate_string(
        &mut self,
        scope: &Scope,
        source: &str,
        source_name: &str,
        start_line: u32,
    ) -> Result<Value, ScriptError> {
        let script = self.compile_string(source, source_name, start_line)?;
        script.exec(self, scope)
    }

    /// Compiles without running, for reuse via [`Script::exec`].
    pub fn compile_string(
        &mut self,
        source: &str,
        source_name: &str,
        start_line: u32,
    ) -> Result<Script, ScriptError> {
        match self.vm.compile(source, source_name, start_line) {
            Ok(inner) => Ok(Script {
                inner,
                source: Rc::from(source),
                source_name: Rc::from(source_name),
                start_line,
            }),
            Err(errors) => Err(ScriptError::from_parse_errors(errors, source, source_name, start_line)),
        }
    }

    /// Runs `f` with the given scope installed as the global scope,
    /// restoring the previous one afterwards.
    fn with_scope<T>(&mut self, scope: &Scope, f: impl FnOnce(&mut Vm) -> T) -> T {
        let previous = self.vm.global();
        self.vm.set_global(scope.clone());
        let result = f(&mut self.vm);
        self.vm.set_global(previous);
        result
    }

    // --- host interop surface ---

    /// Registers a host class descriptor with the shared registry.
    pub fn register_host_class(&mut self, builder: HostClassBuilder) -> HostClassId {
        self.vm.host.registry.register(builder)
    }

    /// Wraps a host value for script consumption (memoized by identity for
    /// objects, lists and maps).
    pub fn wrap_host_value(&mut self, value: HostValue) -> Result<Value, ScriptError> {
        let result = {
            let mut sc = self.vm.scope();
            cinder_interp::hostbridge::wrap_host_value(&mut sc, value)
        };
        result.map_err(|thrown| ScriptError::from_thrown_value(&mut self.vm, thrown))
    }

    /// Convenience: wraps a host instance object.
    pub fn wrap_host_instance(&mut self, instance: HostInstance) -> Result<Value, ScriptError> {
        self.wrap_host_value(HostValue::Object(instance))
    }

    /// Exposes a host class's static members and constructors as a script
    /// object.
    pub fn wrap_host_class(&mut self, class: HostClassId) -> Value {
        let mut sc = self.vm.scope();
        let object = HostClassObject::new(&mut sc, class);
        Value::Object(sc.register(object))
    }

    /// The per-context conversion registry consulted first during overload
    /// weighting and coercion.
    pub fn type_wrappers(&mut self) -> &mut TypeWrappers {
        &mut self.vm.host.type_wrappers
    }

    pub fn set_wrap_factory(&mut self, factory: Rc<dyn WrapFactory>) {
        self.vm.host.wrap_factory = Some(factory);
    }

    pub fn wrap_factory(&self) -> Option<Rc<dyn WrapFactory>> {
        self.vm.host.wrap_factory.clone()
    }

    // --- value helpers ---

    /// Interns a string as a script value.
    pub fn new_string(&mut self, value: &str) -> Value {
        let mut sc = self.vm.scope();
        let sym = sc.intern(value);
        Value::string(sym.into())
    }

    /// Direct access to the underlying engine, for embedders that need to
    /// drop below the convenience surface.
    pub fn vm(&mut self) -> &mut Vm {
        &mut self.vm
    }
}
