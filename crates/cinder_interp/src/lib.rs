use std::rc::Rc;

use cinder_middle::interner::{StringInterner, Symbol};
use rustc_hash::FxHashMap;

pub mod eval;
pub mod frame;
pub mod hostbridge;
pub mod js_std;
pub mod localscope;
mod macros;
pub mod params;
pub mod statics;
pub mod value;

#[cfg(test)]
mod test;

use eval::CompiledScript;
use localscope::{scope, LocalScope};
use params::{ConsoleLevel, VmParams};
use statics::Statics;
use value::error::StackFrame;
use value::object::{Handle, NamedObject};
use value::symbol::JsSymbol;
use value::Value;

pub const MAX_CALL_STACK_DEPTH: usize = 512;

/// One entry of the script call stack, maintained by the evaluator and
/// used for error stack capture.
#[derive(Debug, Clone)]
pub struct ActivationRecord {
    pub function_name: Option<Rc<str>>,
    pub source_name: Rc<str>,
    pub line: u32,
}

/// How an evaluation can fail, as seen by the embedder.
#[derive(Debug)]
pub enum EvalError {
    /// Lex/parse errors, reported through the error reporter.
    Middle(Vec<cinder_middle::parser::error::Error>),
    /// A script exception that was not caught.
    Exception(Value),
    /// The interrupt hook fired; not catchable by scripts.
    Terminated,
}

/// The unit of execution: owns the interner, the intrinsics, the host
/// bridge state and the current call stack. All evaluation runs on one
/// thread from entry to exit.
pub struct Vm {
    pub interner: StringInterner,
    pub statics: Box<Statics>,
    global: Handle,
    params: VmParams,
    call_stack: Vec<ActivationRecord>,
    terminated: bool,
    symbol_registry: FxHashMap<Symbol, JsSymbol>,
    /// Host-bridge state: registry reference, type wrappers, wrap factory,
    /// wrapper cache.
    pub host: hostbridge::HostContextState,
}

impl Vm {
    pub fn new(params: VmParams) -> Self {
        cinder_log::debug!("create vm");
        let interner = StringInterner::new();
        let statics = Box::new(Statics::new());
        let global = Handle::from_object(NamedObject::with_prototype(statics.object_prototype.clone()));

        Self {
            interner,
            statics,
            global,
            params,
            call_stack: Vec::new(),
            terminated: false,
            symbol_registry: FxHashMap::default(),
            host: hostbridge::HostContextState::default(),
        }
    }

    pub fn scope(&mut self) -> LocalScope<'_> {
        scope(self)
    }

    pub fn global(&self) -> Handle {
        self.global.clone()
    }

    pub fn set_global(&mut self, global: Handle) {
        self.global = global;
    }

    /// Populates the global scope with the standard built-ins and returns
    /// it.
    pub fn init_standard_objects(&mut self) -> Handle {
        {
            let mut sc = self.scope();
            js_std::init(&mut sc);
        }
        self.global()
    }

    pub fn params(&self) -> &VmParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut VmParams {
        &mut self.params
    }

    pub fn should_interrupt(&self) -> bool {
        self.params.interrupt_callback().is_some_and(|hook| hook())
    }

    pub fn console_emit(&self, level: ConsoleLevel, message: &str) {
        match self.params.console_callback() {
            Some(sink) => sink(level, message),
            None => println!("{message}"),
        }
    }

    // --- activation stack ---

    pub(crate) fn push_activation(&mut self, record: ActivationRecord) {
        self.call_stack.push(record);
    }

    pub(crate) fn pop_activation(&mut self) {
        self.call_stack.pop();
    }

    pub(crate) fn call_depth(&self) -> usize {
        self.call_stack.len()
    }

    pub(crate) fn set_current_line(&mut self, line: u32) {
        if let Some(top) = self.call_stack.last_mut() {
            top.line = line;
        }
    }

    /// Captures the script stack, top frame first, honoring the trace limit
    /// and the hide-below-function filter.
    pub fn capture_stack(&self) -> Vec<StackFrame> {
        let base = self.params.stack_trace_base();
        let mut frames = Vec::new();

        for record in self.call_stack.iter().rev() {
            if frames.len() >= self.params.stack_trace_limit() {
                break;
            }
            frames.push(StackFrame {
                function_name: record.function_name.clone(),
                source_name: record.source_name.clone(),
                line: record.line,
            });
            if let (Some(base), Some(name)) = (base, record.function_name.as_deref()) {
                if base == name {
                    break;
                }
            }
        }

        frames
    }

    /// The source name and line of the innermost activation.
    pub fn current_position(&self) -> Option<(Rc<str>, u32)> {
        self.call_stack
            .last()
            .map(|record| (record.source_name.clone(), record.line))
    }

    // --- termination plumbing ---

    pub(crate) fn set_terminated(&mut self) {
        self.terminated = true;
    }

    pub(crate) fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub(crate) fn clear_terminated(&mut self) {
        self.terminated = false;
    }

    // --- symbol registry (`Symbol.for`) ---

    pub fn symbol_for(&mut self, key: Symbol) -> JsSymbol {
        if let Some(existing) = self.symbol_registry.get(&key) {
            return existing.clone();
        }
        let symbol = JsSymbol::new(Some(key.into()));
        self.symbol_registry.insert(key, symbol.clone());
        symbol
    }

    // --- evaluation ---

    pub fn compile(
        &mut self,
        source: &str,
        source_name: &str,
        start_line: u32,
    ) -> Result<Rc<CompiledScript>, Vec<cinder_middle::parser::error::Error>> {
        CompiledScript::compile(&mut self.interner, source, source_name, start_line).map(Rc::new)
    }

    /// Parses and runs; returns the completion value.
    pub fn eval(&mut self, source: &str, source_name: &str, start_line: u32) -> Result<Value, EvalError> {
        let script = self
            .compile(source, source_name, start_line)
            .map_err(EvalError::Middle)?;
        self.execute_script(&script)
    }

    pub fn execute_script(&mut self, script: &Rc<CompiledScript>) -> Result<Value, EvalError> {
        self.clear_terminated();
        let result = {
            let mut sc = self.scope();
            eval::execute(&mut sc, script)
        };
        match result {
            Ok(value) => Ok(value),
            Err(eval::Unwind::Throw(value)) => Err(EvalError::Exception(value)),
            Err(eval::Unwind::Terminated) => {
                self.clear_terminated();
                self.call_stack.clear();
                Err(EvalError::Terminated)
            }
        }
    }
}
