use std::any::Any;

/// Queried before each statement; returning `true` terminates the script
/// with an uncatchable error.
pub type InterruptCallback = Box<dyn Fn() -> bool>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Debug,
    Log,
    Info,
    Warn,
    Error,
}

/// Receives script `console` output.
pub type ConsoleCallback = Box<dyn Fn(ConsoleLevel, &str)>;

/// Embedder-tunable knobs for a context.
pub struct VmParams {
    interrupt_callback: Option<InterruptCallback>,
    console_callback: Option<ConsoleCallback>,
    /// Maximum number of frames captured into error stacks.
    stack_trace_limit: usize,
    /// When set, stack frames below (and including) a function of this name
    /// are hidden from captured stacks.
    stack_trace_base: Option<String>,
    state: Option<Box<dyn Any>>,
}

impl Default for VmParams {
    fn default() -> Self {
        Self {
            interrupt_callback: None,
            console_callback: None,
            stack_trace_limit: 64,
            stack_trace_base: None,
            state: None,
        }
    }
}

impl VmParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_interrupt_callback(mut self, callback: InterruptCallback) -> Self {
        self.interrupt_callback = Some(callback);
        self
    }

    pub fn interrupt_callback(&self) -> Option<&InterruptCallback> {
        self.interrupt_callback.as_ref()
    }

    pub fn set_console_callback(mut self, callback: ConsoleCallback) -> Self {
        self.console_callback = Some(callback);
        self
    }

    pub fn console_callback(&self) -> Option<&ConsoleCallback> {
        self.console_callback.as_ref()
    }

    pub fn set_stack_trace_limit(mut self, limit: usize) -> Self {
        self.stack_trace_limit = limit;
        self
    }

    pub fn stack_trace_limit(&self) -> usize {
        self.stack_trace_limit
    }

    pub fn set_stack_trace_base(mut self, function_name: String) -> Self {
        self.stack_trace_base = Some(function_name);
        self
    }

    pub fn stack_trace_base(&self) -> Option<&str> {
        self.stack_trace_base.as_deref()
    }

    pub fn set_state(mut self, state: Box<dyn Any>) -> Self {
        self.state = Some(state);
        self
    }

    pub fn state<T: 'static>(&self) -> Option<&T> {
        self.state.as_ref().and_then(|s| s.downcast_ref::<T>())
    }
}
