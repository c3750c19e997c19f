use std::rc::Rc;

use cinder_interp::value::error::{Error as ErrorObject, ErrorKind, StackFrame};
use cinder_interp::value::ops::conversions::ValueConversion;
use cinder_interp::value::Value;
use cinder_interp::{EvalError, Vm};

/// The embedder-facing error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptErrorKind {
    Syntax,
    Type,
    Reference,
    Range,
    Uri,
    Eval,
    /// An engine self-check failed.
    Evaluator,
    /// A host exception that crossed a bridged call.
    Wrapped,
    /// A plain `Error` (or non-error thrown value).
    Error,
    /// The interrupt hook stopped the script.
    Terminated,
}

impl From<ErrorKind> for ScriptErrorKind {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::SyntaxError => ScriptErrorKind::Syntax,
            ErrorKind::TypeError => ScriptErrorKind::Type,
            ErrorKind::ReferenceError => ScriptErrorKind::Reference,
            ErrorKind::RangeError => ScriptErrorKind::Range,
            ErrorKind::URIError => ScriptErrorKind::Uri,
            ErrorKind::EvalError => ScriptErrorKind::Eval,
            ErrorKind::EvaluatorError => ScriptErrorKind::Evaluator,
            ErrorKind::WrappedError => ScriptErrorKind::Wrapped,
            ErrorKind::Error => ScriptErrorKind::Error,
        }
    }
}

/// A structured script failure: kind, message, source position, and the
/// captured script stack (not the host stack).
#[derive(Debug, thiserror::Error)]
#[error("{rendered}")]
pub struct ScriptError {
    kind: ScriptErrorKind,
    message: String,
    source_name: Option<String>,
    line_number: Option<u32>,
    column_number: Option<u32>,
    line_source: Option<String>,
    stack: Vec<StackFrame>,
    /// `"<details> (<source>#<line>)"`, precomputed.
    rendered: String,
    /// The original thrown value, when one exists.
    thrown: Option<Value>,
}

impl ScriptError {
    pub fn kind(&self) -> ScriptErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    pub fn line_number(&self) -> Option<u32> {
        self.line_number
    }

    pub fn column_number(&self) -> Option<u32> {
        self.column_number
    }

    pub fn line_source(&self) -> Option<&str> {
        self.line_source.as_deref()
    }

    pub fn script_stack(&self) -> &[StackFrame] {
        &self.stack
    }

    pub fn thrown_value(&self) -> Option<&Value> {
        self.thrown.as_ref()
    }

    /// Renders the script stack, one `\tat …` line per frame.
    pub fn stack_trace(&self) -> String {
        let mut out = self.rendered.clone();
        for frame in &self.stack {
            out.push('\n');
            frame.render(&mut out);
        }
        out
    }

    fn render(message: &str, source_name: Option<&str>, line: Option<u32>) -> String {
        match (source_name, line) {
            (Some(source), Some(line)) => format!("{message} ({source}#{line})"),
            _ => message.to_string(),
        }
    }

    /// Builds the syntax-error form from reported parse errors.
    pub(crate) fn from_parse_errors(
        errors: Vec<cinder_middle::parser::error::Error>,
        source: &str,
        source_name: &str,
        start_line: u32,
    ) -> Self {
        let lines = cinder_middle::sourcemap::LineTable::new(source);
        let first = errors.first();

        let (message, line, column, line_source) = match first {
            Some(error) => {
                let span = error.span();
                let line = lines.line_of(span.lo) + start_line.saturating_sub(1);
                let column = lines.column_of(span.lo);
                let line_source = lines
                    .line_source(source, lines.line_of(span.lo))
                    .map(str::to_owned);
                (error.to_string(), Some(line), Some(column), line_source)
            }
            None => ("syntax error".to_string(), None, None, None),
        };

        let rendered = Self::render(&message, Some(source_name), line);
        Self {
            kind: ScriptErrorKind::Syntax,
            message,
            source_name: Some(source_name.to_string()),
            line_number: line,
            column_number: column,
            line_source,
            stack: Vec::new(),
            rendered,
            thrown: None,
        }
    }

    pub(crate) fn from_eval_error(vm: &mut Vm, error: EvalError, source: &str, source_name: &str, start_line: u32) -> Self {
        match error {
            EvalError::Middle(errors) => Self::from_parse_errors(errors, source, source_name, start_line),
            EvalError::Terminated => Self {
                kind: ScriptErrorKind::Terminated,
                message: "script execution terminated".into(),
                source_name: Some(source_name.to_string()),
                line_number: None,
                column_number: None,
                line_source: None,
                stack: Vec::new(),
                rendered: "script execution terminated".into(),
                thrown: None,
            },
            EvalError::Exception(value) => Self::from_thrown_value(vm, value),
        }
    }

    pub(crate) fn from_thrown_value(vm: &mut Vm, value: Value) -> Self {
        if let Some(error) = value.downcast_ref::<ErrorObject>() {
            let (source_name, line_number): (Option<Rc<str>>, Option<u32>) = match &error.position {
                Some((source, line)) => (Some(source.clone()), Some(*line)),
                None => (None, None),
            };
            let message = format!("{}: {}", error.kind.name(), error.message);
            let rendered = Self::render(&message, source_name.as_deref(), line_number);
            return Self {
                kind: error.kind.into(),
                message,
                source_name: source_name.map(|s| s.to_string()),
                line_number,
                column_number: None,
                line_source: None,
                stack: error.stack.clone(),
                rendered,
                thrown: Some(value.clone()),
            };
        }

        // A non-error value was thrown; stringify it for the message.
        let message = {
            let mut sc = vm.scope();
            match value.to_js_string(&mut sc) {
                Ok(s) => s.to_rc(&sc).to_string(),
                Err(_) => "uncaught exception".to_string(),
            }
        };
        Self {
            kind: ScriptErrorKind::Error,
            message: message.clone(),
            source_name: None,
            line_number: None,
            column_number: None,
            line_source: None,
            stack: Vec::new(),
            rendered: message,
            thrown: Some(value),
        }
    }
}
