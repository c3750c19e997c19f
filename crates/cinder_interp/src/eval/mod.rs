use std::rc::Rc;

use cinder_middle::interner::{StringInterner, Symbol};
use cinder_middle::parser::error::Error as MiddleError;
use cinder_middle::parser::scope::{ScopeId, ScopeTree};
use cinder_middle::parser::statement::{
    Catch, ForBinding, FunctionDeclaration, Loop, Statement, StatementKind, TryCatch,
    VariableDeclarationKind,
};
use cinder_middle::sourcemap::{LineTable, Span};
use cinder_parser::Parser;

use crate::frame::{Frame, Slot};
use crate::localscope::LocalScope;
use crate::value::error::{Error, ErrorKind};
use crate::value::function::{Closure, Function, FunctionKind};
use crate::value::iterator;
use crate::value::object::{Handle, Object, PropertyKey};
use crate::value::ops::conversions::ValueConversion;
use crate::value::ops::equality::strict_eq;
use crate::value::string::JsString;
use crate::value::Value;
use crate::{ActivationRecord, MAX_CALL_STACK_DEPTH};

mod exprs;
mod pattern;

pub(crate) use exprs::eval_expr;
pub(crate) use pattern::{bind_pattern, BindMode};

/// A parsed, analysis-complete script ready for execution (and reuse).
#[derive(Debug)]
pub struct CompiledScript {
    pub statements: Vec<Statement>,
    pub scopes: ScopeTree,
    pub root_scope: ScopeId,
    pub source: Rc<str>,
    pub source_name: Rc<str>,
    pub lines: LineTable,
    pub start_line: u32,
}

impl CompiledScript {
    pub fn compile(
        interner: &mut StringInterner,
        source: &str,
        source_name: &str,
        start_line: u32,
    ) -> Result<Self, Vec<MiddleError>> {
        let span = cinder_log::span!(cinder_log::Level::DEBUG, "compile script");
        let _guard = span.entered();

        let parser = Parser::new_from_str(interner, source)?;
        let program = parser.parse_all()?;

        Ok(Self {
            statements: program.statements,
            scopes: program.scopes,
            root_scope: program.root_scope,
            source: Rc::from(source),
            source_name: Rc::from(source_name),
            lines: LineTable::new(source),
            start_line,
        })
    }

    /// The 1-based line of a span start, adjusted for the embedder's
    /// starting line.
    pub fn line_of(&self, span: Span) -> u32 {
        self.lines.line_of(span.lo) + self.start_line.saturating_sub(1)
    }
}

/// How a statement finished. Non-local exits are completions that enclosing
/// constructs absorb or re-raise.
#[derive(Debug, Clone)]
pub enum Completion {
    /// Ran to the end; expression statements carry their value.
    Normal(Option<Value>),
    Return(Value),
    Break(Option<Symbol>),
    Continue(Option<Symbol>),
}

/// The error channel of evaluation.
#[derive(Debug)]
pub enum Unwind {
    /// A script-catchable exception.
    Throw(Value),
    /// The interrupt hook fired; passes through `catch` untouched.
    Terminated,
}

pub(crate) type StepResult = Result<Completion, Unwind>;

/// Shared state for one script's evaluation.
pub(crate) struct Ctx {
    pub script: Rc<CompiledScript>,
}

/// Converts an `Err` from the object layer into an unwind, re-raising a
/// pending termination that crossed a host boundary.
pub(crate) fn throw_unwind(sc: &LocalScope<'_>, err: Value) -> Unwind {
    if sc.is_terminated() {
        Unwind::Terminated
    } else {
        Unwind::Throw(err)
    }
}

pub(crate) fn throw_error(sc: &mut LocalScope<'_>, kind: ErrorKind, message: String) -> Unwind {
    Unwind::Throw(Error::create(sc, kind, message))
}

/// Runs a top-level script in the global scope and returns its completion
/// value.
pub fn execute(sc: &mut LocalScope<'_>, script: &Rc<CompiledScript>) -> Result<Value, Unwind> {
    let this = Value::Object(sc.global());
    let frame = Frame::new_script(&script.scopes, script.root_scope, this);
    let cx = Ctx {
        script: script.clone(),
    };

    sc.push_activation(ActivationRecord {
        function_name: None,
        source_name: script.source_name.clone(),
        line: script.start_line,
    });

    let result = (|| {
        hoist_functions(sc, &cx, &frame, &script.statements)?;

        let mut last = Value::undefined();
        for statement in &script.statements {
            if let Completion::Normal(Some(value)) = eval_statement(sc, &cx, &frame, statement)? {
                last = value;
            }
        }
        Ok(last)
    })();

    sc.pop_activation();
    result
}

/// Calls a script function: sets up the activation, binds parameters, runs
/// the body. This is the bridge from the object layer back into the tree
/// walker.
pub fn invoke_closure(
    sc: &mut LocalScope<'_>,
    closure: &Rc<Closure>,
    this: Value,
    args: Vec<Value>,
) -> Result<Value, Value> {
    if sc.call_depth() >= MAX_CALL_STACK_DEPTH {
        crate::throw!(sc, RangeError, "Maximum call stack size exceeded");
    }

    let cx = Ctx {
        script: closure.script.clone(),
    };
    let decl = &closure.decl;

    // Arrows have no `this` of their own; normal functions coerce a nullish
    // receiver to the global object (non-strict semantics).
    let this_binding = match decl.kind {
        cinder_middle::parser::statement::FunctionKind::Arrow => None,
        cinder_middle::parser::statement::FunctionKind::Function => Some(match this {
            Value::Undefined | Value::Null => Value::Object(sc.global()),
            other => other,
        }),
    };

    let function_name = decl.name.map(|name| sc.resolve_rc(name));
    sc.push_activation(ActivationRecord {
        function_name,
        source_name: cx.script.source_name.clone(),
        line: cx.script.line_of(decl.span),
    });

    let frame = Frame::new_function(
        &cx.script.scopes,
        decl.scope,
        closure.environment.clone(),
        this_binding,
        decl.name,
    );

    let result = (|| -> Result<Value, Unwind> {
        bind_parameters(sc, &cx, &frame, decl, &args)?;
        hoist_functions(sc, &cx, &frame, &decl.statements)?;

        for statement in &decl.statements {
            match eval_statement(sc, &cx, &frame, statement)? {
                Completion::Return(value) => return Ok(value),
                Completion::Normal(_) => {}
                // The parser rejects top-level break/continue in functions.
                Completion::Break(_) | Completion::Continue(_) => break,
            }
        }
        Ok(Value::undefined())
    })();

    sc.pop_activation();

    match result {
        Ok(value) => Ok(value),
        Err(Unwind::Throw(value)) => Err(value),
        Err(Unwind::Terminated) => {
            // Termination is not a script value; flag it so the next
            // evaluator frame re-raises.
            sc.set_terminated();
            Err(Value::undefined())
        }
    }
}

fn bind_parameters(
    sc: &mut LocalScope<'_>,
    cx: &Ctx,
    frame: &Rc<Frame>,
    decl: &FunctionDeclaration,
    args: &[Value],
) -> Result<(), Unwind> {
    for (index, parameter) in decl.parameters.iter().enumerate() {
        let value = if parameter.rest {
            let rest: Vec<Value> = args.get(index..).map(|s| s.to_vec()).unwrap_or_default();
            let array = crate::value::array::Array::with_items(sc, rest);
            Value::Object(sc.register(array))
        } else {
            let arg = args.get(index).cloned().unwrap_or(Value::Undefined);
            match (&arg, &parameter.default) {
                (Value::Undefined, Some(default)) => eval_expr(sc, cx, frame, default)?,
                _ => arg,
            }
        };

        bind_pattern(sc, cx, frame, &parameter.pattern, value, BindMode::Init)?;
    }
    Ok(())
}

/// Creates the function object for a declaration or expression.
pub(crate) fn create_closure(
    sc: &mut LocalScope<'_>,
    cx: &Ctx,
    frame: &Rc<Frame>,
    decl: &Rc<FunctionDeclaration>,
) -> Value {
    let closure = Rc::new(Closure {
        script: cx.script.clone(),
        decl: decl.clone(),
        environment: frame.clone(),
    });
    let name: Option<JsString> = decl.name.map(Into::into);
    let function = Function::new(sc, name, FunctionKind::Closure(closure));
    Value::Object(sc.register(function))
}

/// Function declarations hoist with their initializer: bind them before any
/// statement of the scope runs.
pub(crate) fn hoist_functions(
    sc: &mut LocalScope<'_>,
    cx: &Ctx,
    frame: &Rc<Frame>,
    statements: &[Statement],
) -> Result<(), Unwind> {
    for statement in statements {
        if let StatementKind::Function(decl) = &statement.kind {
            let function = create_closure(sc, cx, frame, decl);
            if let Some(name) = decl.name {
                init_binding(sc, cx, frame, name, function)?;
            }
        }
    }
    Ok(())
}

// --- name resolution through the frame chain ---

pub(crate) fn load_name(
    sc: &mut LocalScope<'_>,
    cx: &Ctx,
    frame: &Rc<Frame>,
    name: Symbol,
    for_typeof: bool,
) -> Result<Value, Unwind> {
    let mut current = frame.clone();
    loop {
        if let Some(object) = &current.with_object {
            let key = PropertyKey::String(name.into());
            let found = object
                .get_property_descriptor(sc, key.clone())
                .map_err(|e| throw_unwind(sc, e))?;
            if found.is_some() {
                return object.get_property(sc, key).map_err(|e| throw_unwind(sc, e));
            }
        } else if let Some(symbol) = cx.script.scopes[current.scope].lookup(name) {
            return match current.get_slot(symbol.index) {
                Slot::Uninitialized => Err(throw_error(
                    sc,
                    ErrorKind::ReferenceError,
                    format!("Cannot access '{}' before initialization", sc.resolve(name)),
                )),
                Slot::Value(value) => Ok(value),
            };
        }

        match &current.parent {
            Some(parent) => current = parent.clone(),
            None => break,
        }
    }

    // Fall off the frame chain into the global object.
    let global = sc.global();
    let key = PropertyKey::String(name.into());
    let found = global
        .get_property_descriptor(sc, key.clone())
        .map_err(|e| throw_unwind(sc, e))?;
    match found {
        Some(_) => global.get_property(sc, key).map_err(|e| throw_unwind(sc, e)),
        None if for_typeof => Ok(Value::undefined()),
        None => Err(throw_error(
            sc,
            ErrorKind::ReferenceError,
            format!("\"{}\" is not defined", sc.resolve(name)),
        )),
    }
}

pub(crate) fn store_name(
    sc: &mut LocalScope<'_>,
    cx: &Ctx,
    frame: &Rc<Frame>,
    name: Symbol,
    value: Value,
) -> Result<(), Unwind> {
    let mut current = frame.clone();
    loop {
        if let Some(object) = &current.with_object {
            let key = PropertyKey::String(name.into());
            let found = object
                .get_property_descriptor(sc, key.clone())
                .map_err(|e| throw_unwind(sc, e))?;
            if found.is_some() {
                return object
                    .set_property(sc, key, crate::value::object::PropertyValue::static_default(value))
                    .map_err(|e| throw_unwind(sc, e));
            }
        } else if let Some(symbol) = cx.script.scopes[current.scope].lookup(name) {
            use cinder_middle::parser::scope::DeclKind;
            match current.get_slot(symbol.index) {
                Slot::Uninitialized => {
                    return Err(throw_error(
                        sc,
                        ErrorKind::ReferenceError,
                        format!("Cannot access '{}' before initialization", sc.resolve(name)),
                    ))
                }
                Slot::Value(_) if symbol.decl == DeclKind::Const => {
                    return Err(throw_error(
                        sc,
                        ErrorKind::TypeError,
                        "Assignment to constant variable".into(),
                    ))
                }
                Slot::Value(_) => {
                    current.set_slot(symbol.index, value);
                    return Ok(());
                }
            }
        }

        match &current.parent {
            Some(parent) => current = parent.clone(),
            None => break,
        }
    }

    // Assignment to an undeclared name creates a global property.
    let global = sc.global();
    global
        .set_property(
            sc,
            PropertyKey::String(name.into()),
            crate::value::object::PropertyValue::static_default(value),
        )
        .map_err(|e| throw_unwind(sc, e))
}

/// Initializes a declared binding (declaration execution, parameters,
/// hoisted functions). Unlike `store_name`, this clears the TDZ and may
/// write `const` slots.
pub(crate) fn init_binding(
    sc: &mut LocalScope<'_>,
    cx: &Ctx,
    frame: &Rc<Frame>,
    name: Symbol,
    value: Value,
) -> Result<(), Unwind> {
    let mut current = frame.clone();
    loop {
        if current.with_object.is_none() {
            if let Some(symbol) = cx.script.scopes[current.scope].lookup(name) {
                current.set_slot(symbol.index, value);
                return Ok(());
            }
        }
        match &current.parent {
            Some(parent) => current = parent.clone(),
            None => break,
        }
    }

    // Script-level `var` in a dynamic scope ends up on the global object.
    let global = sc.global();
    global
        .set_property(
            sc,
            PropertyKey::String(name.into()),
            crate::value::object::PropertyValue::static_default(value),
        )
        .map_err(|e| throw_unwind(sc, e))
}

// --- statements ---

pub(crate) fn eval_statement(sc: &mut LocalScope<'_>, cx: &Ctx, frame: &Rc<Frame>, statement: &Statement) -> StepResult {
    sc.set_current_line(cx.script.line_of(statement.span));
    if sc.should_interrupt() {
        return Err(Unwind::Terminated);
    }

    match &statement.kind {
        StatementKind::Expression(expr) => {
            let value = eval_expr(sc, cx, frame, expr)?;
            Ok(Completion::Normal(Some(value)))
        }
        StatementKind::Variable(decls) => {
            for decl in &decls.0 {
                let value = match &decl.value {
                    Some(expr) => Some(eval_expr(sc, cx, frame, expr)?),
                    None => None,
                };
                match (&decl.binding.kind, value) {
                    // `var x;` without initializer leaves the hoisted
                    // `undefined` in place.
                    (VariableDeclarationKind::Var, None) => {}
                    (_, value) => {
                        bind_pattern(
                            sc,
                            cx,
                            frame,
                            &decl.binding.pattern,
                            value.unwrap_or(Value::Undefined),
                            BindMode::Init,
                        )?;
                    }
                }
            }
            Ok(Completion::Normal(None))
        }
        StatementKind::Block(block) => {
            let block_frame = Frame::new_block(&cx.script.scopes, block.scope, frame.clone());
            eval_statement_list(sc, cx, &block_frame, &block.statements)
        }
        StatementKind::Function(_) => Ok(Completion::Normal(None)), // bound during hoisting
        StatementKind::If(stmt) => {
            let condition = eval_expr(sc, cx, frame, &stmt.condition)?;
            if condition.to_boolean(sc).map_err(|e| throw_unwind(sc, e))? {
                eval_statement(sc, cx, frame, &stmt.then)
            } else if let Some(el) = &stmt.el {
                eval_statement(sc, cx, frame, el)
            } else {
                Ok(Completion::Normal(None))
            }
        }
        StatementKind::Loop(l) => eval_loop(sc, cx, frame, l, &[]),
        StatementKind::Return(ret) => {
            let value = match &ret.0 {
                Some(expr) => eval_expr(sc, cx, frame, expr)?,
                None => Value::undefined(),
            };
            Ok(Completion::Return(value))
        }
        StatementKind::Try(t) => eval_try(sc, cx, frame, t),
        StatementKind::Throw(expr) => {
            let value = eval_expr(sc, cx, frame, expr)?;
            Err(Unwind::Throw(value))
        }
        StatementKind::Break(label) => Ok(Completion::Break(*label)),
        StatementKind::Continue(label) => Ok(Completion::Continue(*label)),
        StatementKind::Labelled(labelled) => {
            let mut labels = vec![labelled.label];
            let mut body: &Statement = &labelled.body;
            while let StatementKind::Labelled(inner) = &body.kind {
                labels.push(inner.label);
                body = &inner.body;
            }

            if let StatementKind::Loop(l) = &body.kind {
                return eval_loop(sc, cx, frame, l, &labels);
            }

            match eval_statement(sc, cx, frame, body)? {
                Completion::Break(Some(target)) if labels.contains(&target) => Ok(Completion::Normal(None)),
                other => Ok(other),
            }
        }
        StatementKind::Switch(switch) => {
            let discriminant = eval_expr(sc, cx, frame, &switch.expr)?;
            let switch_frame = Frame::new_block(&cx.script.scopes, switch.scope, frame.clone());

            // Find the matching case (or the default clause).
            let mut start = None;
            for (index, case) in switch.cases.iter().enumerate() {
                if let Some(test) = &case.value {
                    let test = eval_expr(sc, cx, &switch_frame, test)?;
                    if strict_eq(&discriminant, &test) {
                        start = Some(index);
                        break;
                    }
                }
            }
            let start = start.or_else(|| switch.cases.iter().position(|case| case.value.is_none()));

            if let Some(start) = start {
                for case in &switch.cases[start..] {
                    match eval_statement_list(sc, cx, &switch_frame, &case.body)? {
                        Completion::Break(None) => return Ok(Completion::Normal(None)),
                        Completion::Normal(_) => {}
                        other => return Ok(other),
                    }
                }
            }
            Ok(Completion::Normal(None))
        }
        StatementKind::With(with) => {
            let object = eval_expr(sc, cx, frame, &with.object)?;
            let object = object.to_object(sc).map_err(|e| throw_unwind(sc, e))?;
            let with_frame = Frame::new_with(frame.clone(), object);
            eval_statement(sc, cx, &with_frame, &with.body)
        }
        StatementKind::Debugger => Ok(Completion::Normal(None)),
        StatementKind::Empty => Ok(Completion::Normal(None)),
    }
}

fn eval_statement_list(
    sc: &mut LocalScope<'_>,
    cx: &Ctx,
    frame: &Rc<Frame>,
    statements: &[Statement],
) -> StepResult {
    hoist_functions(sc, cx, frame, statements)?;
    let mut last = None;
    for statement in statements {
        match eval_statement(sc, cx, frame, statement)? {
            Completion::Normal(value) => {
                if value.is_some() {
                    last = value;
                }
            }
            abrupt => return Ok(abrupt),
        }
    }
    Ok(Completion::Normal(last))
}

/// What a loop body's completion means for the loop.
enum LoopFlow {
    Continue,
    Break,
    Propagate(Completion),
}

fn loop_flow(completion: Completion, labels: &[Symbol]) -> LoopFlow {
    match completion {
        Completion::Normal(_) => LoopFlow::Continue,
        Completion::Continue(None) => LoopFlow::Continue,
        Completion::Continue(Some(label)) if labels.contains(&label) => LoopFlow::Continue,
        Completion::Break(None) => LoopFlow::Break,
        Completion::Break(Some(label)) if labels.contains(&label) => LoopFlow::Break,
        other => LoopFlow::Propagate(other),
    }
}

fn eval_loop(sc: &mut LocalScope<'_>, cx: &Ctx, frame: &Rc<Frame>, l: &Loop, labels: &[Symbol]) -> StepResult {
    match l {
        Loop::While(w) => loop {
            if sc.should_interrupt() {
                return Err(Unwind::Terminated);
            }
            let condition = eval_expr(sc, cx, frame, &w.condition)?;
            if !condition.to_boolean(sc).map_err(|e| throw_unwind(sc, e))? {
                return Ok(Completion::Normal(None));
            }
            match loop_flow(eval_statement(sc, cx, frame, &w.body)?, labels) {
                LoopFlow::Continue => {}
                LoopFlow::Break => return Ok(Completion::Normal(None)),
                LoopFlow::Propagate(completion) => return Ok(completion),
            }
        },
        Loop::DoWhile(w) => loop {
            if sc.should_interrupt() {
                return Err(Unwind::Terminated);
            }
            match loop_flow(eval_statement(sc, cx, frame, &w.body)?, labels) {
                LoopFlow::Continue => {}
                LoopFlow::Break => return Ok(Completion::Normal(None)),
                LoopFlow::Propagate(completion) => return Ok(completion),
            }
            let condition = eval_expr(sc, cx, frame, &w.condition)?;
            if !condition.to_boolean(sc).map_err(|e| throw_unwind(sc, e))? {
                return Ok(Completion::Normal(None));
            }
        },
        Loop::For(f) => {
            let head_frame = Frame::new_block(&cx.script.scopes, f.scope, frame.clone());

            if let Some(init) = &f.init {
                match eval_statement(sc, cx, &head_frame, init)? {
                    Completion::Normal(_) => {}
                    abrupt => return Ok(abrupt),
                }
            }

            loop {
                if sc.should_interrupt() {
                    return Err(Unwind::Terminated);
                }

                if let Some(condition) = &f.condition {
                    let condition = eval_expr(sc, cx, &head_frame, condition)?;
                    if !condition.to_boolean(sc).map_err(|e| throw_unwind(sc, e))? {
                        return Ok(Completion::Normal(None));
                    }
                }

                match loop_flow(eval_statement(sc, cx, &head_frame, &f.body)?, labels) {
                    LoopFlow::Continue => {}
                    LoopFlow::Break => return Ok(Completion::Normal(None)),
                    LoopFlow::Propagate(completion) => return Ok(completion),
                }

                if let Some(update) = &f.finalizer {
                    eval_expr(sc, cx, &head_frame, update)?;
                }
            }
        }
        Loop::ForIn(f) => {
            let object = eval_expr(sc, cx, frame, &f.object)?;
            if object.is_nullish() {
                return Ok(Completion::Normal(None));
            }
            let object = object.to_object(sc).map_err(|e| throw_unwind(sc, e))?;
            let keys = enumerable_string_keys(sc, &object).map_err(|e| throw_unwind(sc, e))?;

            for key in keys {
                if sc.should_interrupt() {
                    return Err(Unwind::Terminated);
                }

                let iter_frame = Frame::new_block(&cx.script.scopes, f.scope, frame.clone());
                bind_for_target(sc, cx, &iter_frame, &f.binding, key)?;

                match loop_flow(eval_statement(sc, cx, &iter_frame, &f.body)?, labels) {
                    LoopFlow::Continue => {}
                    LoopFlow::Break => return Ok(Completion::Normal(None)),
                    LoopFlow::Propagate(completion) => return Ok(completion),
                }
            }
            Ok(Completion::Normal(None))
        }
        Loop::ForOf(f) => {
            let iterable = eval_expr(sc, cx, frame, &f.iterable)?;
            let iter = iterator::get_iterator(sc, &iterable).map_err(|e| throw_unwind(sc, e))?;

            loop {
                if sc.should_interrupt() {
                    iterator::iterator_close(sc, &iter);
                    return Err(Unwind::Terminated);
                }

                let (value, done) = iterator::iterator_next(sc, &iter).map_err(|e| throw_unwind(sc, e))?;
                if done {
                    return Ok(Completion::Normal(None));
                }

                let iter_frame = Frame::new_block(&cx.script.scopes, f.scope, frame.clone());
                if let Err(err) = bind_for_target(sc, cx, &iter_frame, &f.binding, value) {
                    iterator::iterator_close(sc, &iter);
                    return Err(err);
                }

                let body = eval_statement(sc, cx, &iter_frame, &f.body);
                let body = match body {
                    Ok(completion) => completion,
                    Err(err) => {
                        iterator::iterator_close(sc, &iter);
                        return Err(err);
                    }
                };

                match loop_flow(body, labels) {
                    LoopFlow::Continue => {}
                    LoopFlow::Break => {
                        iterator::iterator_close(sc, &iter);
                        return Ok(Completion::Normal(None));
                    }
                    LoopFlow::Propagate(completion) => {
                        iterator::iterator_close(sc, &iter);
                        return Ok(completion);
                    }
                }
            }
        }
    }
}

/// Binds one iteration value of a `for…in`/`for…of` head.
fn bind_for_target(
    sc: &mut LocalScope<'_>,
    cx: &Ctx,
    frame: &Rc<Frame>,
    binding: &ForBinding,
    value: Value,
) -> Result<(), Unwind> {
    match binding {
        ForBinding::Declaration(decl) => bind_pattern(sc, cx, frame, &decl.pattern, value, BindMode::Init),
        ForBinding::Assignment(target) => exprs::assign_target(sc, cx, frame, target, value),
    }
}

/// The own enumerable string keys of an object, in insertion order,
/// snapshot before iteration begins.
fn enumerable_string_keys(sc: &mut LocalScope<'_>, object: &Handle) -> Result<Vec<Value>, Value> {
    let keys = object.own_keys(sc)?;
    let mut out = Vec::with_capacity(keys.len());
    for key in keys {
        if let Value::String(_) = key {
            let pk = PropertyKey::from_value(sc, key.clone())?;
            if let Some(desc) = object.get_own_property_descriptor(sc, pk)? {
                if desc
                    .descriptor
                    .contains(crate::value::object::PropertyDataDescriptor::ENUMERABLE)
                {
                    out.push(key);
                }
            }
        }
    }
    Ok(out)
}

fn eval_try(sc: &mut LocalScope<'_>, cx: &Ctx, frame: &Rc<Frame>, t: &TryCatch) -> StepResult {
    let mut result = eval_statement(sc, cx, frame, &t.body);

    // `catch` sees script throws only; termination passes through.
    if let Err(Unwind::Throw(exception)) = &result {
        if let Some(catch) = &t.catch {
            let exception = exception.clone();
            result = eval_catch(sc, cx, frame, catch, exception);
        }
    }

    if let Some(finally) = &t.finally {
        // `finally` runs on every path; an abrupt completion from it
        // overrides whatever was pending.
        match eval_statement(sc, cx, frame, finally) {
            Ok(Completion::Normal(_)) => {}
            other => result = other,
        }
    }

    result
}

fn eval_catch(sc: &mut LocalScope<'_>, cx: &Ctx, frame: &Rc<Frame>, catch: &Catch, exception: Value) -> StepResult {
    let catch_frame = Frame::new_block(&cx.script.scopes, catch.scope, frame.clone());

    if let Some(pattern) = &catch.binding {
        bind_pattern(sc, cx, &catch_frame, pattern, exception, BindMode::Init)?;
    }

    // The catch body block shares the catch scope; run its statements in
    // the frame that holds the binding.
    match &catch.body.kind {
        StatementKind::Block(block) => eval_statement_list(sc, cx, &catch_frame, &block.statements),
        _ => eval_statement(sc, cx, &catch_frame, &catch.body),
    }
}
