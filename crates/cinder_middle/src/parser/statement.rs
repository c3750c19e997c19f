use std::fmt;
use std::rc::Rc;

use derive_more::Display;

use crate::interner::Symbol;
use crate::sourcemap::Span;

use super::expr::Expr;
use super::scope::ScopeId;

/// Formats a list of displayable items, separated by `delim`.
pub fn fmt_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, list: &[T], delim: &str) -> fmt::Result {
    for (i, item) in list.iter().enumerate() {
        if i > 0 {
            write!(f, "{delim} ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

#[derive(Debug, Clone, Display)]
#[display(fmt = "{kind}")]
pub struct Statement {
    pub kind: StatementKind,
    pub span: Span,
}

/// A parsed statement
#[derive(Debug, Clone, Display)]
pub enum StatementKind {
    /// An expression statement
    Expression(Expr),
    /// A variable declaration statement (`let a = 1, b;`)
    Variable(VariableDeclarations),
    /// A block of statements with its own lexical scope
    Block(BlockStatement),
    /// A function declaration (hoisted, with initializer)
    Function(Rc<FunctionDeclaration>),
    /// An if statement
    If(IfStatement),
    /// Any of the loop kinds
    Loop(Loop),
    /// A return statement
    Return(ReturnStatement),
    /// A try/catch/finally statement
    Try(TryCatch),
    /// A throw statement
    #[display(fmt = "throw {_0}")]
    Throw(Expr),
    /// A break statement with an optional label
    #[display(fmt = "break")]
    Break(Option<Symbol>),
    /// A continue statement with an optional label
    #[display(fmt = "continue")]
    Continue(Option<Symbol>),
    /// A labeled statement (`outer: while (…) …`)
    Labelled(LabelledStatement),
    /// A switch statement
    Switch(SwitchStatement),
    /// A with statement, introducing a dynamic scope layer
    With(WithStatement),
    /// A debugger statement
    #[display(fmt = "debugger")]
    Debugger,
    /// An empty statement (`;`)
    #[display(fmt = ";")]
    Empty,
}

#[derive(Debug, Clone)]
pub struct BlockStatement {
    pub scope: ScopeId,
    pub statements: Vec<Statement>,
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{ ")?;
        for stmt in &self.statements {
            write!(f, "{stmt}; ")?;
        }
        f.write_str("}")
    }
}

#[derive(Debug, Clone)]
pub struct VariableDeclarations(pub Vec<VariableDeclaration>);

impl fmt::Display for VariableDeclarations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_list(f, &self.0, ",")
    }
}

#[derive(Debug, Clone)]
pub struct VariableDeclaration {
    pub binding: VariableBinding,
    pub value: Option<Expr>,
}

impl fmt::Display for VariableDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.binding)?;
        if let Some(value) = &self.value {
            write!(f, " = {value}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Display)]
#[display(fmt = "{kind} {pattern}")]
pub struct VariableBinding {
    pub kind: VariableDeclarationKind,
    pub pattern: Pattern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum VariableDeclarationKind {
    #[display(fmt = "var")]
    Var,
    #[display(fmt = "let")]
    Let,
    #[display(fmt = "const")]
    Const,
}

/// A binding pattern: a plain name or a destructuring form.
#[derive(Debug, Clone)]
pub enum Pattern {
    Identifier(Symbol),
    Array(ArrayPattern),
    Object(ObjectPattern),
}

impl Pattern {
    /// Every name the pattern introduces, in source order.
    pub fn bound_names(&self, out: &mut Vec<Symbol>) {
        match self {
            Pattern::Identifier(name) => out.push(*name),
            Pattern::Array(array) => {
                for element in array.elements.iter().flatten() {
                    element.pattern.bound_names(out);
                }
                if let Some(rest) = &array.rest {
                    rest.bound_names(out);
                }
            }
            Pattern::Object(object) => {
                for field in &object.fields {
                    match &field.target {
                        Some(target) => target.bound_names(out),
                        None => {
                            if let PropertyName::Static(name) = field.key {
                                out.push(name);
                            }
                        }
                    }
                }
                if let Some(rest) = object.rest {
                    out.push(rest);
                }
            }
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Identifier(name) => write!(f, "{name}"),
            Pattern::Array(array) => {
                f.write_str("[")?;
                fmt_list(f, &array.elements.iter().map(OptionalElement).collect::<Vec<_>>(), ",")?;
                f.write_str("]")
            }
            Pattern::Object(_) => f.write_str("{…}"),
        }
    }
}

struct OptionalElement<'a>(&'a Option<PatternElement>);

impl fmt::Display for OptionalElement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(element) => write!(f, "{}", element.pattern),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArrayPattern {
    /// `None` entries are elisions (`[a, , b]`)
    pub elements: Vec<Option<PatternElement>>,
    pub rest: Option<Box<Pattern>>,
}

#[derive(Debug, Clone)]
pub struct PatternElement {
    pub pattern: Pattern,
    pub default: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct ObjectPattern {
    pub fields: Vec<ObjectPatternField>,
    pub rest: Option<Symbol>,
}

#[derive(Debug, Clone)]
pub struct ObjectPatternField {
    pub key: PropertyName,
    /// `None` for shorthand fields (`{ x }` binds `x`)
    pub target: Option<Pattern>,
    pub default: Option<Expr>,
}

#[derive(Debug, Clone)]
pub enum PropertyName {
    Static(Symbol),
    Computed(Box<Expr>),
}

#[derive(Debug, Clone, Display)]
#[display(fmt = "if ({condition}) {{ … }}")]
pub struct IfStatement {
    pub condition: Expr,
    pub then: Box<Statement>,
    pub el: Option<Box<Statement>>,
}

#[derive(Debug, Clone, Display)]
pub enum Loop {
    For(ForLoop),
    ForIn(ForInLoop),
    ForOf(ForOfLoop),
    While(WhileLoop),
    DoWhile(DoWhileLoop),
}

#[derive(Debug, Clone, Display)]
#[display(fmt = "for (…) {body}")]
pub struct ForLoop {
    /// Scope for `let`/`const` in the loop head
    pub scope: ScopeId,
    pub init: Option<Box<Statement>>,
    pub condition: Option<Expr>,
    pub finalizer: Option<Expr>,
    pub body: Box<Statement>,
}

/// The binding position of a `for…in`/`for…of` head.
#[derive(Debug, Clone, Display)]
pub enum ForBinding {
    /// `for (let x of …)`
    Declaration(VariableBinding),
    /// `for (x of …)`, assigning to an existing target
    Assignment(Box<Expr>),
}

#[derive(Debug, Clone, Display)]
#[display(fmt = "for ({binding} in {object}) {body}")]
pub struct ForInLoop {
    pub scope: ScopeId,
    pub binding: ForBinding,
    pub object: Expr,
    pub body: Box<Statement>,
}

#[derive(Debug, Clone, Display)]
#[display(fmt = "for ({binding} of {iterable}) {body}")]
pub struct ForOfLoop {
    pub scope: ScopeId,
    pub binding: ForBinding,
    pub iterable: Expr,
    pub body: Box<Statement>,
}

#[derive(Debug, Clone, Display)]
#[display(fmt = "while ({condition}) {body}")]
pub struct WhileLoop {
    pub condition: Expr,
    pub body: Box<Statement>,
}

#[derive(Debug, Clone, Display)]
#[display(fmt = "do {body} while ({condition})")]
pub struct DoWhileLoop {
    pub body: Box<Statement>,
    pub condition: Expr,
}

#[derive(Debug, Clone)]
pub struct ReturnStatement(pub Option<Expr>);

impl fmt::Display for ReturnStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(expr) => write!(f, "return {expr}"),
            None => f.write_str("return"),
        }
    }
}

#[derive(Debug, Clone, Display)]
#[display(fmt = "try {{ … }}")]
pub struct TryCatch {
    pub body: Box<Statement>,
    pub catch: Option<Catch>,
    pub finally: Option<Box<Statement>>,
}

#[derive(Debug, Clone)]
pub struct Catch {
    pub scope: ScopeId,
    /// `None` for a parameterless catch (`catch { … }`)
    pub binding: Option<Pattern>,
    pub body: Box<Statement>,
}

#[derive(Debug, Clone, Display)]
#[display(fmt = "{label}: {body}")]
pub struct LabelledStatement {
    pub label: Symbol,
    pub body: Box<Statement>,
}

#[derive(Debug, Clone, Display)]
#[display(fmt = "switch ({expr}) {{ … }}")]
pub struct SwitchStatement {
    pub scope: ScopeId,
    pub expr: Expr,
    pub cases: Vec<SwitchCase>,
}

#[derive(Debug, Clone)]
pub struct SwitchCase {
    /// `None` for the default clause
    pub value: Option<Expr>,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, Display)]
#[display(fmt = "with ({object}) {body}")]
pub struct WithStatement {
    pub object: Expr,
    pub body: Box<Statement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Function,
    Arrow,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub pattern: Pattern,
    pub default: Option<Expr>,
    pub rest: bool,
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rest {
            f.write_str("...")?;
        }
        write!(f, "{}", self.pattern)?;
        if let Some(default) = &self.default {
            write!(f, " = {default}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FunctionDeclaration {
    pub name: Option<Symbol>,
    /// The function's own scope (parameters and hoisted `var`s live here)
    pub scope: ScopeId,
    pub parameters: Vec<Parameter>,
    pub statements: Vec<Statement>,
    pub kind: FunctionKind,
    pub span: Span,
}

impl fmt::Display for FunctionDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FunctionKind::Arrow => {
                f.write_str("(")?;
                fmt_list(f, &self.parameters, ",")?;
                f.write_str(") => { … }")
            }
            FunctionKind::Function => {
                f.write_str("function ")?;
                if let Some(name) = self.name {
                    write!(f, "{name}")?;
                }
                f.write_str("(")?;
                fmt_list(f, &self.parameters, ",")?;
                f.write_str(") { … }")
            }
        }
    }
}
