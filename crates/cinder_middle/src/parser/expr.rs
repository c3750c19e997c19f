use std::fmt::{self, Debug};
use std::rc::Rc;

use derive_more::Display;

use crate::interner::Symbol;
use crate::lexer::token::TokenType;
use crate::sourcemap::Span;

use super::statement::{fmt_list, FunctionDeclaration, Pattern};

/// The sequence operator (`expr, expr`)
pub type Seq = (Box<Expr>, Box<Expr>);
/// Any prefix expression, i.e. `++foo`
pub type Prefix = (TokenType, Box<Expr>);
/// Any postfix expression, i.e. `foo++`
pub type Postfix = (TokenType, Box<Expr>);

#[derive(Debug, Clone, Display)]
#[display(fmt = "{kind}")]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// A parsed expression
#[derive(Debug, Clone, Display)]
pub enum ExprKind {
    /// Represents a binary expression
    Binary(BinaryExpr),
    /// Represents a grouping expression
    Grouping(GroupingExpr),
    /// Represents a literal, i.e. `foo`
    Literal(LiteralExpr),
    /// Represents an unary expression, i.e. `-foo`, `typeof bar`
    Unary(UnaryExpr),
    /// An assignment expression, i.e. `foo = bar`
    Assignment(AssignmentExpr),
    /// A function call expression
    Call(FunctionCall),
    /// A conditional expression, i.e. `foo ? bar : baz`
    Conditional(ConditionalExpr),
    /// A property access expression, i.e. `foo.bar`
    PropertyAccess(PropertyAccessExpr),
    /// The head of an optional chain: evaluation of the inner member
    /// expression may short-circuit to `undefined`, and the short-circuit
    /// stops here.
    #[display(fmt = "{_0}")]
    Chain(Box<Expr>),
    /// A sequence expression, i.e. `foo, bar`
    #[display(fmt = "{}, {}", "_0.0", "_0.1")]
    Sequence(Seq),
    /// Any prefix expression, i.e. `++foo`
    #[display(fmt = "{}{}", "_0.0", "_0.1")]
    Prefix(Prefix),
    /// Any postfix expression, i.e. `foo++`
    #[display(fmt = "{}{}", "_0.1", "_0.0")]
    Postfix(Postfix),
    /// An expression that evaluates to a function object
    ///
    /// This includes both normal functions and arrow functions
    Function(Rc<FunctionDeclaration>),
    /// An array literal expression
    Array(ArrayLiteral),
    /// An object literal expression
    Object(ObjectLiteral),
    /// A template literal, i.e. `` `a${b}c` ``
    TemplateLiteral(TemplateLiteral),
    /// The `this` expression
    #[display(fmt = "this")]
    This,
    /// An empty expression
    #[display(fmt = "")]
    Empty,
}

impl Expr {
    pub fn binary(l: Expr, r: Expr, op: TokenType) -> Self {
        Self {
            span: l.span.to(r.span),
            kind: ExprKind::Binary(BinaryExpr::new(l, r, op)),
        }
    }

    /// Creates a grouping expression
    ///
    /// NOTE: There must be at least one expression in the group
    pub fn grouping(exprs: Vec<Expr>) -> Self {
        Self {
            span: exprs.first().unwrap().span.to(exprs.last().unwrap().span),
            kind: ExprKind::Grouping(GroupingExpr(exprs)),
        }
    }

    pub fn assignment(l: Expr, r: Expr, op: TokenType) -> Self {
        Self {
            span: l.span.to(r.span),
            kind: ExprKind::Assignment(AssignmentExpr::new_expr_place(l, r, op)),
        }
    }

    pub fn conditional(condition: Expr, then: Expr, el: Expr) -> Self {
        Self {
            span: condition.span.to(el.span),
            kind: ExprKind::Conditional(ConditionalExpr {
                condition: Box::new(condition),
                then: Box::new(then),
                el: Box::new(el),
            }),
        }
    }

    pub fn property_access(computed: bool, optional: bool, target: Expr, property: Expr, span: Span) -> Self {
        Self {
            span,
            kind: ExprKind::PropertyAccess(PropertyAccessExpr {
                computed,
                optional,
                target: Box::new(target),
                property: Box::new(property),
            }),
        }
    }

    pub fn identifier(s: Symbol, span: Span) -> Self {
        Self {
            span,
            kind: ExprKind::Literal(LiteralExpr::Identifier(s)),
        }
    }

    pub fn number_literal(n: f64, span: Span) -> Self {
        Self {
            span,
            kind: ExprKind::Literal(LiteralExpr::Number(n)),
        }
    }

    pub fn string_literal(s: Symbol, span: Span) -> Self {
        Self {
            span,
            kind: ExprKind::Literal(LiteralExpr::String(s)),
        }
    }

    /// Tries to return the identifier that is associated to this expression
    pub fn as_identifier(&self) -> Option<Symbol> {
        match self.kind {
            ExprKind::Literal(LiteralExpr::Identifier(ident)) => Some(ident),
            _ => None,
        }
    }

    /// Whether this expression is a valid assignment target.
    pub fn is_assignment_target(&self) -> bool {
        match &self.kind {
            ExprKind::Literal(LiteralExpr::Identifier(_)) => true,
            ExprKind::PropertyAccess(p) => !p.optional,
            ExprKind::Grouping(GroupingExpr(group)) => {
                group.len() == 1 && group[0].is_assignment_target()
            }
            _ => false,
        }
    }
}

/// Any binary expression
#[derive(Debug, Clone, Display)]
#[display(fmt = "{left} {operator} {right}")]
pub struct BinaryExpr {
    /// Lefthand side
    pub left: Box<Expr>,
    /// Righthand side
    pub right: Box<Expr>,
    /// Operator
    pub operator: TokenType,
}

impl BinaryExpr {
    pub fn new(l: Expr, r: Expr, op: TokenType) -> Self {
        Self {
            left: Box::new(l),
            right: Box::new(r),
            operator: op,
        }
    }
}

/// A grouping expression
#[derive(Debug, Clone)]
pub struct GroupingExpr(pub Vec<Expr>);

impl fmt::Display for GroupingExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        fmt_list(f, &self.0, ",")?;
        write!(f, ")")
    }
}

/// A literal expression
#[derive(Debug, Clone, Display)]
pub enum LiteralExpr {
    /// Boolean literal
    Boolean(bool),
    /// Identifier literal (variable lookup)
    Identifier(Symbol),
    /// Number literal
    Number(f64),
    /// String literal
    #[display(fmt = "\"{_0}\"")]
    String(Symbol),
    /// Regex literal: source and flags, compiled lazily by the runtime
    #[display(fmt = "/{_0}/{_1}")]
    Regex(Symbol, Symbol),
    #[display(fmt = "null")]
    Null,
    #[display(fmt = "undefined")]
    Undefined,
}

/// Unary expression
#[derive(Debug, Clone, Display)]
#[display(fmt = "{operator} {expr}")]
pub struct UnaryExpr {
    /// The operator that was used
    pub operator: TokenType,
    /// Expression
    pub expr: Box<Expr>,
}

impl UnaryExpr {
    pub fn new(op: TokenType, expr: Expr) -> Self {
        Self {
            operator: op,
            expr: Box::new(expr),
        }
    }
}

/// The target of an assignment
#[derive(Debug, Clone, Display)]
pub enum AssignmentTarget {
    /// Assignment to an expression-place
    Expr(Box<Expr>),
    /// Destructuring assignment to a pattern
    Pattern(Box<Pattern>),
}

/// An assignment expression
#[derive(Debug, Clone, Display)]
#[display(fmt = "{left} {operator} {right}")]
pub struct AssignmentExpr {
    /// The lefthand side (place-expression)
    pub left: AssignmentTarget,
    /// The righthand side (value)
    pub right: Box<Expr>,
    /// The type of assignment, (`=`/`+=`/etc)
    pub operator: TokenType,
}

impl AssignmentExpr {
    pub fn new_expr_place(l: Expr, r: Expr, op: TokenType) -> Self {
        Self {
            left: AssignmentTarget::Expr(Box::new(l)),
            right: Box::new(r),
            operator: op,
        }
    }

    pub fn new_pattern_place(l: Pattern, r: Expr, op: TokenType) -> Self {
        Self {
            left: AssignmentTarget::Pattern(Box::new(l)),
            right: Box::new(r),
            operator: op,
        }
    }
}

#[derive(Debug, Clone)]
pub enum CallArgumentKind {
    /// A normal argument
    Normal(Expr),
    /// A spread argument
    Spread(Expr),
}

impl fmt::Display for CallArgumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallArgumentKind::Normal(expr) => fmt::Display::fmt(expr, f),
            CallArgumentKind::Spread(expr) => {
                f.write_str("...")?;
                fmt::Display::fmt(expr, f)
            }
        }
    }
}

/// A function call expression
#[derive(Debug, Clone)]
pub struct FunctionCall {
    /// Whether this function call invokes the constructor (using `new` keyword)
    pub constructor_call: bool,
    /// Whether the call is optional (`f?.()`): a nullish callee
    /// short-circuits the chain instead of throwing
    pub optional: bool,
    /// The target (callee)
    pub target: Box<Expr>,
    /// Function call arguments
    pub arguments: Vec<CallArgumentKind>,
}

impl fmt::Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.target)?;
        fmt_list(f, &self.arguments, ",")?;
        write!(f, ")")
    }
}

/// A conditional expression
#[derive(Debug, Clone, Display)]
#[display(fmt = "{condition} ? {then} : {el}")]
pub struct ConditionalExpr {
    /// The first part of a conditional expression, the condition
    pub condition: Box<Expr>,
    /// The second part of a conditional expression, a then expression
    pub then: Box<Expr>,
    /// The last part of a conditional expression, an else expression
    pub el: Box<Expr>,
}

/// A property access expression
#[derive(Debug, Clone)]
pub struct PropertyAccessExpr {
    /// Whether this property access is computed (`a[b]`)
    pub computed: bool,
    /// Whether this is an optional access (`a?.b`)
    pub optional: bool,
    /// The target object that is accessed
    pub target: Box<Expr>,
    /// The property of the object that is accessed
    pub property: Box<Expr>,
}

impl fmt::Display for PropertyAccessExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.target)?;
        match (self.optional, self.computed) {
            (true, _) => write!(f, "?.{}", self.property),
            (false, true) => write!(f, "[{}]", self.property),
            (false, false) => write!(f, ".{}", self.property),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ArrayMemberKind {
    Item(Expr),
    Spread(Expr),
    /// An elision (`[a, , b]`)
    Hole,
}

impl fmt::Display for ArrayMemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayMemberKind::Item(item) => fmt::Display::fmt(item, f),
            ArrayMemberKind::Spread(item) => {
                f.write_str("...")?;
                fmt::Display::fmt(item, f)
            }
            ArrayMemberKind::Hole => Ok(()),
        }
    }
}

/// An array literal expression (`[expr, expr]`)
#[derive(Debug, Clone)]
pub struct ArrayLiteral(pub Vec<ArrayMemberKind>);

impl fmt::Display for ArrayLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        fmt_list(f, &self.0, ",")?;
        write!(f, "]")
    }
}

#[derive(Debug, Clone)]
pub enum ObjectMemberKind {
    Getter(Symbol),
    Setter(Symbol),
    Static(Symbol),
    Dynamic(Expr),
    Spread,
}

impl fmt::Display for ObjectMemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Getter(name) => write!(f, "get {name}"),
            Self::Setter(name) => write!(f, "set {name}"),
            Self::Static(name) => write!(f, "{name}"),
            Self::Dynamic(expr) => write!(f, "[{expr}]"),
            Self::Spread => f.write_str("..."),
        }
    }
}

/// An object literal expression (`{ k: "v" }`)
#[derive(Debug, Clone)]
pub struct ObjectLiteral(pub Vec<(ObjectMemberKind, Expr)>);

impl fmt::Display for ObjectLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k}: {v}")?;
        }
        write!(f, "}}")
    }
}

#[derive(Debug, Clone)]
pub enum TemplateSegment {
    String(Symbol),
    Expr(Expr),
}

/// A template literal
#[derive(Debug, Clone)]
pub struct TemplateLiteral {
    pub segments: Vec<TemplateSegment>,
}

impl fmt::Display for TemplateLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("`")?;
        for segment in &self.segments {
            match segment {
                TemplateSegment::String(s) => write!(f, "{s}")?,
                TemplateSegment::Expr(e) => write!(f, "${{{e}}}")?,
            }
        }
        f.write_str("`")
    }
}
