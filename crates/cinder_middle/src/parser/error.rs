use std::fmt;

use crate::interner::Symbol;
use crate::lexer;
use crate::lexer::token::{Token, TokenType};
use crate::sourcemap::Span;

/// The type of parser error
#[derive(Debug, Clone)]
pub enum ErrorKind {
    /// A token was found that we didn't expect; we expected a certain other token type
    UnexpectedToken(Token, TokenType),
    /// Same as UnexpectedToken, but we expected any of the given token types
    UnexpectedTokenMultiple(Token, &'static [TokenType]),
    /// A token that cannot begin a statement or expression
    UnknownToken(Token),
    /// Unexpected end of file
    UnexpectedEof,
    /// A lexer error carried through the reporter
    Lexer(lexer::error::Error),
    /// Duplicate `let`/`const` binding in one scope
    DuplicateBinding(Symbol, Span),
    /// The left-hand side of an assignment or `for…in`/`for…of` head is not assignable
    InvalidAssignmentTarget(Span),
    /// `return` outside a function
    IllegalReturn(Span),
    /// `break`/`continue` without an enclosing loop (or matching label)
    IllegalBreakOrContinue(Span),
    /// `break label`/`continue label` names no enclosing labeled statement
    UndefinedLabel(Symbol, Span),
    /// `continue label` targets a label that is not on a loop
    ContinueTargetNotLoop(Symbol, Span),
    /// More than one default clause in a switch statement
    MultipleDefaultInSwitch(Span),
    /// Rest element followed by more elements
    RestMustBeLast(Span),
    /// `123n`: BigInt is not enabled in this build
    BigIntUnsupported(Span),
    /// Line terminator after `throw`
    NewlineAfterThrow(Span),
    /// A reserved word in expression or binding position
    ReservedWord(Span),
    /// Leading-zero octal literal in strict mode
    LegacyOctalInStrictMode(Span),
}

/// An error that occurred during parsing
#[derive(Debug, Clone)]
pub struct Error {
    pub kind: ErrorKind,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind }
    }

    /// The source range the error points at, for line rendering.
    pub fn span(&self) -> Span {
        match &self.kind {
            ErrorKind::UnexpectedToken(token, _)
            | ErrorKind::UnexpectedTokenMultiple(token, _)
            | ErrorKind::UnknownToken(token) => token.span,
            ErrorKind::UnexpectedEof => Span::EMPTY,
            ErrorKind::Lexer(err) => err.span,
            ErrorKind::DuplicateBinding(_, span)
            | ErrorKind::InvalidAssignmentTarget(span)
            | ErrorKind::IllegalReturn(span)
            | ErrorKind::IllegalBreakOrContinue(span)
            | ErrorKind::UndefinedLabel(_, span)
            | ErrorKind::ContinueTargetNotLoop(_, span)
            | ErrorKind::MultipleDefaultInSwitch(span)
            | ErrorKind::RestMustBeLast(span)
            | ErrorKind::BigIntUnsupported(span)
            | ErrorKind::NewlineAfterThrow(span)
            | ErrorKind::ReservedWord(span)
            | ErrorKind::LegacyOctalInStrictMode(span) => *span,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::UnexpectedToken(token, expected) => {
                write!(f, "unexpected token `{}`, expected `{}`", token.ty, expected)
            }
            ErrorKind::UnexpectedTokenMultiple(token, expected) => {
                write!(f, "unexpected token `{}`, expected one of ", token.ty)?;
                for (i, ty) in expected.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "`{ty}`")?;
                }
                Ok(())
            }
            ErrorKind::UnknownToken(token) => write!(f, "unexpected token `{}`", token.ty),
            ErrorKind::UnexpectedEof => f.write_str("unexpected end of input"),
            ErrorKind::Lexer(err) => err.fmt(f),
            ErrorKind::DuplicateBinding(name, _) => {
                write!(f, "identifier has already been declared: {name}")
            }
            ErrorKind::InvalidAssignmentTarget(_) => f.write_str("invalid assignment target"),
            ErrorKind::IllegalReturn(_) => f.write_str("return statement outside of function"),
            ErrorKind::IllegalBreakOrContinue(_) => f.write_str("break or continue outside of loop or switch"),
            ErrorKind::UndefinedLabel(name, _) => write!(f, "undefined label: {name}"),
            ErrorKind::ContinueTargetNotLoop(name, _) => {
                write!(f, "continue target must be a loop: {name}")
            }
            ErrorKind::MultipleDefaultInSwitch(_) => f.write_str("more than one default clause in switch statement"),
            ErrorKind::RestMustBeLast(_) => f.write_str("rest element must be the last element"),
            ErrorKind::BigIntUnsupported(_) => f.write_str("BigInt literals are not supported"),
            ErrorKind::NewlineAfterThrow(_) => f.write_str("illegal newline after throw"),
            ErrorKind::ReservedWord(_) => f.write_str("unexpected reserved word"),
            ErrorKind::LegacyOctalInStrictMode(_) => {
                f.write_str("octal literals are not allowed in strict mode")
            }
        }
    }
}
