use cinder_middle::interner::{sym, StringInterner, Symbol};
use cinder_middle::lexer::token::{Token, TokenType};
use cinder_middle::parser::error::{Error, ErrorKind};
use cinder_middle::parser::scope::{DeclKind, ScopeId, ScopeKind, ScopeTree};
use cinder_middle::parser::statement::Statement;
use cinder_middle::sourcemap::Span;

pub mod expr;
pub mod stmt;

pub use expr::ExpressionParser;
pub use stmt::StatementParser;

/// The parser result: the statement list plus the scope tables the parser
/// populated while walking declarations.
#[derive(Debug)]
pub struct ParsedProgram {
    pub statements: Vec<Statement>,
    pub scopes: ScopeTree,
    pub root_scope: ScopeId,
}

/// State that is saved and restored around every function body, so that
/// `break`/`continue`/labels never target constructs outside the function.
#[derive(Debug, Default)]
struct FunctionContext {
    iteration_depth: usize,
    switch_depth: usize,
    labels: Vec<(Symbol, bool)>,
}

/// A recursive-descent parser with one token of lookahead.
#[derive(Debug)]
pub struct Parser<'a, 'interner> {
    input: &'a str,
    tokens: Vec<Token>,
    errors: Vec<Error>,
    /// Set after an error so that follow-up errors until the next statement
    /// boundary are not reported.
    error_sync: bool,
    idx: usize,
    interner: &'interner mut StringInterner,
    strict: bool,

    scopes: ScopeTree,
    scope_stack: Vec<ScopeId>,
    function_depth: usize,
    with_depth: usize,
    /// Nonzero while parsing a `for` head, where a top-level `in` is the
    /// loop keyword rather than the relational operator.
    no_in: usize,
    ctx: FunctionContext,
}

impl<'a, 'interner> Parser<'a, 'interner> {
    /// Creates a parser over an already-lexed token stream.
    pub fn new(interner: &'interner mut StringInterner, input: &'a str, tokens: Vec<Token>) -> Self {
        let mut scopes = ScopeTree::new();
        let root = scopes.push(None, ScopeKind::Script);
        Self {
            input,
            tokens,
            errors: Vec::new(),
            error_sync: false,
            idx: 0,
            interner,
            strict: false,
            scopes,
            scope_stack: vec![root],
            function_depth: 0,
            with_depth: 0,
            no_in: 0,
            ctx: FunctionContext::default(),
        }
    }

    /// Lexes and parses in one go.
    pub fn new_from_str(
        interner: &'interner mut StringInterner,
        input: &'a str,
    ) -> Result<Self, Vec<Error>> {
        let tokens = cinder_lexer::Lexer::new(interner, input)
            .scan_all()
            .map_err(|errs| errs.into_iter().map(|e| Error::new(ErrorKind::Lexer(e))).collect::<Vec<_>>())?;
        Ok(Self::new(interner, input, tokens))
    }

    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    /// Drives the parser to completion.
    ///
    /// Statements that fail to parse are reported and skipped; parsing
    /// resumes at the next statement boundary.
    pub fn parse_all(mut self) -> Result<ParsedProgram, Vec<Error>> {
        let mut statements = Vec::new();

        while !self.is_eof() {
            let before = self.idx;
            match self.parse_statement() {
                Some(statement) => statements.push(statement),
                None => {
                    self.synchronize();
                    // A stray closing brace stops recovery without
                    // consuming; skip it so the loop always advances.
                    if self.idx <= before {
                        self.idx = before + 1;
                    }
                }
            }
        }

        if self.errors.is_empty() {
            Ok(ParsedProgram {
                statements,
                scopes: self.scopes,
                root_scope: ScopeId::ROOT,
            })
        } else {
            Err(self.errors)
        }
    }

    // --- token cursor ---

    fn is_eof(&self) -> bool {
        self.idx >= self.tokens.len()
    }

    fn current(&self) -> Option<Token> {
        self.tokens.get(self.idx).copied()
    }

    fn previous(&self) -> Option<Token> {
        self.tokens.get(self.idx.checked_sub(1)?).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.current();
        if tok.is_none() && !self.error_sync {
            self.error(ErrorKind::UnexpectedEof);
        }
        self.idx += 1;
        tok
    }

    fn advance_back(&mut self) {
        self.idx -= 1;
    }

    /// The span of the current (or, at end of input, last) token.
    fn current_span(&self) -> Span {
        self.current()
            .or_else(|| self.tokens.last().copied())
            .map(|t| t.span)
            .unwrap_or(Span::EMPTY)
    }

    /// Skips the current token if it matches any of `types`. When `emit_error`
    /// is set, a mismatch is reported.
    fn expect_and_skip(&mut self, types: &'static [TokenType], emit_error: bool) -> bool {
        match self.current() {
            Some(tok) if types.contains(&tok.ty) => {
                self.idx += 1;
                true
            }
            Some(tok) => {
                if emit_error {
                    self.error(match types {
                        [ty] => ErrorKind::UnexpectedToken(tok, *ty),
                        _ => ErrorKind::UnexpectedTokenMultiple(tok, types),
                    });
                }
                false
            }
            None => {
                if emit_error {
                    self.error(ErrorKind::UnexpectedEof);
                }
                false
            }
        }
    }

    /// Expects an identifier (including contextual keywords usable as names)
    /// and returns its symbol.
    fn expect_identifier(&mut self, emit_error: bool) -> Option<Symbol> {
        match self.current() {
            Some(tok) => match tok.ty.as_identifier() {
                Some(symbol) => {
                    self.idx += 1;
                    Some(symbol)
                }
                None => {
                    if emit_error {
                        if let TokenType::Reserved(_) = tok.ty {
                            self.error(ErrorKind::ReservedWord(tok.span));
                        } else {
                            self.error(ErrorKind::UnknownToken(tok));
                        }
                    }
                    None
                }
            },
            None => {
                if emit_error {
                    self.error(ErrorKind::UnexpectedEof);
                }
                None
            }
        }
    }

    /// Consumes a statement terminator, applying automatic semicolon
    /// insertion: a `;` is inserted before `}`, at end of input, or when the
    /// next token sits on a new line.
    fn semicolon(&mut self) {
        if self.expect_and_skip(&[TokenType::Semicolon], false) {
            return;
        }

        match self.current() {
            None => {}
            Some(tok) if tok.ty == TokenType::RightBrace || tok.newline_before => {}
            Some(tok) => {
                if !self.error_sync {
                    self.error(ErrorKind::UnexpectedToken(tok, TokenType::Semicolon));
                }
            }
        }
    }

    /// Whether the current token is preceded by a line terminator. Used by
    /// the restricted productions.
    fn newline_before_current(&self) -> bool {
        self.current().is_none_or(|t| t.newline_before)
    }

    fn error(&mut self, kind: ErrorKind) {
        if !self.error_sync {
            self.errors.push(Error::new(kind));
            self.error_sync = true;
        }
    }

    /// Recovers after a parse error: skip to the next statement boundary.
    fn synchronize(&mut self) {
        let mut depth = 0usize;
        while let Some(tok) = self.current() {
            match tok.ty {
                TokenType::Semicolon if depth == 0 => {
                    self.idx += 1;
                    break;
                }
                TokenType::LeftBrace | TokenType::LeftParen | TokenType::LeftSquareBrace => depth += 1,
                TokenType::RightBrace if depth == 0 => break,
                TokenType::RightBrace | TokenType::RightParen | TokenType::RightSquareBrace => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            self.idx += 1;
        }
        self.error_sync = false;
    }

    // --- scopes ---

    fn current_scope(&self) -> ScopeId {
        *self.scope_stack.last().unwrap()
    }

    fn enter_scope(&mut self, kind: ScopeKind) -> ScopeId {
        let id = self.scopes.push(Some(self.current_scope()), kind);
        if self.with_depth > 0 {
            self.scopes.mark_dynamic(id);
        }
        self.scope_stack.push(id);
        id
    }

    fn exit_scope(&mut self) {
        self.scope_stack.pop();
    }

    /// Declares a name in the current scope, reporting duplicate lexical
    /// bindings as parse errors.
    fn declare(&mut self, name: Symbol, decl: DeclKind, span: Span) {
        if self.scopes.declare(self.current_scope(), name, decl).is_err() {
            self.error(ErrorKind::DuplicateBinding(name, span));
        }
    }

    // --- literal decoding ---

    /// Parses the numeric value out of a number token.
    fn number_value(&mut self, ty: TokenType, span: Span) -> f64 {
        fn radix_value(lexeme: &str, radix: u32) -> f64 {
            let digits: String = lexeme.chars().filter(|&c| c != '_').collect();
            u64::from_str_radix(&digits, radix).map(|v| v as f64).unwrap_or(f64::NAN)
        }

        match ty {
            TokenType::NumberDec(sym) => {
                let lexeme: String = self
                    .interner
                    .resolve(sym)
                    .chars()
                    .filter(|&c| c != '_')
                    .collect();
                lexeme.parse().unwrap_or(f64::NAN)
            }
            TokenType::NumberHex(sym) => radix_value(&self.interner.resolve(sym)[2..], 16),
            TokenType::NumberBin(sym) => radix_value(&self.interner.resolve(sym)[2..], 2),
            TokenType::NumberOct(sym) => radix_value(&self.interner.resolve(sym)[2..], 8),
            TokenType::NumberLegacyOct(sym) => {
                if self.strict {
                    self.error(ErrorKind::LegacyOctalInStrictMode(span));
                }
                radix_value(&self.interner.resolve(sym)[1..], 8)
            }
            TokenType::BigIntSuffixed(_) => {
                self.error(ErrorKind::BigIntUnsupported(span));
                f64::NAN
            }
            _ => unreachable!("not a number token"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinder_middle::parser::statement::StatementKind;

    fn parse(src: &str) -> ParsedProgram {
        let mut interner = StringInterner::new();
        Parser::new_from_str(&mut interner, src)
            .unwrap()
            .parse_all()
            .unwrap_or_else(|errs| panic!("parse failed: {errs:?}"))
    }

    fn parse_err(src: &str) -> Vec<Error> {
        let mut interner = StringInterner::new();
        Parser::new_from_str(&mut interner, src)
            .unwrap()
            .parse_all()
            .err()
            .expect("expected parse failure")
    }

    #[test]
    fn asi_inserts_semicolons_at_newlines() {
        let program = parse("let a = 1\nlet b = 2\na + b");
        assert_eq!(program.statements.len(), 3);
    }

    #[test]
    fn asi_rejects_two_statements_on_one_line() {
        let errors = parse_err("let a = 1 let b = 2");
        assert!(matches!(errors[0].kind, ErrorKind::UnexpectedToken(..)));
    }

    #[test]
    fn restricted_return_takes_no_operand_after_newline() {
        let program = parse("function f() { return\n1 }");
        let StatementKind::Function(func) = &program.statements[0].kind else {
            panic!("expected function");
        };
        let StatementKind::Return(ret) = &func.statements[0].kind else {
            panic!("expected return, got {:?}", func.statements[0].kind);
        };
        assert!(ret.0.is_none());
    }

    #[test]
    fn duplicate_let_is_a_parse_error() {
        let errors = parse_err("let x = 1; let x = 2;");
        assert!(matches!(errors[0].kind, ErrorKind::DuplicateBinding(..)));
    }

    #[test]
    fn var_redeclaration_merges() {
        parse("var x = 1; var x = 2;");
    }

    #[test]
    fn labels_resolve_and_validate() {
        parse("outer: for (;;) { for (;;) { continue outer; break outer; } }");
        let errors = parse_err("a: { continue a; }");
        assert!(matches!(errors[0].kind, ErrorKind::ContinueTargetNotLoop(..)));
        let errors = parse_err("for (;;) { break nope; }");
        assert!(matches!(errors[0].kind, ErrorKind::UndefinedLabel(..)));
    }

    #[test]
    fn recovery_reports_multiple_errors() {
        let errors = parse_err("let = ;\nlet ] = 2;\n");
        assert!(errors.len() >= 2);
    }

    #[test]
    fn spans_nest_within_parents() {
        let program = parse("if (a) { b(c + 1); }");
        let StatementKind::If(stmt) = &program.statements[0].kind else {
            panic!("expected if");
        };
        let outer = program.statements[0].span;
        assert!(outer.contains(stmt.condition.span));
        assert!(outer.contains(stmt.then.span));
    }
}
