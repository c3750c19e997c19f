use std::rc::Rc;

use cinder_middle::interner::{sym, Symbol};
use cinder_middle::lexer::token::TokenType;
use cinder_middle::parser::error::ErrorKind;
use cinder_middle::parser::scope::{DeclKind, ScopeKind};
use cinder_middle::parser::statement::{
    ArrayPattern, BlockStatement, Catch, DoWhileLoop, ForBinding, ForInLoop, ForLoop, ForOfLoop,
    FunctionDeclaration, FunctionKind, IfStatement, LabelledStatement, Loop, ObjectPattern,
    ObjectPatternField, Parameter, Pattern, PatternElement, PropertyName, ReturnStatement, Statement,
    StatementKind, SwitchCase, SwitchStatement, TryCatch, VariableBinding, VariableDeclaration,
    VariableDeclarationKind, VariableDeclarations, WhileLoop, WithStatement,
};
use cinder_middle::sourcemap::Span;

use crate::expr::ExpressionParser;
use crate::Parser;

pub trait StatementParser {
    fn parse_statement(&mut self) -> Option<Statement>;
    fn parse_block(&mut self) -> Option<BlockStatement>;
    fn parse_variable(&mut self, kind: VariableDeclarationKind) -> Option<VariableDeclarations>;
    /// Parses a binding pattern and declares every name it introduces.
    fn parse_variable_binding(&mut self, kind: VariableDeclarationKind) -> Option<VariableBinding>;
    fn parse_pattern(&mut self) -> Option<Pattern>;
    fn parse_if(&mut self) -> Option<IfStatement>;
    fn parse_switch(&mut self) -> Option<SwitchStatement>;
    fn parse_try(&mut self) -> Option<TryCatch>;
    fn parse_return(&mut self, keyword_span: Span) -> Option<ReturnStatement>;
    fn parse_throw(&mut self, keyword_span: Span) -> Option<Statement>;
    fn parse_for(&mut self) -> Option<Loop>;
    fn parse_while(&mut self) -> Option<Loop>;
    fn parse_do_while(&mut self) -> Option<Loop>;
    fn parse_with(&mut self) -> Option<WithStatement>;
    /// Parses a function literal, assuming the `function` keyword has been
    /// consumed. Does not declare the function's name anywhere.
    fn parse_function(&mut self) -> Option<FunctionDeclaration>;
    /// Parses a parameter list, assuming `(` has been consumed; consumes the
    /// closing `)`.
    fn parse_parameter_list(&mut self) -> Option<Vec<Parameter>>;
}

impl Parser<'_, '_> {
    pub(crate) fn span_from(&self, start: Span) -> Span {
        match self.previous() {
            Some(tok) if tok.span.hi >= start.lo => start.to(tok.span),
            _ => start,
        }
    }

    /// Parses statements until `}`; used for function bodies and blocks.
    pub(crate) fn parse_brace_delimited_statements(&mut self) -> Vec<Statement> {
        let mut statements = Vec::new();
        while !self.expect_and_skip(&[TokenType::RightBrace], false) {
            if self.is_eof() {
                self.error(ErrorKind::UnexpectedEof);
                break;
            }
            match self.parse_statement() {
                Some(statement) => statements.push(statement),
                None => self.synchronize(),
            }
        }
        statements
    }

    fn parse_loop_body(&mut self) -> Option<Box<Statement>> {
        self.ctx.iteration_depth += 1;
        let body = self.parse_statement();
        self.ctx.iteration_depth -= 1;
        body.map(Box::new)
    }

    /// Parses the head of a `for…in`/`for…of` after a declaration keyword,
    /// i.e. `for (let x in y)`.
    fn parse_for_each_binding(&mut self, kind: VariableDeclarationKind) -> Option<ForBinding> {
        let binding = self.parse_variable_binding(kind)?;
        Some(ForBinding::Declaration(binding))
    }
}

impl StatementParser for Parser<'_, '_> {
    fn parse_statement(&mut self) -> Option<Statement> {
        self.error_sync = false;
        let start = self.current()?.span;

        let kind = match self.next()?.ty {
            TokenType::Var => self.parse_variable(VariableDeclarationKind::Var).map(StatementKind::Variable),
            TokenType::Let => self.parse_variable(VariableDeclarationKind::Let).map(StatementKind::Variable),
            TokenType::Const => self
                .parse_variable(VariableDeclarationKind::Const)
                .map(StatementKind::Variable),
            TokenType::If => self.parse_if().map(StatementKind::If),
            TokenType::Function => {
                let function = self.parse_function()?;
                if let Some(name) = function.name {
                    self.declare(name, DeclKind::FunctionDecl, start);
                }
                Some(StatementKind::Function(Rc::new(function)))
            }
            TokenType::LeftBrace => self.parse_block().map(StatementKind::Block),
            TokenType::While => self.parse_while().map(StatementKind::Loop),
            TokenType::Do => self.parse_do_while().map(StatementKind::Loop),
            TokenType::For => self.parse_for().map(StatementKind::Loop),
            TokenType::Try => self.parse_try().map(StatementKind::Try),
            TokenType::Throw => return self.parse_throw(start),
            TokenType::Return => self.parse_return(start).map(StatementKind::Return),
            TokenType::Switch => self.parse_switch().map(StatementKind::Switch),
            TokenType::With => self.parse_with().map(StatementKind::With),
            TokenType::Break => {
                let label = self.parse_jump_label();
                match label {
                    Some(label) if !self.ctx.labels.iter().any(|&(name, _)| name == label) => {
                        self.error(ErrorKind::UndefinedLabel(label, start));
                        None
                    }
                    None if self.ctx.iteration_depth == 0 && self.ctx.switch_depth == 0 => {
                        self.error(ErrorKind::IllegalBreakOrContinue(start));
                        None
                    }
                    label => Some(StatementKind::Break(label)),
                }
            }
            TokenType::Continue => {
                let label = self.parse_jump_label();
                match label {
                    Some(label) => match self.ctx.labels.iter().find(|&&(name, _)| name == label) {
                        Some(&(_, is_loop)) if !is_loop => {
                            self.error(ErrorKind::ContinueTargetNotLoop(label, start));
                            None
                        }
                        Some(_) => Some(StatementKind::Continue(Some(label))),
                        None => {
                            self.error(ErrorKind::UndefinedLabel(label, start));
                            None
                        }
                    },
                    None if self.ctx.iteration_depth == 0 => {
                        self.error(ErrorKind::IllegalBreakOrContinue(start));
                        None
                    }
                    None => Some(StatementKind::Continue(None)),
                }
            }
            TokenType::Debugger => Some(StatementKind::Debugger),
            TokenType::Semicolon => {
                // Already terminated; return immediately to not consume another.
                return Some(Statement {
                    kind: StatementKind::Empty,
                    span: start,
                });
            }
            TokenType::Identifier(label) if self.current().is_some_and(|t| t.ty == TokenType::Colon) => {
                self.next(); // the colon
                let is_loop = matches!(
                    self.current().map(|t| t.ty),
                    Some(TokenType::For | TokenType::While | TokenType::Do)
                );
                self.ctx.labels.push((label, is_loop));
                let body = self.parse_statement();
                self.ctx.labels.pop();
                body.map(|body| {
                    StatementKind::Labelled(LabelledStatement {
                        label,
                        body: Box::new(body),
                    })
                })
            }
            _ => {
                // The token belongs to this expression; go back.
                self.advance_back();
                Some(StatementKind::Expression(self.parse_expression()?))
            }
        }?;

        if matches!(
            kind,
            StatementKind::Expression(_)
                | StatementKind::Variable(_)
                | StatementKind::Return(_)
                | StatementKind::Break(_)
                | StatementKind::Continue(_)
                | StatementKind::Debugger
        ) {
            self.semicolon();
        } else {
            // Stray semicolons after braced statements are consumed silently.
            self.expect_and_skip(&[TokenType::Semicolon], false);
        }

        Some(Statement {
            span: self.span_from(start),
            kind,
        })
    }

    fn parse_block(&mut self) -> Option<BlockStatement> {
        let scope = self.enter_scope(ScopeKind::Block);
        let statements = self.parse_brace_delimited_statements();
        self.exit_scope();
        Some(BlockStatement { scope, statements })
    }

    fn parse_variable(&mut self, kind: VariableDeclarationKind) -> Option<VariableDeclarations> {
        let mut declarations = Vec::new();

        loop {
            let binding = self.parse_variable_binding(kind)?;
            let value = if self.expect_and_skip(&[TokenType::Assignment], false) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            declarations.push(VariableDeclaration { binding, value });

            if !self.expect_and_skip(&[TokenType::Comma], false) {
                break;
            }
        }

        Some(VariableDeclarations(declarations))
    }

    fn parse_variable_binding(&mut self, kind: VariableDeclarationKind) -> Option<VariableBinding> {
        let span = self.current_span();
        let pattern = self.parse_pattern()?;

        let decl = match kind {
            VariableDeclarationKind::Var => DeclKind::Var,
            VariableDeclarationKind::Let => DeclKind::Let,
            VariableDeclarationKind::Const => DeclKind::Const,
        };

        let mut names = Vec::new();
        pattern.bound_names(&mut names);
        for name in names {
            self.declare(name, decl, span);
        }

        Some(VariableBinding { kind, pattern })
    }

    fn parse_pattern(&mut self) -> Option<Pattern> {
        let tok = self.current()?;
        match tok.ty {
            TokenType::LeftSquareBrace => {
                self.next();
                let mut elements = Vec::new();
                let mut rest = None;

                while !self.expect_and_skip(&[TokenType::RightSquareBrace], false) {
                    if self.is_eof() {
                        self.error(ErrorKind::UnexpectedEof);
                        return None;
                    }

                    if self.expect_and_skip(&[TokenType::Comma], false) {
                        elements.push(None);
                        continue;
                    }

                    if self.expect_and_skip(&[TokenType::Spread], false) {
                        rest = Some(Box::new(self.parse_pattern()?));
                        if !self.expect_and_skip(&[TokenType::RightSquareBrace], false) {
                            self.error(ErrorKind::RestMustBeLast(self.current_span()));
                            return None;
                        }
                        break;
                    }

                    let pattern = self.parse_pattern()?;
                    let default = if self.expect_and_skip(&[TokenType::Assignment], false) {
                        Some(self.parse_assignment()?)
                    } else {
                        None
                    };
                    elements.push(Some(PatternElement { pattern, default }));

                    // A trailing comma after the element; the `]` check at the
                    // top handles the end.
                    self.expect_and_skip(&[TokenType::Comma], false);
                }

                Some(Pattern::Array(ArrayPattern { elements, rest }))
            }
            TokenType::LeftBrace => {
                self.next();
                let mut fields = Vec::new();
                let mut rest = None;

                while !self.expect_and_skip(&[TokenType::RightBrace], false) {
                    if self.is_eof() {
                        self.error(ErrorKind::UnexpectedEof);
                        return None;
                    }

                    if self.expect_and_skip(&[TokenType::Spread], false) {
                        rest = self.expect_identifier(true);
                        if !self.expect_and_skip(&[TokenType::RightBrace], false) {
                            self.error(ErrorKind::RestMustBeLast(self.current_span()));
                            return None;
                        }
                        break;
                    }

                    let key = self.parse_property_name()?;
                    let target = if self.expect_and_skip(&[TokenType::Colon], false) {
                        Some(self.parse_pattern()?)
                    } else {
                        None
                    };
                    let default = if self.expect_and_skip(&[TokenType::Assignment], false) {
                        Some(self.parse_assignment()?)
                    } else {
                        None
                    };

                    // Shorthand fields must have a plain name to bind.
                    if target.is_none() && !matches!(key, PropertyName::Static(_)) {
                        self.error(ErrorKind::InvalidAssignmentTarget(tok.span));
                        return None;
                    }

                    fields.push(ObjectPatternField { key, target, default });
                    self.expect_and_skip(&[TokenType::Comma], false);
                }

                Some(Pattern::Object(ObjectPattern { fields, rest }))
            }
            TokenType::Reserved(_) => {
                self.error(ErrorKind::ReservedWord(tok.span));
                None
            }
            _ => {
                let name = self.expect_identifier(true)?;
                Some(Pattern::Identifier(name))
            }
        }
    }

    fn parse_if(&mut self) -> Option<IfStatement> {
        self.expect_and_skip(&[TokenType::LeftParen], true);
        let condition = self.parse_expression()?;
        self.expect_and_skip(&[TokenType::RightParen], true);

        let then = Box::new(self.parse_statement()?);

        let el = if self.expect_and_skip(&[TokenType::Else], false) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Some(IfStatement { condition, then, el })
    }

    fn parse_switch(&mut self) -> Option<SwitchStatement> {
        self.expect_and_skip(&[TokenType::LeftParen], true);
        let expr = self.parse_expression()?;
        self.expect_and_skip(&[TokenType::RightParen], true);
        self.expect_and_skip(&[TokenType::LeftBrace], true);

        // All cases share one block scope for lexical declarations.
        let scope = self.enter_scope(ScopeKind::Block);
        self.ctx.switch_depth += 1;

        let mut cases: Vec<SwitchCase> = Vec::new();
        let mut seen_default = false;

        let result = loop {
            if self.expect_and_skip(&[TokenType::RightBrace], false) {
                break Some(());
            }

            let value = if self.expect_and_skip(&[TokenType::Case], false) {
                let value = match self.parse_expression() {
                    Some(value) => value,
                    None => break None,
                };
                Some(value)
            } else if self.expect_and_skip(&[TokenType::Default], false) {
                if seen_default {
                    self.error(ErrorKind::MultipleDefaultInSwitch(self.current_span()));
                    break None;
                }
                seen_default = true;
                None
            } else {
                let kind = match self.current() {
                    Some(tok) => ErrorKind::UnexpectedTokenMultiple(
                        tok,
                        &[TokenType::Case, TokenType::Default, TokenType::RightBrace],
                    ),
                    None => ErrorKind::UnexpectedEof,
                };
                self.error(kind);
                break None;
            };

            self.expect_and_skip(&[TokenType::Colon], true);

            let mut body = Vec::new();
            while !matches!(
                self.current().map(|t| t.ty),
                Some(TokenType::Case | TokenType::Default | TokenType::RightBrace) | None
            ) {
                match self.parse_statement() {
                    Some(statement) => body.push(statement),
                    None => self.synchronize(),
                }
            }

            cases.push(SwitchCase { value, body });
        };

        self.ctx.switch_depth -= 1;
        self.exit_scope();

        result?;
        Some(SwitchStatement { scope, expr, cases })
    }

    fn parse_try(&mut self) -> Option<TryCatch> {
        self.expect_and_skip(&[TokenType::LeftBrace], true);
        let body_span = self.current_span();
        let body = self.parse_block()?;
        let body = Statement {
            kind: StatementKind::Block(body),
            span: self.span_from(body_span),
        };

        let catch = if self.expect_and_skip(&[TokenType::Catch], false) {
            let scope = self.enter_scope(ScopeKind::Block);

            let binding = if self.expect_and_skip(&[TokenType::LeftParen], false) {
                let span = self.current_span();
                let pattern = self.parse_pattern();
                self.expect_and_skip(&[TokenType::RightParen], true);
                match pattern {
                    Some(pattern) => {
                        let mut names = Vec::new();
                        pattern.bound_names(&mut names);
                        for name in names {
                            self.declare(name, DeclKind::Param, span);
                        }
                        Some(pattern)
                    }
                    None => {
                        self.exit_scope();
                        return None;
                    }
                }
            } else {
                None
            };

            self.expect_and_skip(&[TokenType::LeftBrace], true);
            let start = self.current_span();
            let statements = self.parse_brace_delimited_statements();
            self.exit_scope();

            Some(Catch {
                scope,
                binding,
                body: Box::new(Statement {
                    kind: StatementKind::Block(BlockStatement { scope, statements }),
                    span: self.span_from(start),
                }),
            })
        } else {
            None
        };

        let finally = if self.expect_and_skip(&[TokenType::Finally], false) {
            self.expect_and_skip(&[TokenType::LeftBrace], true);
            let start = self.current_span();
            let block = self.parse_block()?;
            Some(Box::new(Statement {
                kind: StatementKind::Block(block),
                span: self.span_from(start),
            }))
        } else {
            None
        };

        if catch.is_none() && finally.is_none() {
            let kind = match self.current() {
                Some(tok) => ErrorKind::UnexpectedTokenMultiple(tok, &[TokenType::Catch, TokenType::Finally]),
                None => ErrorKind::UnexpectedEof,
            };
            self.error(kind);
            return None;
        }

        Some(TryCatch {
            body: Box::new(body),
            catch,
            finally,
        })
    }

    fn parse_return(&mut self, keyword_span: Span) -> Option<ReturnStatement> {
        if self.function_depth == 0 {
            self.error(ErrorKind::IllegalReturn(keyword_span));
            return None;
        }

        // Restricted production: a line terminator ends the statement.
        if self.newline_before_current()
            || matches!(
                self.current().map(|t| t.ty),
                Some(TokenType::Semicolon | TokenType::RightBrace) | None
            )
        {
            return Some(ReturnStatement(None));
        }

        Some(ReturnStatement(Some(self.parse_expression()?)))
    }

    fn parse_throw(&mut self, keyword_span: Span) -> Option<Statement> {
        if self.newline_before_current() {
            self.error(ErrorKind::NewlineAfterThrow(keyword_span));
            return None;
        }
        let expr = self.parse_expression()?;
        self.semicolon();
        Some(Statement {
            span: self.span_from(keyword_span),
            kind: StatementKind::Throw(expr),
        })
    }

    fn parse_for(&mut self) -> Option<Loop> {
        self.expect_and_skip(&[TokenType::LeftParen], true);
        let scope = self.enter_scope(ScopeKind::Block);

        let result = 'parse: {
            // Empty init
            if self.expect_and_skip(&[TokenType::Semicolon], false) {
                break 'parse self.parse_classic_for_tail(scope, None);
            }

            let decl_kind = match self.current().map(|t| t.ty) {
                Some(TokenType::Var) => Some(VariableDeclarationKind::Var),
                Some(TokenType::Let) => Some(VariableDeclarationKind::Let),
                Some(TokenType::Const) => Some(VariableDeclarationKind::Const),
                _ => None,
            };

            if let Some(kind) = decl_kind {
                self.next();

                // Look one pattern ahead: `in`/`of` switch to the
                // enumerating loop forms.
                let binding = match self.parse_for_each_binding(kind) {
                    Some(binding) => binding,
                    None => break 'parse None,
                };

                match self.current().map(|t| t.ty) {
                    Some(TokenType::In) => {
                        self.next();
                        break 'parse self.parse_for_each_tail(scope, binding, true);
                    }
                    Some(TokenType::Identifier(s)) if s == sym::OF => {
                        self.next();
                        break 'parse self.parse_for_each_tail(scope, binding, false);
                    }
                    _ => {}
                }

                // Classic for with declarations: finish this declarator and
                // any remaining ones.
                let ForBinding::Declaration(first) = binding else {
                    unreachable!()
                };
                let value = if self.expect_and_skip(&[TokenType::Assignment], false) {
                    match self.parse_assignment() {
                        Some(value) => Some(value),
                        None => break 'parse None,
                    }
                } else {
                    None
                };
                let mut declarations = vec![VariableDeclaration { binding: first, value }];
                if self.expect_and_skip(&[TokenType::Comma], false) {
                    match self.parse_variable(kind) {
                        Some(VariableDeclarations(rest)) => declarations.extend(rest),
                        None => break 'parse None,
                    }
                }

                self.expect_and_skip(&[TokenType::Semicolon], true);
                let init_span = self.current_span();
                let init = Statement {
                    kind: StatementKind::Variable(VariableDeclarations(declarations)),
                    span: init_span,
                };
                break 'parse self.parse_classic_for_tail(scope, Some(Box::new(init)));
            }

            // Expression init.
            let expr = {
                self.no_in += 1;
                let expr = self.parse_expression();
                self.no_in -= 1;
                match expr {
                    Some(expr) => expr,
                    None => break 'parse None,
                }
            };

            match self.current().map(|t| t.ty) {
                Some(TokenType::In) => {
                    self.next();
                    if !expr.is_assignment_target() {
                        self.error(ErrorKind::InvalidAssignmentTarget(expr.span));
                        break 'parse None;
                    }
                    self.parse_for_each_tail(scope, ForBinding::Assignment(Box::new(expr)), true)
                }
                Some(TokenType::Identifier(s)) if s == sym::OF => {
                    self.next();
                    if !expr.is_assignment_target() {
                        self.error(ErrorKind::InvalidAssignmentTarget(expr.span));
                        break 'parse None;
                    }
                    self.parse_for_each_tail(scope, ForBinding::Assignment(Box::new(expr)), false)
                }
                _ => {
                    self.expect_and_skip(&[TokenType::Semicolon], true);
                    let span = expr.span;
                    let init = Statement {
                        kind: StatementKind::Expression(expr),
                        span,
                    };
                    self.parse_classic_for_tail(scope, Some(Box::new(init)))
                }
            }
        };

        self.exit_scope();
        result
    }

    fn parse_while(&mut self) -> Option<Loop> {
        self.expect_and_skip(&[TokenType::LeftParen], true);
        let condition = self.parse_expression()?;
        self.expect_and_skip(&[TokenType::RightParen], true);
        let body = self.parse_loop_body()?;
        Some(Loop::While(WhileLoop { condition, body }))
    }

    fn parse_do_while(&mut self) -> Option<Loop> {
        let body = self.parse_loop_body()?;
        self.expect_and_skip(&[TokenType::While], true);
        self.expect_and_skip(&[TokenType::LeftParen], true);
        let condition = self.parse_expression()?;
        self.expect_and_skip(&[TokenType::RightParen], true);
        // A semicolon is always inserted after do…while.
        self.expect_and_skip(&[TokenType::Semicolon], false);
        Some(Loop::DoWhile(DoWhileLoop { body, condition }))
    }

    fn parse_with(&mut self) -> Option<WithStatement> {
        self.expect_and_skip(&[TokenType::LeftParen], true);
        let object = self.parse_expression()?;
        self.expect_and_skip(&[TokenType::RightParen], true);

        // Everything lexically inside resolves names dynamically.
        self.with_depth += 1;
        let body = self.parse_statement();
        self.with_depth -= 1;

        Some(WithStatement {
            object,
            body: Box::new(body?),
        })
    }

    fn parse_function(&mut self) -> Option<FunctionDeclaration> {
        let start = self.current_span();
        let name = self.expect_identifier(false);

        self.expect_and_skip(&[TokenType::LeftParen], true);

        let scope = self.enter_scope(ScopeKind::Function);
        let saved_ctx = std::mem::take(&mut self.ctx);
        self.function_depth += 1;

        let result = (|| {
            let parameters = self.parse_parameter_list()?;
            self.expect_and_skip(&[TokenType::LeftBrace], true);
            let statements = self.parse_brace_delimited_statements();
            Some((parameters, statements))
        })();

        self.function_depth -= 1;
        self.ctx = saved_ctx;
        self.exit_scope();

        let (parameters, statements) = result?;

        Some(FunctionDeclaration {
            name,
            scope,
            parameters,
            statements,
            kind: FunctionKind::Function,
            span: self.span_from(start),
        })
    }

    fn parse_parameter_list(&mut self) -> Option<Vec<Parameter>> {
        let mut parameters = Vec::new();

        while !self.expect_and_skip(&[TokenType::RightParen], false) {
            if self.is_eof() {
                self.error(ErrorKind::UnexpectedEof);
                return None;
            }

            let rest = self.expect_and_skip(&[TokenType::Spread], false);

            let span = self.current_span();
            let pattern = self.parse_pattern()?;
            let default = if self.expect_and_skip(&[TokenType::Assignment], false) {
                Some(self.parse_assignment()?)
            } else {
                None
            };

            let mut names = Vec::new();
            pattern.bound_names(&mut names);
            for name in names {
                self.declare(name, DeclKind::Param, span);
            }

            parameters.push(Parameter { pattern, default, rest });

            if rest && !matches!(self.current().map(|t| t.ty), Some(TokenType::RightParen)) {
                self.error(ErrorKind::RestMustBeLast(span));
                return None;
            }

            self.expect_and_skip(&[TokenType::Comma], false);
        }

        Some(parameters)
    }
}

impl Parser<'_, '_> {
    /// Parses the `cond; update) body` tail of a classic for loop.
    fn parse_classic_for_tail(&mut self, scope: cinder_middle::parser::scope::ScopeId, init: Option<Box<Statement>>) -> Option<Loop> {
        let condition = if self.expect_and_skip(&[TokenType::Semicolon], false) {
            None
        } else {
            let condition = self.parse_expression()?;
            self.expect_and_skip(&[TokenType::Semicolon], true);
            Some(condition)
        };

        let finalizer = if matches!(self.current().map(|t| t.ty), Some(TokenType::RightParen)) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_and_skip(&[TokenType::RightParen], true);

        let body = self.parse_loop_body()?;

        Some(Loop::For(ForLoop {
            scope,
            init,
            condition,
            finalizer,
            body,
        }))
    }

    /// Parses the `<expr>) body` tail of a `for…in`/`for…of` loop.
    fn parse_for_each_tail(
        &mut self,
        scope: cinder_middle::parser::scope::ScopeId,
        binding: ForBinding,
        is_in: bool,
    ) -> Option<Loop> {
        let expr = self.parse_expression()?;
        self.expect_and_skip(&[TokenType::RightParen], true);
        let body = self.parse_loop_body()?;

        Some(if is_in {
            Loop::ForIn(ForInLoop {
                scope,
                binding,
                object: expr,
                body,
            })
        } else {
            Loop::ForOf(ForOfLoop {
                scope,
                binding,
                iterable: expr,
                body,
            })
        })
    }

    /// Parses the optional label of `break`/`continue`, respecting the
    /// no-line-terminator rule.
    fn parse_jump_label(&mut self) -> Option<Symbol> {
        if self.newline_before_current() {
            return None;
        }
        match self.current().and_then(|t| t.ty.as_identifier()) {
            Some(label) => {
                self.next();
                Some(label)
            }
            None => None,
        }
    }

    pub(crate) fn parse_property_name(&mut self) -> Option<PropertyName> {
        let tok = self.current()?;
        match tok.ty {
            TokenType::String(s) => {
                self.next();
                Some(PropertyName::Static(s))
            }
            TokenType::NumberDec(_)
            | TokenType::NumberHex(_)
            | TokenType::NumberBin(_)
            | TokenType::NumberOct(_)
            | TokenType::NumberLegacyOct(_) => {
                self.next();
                let value = self.number_value(tok.ty, tok.span);
                let sym = self.interner.intern(cinder_middle::util::format_f64(value));
                Some(PropertyName::Static(sym))
            }
            TokenType::LeftSquareBrace => {
                self.next();
                let expr = self.parse_assignment()?;
                self.expect_and_skip(&[TokenType::RightSquareBrace], true);
                Some(PropertyName::Computed(Box::new(expr)))
            }
            _ => {
                // Identifiers and keywords are all valid property names;
                // re-read the raw text so `{ delete: 1 }` works.
                let text = tok.span.res(self.input);
                if !text.is_empty() && text.bytes().all(cinder_middle::util::is_alpha) {
                    self.next();
                    let sym = self.interner.intern(text);
                    return Some(PropertyName::Static(sym));
                }
                self.error(ErrorKind::UnknownToken(tok));
                None
            }
        }
    }
}
