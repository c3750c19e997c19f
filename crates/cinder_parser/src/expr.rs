use std::rc::Rc;

use cinder_middle::interner::sym;
use cinder_middle::lexer::token::TokenType;
use cinder_middle::parser::error::ErrorKind;
use cinder_middle::parser::expr::{
    ArrayLiteral, ArrayMemberKind, AssignmentExpr, CallArgumentKind, Expr, ExprKind, FunctionCall,
    GroupingExpr, LiteralExpr, ObjectLiteral, ObjectMemberKind, TemplateLiteral, TemplateSegment,
    UnaryExpr,
};
use cinder_middle::parser::scope::{DeclKind, ScopeKind};
use cinder_middle::parser::statement::{
    ArrayPattern, FunctionDeclaration, FunctionKind, ObjectPattern, ObjectPatternField, Parameter,
    Pattern, PatternElement, PropertyName, ReturnStatement, Statement, StatementKind,
};
use cinder_middle::sourcemap::Span;

use crate::stmt::StatementParser;
use crate::Parser;

pub trait ExpressionParser {
    /// Parses a full expression, including the sequence (comma) operator.
    fn parse_expression(&mut self) -> Option<Expr>;
    /// Parses a single assignment-level expression (no top-level commas).
    fn parse_assignment(&mut self) -> Option<Expr>;
}

impl ExpressionParser for Parser<'_, '_> {
    fn parse_expression(&mut self) -> Option<Expr> {
        let mut expr = self.parse_assignment()?;

        while self.expect_and_skip(&[TokenType::Comma], false) {
            let right = self.parse_assignment()?;
            let span = expr.span.to(right.span);
            expr = Expr {
                kind: ExprKind::Sequence((Box::new(expr), Box::new(right))),
                span,
            };
        }

        Some(expr)
    }

    fn parse_assignment(&mut self) -> Option<Expr> {
        // `x => …` with a bare parameter
        if let Some(tok) = self.current() {
            if let TokenType::Identifier(name) = tok.ty {
                if self.tokens.get(self.idx + 1).map(|t| t.ty) == Some(TokenType::FatArrow) {
                    self.next();
                    self.next();
                    let parameter = Parameter {
                        pattern: Pattern::Identifier(name),
                        default: None,
                        rest: false,
                    };
                    return self.parse_arrow_body(vec![parameter], tok.span);
                }
            }
        }

        let left = self.parse_conditional()?;

        const ASSIGNMENT_OPS: &[TokenType] = &[
            TokenType::Assignment,
            TokenType::AdditionAssignment,
            TokenType::SubtractionAssignment,
            TokenType::MultiplicationAssignment,
            TokenType::DivisionAssignment,
            TokenType::RemainderAssignment,
            TokenType::ExponentiationAssignment,
            TokenType::LeftShiftAssignment,
            TokenType::RightShiftAssignment,
            TokenType::UnsignedRightShiftAssignment,
            TokenType::BitwiseAndAssignment,
            TokenType::BitwiseOrAssignment,
            TokenType::BitwiseXorAssignment,
            TokenType::LogicalAndAssignment,
            TokenType::LogicalOrAssignment,
            TokenType::LogicalNullishAssignment,
        ];

        let Some(op_token) = self.current().filter(|t| ASSIGNMENT_OPS.contains(&t.ty)) else {
            return Some(left);
        };
        self.next();

        let right = self.parse_assignment()?;
        let span = left.span.to(right.span);

        // Destructuring assignment: `[a, b] = c`, `{x} = y`
        if op_token.ty == TokenType::Assignment {
            if let ExprKind::Array(_) | ExprKind::Object(_) = left.kind {
                let Some(pattern) = self.expr_to_pattern(&left) else {
                    self.error(ErrorKind::InvalidAssignmentTarget(left.span));
                    return None;
                };
                return Some(Expr {
                    kind: ExprKind::Assignment(AssignmentExpr::new_pattern_place(pattern, right, op_token.ty)),
                    span,
                });
            }
        }

        if !left.is_assignment_target() {
            self.error(ErrorKind::InvalidAssignmentTarget(left.span));
            return None;
        }

        Some(Expr {
            kind: ExprKind::Assignment(AssignmentExpr::new_expr_place(left, right, op_token.ty)),
            span,
        })
    }
}

/// Each binary precedence level follows the same shape; this cuts the
/// boilerplate of writing the loop a dozen times.
macro_rules! binary_level {
    ($name:ident, $next:ident, $ops:expr) => {
        fn $name(&mut self) -> Option<Expr> {
            let mut left = self.$next()?;
            while let Some(tok) = self.current() {
                if !$ops.contains(&tok.ty) {
                    break;
                }
                if tok.ty == TokenType::In && self.no_in > 0 {
                    break;
                }
                self.next();
                let right = self.$next()?;
                left = Expr::binary(left, right, tok.ty);
            }
            Some(left)
        }
    };
}

impl Parser<'_, '_> {
    fn parse_conditional(&mut self) -> Option<Expr> {
        let condition = self.parse_nullish()?;

        if !self.expect_and_skip(&[TokenType::Conditional], false) {
            return Some(condition);
        }

        let then = self.parse_assignment()?;
        self.expect_and_skip(&[TokenType::Colon], true);
        let el = self.parse_assignment()?;

        Some(Expr::conditional(condition, then, el))
    }

    binary_level!(parse_nullish, parse_logical_or, [TokenType::NullishCoalescing]);
    binary_level!(parse_logical_or, parse_logical_and, [TokenType::LogicalOr]);
    binary_level!(parse_logical_and, parse_bitwise_or, [TokenType::LogicalAnd]);
    binary_level!(parse_bitwise_or, parse_bitwise_xor, [TokenType::BitwiseOr]);
    binary_level!(parse_bitwise_xor, parse_bitwise_and, [TokenType::BitwiseXor]);
    binary_level!(parse_bitwise_and, parse_equality, [TokenType::BitwiseAnd]);
    binary_level!(
        parse_equality,
        parse_relational,
        [
            TokenType::Equality,
            TokenType::Inequality,
            TokenType::StrictEquality,
            TokenType::StrictInequality
        ]
    );
    binary_level!(
        parse_relational,
        parse_shift,
        [
            TokenType::Greater,
            TokenType::GreaterEqual,
            TokenType::Less,
            TokenType::LessEqual,
            TokenType::In,
            TokenType::Instanceof
        ]
    );
    binary_level!(
        parse_shift,
        parse_additive,
        [
            TokenType::LeftShift,
            TokenType::RightShift,
            TokenType::UnsignedRightShift
        ]
    );
    binary_level!(parse_additive, parse_multiplicative, [TokenType::Plus, TokenType::Minus]);
    binary_level!(
        parse_multiplicative,
        parse_exponentiation,
        [TokenType::Star, TokenType::Slash, TokenType::Remainder]
    );

    /// `**` is right-associative.
    fn parse_exponentiation(&mut self) -> Option<Expr> {
        let left = self.parse_unary()?;
        if self.expect_and_skip(&[TokenType::Exponentiation], false) {
            let right = self.parse_exponentiation()?;
            return Some(Expr::binary(left, right, TokenType::Exponentiation));
        }
        Some(left)
    }

    fn parse_unary(&mut self) -> Option<Expr> {
        let tok = self.current()?;
        match tok.ty {
            TokenType::LogicalNot
            | TokenType::BitwiseNot
            | TokenType::Plus
            | TokenType::Minus
            | TokenType::Typeof
            | TokenType::Void
            | TokenType::Delete => {
                self.next();
                let expr = self.parse_unary()?;
                let span = tok.span.to(expr.span);
                Some(Expr {
                    kind: ExprKind::Unary(UnaryExpr::new(tok.ty, expr)),
                    span,
                })
            }
            TokenType::Increment | TokenType::Decrement => {
                self.next();
                let expr = self.parse_unary()?;
                if !expr.is_assignment_target() {
                    self.error(ErrorKind::InvalidAssignmentTarget(expr.span));
                    return None;
                }
                let span = tok.span.to(expr.span);
                Some(Expr {
                    kind: ExprKind::Prefix((tok.ty, Box::new(expr))),
                    span,
                })
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Option<Expr> {
        let expr = self.parse_member_chain(true)?;

        // Restricted production: no line terminator before postfix `++`/`--`.
        if let Some(tok) = self.current() {
            if matches!(tok.ty, TokenType::Increment | TokenType::Decrement) && !tok.newline_before {
                if !expr.is_assignment_target() {
                    self.error(ErrorKind::InvalidAssignmentTarget(expr.span));
                    return None;
                }
                self.next();
                let span = expr.span.to(tok.span);
                return Some(Expr {
                    kind: ExprKind::Postfix((tok.ty, Box::new(expr))),
                    span,
                });
            }
        }

        Some(expr)
    }

    /// Parses a member/call chain. When `allow_call` is false (inside `new`),
    /// call parentheses end the chain and belong to the constructor.
    fn parse_member_chain(&mut self, allow_call: bool) -> Option<Expr> {
        let mut expr = if self.expect_and_skip(&[TokenType::New], false) {
            let new_span = self.previous()?.span;
            let target = self.parse_member_chain(false)?;

            let arguments = if matches!(self.current().map(|t| t.ty), Some(TokenType::LeftParen)) {
                self.next();
                self.parse_call_arguments()?
            } else {
                Vec::new()
            };

            let span = new_span.to(self.previous()?.span);
            Expr {
                kind: ExprKind::Call(FunctionCall {
                    constructor_call: true,
                    optional: false,
                    target: Box::new(target),
                    arguments,
                }),
                span,
            }
        } else {
            self.parse_primary()?
        };

        let mut has_optional = false;

        loop {
            let Some(tok) = self.current() else { break };

            match tok.ty {
                TokenType::Dot => {
                    self.next();
                    let property = self.parse_member_name()?;
                    let span = expr.span.to(self.previous()?.span);
                    expr = Expr::property_access(false, false, expr, property, span);
                }
                TokenType::OptionalChaining => {
                    self.next();
                    has_optional = true;

                    match self.current().map(|t| t.ty) {
                        Some(TokenType::LeftParen) => {
                            self.next();
                            let arguments = self.parse_call_arguments()?;
                            let span = expr.span.to(self.previous()?.span);
                            expr = Expr {
                                kind: ExprKind::Call(FunctionCall {
                                    constructor_call: false,
                                    optional: true,
                                    target: Box::new(expr),
                                    arguments,
                                }),
                                span,
                            };
                        }
                        Some(TokenType::LeftSquareBrace) => {
                            self.next();
                            let property = self.parse_expression()?;
                            self.expect_and_skip(&[TokenType::RightSquareBrace], true);
                            let span = expr.span.to(self.previous()?.span);
                            expr = Expr::property_access(true, true, expr, property, span);
                        }
                        _ => {
                            let property = self.parse_member_name()?;
                            let span = expr.span.to(self.previous()?.span);
                            expr = Expr::property_access(false, true, expr, property, span);
                        }
                    }
                }
                TokenType::LeftSquareBrace => {
                    self.next();
                    let property = self.parse_expression()?;
                    self.expect_and_skip(&[TokenType::RightSquareBrace], true);
                    let span = expr.span.to(self.previous()?.span);
                    expr = Expr::property_access(true, false, expr, property, span);
                }
                TokenType::LeftParen if allow_call => {
                    self.next();
                    let arguments = self.parse_call_arguments()?;
                    let span = expr.span.to(self.previous()?.span);
                    expr = Expr {
                        kind: ExprKind::Call(FunctionCall {
                            constructor_call: false,
                            optional: false,
                            target: Box::new(expr),
                            arguments,
                        }),
                        span,
                    };
                }
                _ => break,
            }
        }

        if has_optional {
            let span = expr.span;
            expr = Expr {
                kind: ExprKind::Chain(Box::new(expr)),
                span,
            };
        }

        Some(expr)
    }

    /// A property name after `.` or `?.`: identifiers and any keyword.
    fn parse_member_name(&mut self) -> Option<Expr> {
        let tok = self.current()?;
        let text = tok.span.res(self.input);
        if !text.is_empty() && text.bytes().all(cinder_middle::util::is_alpha) {
            self.next();
            let sym = self.interner.intern(text);
            return Some(Expr::identifier(sym, tok.span));
        }
        self.error(ErrorKind::UnknownToken(tok));
        None
    }

    /// Parses call arguments, assuming `(` has been consumed; consumes `)`.
    fn parse_call_arguments(&mut self) -> Option<Vec<CallArgumentKind>> {
        let mut arguments = Vec::new();

        while !self.expect_and_skip(&[TokenType::RightParen], false) {
            if self.is_eof() {
                self.error(ErrorKind::UnexpectedEof);
                return None;
            }

            if self.expect_and_skip(&[TokenType::Spread], false) {
                arguments.push(CallArgumentKind::Spread(self.parse_assignment()?));
            } else {
                arguments.push(CallArgumentKind::Normal(self.parse_assignment()?));
            }

            self.expect_and_skip(&[TokenType::Comma], false);
        }

        Some(arguments)
    }

    fn parse_primary(&mut self) -> Option<Expr> {
        let tok = self.current()?;

        let expr = match tok.ty {
            TokenType::TrueLit => {
                self.next();
                Expr {
                    kind: ExprKind::Literal(LiteralExpr::Boolean(true)),
                    span: tok.span,
                }
            }
            TokenType::FalseLit => {
                self.next();
                Expr {
                    kind: ExprKind::Literal(LiteralExpr::Boolean(false)),
                    span: tok.span,
                }
            }
            TokenType::NullLit => {
                self.next();
                Expr {
                    kind: ExprKind::Literal(LiteralExpr::Null),
                    span: tok.span,
                }
            }
            TokenType::This => {
                self.next();
                Expr {
                    kind: ExprKind::This,
                    span: tok.span,
                }
            }
            TokenType::Identifier(ident) => {
                self.next();
                if ident == sym::UNDEFINED {
                    Expr {
                        kind: ExprKind::Literal(LiteralExpr::Undefined),
                        span: tok.span,
                    }
                } else {
                    Expr::identifier(ident, tok.span)
                }
            }
            TokenType::String(s) => {
                self.next();
                Expr::string_literal(s, tok.span)
            }
            TokenType::NumberDec(_)
            | TokenType::NumberHex(_)
            | TokenType::NumberBin(_)
            | TokenType::NumberOct(_)
            | TokenType::NumberLegacyOct(_)
            | TokenType::BigIntSuffixed(_) => {
                self.next();
                let value = self.number_value(tok.ty, tok.span);
                Expr::number_literal(value, tok.span)
            }
            TokenType::RegexLiteral { literal, flags } => {
                self.next();
                Expr {
                    kind: ExprKind::Literal(LiteralExpr::Regex(literal, flags)),
                    span: tok.span,
                }
            }
            TokenType::TemplateSegment { .. } => self.parse_template()?,
            TokenType::LeftParen => {
                if let Some(arrow) = self.try_parse_parenthesized_arrow() {
                    arrow
                } else {
                    self.next();
                    let mut exprs = Vec::new();
                    loop {
                        exprs.push(self.parse_assignment()?);
                        if !self.expect_and_skip(&[TokenType::Comma], false) {
                            break;
                        }
                    }
                    self.expect_and_skip(&[TokenType::RightParen], true);
                    Expr::grouping(exprs)
                }
            }
            TokenType::LeftSquareBrace => self.parse_array_literal()?,
            TokenType::LeftBrace => self.parse_object_literal()?,
            TokenType::Function => {
                self.next();
                let function = self.parse_function()?;
                Expr {
                    span: function.span,
                    kind: ExprKind::Function(Rc::new(function)),
                }
            }
            TokenType::Reserved(_) => {
                self.error(ErrorKind::ReservedWord(tok.span));
                return None;
            }
            _ => {
                self.error(ErrorKind::UnknownToken(tok));
                return None;
            }
        };

        Some(expr)
    }

    fn parse_array_literal(&mut self) -> Option<Expr> {
        let start = self.current()?.span;
        self.next();

        let mut members = Vec::new();
        while !self.expect_and_skip(&[TokenType::RightSquareBrace], false) {
            if self.is_eof() {
                self.error(ErrorKind::UnexpectedEof);
                return None;
            }

            if self.expect_and_skip(&[TokenType::Comma], false) {
                members.push(ArrayMemberKind::Hole);
                continue;
            }

            if self.expect_and_skip(&[TokenType::Spread], false) {
                members.push(ArrayMemberKind::Spread(self.parse_assignment()?));
            } else {
                members.push(ArrayMemberKind::Item(self.parse_assignment()?));
            }

            self.expect_and_skip(&[TokenType::Comma], false);
        }

        Some(Expr {
            span: start.to(self.previous()?.span),
            kind: ExprKind::Array(ArrayLiteral(members)),
        })
    }

    fn parse_object_literal(&mut self) -> Option<Expr> {
        let start = self.current()?.span;
        self.next();

        let mut members = Vec::new();
        while !self.expect_and_skip(&[TokenType::RightBrace], false) {
            if self.is_eof() {
                self.error(ErrorKind::UnexpectedEof);
                return None;
            }

            if self.expect_and_skip(&[TokenType::Spread], false) {
                let value = self.parse_assignment()?;
                members.push((ObjectMemberKind::Spread, value));
                self.expect_and_skip(&[TokenType::Comma], false);
                continue;
            }

            // `get`/`set` accessors: the keyword is followed by another
            // property name rather than `:`/`(`/`,`/`}`.
            let accessor = match self.current().map(|t| t.ty) {
                Some(TokenType::Identifier(name)) if (name == sym::GET || name == sym::SET) => {
                    let next_ty = self.tokens.get(self.idx + 1).map(|t| t.ty);
                    match next_ty {
                        Some(
                            TokenType::Colon
                            | TokenType::Comma
                            | TokenType::RightBrace
                            | TokenType::LeftParen
                            | TokenType::Assignment,
                        )
                        | None => None,
                        _ => Some(name == sym::GET),
                    }
                }
                _ => None,
            };

            if let Some(is_getter) = accessor {
                self.next();
                let key = self.parse_property_name()?;
                let PropertyName::Static(name) = key else {
                    self.error(ErrorKind::InvalidAssignmentTarget(start));
                    return None;
                };
                self.expect_and_skip(&[TokenType::LeftParen], true);
                let function = self.parse_accessor_function()?;
                let kind = if is_getter {
                    ObjectMemberKind::Getter(name)
                } else {
                    ObjectMemberKind::Setter(name)
                };
                let span = function.span;
                members.push((
                    kind,
                    Expr {
                        kind: ExprKind::Function(Rc::new(function)),
                        span,
                    },
                ));
                self.expect_and_skip(&[TokenType::Comma], false);
                continue;
            }

            let key_span = self.current_span();
            let key = self.parse_property_name()?;

            match self.current().map(|t| t.ty) {
                // `{ m() {} }`: shorthand method
                Some(TokenType::LeftParen) => {
                    self.next();
                    let function = self.parse_accessor_function()?;
                    let (kind, span) = match key {
                        PropertyName::Static(name) => (ObjectMemberKind::Static(name), function.span),
                        PropertyName::Computed(expr) => (ObjectMemberKind::Dynamic(*expr), function.span),
                    };
                    members.push((
                        kind,
                        Expr {
                            kind: ExprKind::Function(Rc::new(function)),
                            span,
                        },
                    ));
                }
                // `{ k: v }`
                Some(TokenType::Colon) => {
                    self.next();
                    let value = self.parse_assignment()?;
                    let kind = match key {
                        PropertyName::Static(name) => ObjectMemberKind::Static(name),
                        PropertyName::Computed(expr) => ObjectMemberKind::Dynamic(*expr),
                    };
                    members.push((kind, value));
                }
                // `{ x }`: shorthand
                _ => {
                    let PropertyName::Static(name) = key else {
                        self.error(ErrorKind::InvalidAssignmentTarget(key_span));
                        return None;
                    };
                    members.push((ObjectMemberKind::Static(name), Expr::identifier(name, key_span)));
                }
            }

            self.expect_and_skip(&[TokenType::Comma], false);
        }

        Some(Expr {
            span: start.to(self.previous()?.span),
            kind: ExprKind::Object(ObjectLiteral(members)),
        })
    }

    /// Parses a method or accessor body, with `(` already consumed.
    fn parse_accessor_function(&mut self) -> Option<FunctionDeclaration> {
        let start = self.previous()?.span;
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
            name: None,
            scope,
            parameters,
            statements,
            kind: FunctionKind::Function,
            span: self.span_from(start),
        })
    }

    fn parse_template(&mut self) -> Option<Expr> {
        let start = self.current()?.span;
        let mut segments = Vec::new();
        let mut end = start;

        loop {
            let tok = self.current()?;
            let TokenType::TemplateSegment { text, interpolated } = tok.ty else {
                self.error(ErrorKind::UnknownToken(tok));
                return None;
            };
            self.next();
            end = tok.span;

            if text != sym::EMPTY {
                segments.push(TemplateSegment::String(text));
            }

            if !interpolated {
                break;
            }

            segments.push(TemplateSegment::Expr(self.parse_expression()?));
        }

        Some(Expr {
            span: start.to(end),
            kind: ExprKind::TemplateLiteral(TemplateLiteral { segments }),
        })
    }

    /// Attempts to reparse from a `(` as an arrow-function parameter list.
    /// On failure the cursor and error list are rolled back and the caller
    /// parses a grouping instead.
    fn try_parse_parenthesized_arrow(&mut self) -> Option<Expr> {
        let start_idx = self.idx;
        let errors_len = self.errors.len();
        let start_span = self.current()?.span;

        self.next(); // consume `(`

        let parameters = self.parse_parameter_list_syntax();
        let is_arrow = parameters.is_some() && self.current().map(|t| t.ty) == Some(TokenType::FatArrow);

        if !is_arrow {
            self.idx = start_idx;
            self.errors.truncate(errors_len);
            self.error_sync = false;
            return None;
        }

        self.next(); // consume `=>`
        self.parse_arrow_body(parameters.unwrap(), start_span)
    }

    /// Parses arrow parameters without declaring names; declaration happens
    /// once the `=>` confirms this really is an arrow function.
    fn parse_parameter_list_syntax(&mut self) -> Option<Vec<Parameter>> {
        let mut parameters = Vec::new();

        while !self.expect_and_skip(&[TokenType::RightParen], false) {
            if self.is_eof() {
                return None;
            }

            let rest = self.expect_and_skip(&[TokenType::Spread], false);
            let pattern = self.parse_pattern()?;
            let default = if self.expect_and_skip(&[TokenType::Assignment], false) {
                Some(self.parse_assignment()?)
            } else {
                None
            };

            parameters.push(Parameter { pattern, default, rest });

            if rest && !matches!(self.current().map(|t| t.ty), Some(TokenType::RightParen)) {
                return None;
            }

            if !self.expect_and_skip(&[TokenType::Comma], false)
                && !matches!(self.current().map(|t| t.ty), Some(TokenType::RightParen))
            {
                return None;
            }
        }

        Some(parameters)
    }

    /// Parses an arrow body (expression or block) and assembles the function.
    fn parse_arrow_body(&mut self, parameters: Vec<Parameter>, start_span: Span) -> Option<Expr> {
        let scope = self.enter_scope(ScopeKind::Function);
        let saved_ctx = std::mem::take(&mut self.ctx);
        self.function_depth += 1;

        let result = (|| {
            for parameter in &parameters {
                let mut names = Vec::new();
                parameter.pattern.bound_names(&mut names);
                for name in names {
                    self.declare(name, DeclKind::Param, start_span);
                }
            }

            if self.expect_and_skip(&[TokenType::LeftBrace], false) {
                Some(self.parse_brace_delimited_statements())
            } else {
                let expr = self.parse_assignment()?;
                let span = expr.span;
                Some(vec![Statement {
                    kind: StatementKind::Return(ReturnStatement(Some(expr))),
                    span,
                }])
            }
        })();

        self.function_depth -= 1;
        self.ctx = saved_ctx;
        self.exit_scope();

        let statements = result?;
        let span = self.span_from(start_span);

        Some(Expr {
            span,
            kind: ExprKind::Function(Rc::new(FunctionDeclaration {
                name: None,
                scope,
                parameters,
                statements,
                kind: FunctionKind::Arrow,
                span,
            })),
        })
    }

    /// Reinterprets an array/object literal as a destructuring pattern.
    /// Only identifier leaves are supported as targets.
    fn expr_to_pattern(&mut self, expr: &Expr) -> Option<Pattern> {
        match &expr.kind {
            ExprKind::Literal(LiteralExpr::Identifier(name)) => Some(Pattern::Identifier(*name)),
            ExprKind::Array(ArrayLiteral(members)) => {
                let mut elements = Vec::new();
                let mut rest = None;
                for (i, member) in members.iter().enumerate() {
                    match member {
                        ArrayMemberKind::Hole => elements.push(None),
                        ArrayMemberKind::Item(item) => {
                            let (target, default) = match &item.kind {
                                ExprKind::Assignment(AssignmentExpr {
                                    left: cinder_middle::parser::expr::AssignmentTarget::Expr(left),
                                    right,
                                    operator: TokenType::Assignment,
                                }) => (self.expr_to_pattern(left)?, Some((**right).clone())),
                                _ => (self.expr_to_pattern(item)?, None),
                            };
                            elements.push(Some(PatternElement {
                                pattern: target,
                                default,
                            }));
                        }
                        ArrayMemberKind::Spread(item) => {
                            if i != members.len() - 1 {
                                return None;
                            }
                            rest = Some(Box::new(self.expr_to_pattern(item)?));
                        }
                    }
                }
                Some(Pattern::Array(ArrayPattern { elements, rest }))
            }
            ExprKind::Object(ObjectLiteral(members)) => {
                let mut fields = Vec::new();
                for (kind, value) in members {
                    match kind {
                        ObjectMemberKind::Static(name) => {
                            let (target, default) = match &value.kind {
                                ExprKind::Literal(LiteralExpr::Identifier(id)) if id == name => (None, None),
                                ExprKind::Assignment(AssignmentExpr {
                                    left: cinder_middle::parser::expr::AssignmentTarget::Expr(left),
                                    right,
                                    operator: TokenType::Assignment,
                                }) => (Some(self.expr_to_pattern(left)?), Some((**right).clone())),
                                _ => (Some(self.expr_to_pattern(value)?), None),
                            };
                            fields.push(ObjectPatternField {
                                key: PropertyName::Static(*name),
                                target,
                                default,
                            });
                        }
                        _ => return None,
                    }
                }
                Some(Pattern::Object(ObjectPattern { fields, rest: None }))
            }
            ExprKind::Grouping(GroupingExpr(group)) if group.len() == 1 => self.expr_to_pattern(&group[0]),
            _ => None,
        }
    }
}
