use std::borrow::Cow;
use std::ops::Range;

use cinder_middle::interner::{sym, StringInterner, Symbol};
use cinder_middle::lexer::error::{Error, ErrorKind};
use cinder_middle::lexer::token::{as_token, Token, TokenType};
use cinder_middle::sourcemap::Span;
use cinder_middle::util;

/// The source code lexer.
///
/// Produces a flat token stream. Automatic semicolon insertion is not
/// performed here; every token records whether a line terminator preceded
/// it and the parser decides.
#[derive(Debug)]
pub struct Lexer<'a, 'interner> {
    input: &'a str,

    tokens: Vec<Token>,
    errors: Vec<Error>,

    interner: &'interner mut StringInterner,

    idx: usize,
    start: usize,
    /// Set when a line terminator was seen since the last emitted token;
    /// consumed into `Token::newline_before`.
    newline_pending: bool,
    /// Brace-depth stack for template literals. A counter is pushed when
    /// `${` opens an interpolation; when it drops back to zero the lexer
    /// returns to template-body mode.
    template_depths: Vec<usize>,
}

impl<'a, 'interner> Lexer<'a, 'interner> {
    pub fn new(interner: &'interner mut StringInterner, source: &'a str) -> Self {
        assert!(source.len() <= u32::MAX as usize);
        Self {
            input: source,
            idx: 0,
            start: 0,
            newline_pending: false,
            interner,
            template_depths: Vec::new(),
            errors: Vec::new(),
            tokens: Vec::new(),
        }
    }

    /// Drives this lexer to completion.
    pub fn scan_all(mut self) -> Result<Vec<Token>, Vec<Error>> {
        while !self.is_eof() {
            self.scan_next();
        }
        if self.errors.is_empty() {
            Ok(self.tokens)
        } else {
            Err(self.errors)
        }
    }

    fn is_eof(&self) -> bool {
        self.idx >= self.input.len()
    }

    fn at(&self, index: usize) -> Option<u8> {
        self.input.as_bytes().get(index).copied()
    }

    fn current(&self) -> Option<u8> {
        self.at(self.idx)
    }

    fn peek(&self) -> Option<u8> {
        self.at(self.idx + 1)
    }

    /// Returns the current byte, without returning an Option
    fn current_real(&self) -> u8 {
        self.at(self.idx).unwrap()
    }

    fn next_char(&mut self) -> Option<u8> {
        let cur = self.current()?;
        self.advance();
        Some(cur)
    }

    fn advance(&mut self) {
        self.idx += 1;
    }

    fn advance_n(&mut self, n: usize) {
        self.idx += n;
    }

    fn subslice(&self, r: Range<usize>) -> &'a str {
        &self.input[r]
    }

    fn get_lexeme(&self) -> &'a str {
        &self.input[self.start..self.idx]
    }

    /// Creates a span based on the current location
    fn span(&self) -> Span {
        Span {
            lo: self.start as u32,
            hi: self.idx as u32,
        }
    }

    fn create_token(&mut self, ty: TokenType) {
        let tok = Token {
            ty,
            span: self.span(),
            newline_before: std::mem::take(&mut self.newline_pending),
        };
        self.tokens.push(tok);
    }

    /// Creates a token by matching the next bytes against candidates.
    ///
    /// Candidates must be ordered longest-first so that `>>>=` wins over `>>`.
    fn create_conditional_token(&mut self, default: TokenType, tokens: &[(&str, TokenType)]) {
        for (expect, token) in tokens {
            let from = self.idx;
            let to = (from + expect.len()).min(self.input.len());

            if self.subslice(from..to) == *expect {
                self.idx += expect.len();
                self.create_token(*token);
                return;
            }
        }

        self.create_token(default);
    }

    fn create_error(&mut self, kind: ErrorKind) {
        self.errors.push(Error { kind, span: self.span() });
    }

    /// Expects the current byte to be `expected` and advances the stream if matched
    fn expect_and_skip(&mut self, expected: u8) -> bool {
        match self.current() {
            Some(cur) if cur == expected => {
                self.advance();
                true
            }
            _ => false,
        }
    }

    /// Decodes one escape sequence into `out`. The cursor is on the byte
    /// after the backslash.
    fn read_escape_sequence(&mut self, out: &mut String) {
        let Some(escape) = self.current() else {
            return self.create_error(ErrorKind::UnexpectedEof);
        };

        match escape {
            b'n' | b't' | b'r' | b'b' | b'f' | b'v' | b'0' => {
                out.push(match escape {
                    b'n' => '\n',
                    b't' => '\t',
                    b'r' => '\r',
                    b'b' => '\x08',
                    b'f' => '\x0C',
                    b'v' => '\x0B',
                    b'0' => '\0',
                    _ => unreachable!(),
                });
                self.advance();
            }
            b'x' => {
                self.advance();
                match self
                    .input
                    .get(self.idx..self.idx + 2)
                    .map(|hex| u8::from_str_radix(hex, 16))
                {
                    Some(Ok(num)) => {
                        out.push(num as char);
                        self.advance_n(2);
                    }
                    Some(Err(_)) => self.create_error(ErrorKind::InvalidEscapeSequence),
                    None => self.create_error(ErrorKind::UnexpectedEof),
                }
            }
            b'u' => {
                self.advance();
                if self.current() == Some(b'{') {
                    // \u{1F600}
                    self.advance();
                    let digits_start = self.idx;
                    while self.current().is_some_and(util::is_hex_digit) {
                        self.advance();
                    }
                    let digits = self.subslice(digits_start..self.idx);
                    if !self.expect_and_skip(b'}') {
                        return self.create_error(ErrorKind::InvalidEscapeSequence);
                    }
                    match u32::from_str_radix(digits, 16).ok().and_then(char::from_u32) {
                        Some(c) => out.push(c),
                        None => self.create_error(ErrorKind::InvalidEscapeSequence),
                    }
                } else {
                    match self
                        .input
                        .get(self.idx..self.idx + 4)
                        .map(|hex| u16::from_str_radix(hex, 16))
                    {
                        Some(Ok(num)) => {
                            // Lone surrogates degrade to the replacement
                            // character; code-unit arithmetic happens on the
                            // runtime string type, not here.
                            out.push(char::from_u32(num as u32).unwrap_or(char::REPLACEMENT_CHARACTER));
                            self.advance_n(4);
                        }
                        Some(Err(_)) => self.create_error(ErrorKind::InvalidEscapeSequence),
                        None => self.create_error(ErrorKind::UnexpectedEof),
                    }
                }
            }
            b'\n' => {
                // Line continuation
                self.newline_pending = true;
                self.advance();
            }
            other if !other.is_ascii() => {
                let (c, len) = util::next_char_in_bytes(&self.input.as_bytes()[self.idx..]);
                out.push(c);
                self.advance_n(len);
            }
            other => {
                out.push(other as char);
                self.advance();
            }
        }
    }

    /// Reads a string literal.
    ///
    /// This function expects to be one byte ahead of a quote.
    fn read_string_literal(&mut self) {
        let quote = self.at(self.idx - 1).unwrap();
        let mut found_quote = false;

        // Borrow from the input until the first escape forces an owned buffer.
        let mut decoded: Option<String> = None;
        let mut segment_start = self.idx;

        while !self.is_eof() {
            let cur = self.current_real();
            if cur == quote {
                self.advance();
                found_quote = true;
                break;
            }

            if cur == b'\n' {
                self.newline_pending = true;
                break;
            }

            if cur == b'\\' {
                let segment = self.subslice(segment_start..self.idx);
                let buf = decoded.get_or_insert_with(String::new);
                buf.push_str(segment);
                self.advance();
                let mut buf = decoded.take().unwrap();
                self.read_escape_sequence(&mut buf);
                decoded = Some(buf);
                segment_start = self.idx;
                continue;
            }

            self.advance();
        }

        if !found_quote {
            return self.create_error(ErrorKind::UnterminatedString);
        }

        let lexeme = match decoded {
            None => Cow::Borrowed(self.subslice(self.start + 1..self.idx - 1)),
            Some(mut buf) => {
                buf.push_str(self.subslice(segment_start..self.idx - 1));
                Cow::Owned(buf)
            }
        };

        let sym = self.interner.intern(lexeme);
        self.create_token(TokenType::String(sym));
    }

    /// Reads one chunk of a template literal, either from the opening
    /// backtick or from the `}` that closed an interpolation.
    fn read_template_segment(&mut self) {
        let chunk_start = self.idx;
        let mut buf = String::new();
        let mut plain_start = self.idx;
        let mut ended = None;

        while !self.is_eof() {
            let cur = self.current_real();
            match cur {
                b'`' => {
                    ended = Some(false);
                    break;
                }
                b'$' if self.peek() == Some(b'{') => {
                    ended = Some(true);
                    break;
                }
                b'\\' => {
                    buf.push_str(self.subslice(plain_start..self.idx));
                    self.advance();
                    self.read_escape_sequence(&mut buf);
                    plain_start = self.idx;
                }
                _ => {
                    if cur == b'\n' {
                        self.newline_pending = true;
                    }
                    self.advance();
                }
            }
        }

        let Some(interpolated) = ended else {
            return self.create_error(ErrorKind::UnterminatedString);
        };

        buf.push_str(self.subslice(plain_start..self.idx));

        if interpolated {
            // Consume `${` and switch to expression mode.
            self.advance_n(2);
            self.template_depths.push(1);
        } else {
            // Consume the closing backtick.
            self.advance();
        }

        // The span covers the raw chunk, without delimiters.
        self.start = chunk_start;
        let sym = self.interner.intern(&*buf);
        self.create_token(TokenType::TemplateSegment {
            text: sym,
            interpolated,
        });
    }

    /// Reads a prefixed number literal (0x, 0b, 0o)
    fn read_prefixed_literal<P>(&mut self, ty_ctor: fn(Symbol) -> TokenType, predicate: P)
    where
        P: Fn(u8) -> bool,
    {
        // Skip the prefix character (the `0` was consumed by the caller)
        self.advance();

        while !self.is_eof() {
            let cur = self.current_real();
            if cur == b'_' || predicate(cur) {
                self.advance();
            } else {
                break;
            }
        }

        let sym = self.interner.intern(self.get_lexeme());
        if self.expect_and_skip(b'n') {
            self.create_token(TokenType::BigIntSuffixed(sym));
        } else {
            self.create_token(ty_ctor(sym));
        }
    }

    /// Reads a decimal number literal, or a legacy `0755` octal.
    fn read_number_literal(&mut self, first: u8) {
        let mut is_float = first == b'.';
        let mut is_exp = false;

        // `0` followed directly by octal digits is the legacy octal form.
        if first == b'0' && self.current().is_some_and(util::is_octal_digit) {
            while self.current().is_some_and(util::is_octal_digit) {
                self.advance();
            }
            // A `8` or `9` after octal digits means this was decimal all
            // along (e.g. `0789`), fall through to the decimal scanner.
            if !self.current().is_some_and(util::is_digit) {
                let sym = self.interner.intern(self.get_lexeme());
                return self.create_token(TokenType::NumberLegacyOct(sym));
            }
        }

        while !self.is_eof() {
            let cur = self.current_real();

            match cur {
                b'.' => {
                    if is_float || is_exp {
                        break;
                    }
                    // `1.toString()` lexes the dot as a member access.
                    if !self.peek().is_some_and(util::is_digit) {
                        break;
                    }
                    is_float = true;
                }
                b'e' | b'E' => {
                    if is_exp {
                        break;
                    }
                    // Handle a sign after the exponent, like 1e-5
                    if matches!(self.peek(), Some(b'-' | b'+')) {
                        self.advance();
                    }
                    is_exp = true;
                }
                b'_' => {}
                _ => {
                    if !util::is_digit(cur) {
                        break;
                    }
                }
            }

            self.advance();
        }

        let sym = self.interner.intern(self.get_lexeme());
        if !is_float && !is_exp && self.expect_and_skip(b'n') {
            self.create_token(TokenType::BigIntSuffixed(sym));
        } else {
            self.create_token(TokenType::NumberDec(sym));
        }
    }

    /// Assumes one character has already been read.
    fn read_identifier_raw(&mut self) -> Symbol {
        let start = self.idx - 1;
        while !self.is_eof() {
            if !util::is_alpha(self.current_real()) {
                break;
            }
            self.advance();
        }

        self.interner.intern(self.subslice(start..self.idx))
    }

    fn read_identifier(&mut self) {
        let sym = self.read_identifier_raw();
        self.create_token(as_token(sym));
    }

    /// Reads a regex literal, assuming the cursor is one byte past the `/`.
    ///
    /// No real regex parsing happens here; the body is skipped to the
    /// closing `/` (escapes and character classes considered) and compiled
    /// by the runtime.
    fn read_regex_literal(&mut self) {
        let mut in_class = false;
        while !self.is_eof() {
            let c = self.next_char().unwrap();
            match c {
                b'\\' => self.advance(),
                b'[' => in_class = true,
                b']' => in_class = false,
                b'/' if !in_class => break,
                _ => {}
            }
        }

        let literal = self.interner.intern(self.get_lexeme());

        let flags = if self.current().is_some_and(util::is_alpha) {
            self.advance(); // identifier reading requires one character to be read
            self.read_identifier_raw()
        } else {
            sym::EMPTY
        };

        self.create_token(TokenType::RegexLiteral { literal, flags });
    }

    /// Whether a `/` at the current position starts a regex literal, judged
    /// by the previous significant token. A preceding operator, punctuator
    /// or expression-expecting keyword means a regex; a preceding value
    /// means division.
    fn regex_can_start_here(&self) -> bool {
        const EXPRESSION_KEYWORDS: &[TokenType] = &[
            TokenType::Return,
            TokenType::Typeof,
            TokenType::Delete,
            TokenType::In,
            TokenType::Of,
            TokenType::Instanceof,
            TokenType::New,
            TokenType::Throw,
            TokenType::Void,
            TokenType::Case,
            TokenType::Do,
            TokenType::Else,
        ];

        match self.tokens.last() {
            None => true,
            Some(token) => match token.ty {
                // After a value or closing bracket `/` is division.
                TokenType::Identifier(_)
                | TokenType::String(_)
                | TokenType::TemplateSegment { .. }
                | TokenType::NumberDec(_)
                | TokenType::NumberHex(_)
                | TokenType::NumberBin(_)
                | TokenType::NumberOct(_)
                | TokenType::NumberLegacyOct(_)
                | TokenType::BigIntSuffixed(_)
                | TokenType::RegexLiteral { .. }
                | TokenType::RightParen
                | TokenType::RightSquareBrace
                | TokenType::RightBrace
                | TokenType::This
                | TokenType::TrueLit
                | TokenType::FalseLit
                | TokenType::NullLit
                | TokenType::Increment
                | TokenType::Decrement => EXPRESSION_KEYWORDS.contains(&token.ty),
                _ => true,
            },
        }
    }

    /// Iterates through the input string and yields the next node
    pub fn scan_next(&mut self) -> Option<()> {
        self.skip_whitespace_and_comments();
        self.start = self.idx;

        let cur = self.next_char()?;

        match cur {
            b'(' => self.create_token(TokenType::LeftParen),
            b')' => self.create_token(TokenType::RightParen),
            b'{' => {
                if let Some(depth) = self.template_depths.last_mut() {
                    *depth += 1;
                }
                self.create_token(TokenType::LeftBrace)
            }
            b'}' => {
                if let Some(depth) = self.template_depths.last_mut() {
                    *depth -= 1;
                    if *depth == 0 {
                        // This `}` closes a template interpolation: swallow
                        // it and read the next template chunk.
                        self.template_depths.pop();
                        self.read_template_segment();
                        return Some(());
                    }
                }
                self.create_token(TokenType::RightBrace)
            }
            b'[' => self.create_token(TokenType::LeftSquareBrace),
            b']' => self.create_token(TokenType::RightSquareBrace),
            b',' => self.create_token(TokenType::Comma),
            b'.' => {
                if self.current().is_some_and(util::is_digit) {
                    self.read_number_literal(b'.');
                } else {
                    self.create_conditional_token(TokenType::Dot, &[("..", TokenType::Spread)]);
                }
            }
            b'-' => self.create_conditional_token(
                TokenType::Minus,
                &[("-", TokenType::Decrement), ("=", TokenType::SubtractionAssignment)],
            ),
            b'+' => self.create_conditional_token(
                TokenType::Plus,
                &[("+", TokenType::Increment), ("=", TokenType::AdditionAssignment)],
            ),
            b'*' => self.create_conditional_token(
                TokenType::Star,
                &[
                    ("*=", TokenType::ExponentiationAssignment),
                    ("*", TokenType::Exponentiation),
                    ("=", TokenType::MultiplicationAssignment),
                ],
            ),
            b'|' => self.create_conditional_token(
                TokenType::BitwiseOr,
                &[
                    ("|=", TokenType::LogicalOrAssignment),
                    ("=", TokenType::BitwiseOrAssignment),
                    ("|", TokenType::LogicalOr),
                ],
            ),
            b'^' => self.create_conditional_token(TokenType::BitwiseXor, &[("=", TokenType::BitwiseXorAssignment)]),
            b'&' => self.create_conditional_token(
                TokenType::BitwiseAnd,
                &[
                    ("&=", TokenType::LogicalAndAssignment),
                    ("=", TokenType::BitwiseAndAssignment),
                    ("&", TokenType::LogicalAnd),
                ],
            ),
            b'>' => self.create_conditional_token(
                TokenType::Greater,
                &[
                    (">>=", TokenType::UnsignedRightShiftAssignment),
                    (">>", TokenType::UnsignedRightShift),
                    (">=", TokenType::RightShiftAssignment),
                    ("=", TokenType::GreaterEqual),
                    (">", TokenType::RightShift),
                ],
            ),
            b'<' => self.create_conditional_token(
                TokenType::Less,
                &[
                    ("<=", TokenType::LeftShiftAssignment),
                    ("=", TokenType::LessEqual),
                    ("<", TokenType::LeftShift),
                ],
            ),
            b'%' => self.create_conditional_token(TokenType::Remainder, &[("=", TokenType::RemainderAssignment)]),
            b'/' => {
                if self.regex_can_start_here() {
                    self.read_regex_literal()
                } else {
                    self.create_conditional_token(TokenType::Slash, &[("=", TokenType::DivisionAssignment)])
                }
            }
            b'!' => self.create_conditional_token(
                TokenType::LogicalNot,
                &[("==", TokenType::StrictInequality), ("=", TokenType::Inequality)],
            ),
            b'~' => self.create_token(TokenType::BitwiseNot),
            b'?' => self.create_conditional_token(
                TokenType::Conditional,
                &[
                    ("?=", TokenType::LogicalNullishAssignment),
                    ("?", TokenType::NullishCoalescing),
                    (".", TokenType::OptionalChaining),
                ],
            ),
            b':' => self.create_token(TokenType::Colon),
            b';' => self.create_token(TokenType::Semicolon),
            b'=' => self.create_conditional_token(
                TokenType::Assignment,
                &[
                    ("==", TokenType::StrictEquality),
                    ("=", TokenType::Equality),
                    (">", TokenType::FatArrow),
                ],
            ),
            b'"' | b'\'' => self.read_string_literal(),
            b'`' => self.read_template_segment(),
            _ => {
                if util::is_digit(cur) {
                    match (cur == b'0', self.current()) {
                        (true, Some(b'x' | b'X')) => self.read_prefixed_literal(TokenType::NumberHex, util::is_hex_digit),
                        (true, Some(b'b' | b'B')) => {
                            self.read_prefixed_literal(TokenType::NumberBin, util::is_binary_digit)
                        }
                        (true, Some(b'o' | b'O')) => {
                            self.read_prefixed_literal(TokenType::NumberOct, util::is_octal_digit)
                        }
                        _ => self.read_number_literal(cur),
                    }
                } else if util::is_identifier_start(cur) {
                    self.read_identifier()
                } else {
                    self.create_error(ErrorKind::UnknownCharacter(cur));
                }
            }
        };
        Some(())
    }

    fn skip_whitespace_and_comments(&mut self) {
        while !self.is_eof() {
            match self.current_real() {
                b'\n' => {
                    self.newline_pending = true;
                    self.advance();
                }
                b'\r' | b'\t' | b' ' => self.advance(),
                b'/' => match self.peek() {
                    Some(b'/') => self.skip_single_line_comment(),
                    Some(b'*') => self.skip_multi_line_comment(),
                    _ => return,
                },
                _ => return,
            }
        }
    }

    fn skip_single_line_comment(&mut self) {
        while !self.is_eof() {
            if self.current_real() == b'\n' {
                return;
            }
            self.advance();
        }
    }

    fn skip_multi_line_comment(&mut self) {
        self.expect_and_skip(b'/');
        self.expect_and_skip(b'*');
        while !self.is_eof() {
            let ch = self.current_real();
            if ch == b'\n' {
                self.newline_pending = true;
            } else if ch == b'*' && self.peek() == Some(b'/') {
                self.advance_n(2);
                return;
            }
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> Vec<TokenType> {
        let mut interner = StringInterner::new();
        Lexer::new(&mut interner, src)
            .scan_all()
            .unwrap()
            .into_iter()
            .map(|t| t.ty)
            .collect()
    }

    #[test]
    fn punctuation_and_longest_match() {
        let tokens = lex("a >>>= b");
        assert!(matches!(tokens[0], TokenType::Identifier(_)));
        assert_eq!(tokens[1], TokenType::UnsignedRightShiftAssignment);
        assert!(matches!(tokens[2], TokenType::Identifier(_)));
    }

    #[test]
    fn regex_vs_division() {
        // After `=` a slash starts a regex.
        let toks = lex("let x = /ab/g");
        assert!(matches!(toks[3], TokenType::RegexLiteral { .. }));

        // After a value it is division.
        let toks = lex("a / b");
        assert_eq!(toks[1], TokenType::Slash);

        // After `return` it is a regex again.
        let toks = lex("return /a/");
        assert!(matches!(toks[1], TokenType::RegexLiteral { .. }));
    }

    #[test]
    fn newline_bit_is_recorded() {
        let mut interner = StringInterner::new();
        let tokens = Lexer::new(&mut interner, "a\nb c").scan_all().unwrap();
        assert!(!tokens[0].newline_before);
        assert!(tokens[1].newline_before);
        assert!(!tokens[2].newline_before);
    }

    #[test]
    fn template_literals_toggle_modes() {
        let mut interner = StringInterner::new();
        let tokens = Lexer::new(&mut interner, "`a${ {x: 1} }b`").scan_all().unwrap();
        assert!(matches!(
            tokens[0].ty,
            TokenType::TemplateSegment { interpolated: true, .. }
        ));
        // Inner object literal braces survive as tokens.
        assert_eq!(tokens[1].ty, TokenType::LeftBrace);
        assert!(matches!(
            tokens.last().unwrap().ty,
            TokenType::TemplateSegment { interpolated: false, .. }
        ));
    }

    #[test]
    fn numeric_forms() {
        let mut interner = StringInterner::new();
        let tokens = Lexer::new(&mut interner, "0xFF 0b11 0o17 0755 1.5e-3 2n").scan_all().unwrap();
        assert!(matches!(tokens[0].ty, TokenType::NumberHex(_)));
        assert!(matches!(tokens[1].ty, TokenType::NumberBin(_)));
        assert!(matches!(tokens[2].ty, TokenType::NumberOct(_)));
        assert!(matches!(tokens[3].ty, TokenType::NumberLegacyOct(_)));
        assert!(matches!(tokens[4].ty, TokenType::NumberDec(_)));
        assert!(matches!(tokens[5].ty, TokenType::BigIntSuffixed(_)));
    }

    #[test]
    fn string_escapes_decode() {
        let mut interner = StringInterner::new();
        let tokens = Lexer::new(&mut interner, r#"'a\n\x41B\u{43}'"#).scan_all().unwrap();
        let TokenType::String(sym) = tokens[0].ty else {
            panic!("expected string token");
        };
        assert_eq!(interner.resolve(sym), "a\nABC");
    }

    #[test]
    fn unterminated_string_is_recorded() {
        let mut interner = StringInterner::new();
        let errors = Lexer::new(&mut interner, "'abc").scan_all().unwrap_err();
        assert_eq!(errors[0].kind, ErrorKind::UnterminatedString);
    }

    #[test]
    fn optional_chaining_and_nullish() {
        assert_eq!(lex("a?.b")[1], TokenType::OptionalChaining);
        assert_eq!(lex("a ?? b")[1], TokenType::NullishCoalescing);
        assert_eq!(lex("a ??= b")[1], TokenType::LogicalNullishAssignment);
    }
}
