//! Core parser infrastructure: token cursor, error reporting, helpers.

use glow_lexer::token::{Token, TokenKind};
use glow_types::ast::{Ident, Script};
use glow_types::{CompileErrors, ErrorCode, GlowError, SourceFile, Span, MAX_ERRORS};

/// The Glow parser.
///
/// Consumes a token stream produced by the lexer and builds the script
/// tables. Collects errors and resumes at the next line after each one.
pub struct Parser<'src> {
    tokens: Vec<Token>,
    pos: usize,
    source_file: &'src SourceFile,
    errors: CompileErrors,
}

/// Result of parsing.
///
/// `script` holds every line that parsed; it is only safe to compile when
/// `errors` is empty.
pub struct ParseResult {
    pub script: Script,
    pub errors: CompileErrors,
}

impl<'src> Parser<'src> {
    pub fn new(tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        Self {
            tokens,
            pos: 0,
            source_file,
            errors: CompileErrors::empty(),
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    pub(crate) fn peek(&self) -> &Token {
        static EOF: Token = Token {
            kind: TokenKind::Eof,
            span: Span {
                start_line: 1,
                start_col: 1,
                end_line: 1,
                end_col: 1,
            },
        };
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .unwrap_or(&EOF)
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    /// Advance the cursor by one and return the consumed token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn previous_span(&self) -> Span {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.span,
            None => Span::point(1, 1),
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn tokens_mut(&mut self) -> &mut Vec<Token> {
        &mut self.tokens
    }

    pub(crate) fn source_file(&self) -> &'src SourceFile {
        self.source_file
    }

    // ── Newline Handling ──────────────────────────────────────────────────────

    pub(crate) fn skip_newlines(&mut self) {
        while self.check(&TokenKind::Newline) {
            self.advance();
        }
    }

    /// Expect the end of the current line. Reports an error if anything else
    /// follows the statement.
    pub(crate) fn expect_newline_or_eof(&mut self) -> Option<()> {
        if self.at_end() || self.eat(&TokenKind::Newline) {
            return Some(());
        }
        self.error_at_current(
            ErrorCode::UNEXPECTED_TOKEN,
            format!("expected end of line, got '{}'", self.peek_kind()),
        );
        None
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Option<Token> {
        if self.check(expected) {
            Some(self.advance())
        } else {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected '{}', got '{}'", expected, self.peek_kind()),
            );
            None
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> Option<Ident> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                let span = self.advance().span;
                Some(Ident::new(name, span))
            }
            _ => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected identifier, got '{}'", self.peek_kind()),
                );
                None
            }
        }
    }

    pub(crate) fn expect_function_name(&mut self) -> Option<Ident> {
        match self.peek_kind().clone() {
            TokenKind::FunctionName(name) => {
                let span = self.advance().span;
                Some(Ident::new(name, span))
            }
            _ => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected function name like '@start', got '{}'", self.peek_kind()),
                );
                None
            }
        }
    }

    /// Expect a number literal. Returns the value and its span.
    pub(crate) fn expect_number(&mut self) -> Option<(u64, Span)> {
        match *self.peek_kind() {
            TokenKind::Number(n) => {
                let span = self.advance().span;
                Some((n, span))
            }
            _ => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected number, got '{}'", self.peek_kind()),
                );
                None
            }
        }
    }

    /// Expect a setting value: a quoted string, a bare number or a bare word.
    pub(crate) fn expect_setting_value(&mut self) -> Option<String> {
        let value = match self.peek_kind() {
            TokenKind::StringLit(s) | TokenKind::Identifier(s) => s.clone(),
            TokenKind::Number(n) => n.to_string(),
            _ => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected quoted value, got '{}'", self.peek_kind()),
                );
                return None;
            }
        };
        self.advance();
        Some(value)
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    pub(crate) fn error_at_current(&mut self, code: ErrorCode, message: impl Into<String>) {
        let span = self.current_span();
        self.error_at(code, message, span);
    }

    pub(crate) fn error_at(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        self.push_error(self.make_error(code, message, span));
    }

    pub(crate) fn make_error(
        &self,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
    ) -> GlowError {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        GlowError::new(&self.source_file.name, code, message, span, source_line)
    }

    pub(crate) fn push_error(&mut self, error: GlowError) {
        self.errors.push_error(error);
    }

    /// Returns `true` if we've hit the error limit and should stop.
    pub(crate) fn too_many_errors(&self) -> bool {
        self.errors.total_errors >= MAX_ERRORS
    }

    // ── Synchronization ───────────────────────────────────────────────────────

    /// Skip to the start of the next line.
    pub(crate) fn synchronize(&mut self) {
        while !self.at_end() {
            if self.eat(&TokenKind::Newline) {
                self.skip_newlines();
                return;
            }
            self.advance();
        }
    }

    // ── Public API ────────────────────────────────────────────────────────────

    /// Parse the token stream into a [`Script`].
    pub fn parse(mut self) -> ParseResult {
        let defines = self.collect_defines();
        self.splice_defines(&defines);
        let script = self.parse_script();
        ParseResult {
            script,
            errors: self.errors,
        }
    }
}
