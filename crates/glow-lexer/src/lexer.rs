//! Core Glow lexer: converts script text to a token stream.
//!
//! - One statement per line; newlines are tokens
//! - `//` comments run to end of line
//! - Identifiers, keywords and function names are lowercased
//! - String literals keep their case and may use either quote style
//! - Error recovery: collects up to 20 errors instead of stopping at the first

use glow_types::{CompileErrors, ErrorCode, GlowError, SourceFile, Span, MAX_ERRORS};

use crate::token::{Token, TokenKind};

/// The Glow lexer.
pub struct Lexer<'src> {
    source: &'src [u8],
    source_file: &'src SourceFile,
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    col: u32,
    errors: CompileErrors,
}

/// Result of lexing: tokens + any errors collected.
pub struct LexResult {
    /// The token stream (always ends with [`TokenKind::Eof`]).
    pub tokens: Vec<Token>,
    pub errors: CompileErrors,
}

impl<'src> Lexer<'src> {
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source: source_file.source.as_bytes(),
            source_file,
            pos: 0,
            line: 1,
            col: 1,
            errors: CompileErrors::empty(),
        }
    }

    /// Lex the entire source file into a token stream.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();

        loop {
            if self.errors.total_errors >= MAX_ERRORS {
                break;
            }
            let token = self.scan();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            tokens.push(Token::new(TokenKind::Eof, self.current_span()));
        }

        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else if ch & 0xC0 != 0x80 {
            // Continuation bytes of a UTF-8 sequence share one column.
            self.col += 1;
        }
        Some(ch)
    }

    fn current_span(&self) -> Span {
        Span::point(self.line, self.col)
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(
            start_line,
            start_col,
            self.line,
            self.col.saturating_sub(1).max(1),
        )
    }

    fn text_from(&self, start: usize) -> &'src str {
        std::str::from_utf8(&self.source[start..self.pos]).unwrap_or("")
    }

    fn emit_error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        let err = GlowError::new(&self.source_file.name, code, message, span, source_line);
        self.errors.push_error(err);
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace & comments
    // ─────────────────────────────────────────────────────────────

    /// Skip spaces and tabs; newlines are tokens.
    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\r') = self.peek() {
            self.advance();
        }
    }

    /// Skip a `//` comment up to, but not including, the newline.
    fn skip_comment(&mut self) -> bool {
        if self.peek() == Some(b'/') && self.peek_at(1) == Some(b'/') {
            while let Some(ch) = self.peek() {
                if ch == b'\n' {
                    break;
                }
                self.advance();
            }
            true
        } else {
            false
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Scanning
    // ─────────────────────────────────────────────────────────────

    fn scan(&mut self) -> Token {
        loop {
            self.skip_whitespace();
            if !self.skip_comment() {
                break;
            }
        }

        if self.errors.total_errors >= MAX_ERRORS || self.pos >= self.source.len() {
            return Token::new(TokenKind::Eof, self.current_span());
        }

        let start = self.pos;
        let start_line = self.line;
        let start_col = self.col;
        let Some(ch) = self.advance() else {
            return Token::new(TokenKind::Eof, self.current_span());
        };

        let kind = match ch {
            b'\n' => TokenKind::Newline,
            b'"' | b'\'' => return self.scan_string(ch, start_line, start_col),
            b'0'..=b'9' => return self.scan_number(start, start_line, start_col),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                self.eat_word();
                let word = self.text_from(start).to_ascii_lowercase();
                TokenKind::from_keyword(&word).unwrap_or(TokenKind::Identifier(word))
            }
            b'@' => {
                if !matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == b'_') {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(
                        ErrorCode::INVALID_CHARACTER,
                        "'@' must be followed by a function name",
                        span,
                    );
                    return self.scan();
                }
                self.eat_word();
                TokenKind::FunctionName(self.text_from(start).to_ascii_lowercase())
            }
            b':' => TokenKind::Colon,
            b',' => TokenKind::Comma,
            b'-' => TokenKind::Minus,
            b'=' => TokenKind::Eq,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            _ => {
                // Swallow the rest of a multi-byte character.
                while matches!(self.peek(), Some(b) if b & 0xC0 == 0x80) {
                    self.advance();
                }
                let text = self.text_from(start).to_string();
                let span = self.span_from(start_line, start_col);
                self.emit_error(
                    ErrorCode::INVALID_CHARACTER,
                    format!("unexpected character '{text}'"),
                    span,
                );
                return self.scan();
            }
        };

        Token::new(kind, self.span_from(start_line, start_col))
    }

    fn eat_word(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == b'_') {
            self.advance();
        }
    }

    fn scan_number(&mut self, start: usize, start_line: u32, start_col: u32) -> Token {
        while let Some(b'0'..=b'9') = self.peek() {
            self.advance();
        }
        let span = self.span_from(start_line, start_col);
        let text = self.text_from(start);
        let value = match text.parse::<u64>() {
            Ok(v) => v,
            Err(_) => {
                self.emit_error(
                    ErrorCode::INVALID_NUMBER,
                    format!("number '{text}' is too large"),
                    span,
                );
                0
            }
        };
        Token::new(TokenKind::Number(value), span)
    }

    /// Scan a string literal after its opening quote. The closing quote
    /// must match the opening one; strings never span lines.
    fn scan_string(&mut self, quote: u8, start_line: u32, start_col: u32) -> Token {
        let body_start = self.pos;
        loop {
            match self.peek() {
                None | Some(b'\n') => {
                    let text = self.text_from(body_start).to_string();
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(
                        ErrorCode::UNTERMINATED_STRING,
                        "unterminated string literal",
                        span,
                    );
                    return Token::new(TokenKind::StringLit(text), span);
                }
                Some(c) if c == quote => {
                    let text = self.text_from(body_start).to_string();
                    self.advance();
                    return Token::new(
                        TokenKind::StringLit(text),
                        self.span_from(start_line, start_col),
                    );
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let sf = SourceFile::new("t.glow", source);
        Lexer::new(&sf).lex().tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_duration_splits_into_number_and_unit() {
        assert_eq!(
            kinds("500ms"),
            vec![
                TokenKind::Number(500),
                TokenKind::Identifier("ms".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_spans_are_one_based() {
        let sf = SourceFile::new("t.glow", "  pause: 2s");
        let tokens = Lexer::new(&sf).lex().tokens;
        assert_eq!(tokens[0].span, Span::new(1, 3, 1, 7));
        assert_eq!(tokens[1].span, Span::new(1, 8, 1, 8));
    }
}
