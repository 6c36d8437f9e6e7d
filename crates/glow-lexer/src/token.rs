//! Token types for the Glow lexer.
//!
//! Defines [`TokenKind`] covering every lexeme of a lightshow script and
//! [`Token`], which pairs a kind with a source [`Span`].

use glow_types::Span;
use std::fmt;

/// All reserved words, in their lowercase source form.
///
/// Scripts are case-insensitive; the lexer lowercases identifiers before
/// matching, so `glowImmediate` and `GLOWIMMEDIATE` are the same keyword.
pub const ALL_KEYWORDS: &[&str] = &[
    // Table lines
    "device", "define",
    // Instructions
    "glowimmediate", "glowramp", "pause", "here", "goto", "call", "callasync",
    // Connectives and options
    "to", "in", "repeat", "zorder",
];

// ─────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────

/// A single token produced by the Glow lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns `true` if this token is a reserved keyword.
    pub fn is_keyword(&self) -> bool {
        self.kind.is_keyword()
    }
}

// ─────────────────────────────────────────────────────────────────────
// TokenKind
// ─────────────────────────────────────────────────────────────────────

/// Every token kind in the Glow language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // ── Literals ──────────────────────────────────────────────
    /// Unsigned integer literal: `255`
    Number(u64),
    /// Quoted text, single or double quotes: `"8"`, `'1-4'`
    StringLit(String),

    // ── Names ─────────────────────────────────────────────────
    /// Lowercased identifier: labels, aliases, setting keys, unit suffixes
    Identifier(String),
    /// Lowercased function name including the `@`: `@start`
    FunctionName(String),

    // ── Keywords ──────────────────────────────────────────────
    Device,
    Define,
    GlowImmediate,
    GlowRamp,
    Pause,
    Here,
    Goto,
    Call,
    CallAsync,
    To,
    In,
    Repeat,
    ZOrder,

    // ── Punctuation ───────────────────────────────────────────
    Colon,
    Comma,
    Minus,
    Eq,
    LParen,
    RParen,
    LBracket,
    RBracket,

    // ── Special ───────────────────────────────────────────────
    Newline,
    Eof,
}

impl TokenKind {
    /// Look up a lowercased word. Returns `None` for ordinary identifiers.
    pub fn from_keyword(s: &str) -> Option<TokenKind> {
        let kind = match s {
            "device" => TokenKind::Device,
            "define" => TokenKind::Define,
            "glowimmediate" => TokenKind::GlowImmediate,
            "glowramp" => TokenKind::GlowRamp,
            "pause" => TokenKind::Pause,
            "here" => TokenKind::Here,
            "goto" => TokenKind::Goto,
            "call" => TokenKind::Call,
            "callasync" => TokenKind::CallAsync,
            "to" => TokenKind::To,
            "in" => TokenKind::In,
            "repeat" => TokenKind::Repeat,
            "zorder" => TokenKind::ZOrder,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Device
                | TokenKind::Define
                | TokenKind::GlowImmediate
                | TokenKind::GlowRamp
                | TokenKind::Pause
                | TokenKind::Here
                | TokenKind::Goto
                | TokenKind::Call
                | TokenKind::CallAsync
                | TokenKind::To
                | TokenKind::In
                | TokenKind::Repeat
                | TokenKind::ZOrder
        )
    }

    /// Returns `true` for keywords that begin a function-body statement.
    pub fn is_instruction(&self) -> bool {
        matches!(
            self,
            TokenKind::GlowImmediate
                | TokenKind::GlowRamp
                | TokenKind::Pause
                | TokenKind::Here
                | TokenKind::Goto
                | TokenKind::Call
                | TokenKind::CallAsync
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "{n}"),
            TokenKind::StringLit(s) => write!(f, "\"{s}\""),
            TokenKind::Identifier(name) | TokenKind::FunctionName(name) => f.write_str(name),
            TokenKind::Device => f.write_str("device"),
            TokenKind::Define => f.write_str("define"),
            TokenKind::GlowImmediate => f.write_str("glowimmediate"),
            TokenKind::GlowRamp => f.write_str("glowramp"),
            TokenKind::Pause => f.write_str("pause"),
            TokenKind::Here => f.write_str("here"),
            TokenKind::Goto => f.write_str("goto"),
            TokenKind::Call => f.write_str("call"),
            TokenKind::CallAsync => f.write_str("callasync"),
            TokenKind::To => f.write_str("to"),
            TokenKind::In => f.write_str("in"),
            TokenKind::Repeat => f.write_str("repeat"),
            TokenKind::ZOrder => f.write_str("zorder"),
            TokenKind::Colon => f.write_str(":"),
            TokenKind::Comma => f.write_str(","),
            TokenKind::Minus => f.write_str("-"),
            TokenKind::Eq => f.write_str("="),
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
            TokenKind::LBracket => f.write_str("["),
            TokenKind::RBracket => f.write_str("]"),
            TokenKind::Newline => f.write_str("newline"),
            TokenKind::Eof => f.write_str("end of file"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_keyword_recognises_all() {
        for &kw in ALL_KEYWORDS {
            assert!(
                TokenKind::from_keyword(kw).is_some(),
                "from_keyword should recognise '{kw}'"
            );
        }
    }

    #[test]
    fn test_from_keyword_is_lowercase_only() {
        // The lexer lowercases before lookup.
        assert!(TokenKind::from_keyword("glowImmediate").is_none());
        assert!(TokenKind::from_keyword("top").is_none());
        assert!(TokenKind::from_keyword("ms").is_none());
    }

    #[test]
    fn test_display_roundtrip_keywords() {
        for &kw in ALL_KEYWORDS {
            let kind = TokenKind::from_keyword(kw).unwrap();
            assert!(kind.is_keyword());
            assert_eq!(kind.to_string(), kw);
        }
    }

    #[test]
    fn test_instruction_keywords() {
        assert!(TokenKind::Pause.is_instruction());
        assert!(TokenKind::CallAsync.is_instruction());
        assert!(!TokenKind::Device.is_instruction());
        assert!(!TokenKind::To.is_instruction());
    }

    #[test]
    fn test_display_special() {
        assert_eq!(TokenKind::Number(42).to_string(), "42");
        assert_eq!(TokenKind::FunctionName("@start".into()).to_string(), "@start");
        assert_eq!(TokenKind::Newline.to_string(), "newline");
        assert_eq!(TokenKind::Eof.to_string(), "end of file");
    }
}
