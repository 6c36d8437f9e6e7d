//! Lexer tests: keywords, literals, case folding, comments, error recovery.

use glow_lexer::{Lexer, TokenKind};
use glow_types::{ErrorCode, SourceFile};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Lex source text and return just the token kinds (excluding final Eof).
fn kinds(source: &str) -> Vec<TokenKind> {
    let sf = SourceFile::new("test.glow", source);
    Lexer::new(&sf)
        .lex()
        .tokens
        .into_iter()
        .filter(|t| t.kind != TokenKind::Eof)
        .map(|t| t.kind)
        .collect()
}

fn error_codes(source: &str) -> Vec<ErrorCode> {
    let sf = SourceFile::new("test.glow", source);
    Lexer::new(&sf)
        .lex()
        .errors
        .errors
        .iter()
        .map(|e| e.code)
        .collect()
}

fn ident(s: &str) -> TokenKind {
    TokenKind::Identifier(s.into())
}

// ─────────────────────────────────────────────────────────────────────
// Statements
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_glow_immediate_line() {
    assert_eq!(
        kinds("glowImmediate: [1,3-5] (255,0,0,31)"),
        vec![
            TokenKind::GlowImmediate,
            TokenKind::Colon,
            TokenKind::LBracket,
            TokenKind::Number(1),
            TokenKind::Comma,
            TokenKind::Number(3),
            TokenKind::Minus,
            TokenKind::Number(5),
            TokenKind::RBracket,
            TokenKind::LParen,
            TokenKind::Number(255),
            TokenKind::Comma,
            TokenKind::Number(0),
            TokenKind::Comma,
            TokenKind::Number(0),
            TokenKind::Comma,
            TokenKind::Number(31),
            TokenKind::RParen,
        ]
    );
}

#[test]
fn test_glow_ramp_line() {
    let k = kinds("glowRamp: [eyes] (0,0,0,0) to (9,9,9,9) in 2s");
    assert_eq!(k[0], TokenKind::GlowRamp);
    assert_eq!(k[3], ident("eyes"));
    assert!(k.contains(&TokenKind::To));
    assert!(k.contains(&TokenKind::In));
    assert_eq!(&k[k.len() - 2..], &[TokenKind::Number(2), ident("s")]);
}

#[test]
fn test_call_with_options() {
    assert_eq!(
        kinds("call: @Blink (repeat=3)"),
        vec![
            TokenKind::Call,
            TokenKind::Colon,
            TokenKind::FunctionName("@blink".into()),
            TokenKind::LParen,
            TokenKind::Repeat,
            TokenKind::Eq,
            TokenKind::Number(3),
            TokenKind::RParen,
        ]
    );
    assert_eq!(kinds("callAsync: @spin (zOrder=2)")[0], TokenKind::CallAsync);
    assert!(kinds("callAsync: @spin (zOrder=2)").contains(&TokenKind::ZOrder));
}

#[test]
fn test_device_and_define_lines() {
    assert_eq!(
        kinds("device: ledCount = \"8\""),
        vec![
            TokenKind::Device,
            TokenKind::Colon,
            ident("ledcount"),
            TokenKind::Eq,
            TokenKind::StringLit("8".into()),
        ]
    );
    assert_eq!(
        kinds("define: red = '(255,0,0,31)'"),
        vec![
            TokenKind::Define,
            TokenKind::Colon,
            ident("red"),
            TokenKind::Eq,
            TokenKind::StringLit("(255,0,0,31)".into()),
        ]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Case folding
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_keywords_are_case_insensitive() {
    for src in ["pause", "PAUSE", "Pause", "pAuSe"] {
        assert_eq!(kinds(src), vec![TokenKind::Pause], "source '{src}'");
    }
    assert_eq!(kinds("CALLASYNC"), vec![TokenKind::CallAsync]);
}

#[test]
fn test_identifiers_are_lowercased() {
    assert_eq!(kinds("TopOfLoop"), vec![ident("topofloop")]);
    assert_eq!(
        kinds("@Start"),
        vec![TokenKind::FunctionName("@start".into())]
    );
}

#[test]
fn test_string_literal_keeps_case() {
    assert_eq!(
        kinds("\"Desk Lamp\""),
        vec![TokenKind::StringLit("Desk Lamp".into())]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Layout
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_comments_are_stripped() {
    assert_eq!(
        kinds("pause: 1s // wait a bit\nhere: top"),
        vec![
            TokenKind::Pause,
            TokenKind::Colon,
            TokenKind::Number(1),
            ident("s"),
            TokenKind::Newline,
            TokenKind::Here,
            TokenKind::Colon,
            ident("top"),
        ]
    );
    assert_eq!(kinds("// only a comment"), vec![]);
}

#[test]
fn test_crlf_line_endings() {
    assert_eq!(
        kinds("@start\r\nhere: a\r\n"),
        vec![
            TokenKind::FunctionName("@start".into()),
            TokenKind::Newline,
            TokenKind::Here,
            TokenKind::Colon,
            ident("a"),
            TokenKind::Newline,
        ]
    );
}

#[test]
fn test_stream_always_ends_with_eof() {
    let sf = SourceFile::new("test.glow", "");
    let tokens = Lexer::new(&sf).lex().tokens;
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Eof);
}

// ─────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_unterminated_string() {
    assert_eq!(
        error_codes("device: name = \"lamp\nhere: a"),
        vec![ErrorCode::UNTERMINATED_STRING]
    );
}

#[test]
fn test_mismatched_quotes_do_not_close() {
    assert_eq!(
        error_codes("define: a = \"1-4'"),
        vec![ErrorCode::UNTERMINATED_STRING]
    );
}

#[test]
fn test_invalid_character_recovers() {
    let sf = SourceFile::new("test.glow", "pause: 1s $ here");
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.errors.total_errors, 1);
    assert_eq!(result.errors.errors[0].code, ErrorCode::INVALID_CHARACTER);
    assert_eq!(result.errors.errors[0].span.start_col, 11);
    assert!(result.tokens.iter().any(|t| t.kind == TokenKind::Here));
}

#[test]
fn test_bare_at_sign() {
    assert_eq!(error_codes("call: @ "), vec![ErrorCode::INVALID_CHARACTER]);
}

#[test]
fn test_number_overflow() {
    assert_eq!(
        error_codes("pause: 99999999999999999999999ms"),
        vec![ErrorCode::INVALID_NUMBER]
    );
}

#[test]
fn test_error_cap() {
    let src = "$".repeat(40);
    let sf = SourceFile::new("test.glow", src.as_str());
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.errors.errors.len(), 20);
    assert_eq!(result.tokens.last().map(|t| &t.kind), Some(&TokenKind::Eof));
}

#[test]
fn test_lexing_is_deterministic() {
    let src = "device: ledCount = \"8\"\n@start\n  glowRamp: [1-8] (0,0,0,0) to (255,255,255,31) in 2s\n";
    let first = kinds(src);
    for _ in 0..50 {
        assert_eq!(kinds(src), first);
    }
}
