//! Define aliases.
//!
//! `define: alias = "text"` lines are collected before anything else is
//! parsed, so an alias may be used above its definition. Each alias body is
//! lexed once; uses inside `glowImmediate`, `glowRamp` and `pause` lines are
//! replaced by the body's tokens, re-spanned to the use site.

use std::collections::HashMap;

use glow_lexer::token::{Token, TokenKind};
use glow_lexer::Lexer;
use glow_types::{ErrorCode, GlowError, SourceFile, Span};

use crate::parser::Parser;

/// Deepest chain of aliases referring to aliases.
pub(crate) const MAX_DEFINE_DEPTH: u32 = 8;

pub(crate) type DefineTable = HashMap<String, Vec<TokenKind>>;

impl<'src> Parser<'src> {
    /// Pre-scan for well-formed define lines. Malformed ones are reported by
    /// the main pass.
    pub(crate) fn collect_defines(&mut self) -> DefineTable {
        let mut found = Vec::new();
        {
            let tokens = self.tokens_mut();
            for i in 0..tokens.len() {
                let line_start = i == 0 || tokens[i - 1].kind == TokenKind::Newline;
                if !line_start {
                    continue;
                }
                let kinds: Vec<&TokenKind> = tokens[i..].iter().take(5).map(|t| &t.kind).collect();
                if let [TokenKind::Define, TokenKind::Colon, TokenKind::Identifier(alias), TokenKind::Eq, TokenKind::StringLit(text)] =
                    kinds.as_slice()
                {
                    found.push((alias.clone(), tokens[i + 2].span, text.clone(), tokens[i + 4].span));
                }
            }
        }

        let mut table = DefineTable::new();
        let mut first_seen: HashMap<String, Span> = HashMap::new();
        for (alias, alias_span, text, text_span) in found {
            if let Some(first) = first_seen.get(&alias) {
                let err = self
                    .make_error(
                        ErrorCode::DUPLICATE_DEFINE,
                        format!("define '{alias}' is already defined"),
                        alias_span,
                    )
                    .with_suggestion(format!("first defined on line {}", first.start_line));
                self.push_error(err);
                continue;
            }
            first_seen.insert(alias.clone(), alias_span);

            let (body, lex_errors) = lex_body(&self.source_file().name, &text);
            for e in lex_errors {
                self.error_at(e.code, format!("in define '{alias}': {}", e.message), text_span);
            }
            table.insert(alias, body);
        }
        table
    }

    /// Replace alias uses in value positions with the alias bodies.
    pub(crate) fn splice_defines(&mut self, defines: &DefineTable) {
        let tokens = std::mem::take(self.tokens_mut());
        let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
        let mut line_start_idx = 0;
        let mut splicing = false;
        let mut skipping = false;

        for token in tokens {
            let at_line_start = out.last().is_none_or(|t| t.kind == TokenKind::Newline);
            if at_line_start && !skipping {
                line_start_idx = out.len();
                splicing = matches!(
                    token.kind,
                    TokenKind::GlowImmediate | TokenKind::GlowRamp | TokenKind::Pause
                );
            }
            if matches!(token.kind, TokenKind::Newline | TokenKind::Eof) {
                skipping = false;
                out.push(token);
                continue;
            }
            if skipping {
                continue;
            }
            if !splicing {
                out.push(token);
                continue;
            }
            let span = token.span;
            if let Err(err) = self.expand(token.kind, span, 0, defines, &mut out) {
                // Drop the rest of the line so the parser does not report it twice.
                self.push_error(err);
                out.truncate(line_start_idx);
                skipping = true;
            }
        }

        *self.tokens_mut() = out;
    }

    fn expand(
        &self,
        kind: TokenKind,
        span: Span,
        depth: u32,
        defines: &DefineTable,
        out: &mut Vec<Token>,
    ) -> Result<(), GlowError> {
        let TokenKind::Identifier(name) = &kind else {
            out.push(Token::new(kind, span));
            return Ok(());
        };
        // A word right after a number is a time unit.
        if matches!(out.last().map(|t| &t.kind), Some(TokenKind::Number(_))) {
            out.push(Token::new(kind, span));
            return Ok(());
        }
        let Some(body) = defines.get(name) else {
            return Err(self
                .make_error(ErrorCode::UNKNOWN_DEFINE, format!("unknown define '{name}'"), span)
                .with_suggestion(format!("add 'define: {name} = \"...\"'")));
        };
        if depth >= MAX_DEFINE_DEPTH {
            return Err(self.make_error(
                ErrorCode::DEFINE_TOO_DEEP,
                format!("define '{name}' nests deeper than {MAX_DEFINE_DEPTH} levels"),
                span,
            ));
        }
        for inner in body {
            self.expand(inner.clone(), span, depth + 1, defines, out)?;
        }
        Ok(())
    }
}

fn lex_body(file_name: &str, text: &str) -> (Vec<TokenKind>, Vec<GlowError>) {
    let sf = SourceFile::new(file_name, text);
    let lexed = Lexer::new(&sf).lex();
    let body = lexed
        .tokens
        .into_iter()
        .map(|t| t.kind)
        .filter(|k| !matches!(k, TokenKind::Eof | TokenKind::Newline))
        .collect();
    (body, lexed.errors.errors)
}
