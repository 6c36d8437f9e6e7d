//! Table-line parsing.
//!
//! A script is a flat list of lines. `device:` and `define:` lines may
//! appear anywhere; an `@name` line opens a function that collects every
//! following statement until the next `@name`.

use std::collections::HashMap;

use glow_lexer::token::TokenKind;
use glow_types::ast::*;
use glow_types::{ErrorCode, Span};

use crate::parser::Parser;

impl<'src> Parser<'src> {
    /// Parse every line into the script tables.
    pub(crate) fn parse_script(&mut self) -> Script {
        let mut script = Script::default();
        let mut current: Option<FunctionDecl> = None;
        let mut seen_functions: HashMap<String, Span> = HashMap::new();

        self.skip_newlines();
        while !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            let ok = match self.peek_kind() {
                TokenKind::Device => self
                    .parse_device_line()
                    .map(|d| script.devices.push(d))
                    .is_some(),
                TokenKind::Define => self
                    .parse_define_line()
                    .map(|d| script.defines.push(d))
                    .is_some(),
                TokenKind::FunctionName(_) => match self.parse_function_header() {
                    Some(name) => {
                        if let Some(done) = current.take() {
                            script.functions.push(done);
                        }
                        if let Some(first) = seen_functions.get(&name.name) {
                            let err = self
                                .make_error(
                                    ErrorCode::DUPLICATE_FUNCTION,
                                    format!("function '{}' is already defined", name.name),
                                    name.span,
                                )
                                .with_suggestion(format!(
                                    "first defined on line {}",
                                    first.start_line
                                ));
                            self.push_error(err);
                        } else {
                            seen_functions.insert(name.name.clone(), name.span);
                        }
                        current = Some(FunctionDecl {
                            span: name.span,
                            name,
                            body: Vec::new(),
                        });
                        true
                    }
                    None => false,
                },
                kind if kind.is_instruction() => match current.as_mut() {
                    Some(function) => match self.parse_statement() {
                        Some(stmt) => {
                            function.span = function.span.to(stmt.span);
                            function.body.push(stmt);
                            true
                        }
                        None => false,
                    },
                    None => {
                        self.error_at_current(
                            ErrorCode::STATEMENT_OUTSIDE_FUNCTION,
                            format!("'{}' must appear inside a function", self.peek_kind()),
                        );
                        false
                    }
                },
                _ => {
                    self.error_at_current(
                        ErrorCode::UNKNOWN_INSTRUCTION,
                        format!("unknown instruction '{}'", self.peek_kind()),
                    );
                    false
                }
            };
            if !ok {
                self.synchronize();
            }
            self.skip_newlines();
        }

        if let Some(done) = current.take() {
            script.functions.push(done);
        }
        script
    }

    /// `device: key = "value"`
    fn parse_device_line(&mut self) -> Option<DeviceSetting> {
        let start = self.advance().span; // eat `device`
        self.expect(&TokenKind::Colon)?;
        let key = self.expect_identifier()?;
        self.expect(&TokenKind::Eq)?;
        let value = self.expect_setting_value()?;
        let span = start.to(self.previous_span());
        self.expect_newline_or_eof()?;
        Some(DeviceSetting { key, value, span })
    }

    /// `define: alias = "text"`
    fn parse_define_line(&mut self) -> Option<Define> {
        let start = self.advance().span; // eat `define`
        self.expect(&TokenKind::Colon)?;
        let alias = self.expect_identifier()?;
        self.expect(&TokenKind::Eq)?;
        let value = match self.peek_kind().clone() {
            TokenKind::StringLit(s) => {
                self.advance();
                s
            }
            other => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected quoted define text, got '{other}'"),
                );
                return None;
            }
        };
        let span = start.to(self.previous_span());
        self.expect_newline_or_eof()?;
        Some(Define { alias, value, span })
    }

    /// `@name` on a line of its own.
    fn parse_function_header(&mut self) -> Option<Ident> {
        let name = self.expect_function_name()?;
        self.expect_newline_or_eof()?;
        Some(name)
    }
}
