//! Statement parsing.

use std::collections::HashSet;

use glow_lexer::token::TokenKind;
use glow_types::ast::*;
use glow_types::led::{MAX_BRIGHT, MAX_COLOR};
use glow_types::{ErrorCode, LedState, Span};

use crate::parser::Parser;

/// Highest LED number a script may name; the device LED count is 16 bits.
pub(crate) const MAX_LED_NUMBER: u64 = u16::MAX as u64;
/// Largest `repeat` count on a `call`.
pub(crate) const MAX_REPEAT: u64 = 2_000_000_000;
/// Largest `zorder` on a `callAsync`.
pub(crate) const MAX_ZORDER: u64 = 1000;

impl<'src> Parser<'src> {
    /// Parse a single statement line. The current token is an instruction
    /// keyword.
    pub(crate) fn parse_statement(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        let keyword = self.advance().kind;
        self.expect(&TokenKind::Colon)?;

        let kind = match keyword {
            TokenKind::GlowImmediate => {
                let leds = self.parse_led_list()?;
                let color = self.parse_color()?;
                StmtKind::GlowImmediate { leds, color }
            }
            TokenKind::GlowRamp => {
                let leds = self.parse_led_list()?;
                let from = self.parse_color()?;
                self.expect(&TokenKind::To)?;
                let to = self.parse_color()?;
                self.expect(&TokenKind::In)?;
                let duration = self.parse_duration()?;
                StmtKind::GlowRamp {
                    leds,
                    from,
                    to,
                    duration,
                }
            }
            TokenKind::Pause => StmtKind::Pause {
                duration: self.parse_duration()?,
            },
            TokenKind::Here => StmtKind::Here {
                label: self.expect_identifier()?,
            },
            TokenKind::Goto => StmtKind::Goto {
                label: self.expect_identifier()?,
            },
            TokenKind::Call => {
                let function = self.expect_function_name()?;
                let repeat = match self.parse_option(&TokenKind::Repeat)? {
                    Some((n, span)) => {
                        if !(1..=MAX_REPEAT).contains(&n) {
                            self.error_at(
                                ErrorCode::REPEAT_OUT_OF_RANGE,
                                format!("repeat count {n} is outside 1-{MAX_REPEAT}"),
                                span,
                            );
                            return None;
                        }
                        n as u32
                    }
                    None => 1,
                };
                StmtKind::Call { function, repeat }
            }
            TokenKind::CallAsync => {
                let function = self.expect_function_name()?;
                let z_order = match self.parse_option(&TokenKind::ZOrder)? {
                    Some((n, span)) => {
                        if n > MAX_ZORDER {
                            self.error_at(
                                ErrorCode::ZORDER_OUT_OF_RANGE,
                                format!("zorder {n} is outside 0-{MAX_ZORDER}"),
                                span,
                            );
                            return None;
                        }
                        Some(n as u32)
                    }
                    None => None,
                };
                StmtKind::CallAsync { function, z_order }
            }
            other => {
                self.error_at(
                    ErrorCode::UNKNOWN_INSTRUCTION,
                    format!("unknown instruction '{other}'"),
                    start,
                );
                return None;
            }
        };

        let span = start.to(self.previous_span());
        self.expect_newline_or_eof()?;
        Some(Stmt { kind, span })
    }

    /// Optional `(name=N)` suffix.
    fn parse_option(&mut self, name: &TokenKind) -> Option<Option<(u64, Span)>> {
        if !self.eat(&TokenKind::LParen) {
            return Some(None);
        }
        self.expect(name)?;
        self.expect(&TokenKind::Eq)?;
        let value = self.expect_number()?;
        self.expect(&TokenKind::RParen)?;
        Some(Some(value))
    }

    /// `[1, 3-5, 8]`: 1-based LED numbers and inclusive ranges.
    fn parse_led_list(&mut self) -> Option<LedList> {
        let start = self.current_span();
        self.expect(&TokenKind::LBracket)?;
        let mut numbers: Vec<u32> = Vec::new();
        let mut seen = HashSet::new();
        loop {
            let (first, first_span) = self.expect_number()?;
            let (last, last_span) = if self.eat(&TokenKind::Minus) {
                self.expect_number()?
            } else {
                (first, first_span)
            };
            let item_span = first_span.to(last_span);
            if first == 0 {
                self.error_at(
                    ErrorCode::LED_OUT_OF_RANGE,
                    "LED numbers start at 1",
                    first_span,
                );
                return None;
            }
            if last > MAX_LED_NUMBER {
                self.error_at(
                    ErrorCode::LED_OUT_OF_RANGE,
                    format!("LED {last} is above the protocol limit of {MAX_LED_NUMBER}"),
                    last_span,
                );
                return None;
            }
            if last < first {
                self.error_at(
                    ErrorCode::LED_OUT_OF_RANGE,
                    format!("LED range {first}-{last} runs backwards"),
                    item_span,
                );
                return None;
            }
            for n in first..=last {
                let n = n as u32;
                if seen.insert(n) {
                    numbers.push(n);
                }
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBracket)?;
        Some(LedList {
            numbers,
            span: start.to(self.previous_span()),
        })
    }

    /// `(r, g, b, bright)`
    fn parse_color(&mut self) -> Option<LedState> {
        self.expect(&TokenKind::LParen)?;
        let mut values = [0u8; 4];
        for (i, slot) in values.iter_mut().enumerate() {
            if i > 0 {
                self.expect(&TokenKind::Comma)?;
            }
            let (n, span) = self.expect_number()?;
            let max = if i == 3 { MAX_BRIGHT } else { MAX_COLOR };
            if n > u64::from(max) {
                let channel = ["red", "green", "blue", "bright"][i];
                self.error_at(
                    ErrorCode::COLOR_OUT_OF_RANGE,
                    format!("{channel} value {n} is outside 0-{max}"),
                    span,
                );
                return None;
            }
            *slot = n as u8;
        }
        self.expect(&TokenKind::RParen)?;
        let [red, green, blue, bright] = values;
        Some(LedState::new(red, green, blue, bright))
    }

    /// `500ms`, `2s`, `1m`, `1h`, `12t`
    fn parse_duration(&mut self) -> Option<Duration> {
        let (amount, start) = self.expect_number()?;
        let unit = match self.peek_kind() {
            TokenKind::Identifier(suffix) => TimeUnit::from_suffix(suffix),
            _ => None,
        };
        let Some(unit) = unit else {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected time unit (ms, s, m, h, t), got '{}'", self.peek_kind()),
            );
            return None;
        };
        let end = self.advance().span;
        Some(Duration {
            amount,
            unit,
            span: start.to(end),
        })
    }
}
