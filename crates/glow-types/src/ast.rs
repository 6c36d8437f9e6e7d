//! AST node types for Glow lightshow scripts.
//!
//! A script is a flat sequence of lines sorted into three tables: device
//! settings, define aliases and functions. Function bodies hold statements.

use crate::{LedState, Span};
use serde::{Deserialize, Serialize};

/// Longest duration a pause or ramp may request: 45 days, in milliseconds.
pub const MAX_DURATION_MS: u64 = 3_888_000_000;

/// Name of the function every lightshow starts in.
pub const ENTRY_FUNCTION: &str = "@start";

// ══════════════════════════════════════════════════════════════════════════════
// Tables
// ══════════════════════════════════════════════════════════════════════════════

/// A parsed script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub devices: Vec<DeviceSetting>,
    pub defines: Vec<Define>,
    pub functions: Vec<FunctionDecl>,
}

impl Script {
    /// Find a function by its `@name`.
    pub fn function(&self, name: &str) -> Option<&FunctionDecl> {
        self.functions.iter().find(|f| f.name.name == name)
    }
}

/// `device: key = "value"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSetting {
    pub key: Ident,
    pub value: String,
    pub span: Span,
}

/// `define: alias = "text"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Define {
    pub alias: Ident,
    pub value: String,
    pub span: Span,
}

/// `@name` followed by its body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    /// Includes the leading `@`.
    pub name: Ident,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// Identifier with its source span.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

/// A single function-body statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    /// `glowImmediate: [leds] (r,g,b,bright)`
    GlowImmediate { leds: LedList, color: LedState },
    /// `glowRamp: [leds] (from) to (to) in <duration>`
    GlowRamp {
        leds: LedList,
        from: LedState,
        to: LedState,
        duration: Duration,
    },
    /// `pause: <duration>`
    Pause { duration: Duration },
    /// `here: label`
    Here { label: Ident },
    /// `goto: label`
    Goto { label: Ident },
    /// `call: @func` or `call: @func (repeat=N)`
    Call { function: Ident, repeat: u32 },
    /// `callAsync: @func` or `callAsync: @func (zorder=N)`
    CallAsync {
        function: Ident,
        z_order: Option<u32>,
    },
}

/// LED selection as written: 1-based numbers with ranges already expanded
/// and duplicates removed, in first-mention order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedList {
    pub numbers: Vec<u32>,
    pub span: Span,
}

/// Time unit suffix of a duration literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Millis,
    Seconds,
    Minutes,
    Hours,
    Ticks,
}

impl TimeUnit {
    /// Parse a unit suffix (`ms`, `s`, `m`, `h`, `t`).
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "ms" => Some(Self::Millis),
            "s" => Some(Self::Seconds),
            "m" => Some(Self::Minutes),
            "h" => Some(Self::Hours),
            "t" => Some(Self::Ticks),
            _ => None,
        }
    }
}

/// A duration literal such as `500ms` or `12t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duration {
    pub amount: u64,
    pub unit: TimeUnit,
    pub span: Span,
}

impl Duration {
    /// Convert to milliseconds. `None` on overflow.
    pub fn to_millis(&self, tick_interval_ms: u32) -> Option<u64> {
        let factor = match self.unit {
            TimeUnit::Millis => 1,
            TimeUnit::Seconds => 1_000,
            TimeUnit::Minutes => 60_000,
            TimeUnit::Hours => 3_600_000,
            TimeUnit::Ticks => u64::from(tick_interval_ms),
        };
        self.amount.checked_mul(factor)
    }
}
