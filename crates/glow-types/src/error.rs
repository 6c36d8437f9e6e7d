use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of errors reported before fail-fast.
pub const MAX_ERRORS: usize = 20;

/// Error severity.
///
/// Compilation is all-or-nothing; warnings never block an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Error category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Syntax,
    Semantic,
    Structure,
    Resource,
    Configuration,
    Encoding,
}

/// Numeric error code (E100–E699).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Syntax errors (E100–E199) ──
    pub const UNEXPECTED_TOKEN: Self = Self(100);
    pub const UNKNOWN_INSTRUCTION: Self = Self(101);
    pub const INVALID_CHARACTER: Self = Self(102);
    pub const UNTERMINATED_STRING: Self = Self(103);
    pub const STATEMENT_OUTSIDE_FUNCTION: Self = Self(104);
    pub const INVALID_NUMBER: Self = Self(105);

    // ── Semantic validation errors (E200–E299) ──
    pub const LED_OUT_OF_RANGE: Self = Self(200);
    pub const COLOR_OUT_OF_RANGE: Self = Self(201);
    pub const DURATION_TOO_LONG: Self = Self(202);
    pub const DURATION_NOT_TICK_MULTIPLE: Self = Self(203);
    pub const REPEAT_OUT_OF_RANGE: Self = Self(204);
    pub const ZORDER_OUT_OF_RANGE: Self = Self(205);
    pub const UNKNOWN_DEFINE: Self = Self(206);
    pub const DEFINE_TOO_DEEP: Self = Self(207);
    pub const DUPLICATE_DEFINE: Self = Self(208);
    pub const SHOW_NEVER_LIGHTS: Self = Self(209);

    // ── Structure / control-flow errors (E300–E399) ──
    pub const UNRESOLVED_LABEL: Self = Self(300);
    pub const MISALIGNED_PATH: Self = Self(301);
    pub const UNKNOWN_FUNCTION: Self = Self(302);
    pub const DUPLICATE_FUNCTION: Self = Self(303);
    pub const MISSING_ENTRY_POINT: Self = Self(304);
    pub const RECURSIVE_CALL: Self = Self(305);
    pub const UNRESOLVED_PATH: Self = Self(306);
    pub const DUPLICATE_LABEL: Self = Self(307);

    // ── Resource budget errors (E400–E499) ──
    pub const TOO_MANY_THREADS: Self = Self(400);
    pub const RAM_EXCEEDED: Self = Self(401);
    pub const ROM_EXCEEDED: Self = Self(402);

    // ── Configuration errors (E500–E599) ──
    pub const PROTOCOL_MISMATCH: Self = Self(500);
    pub const MISSING_DEVICE: Self = Self(501);
    pub const INVALID_DEVICE_SETTING: Self = Self(502);
    pub const INVALID_DEVICE_VALUE: Self = Self(503);

    // ── Encoding errors (E600–E699) ──
    pub const FIELD_OVERFLOW: Self = Self(600);
    pub const INTERNAL: Self = Self(601);

    /// Get the category for this error code.
    pub fn category(self) -> ErrorCategory {
        match self.0 {
            100..=199 => ErrorCategory::Syntax,
            200..=299 => ErrorCategory::Semantic,
            300..=399 => ErrorCategory::Structure,
            400..=499 => ErrorCategory::Resource,
            500..=599 => ErrorCategory::Configuration,
            _ => ErrorCategory::Encoding,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// A structured Glow compiler error.
///
/// Front ends render these; they must not parse free-form strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlowError {
    /// Source file name.
    pub file: String,
    /// Error code (e.g., E300).
    pub code: ErrorCode,
    /// Error severity.
    pub severity: Severity,
    /// Error category (derived from code).
    pub category: ErrorCategory,
    /// Human-readable error message.
    pub message: String,
    /// Source location.
    #[serde(flatten)]
    pub span: Span,
    /// The exact source line for context.
    pub source_line: String,
    /// Optional fix suggestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl GlowError {
    /// Create a new error.
    pub fn new(
        file: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            code,
            severity: Severity::Error,
            category: code.category(),
            message: message.into(),
            span,
            source_line: source_line.into(),
            suggestion: None,
        }
    }

    /// Create a warning. Warnings are reported but never fail a build.
    pub fn warning(
        file: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::new(file, code, message, span, "")
        }
    }

    /// Attach a fix suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for GlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} [{}] {}",
            self.file, self.span, self.code, self.category, self.message
        )
    }
}

impl std::error::Error for GlowError {}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "syntax"),
            Self::Semantic => write!(f, "semantic"),
            Self::Structure => write!(f, "structure"),
            Self::Resource => write!(f, "resource"),
            Self::Configuration => write!(f, "configuration"),
            Self::Encoding => write!(f, "encoding"),
        }
    }
}

/// The structured JSON output for compilation diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileErrors {
    pub errors: Vec<GlowError>,
    pub warnings: Vec<GlowError>,
    pub total_errors: usize,
    pub total_warnings: usize,
}

impl CompileErrors {
    /// Create an empty result (no errors).
    pub fn empty() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            total_errors: 0,
            total_warnings: 0,
        }
    }

    /// Wrap a single error.
    pub fn single(error: GlowError) -> Self {
        let mut errs = Self::empty();
        errs.push_error(error);
        errs
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// Add an error, respecting the MAX_ERRORS limit.
    pub fn push_error(&mut self, error: GlowError) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
        self.total_errors += 1;
    }

    /// Add a warning.
    pub fn push_warning(&mut self, warning: GlowError) {
        self.warnings.push(warning);
        self.total_warnings += 1;
    }

    /// Move every error and warning of `other` into `self`.
    pub fn extend(&mut self, other: CompileErrors) {
        for err in other.errors {
            self.push_error(err);
        }
        // Errors dropped by `other`'s cap still count.
        self.total_errors += other.total_errors.saturating_sub(other.total_errors.min(MAX_ERRORS));
        for warning in other.warnings {
            self.push_warning(warning);
        }
    }
}
