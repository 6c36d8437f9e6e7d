//! Codegen error types.

use glow_types::{ErrorCode, Span};
use thiserror::Error;

/// Errors that can occur while turning instructions into a lightshow image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    /// A value needs more bits than its field declares.
    #[error("value {value} does not fit in {width}-bit field '{field}'")]
    FieldOverflow {
        field: String,
        width: u64,
        value: u64,
        span: Option<Span>,
    },

    #[error("flag {index} is outside {width}-bit field '{field}'")]
    FlagOutOfRange {
        field: String,
        index: u64,
        width: u64,
        span: Option<Span>,
    },

    #[error("cannot insert at bit {index} of {width}-bit field '{field}'")]
    InsertOutOfRange { field: String, index: u64, width: u64 },

    #[error("show runs {count} concurrent paths but the device supports {max}")]
    TooManyThreads { count: usize, max: u32 },

    #[error("goto target '{label}' has no matching 'here' in the same function")]
    UnresolvedLabel { label: String, span: Option<Span> },

    #[error("path on thread {thread} starts at bit {bit_address}, which is not byte aligned")]
    MisalignedPath { thread: u32, bit_address: u64 },

    #[error("pause of {millis}ms is not a multiple of the {tick_ms}ms device tick")]
    PauseNotTickMultiple {
        millis: u64,
        tick_ms: u64,
        span: Option<Span>,
    },

    #[error("path activation targets unknown path {path}")]
    UnresolvedPath { path: u32, span: Option<Span> },

    #[error("show needs {needed} bytes of RAM but the device has {available}")]
    RamExceeded { needed: u64, available: u64 },

    #[error("show needs {needed} bytes of ROM but the device has {available}")]
    RomExceeded { needed: u64, available: u64 },

    #[error("device protocol version '{found}' does not match compiler protocol version '{expected}'")]
    ProtocolMismatch { found: String, expected: String },

    #[error("invalid device configuration: {0}")]
    InvalidDevice(String),

    /// An internal consistency check failed.
    #[error("internal codegen error: {0}")]
    Internal(String),
}

impl CodegenError {
    /// The structured error code this error is reported under.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::FieldOverflow { .. }
            | Self::FlagOutOfRange { .. }
            | Self::InsertOutOfRange { .. } => ErrorCode::FIELD_OVERFLOW,
            Self::TooManyThreads { .. } => ErrorCode::TOO_MANY_THREADS,
            Self::UnresolvedLabel { .. } => ErrorCode::UNRESOLVED_LABEL,
            Self::MisalignedPath { .. } => ErrorCode::MISALIGNED_PATH,
            Self::PauseNotTickMultiple { .. } => ErrorCode::DURATION_NOT_TICK_MULTIPLE,
            Self::UnresolvedPath { .. } => ErrorCode::UNRESOLVED_PATH,
            Self::RamExceeded { .. } => ErrorCode::RAM_EXCEEDED,
            Self::RomExceeded { .. } => ErrorCode::ROM_EXCEEDED,
            Self::ProtocolMismatch { .. } => ErrorCode::PROTOCOL_MISMATCH,
            Self::InvalidDevice(_) => ErrorCode::INVALID_DEVICE_VALUE,
            Self::Internal(_) => ErrorCode::INTERNAL,
        }
    }

    /// Source location of the offending instruction, when known.
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::FieldOverflow { span, .. }
            | Self::FlagOutOfRange { span, .. }
            | Self::UnresolvedLabel { span, .. }
            | Self::PauseNotTickMultiple { span, .. }
            | Self::UnresolvedPath { span, .. } => *span,
            _ => None,
        }
    }

    /// Attach `span` to an error raised below the instruction level.
    pub(crate) fn at(mut self, at: Option<Span>) -> Self {
        match &mut self {
            Self::FieldOverflow { span, .. }
            | Self::FlagOutOfRange { span, .. }
            | Self::PauseNotTickMultiple { span, .. }
                if span.is_none() =>
            {
                *span = at;
            }
            _ => {}
        }
        self
    }
}

/// Codegen result type alias.
pub type CodegenResult<T> = Result<T, CodegenError>;
