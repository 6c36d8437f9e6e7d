//! Shared types for the Glow lightshow compiler.
//!
//! This crate defines the script AST, source spans, error types, LED color
//! state and the device configuration used across all compiler stages.

mod error;
mod span;
pub mod ast;
pub mod device;
pub mod led;

pub use device::{DeviceConfig, ProtocolLimits, PROTOCOL_VERSION};
pub use error::{CompileErrors, ErrorCategory, ErrorCode, GlowError, Severity, MAX_ERRORS};
pub use led::{Channel, LedState};
pub use span::{SourceFile, Span};
