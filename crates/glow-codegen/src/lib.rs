//! Glow code generator: expanded instruction list to bit-packed lightshow
//! image.
//!
//! # Architecture
//!
//! The front end hands over a flat [`Instruction`] list in which every
//! instruction already carries its path id and z-order. The backend then:
//!
//! - groups the list into paths and numbers them as prioritized threads
//!   ([`schedule`])
//! - finds LEDs written by more than one path ([`cross_path`])
//! - encodes each instruction as an ordered list of named bit fields
//!   ([`encode`], [`fields`], [`opcode`])
//! - byte-aligns paths, stamps addresses and resolves gotos ([`layout`])
//! - prepends the context region ([`context_region`]) and pads to whole USB
//!   packets ([`packet`])
//!
//! ## Image
//!
//! `[context region][path 0][path 1]...[1-filled pad]`
//!
//! All multi-bit values are transmitted most significant bit first.

pub mod bits;
pub mod budget;
pub mod compiler;
pub mod context;
pub mod context_region;
pub mod control;
pub mod cross_path;
pub mod encode;
pub mod error;
pub mod fields;
pub mod ir;
pub mod layout;
pub mod listing;
pub mod opcode;
pub mod packet;
pub mod schedule;

pub use bits::BitPacker;
pub use budget::UsageReport;
pub use compiler::{compile, compile_with_listing, Lightshow};
pub use context::CompileContext;
pub use control::ControlPackets;
pub use error::{CodegenError, CodegenResult};
pub use ir::{InstrKind, InstrType, Instruction, PathId};
