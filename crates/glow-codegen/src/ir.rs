//! Instruction intermediate representation.
//!
//! The compiler front end expands a script into a flat `Vec<Instruction>`;
//! every backend stage then refines that list in place (thread index,
//! encoded fields, addresses).

use glow_types::{LedState, Span};

use crate::fields::FieldSet;

/// Path id allocated by call-graph expansion. `None` on an instruction marks
/// the virtual launcher, which never reaches the image.
pub type PathId = u32;

/// 4-bit instruction type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrType {
    Control = 0,
    Here = 1,
    Goto = 2,
    Pause = 3,
    GlowImmediate = 4,
    GlowRamp = 5,
    ContextRegion = 13,
    PathActivate = 14,
    PathEnd = 15,
}

impl InstrType {
    pub const WIDTH: u64 = 4;

    pub fn tag(self) -> u64 {
        self as u64
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Control => "control",
            Self::Here => "here",
            Self::Goto => "goto",
            Self::Pause => "pause",
            Self::GlowImmediate => "glowImmediate",
            Self::GlowRamp => "glowRamp",
            Self::ContextRegion => "contextRegion",
            Self::PathActivate => "pathActivate",
            Self::PathEnd => "pathEnd",
        }
    }
}

/// Memory a control command addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryTarget {
    Sram = 0,
    Nvm = 1,
}

/// Host-to-device command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Pause = 0,
    Resume = 1,
    Restart = 2,
    Store = 3,
}

/// What an instruction does. LED indices are 0-based; durations are in
/// milliseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstrKind {
    Control {
        memory: MemoryTarget,
        command: ControlCommand,
    },
    Here {
        label: String,
        scope: u32,
    },
    Goto {
        label: String,
        scope: u32,
    },
    Pause {
        millis: u64,
    },
    GlowImmediate {
        leds: Vec<u32>,
        color: LedState,
    },
    GlowRamp {
        leds: Vec<u32>,
        from: LedState,
        to: LedState,
        millis: u64,
    },
    /// Starts another path. Holds a path id until scheduling rewrites it to
    /// the target's thread index.
    PathActivate {
        target: u32,
    },
    PathEnd,
    /// Expansion marker; never encoded.
    Call {
        function: String,
    },
}

impl InstrKind {
    /// The wire tag, or `None` for the call marker.
    pub fn instr_type(&self) -> Option<InstrType> {
        Some(match self {
            Self::Control { .. } => InstrType::Control,
            Self::Here { .. } => InstrType::Here,
            Self::Goto { .. } => InstrType::Goto,
            Self::Pause { .. } => InstrType::Pause,
            Self::GlowImmediate { .. } => InstrType::GlowImmediate,
            Self::GlowRamp { .. } => InstrType::GlowRamp,
            Self::PathActivate { .. } => InstrType::PathActivate,
            Self::PathEnd => InstrType::PathEnd,
            Self::Call { .. } => return None,
        })
    }

    /// LEDs written by this instruction.
    pub fn leds(&self) -> &[u32] {
        match self {
            Self::GlowImmediate { leds, .. } | Self::GlowRamp { leds, .. } => leds,
            _ => &[],
        }
    }

    pub fn name(&self) -> &'static str {
        self.instr_type().map_or("call", InstrType::name)
    }
}

/// One instruction and everything the backend learns about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub kind: InstrKind,
    pub path: Option<PathId>,
    pub z_order: Option<u32>,
    /// Prioritized thread index, set by scheduling.
    pub thread: Option<u32>,
    /// Bit offset from the start of the instruction region.
    pub bit_address: u64,
    /// Bit offset from the start of this instruction's path.
    pub path_bit_address: u64,
    pub span: Option<Span>,
    pub fields: FieldSet,
}

impl Instruction {
    pub fn new(kind: InstrKind, path: Option<PathId>, z_order: Option<u32>) -> Self {
        Self {
            kind,
            path,
            z_order,
            thread: None,
            bit_address: 0,
            path_bit_address: 0,
            span: None,
            fields: FieldSet::new(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Encoded width in bits; zero until fields are assigned.
    pub fn width(&self) -> u64 {
        self.fields.width()
    }
}
