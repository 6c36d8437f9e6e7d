//! Host-to-device control packets.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::context::CompileContext;
use crate::encode::encode;
use crate::error::CodegenResult;
use crate::ir::{ControlCommand, InstrKind, MemoryTarget};
use crate::packet::pad_to_packet;

/// One packet per command. `store` is followed by the image it stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlPackets {
    pub pause: Vec<u8>,
    pub resume: Vec<u8>,
    pub restart: Vec<u8>,
    pub store: Vec<u8>,
}

/// Memory targeted by every command for this device.
pub fn memory_target(ctx: &CompileContext) -> MemoryTarget {
    if ctx.device.save_to_rom {
        MemoryTarget::Nvm
    } else {
        MemoryTarget::Sram
    }
}

fn control_packet(command: ControlCommand, ctx: &CompileContext) -> CodegenResult<Vec<u8>> {
    let kind = InstrKind::Control {
        memory: memory_target(ctx),
        command,
    };
    let fields = encode(&kind, ctx, &BTreeSet::new())?;
    Ok(pad_to_packet(fields.aggregate(), ctx.packet_bits()).to_bytes())
}

/// Build the four control packets for `image`.
pub fn control_packets(image: &[u8], ctx: &CompileContext) -> CodegenResult<ControlPackets> {
    let mut store = control_packet(ControlCommand::Store, ctx)?;
    store.extend_from_slice(image);
    Ok(ControlPackets {
        pause: control_packet(ControlCommand::Pause, ctx)?,
        resume: control_packet(ControlCommand::Resume, ctx)?,
        restart: control_packet(ControlCommand::Restart, ctx)?,
        store,
    })
}
