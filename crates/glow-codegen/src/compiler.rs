//! Backend pipeline.
//!
//! Stages, in order:
//! 1. Check the device against the protocol
//! 2. Schedule instructions into prioritized paths
//! 3. Find LEDs shared between paths
//! 4. Encode every instruction
//! 5. Pad paths, stamp addresses, resolve gotos
//! 6. Build the context region
//! 7. Concatenate and pad to whole USB packets
//! 8. Check the RAM/ROM budget
//! 9. Build the control packets

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::bits::BitPacker;
use crate::budget::{check_budget, UsageReport};
use crate::context::CompileContext;
use crate::context_region::build_context_region;
use crate::control::{control_packets, ControlPackets};
use crate::cross_path::cross_path_leds;
use crate::encode::assign_fields;
use crate::error::CodegenResult;
use crate::ir::Instruction;
use crate::layout;
use crate::listing::render_listing;
use crate::packet::packetize;
use crate::schedule::schedule;

/// A compiled show, ready to send to the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lightshow {
    /// Context region, instruction region and 1-filled packet pad.
    pub image: Vec<u8>,
    pub context_region_bytes: u64,
    pub instruction_region_bytes: u64,
    pub max_path_bytes: u64,
    pub thread_count: usize,
    pub simulator_brightness: u32,
    pub report: UsageReport,
    pub packets: ControlPackets,
}

/// Compile an expanded instruction list into a lightshow image.
pub fn compile(instructions: Vec<Instruction>, ctx: &CompileContext) -> CodegenResult<Lightshow> {
    run(instructions, ctx, false).map(|(show, _)| show)
}

/// Like [`compile`], also returning a field-by-field listing of the image.
pub fn compile_with_listing(
    instructions: Vec<Instruction>,
    ctx: &CompileContext,
) -> CodegenResult<(Lightshow, String)> {
    run(instructions, ctx, true).map(|(show, listing)| (show, listing.unwrap_or_default()))
}

fn run(
    instructions: Vec<Instruction>,
    ctx: &CompileContext,
    want_listing: bool,
) -> CodegenResult<(Lightshow, Option<String>)> {
    // 1. Device gate
    ctx.check()?;

    // 2. Scheduling
    let mut paths = schedule(instructions, ctx)?;
    debug!(paths = paths.len(), "scheduled paths");

    // 3. Shared LEDs
    let cross = cross_path_leds(&paths, ctx.led_count());
    debug!(cross_path_leds = cross.len(), "analysed shared LEDs");

    // 4. Encoding
    assign_fields(&mut paths, ctx, &cross)?;

    // 5. Layout
    layout::finalize(&mut paths)?;

    // 6. Context region
    let region = build_context_region(&paths, ctx)?;
    debug!(
        context_bytes = region.byte_len,
        instruction_bytes = region.instruction_region_bytes,
        max_path_bytes = region.max_path_bytes,
        "built context region"
    );
    if region.simulator_brightness == 0 {
        warn!("show never lights any LED");
    }

    // 7. Packets
    let mut instruction_bits = BitPacker::new("instruction region", 0);
    for instr in paths.iter().flat_map(|p| p.instructions.iter()) {
        instruction_bits.append(&instr.fields.aggregate());
    }
    let image = packetize(
        &region.fields.aggregate(),
        &instruction_bits,
        ctx.packet_bits(),
    )
    .to_bytes();
    debug!(image_bytes = image.len(), "packetized image");

    // 8. Budget
    let report = check_budget(
        ctx,
        paths.len(),
        region.byte_len,
        region.max_path_bytes,
        image.len() as u64,
    )?;

    // 9. Control packets
    let packets = control_packets(&image, ctx)?;

    let listing = want_listing.then(|| render_listing(&region, &paths));
    let show = Lightshow {
        image,
        context_region_bytes: region.byte_len,
        instruction_region_bytes: region.instruction_region_bytes,
        max_path_bytes: region.max_path_bytes,
        thread_count: paths.len(),
        simulator_brightness: region.simulator_brightness,
        report,
        packets,
    };
    Ok((show, listing))
}
