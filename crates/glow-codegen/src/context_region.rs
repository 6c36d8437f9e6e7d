//! Context region: the header the device reads before any path runs.
//!
//! Layout, in transmission order:
//!
//! | field              | width            |
//! |--------------------|------------------|
//! | type tag (13)      | 4                |
//! | context byte len   | 16               |
//! | instr. byte len    | 32               |
//! | LED count          | 16               |
//! | tick interval (ms) | 16               |
//! | sim. brightness    | 16               |
//! | path count         | 8                |
//! | path-ended bitmap  | path count       |
//! | per path           | see below        |
//! | byte-align padding | 0..7             |
//!
//! Per path: byte address and byte length (2-bit opcode + value), a
//! reserved instruction bit address (2-bit opcode sized for the path, value
//! always 0), then the longest ramp and longest pause in ticks (3-bit opcode
//! + value).

use glow_types::LedState;

use crate::bits::BitPacker;
use crate::context::CompileContext;
use crate::error::CodegenResult;
use crate::fields::FieldSet;
use crate::ir::{InstrKind, InstrType};
use crate::opcode::{push_var2, push_var2_sized, push_var3};
use crate::schedule::Path;

/// The encoded header plus the sizes it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextRegion {
    pub fields: FieldSet,
    pub byte_len: u64,
    pub instruction_region_bytes: u64,
    pub max_path_bytes: u64,
    pub simulator_brightness: u32,
}

/// Brightest color the show ever sets, as `(R + G + B) × Bright`.
pub fn simulator_brightness(paths: &[Path]) -> u32 {
    let colors = paths
        .iter()
        .flat_map(|p| p.instructions.iter())
        .flat_map(|i| -> Vec<&LedState> {
            match &i.kind {
                InstrKind::GlowImmediate { color, .. } => vec![color],
                InstrKind::GlowRamp { from, to, .. } => vec![from, to],
                _ => Vec::new(),
            }
        });
    colors.map(LedState::simulator_brightness).max().unwrap_or(0)
}

/// Longest ramp and longest pause of `path`, in ticks. A path that ramps
/// but never pauses reports a pause of one tick.
fn max_ticks(path: &Path, tick_ms: u64) -> (u64, u64) {
    let mut ramp = None::<u64>;
    let mut pause = None::<u64>;
    for instr in &path.instructions {
        match instr.kind {
            InstrKind::GlowRamp { millis, .. } => {
                let ticks = millis.checked_div(tick_ms).unwrap_or(0);
                ramp = Some(ramp.map_or(ticks, |m| m.max(ticks)));
            }
            InstrKind::Pause { millis } => {
                let ticks = millis.checked_div(tick_ms).unwrap_or(0);
                pause = Some(pause.map_or(ticks, |m| m.max(ticks)));
            }
            _ => {}
        }
    }
    let pause = match (ramp, pause) {
        (Some(_), None) => 1,
        (_, p) => p.unwrap_or(0),
    };
    (ramp.unwrap_or(0), pause)
}

/// Build the context region for laid-out paths.
pub fn build_context_region(paths: &[Path], ctx: &CompileContext) -> CodegenResult<ContextRegion> {
    let mut fields = FieldSet::new();
    fields.push_value("type", InstrType::WIDTH, InstrType::ContextRegion.tag())?;
    let byte_len_id = fields.push_value("contx-reg byte len", 16, 0)?;
    let instr_len_id = fields.push_value("instr-reg byte len", 32, 0)?;
    fields.push_value("led count", 16, u64::from(ctx.led_count()))?;
    fields.push_value("tick interval", 16, ctx.tick_ms())?;
    let brightness = simulator_brightness(paths);
    fields.push_value("sim bright coeff", 16, u64::from(brightness))?;

    let count = paths.len() as u64;
    fields.push_value("total paths", 8, count)?;
    let mut ended = BitPacker::new("path end bitmap", count);
    for i in 1..count {
        ended.set_flag(count - i - 1)?;
    }
    fields.push(ended);

    let base = paths
        .first()
        .and_then(|p| p.instructions.first())
        .map_or(0, |i| i.bit_address);
    let mut instruction_region_bytes = 0u64;
    let mut max_path_bytes = 0u64;

    for (i, path) in paths.iter().enumerate() {
        let (Some(first), Some(last)) = (path.instructions.first(), path.instructions.last())
        else {
            continue;
        };
        let byte_addr = (first.bit_address - base) >> 3;
        let byte_len = (last.bit_address + last.width() - first.bit_address) >> 3;
        let (ramp_ticks, pause_ticks) = max_ticks(path, ctx.tick_ms());

        push_var2(&mut fields, &format!("path={i} byte addr"), byte_addr)?;
        push_var2(&mut fields, &format!("path={i} byte len"), byte_len)?;
        push_var2_sized(&mut fields, &format!("path={i} instr bit addr"), byte_len << 3, 0)?;
        push_var3(&mut fields, &format!("path={i} max ramp ticks"), ramp_ticks)?;
        push_var3(&mut fields, &format!("path={i} max pause ticks"), pause_ticks)?;

        instruction_region_bytes += byte_len;
        max_path_bytes = max_path_bytes.max(byte_len);
    }

    let pad = 8 - fields.width() % 8;
    if pad < 8 {
        fields.push(BitPacker::new("byte-align padding", pad));
    }
    let byte_len = fields.width() >> 3;
    fields.get_mut(instr_len_id).set(instruction_region_bytes)?;
    fields.get_mut(byte_len_id).set(byte_len)?;

    Ok(ContextRegion {
        fields,
        byte_len,
        instruction_region_bytes,
        max_path_bytes,
        simulator_brightness: brightness,
    })
}
