//! Per-instruction field layouts.
//!
//! Every record starts with the 4-bit type tag. The remaining fields depend
//! on the kind; numeric fields whose range varies use the width opcodes from
//! [`crate::opcode`].

use std::collections::BTreeSet;

use glow_types::{Channel, LedState};

use crate::bits::BitPacker;
use crate::context::CompileContext;
use crate::error::{CodegenError, CodegenResult};
use crate::fields::FieldSet;
use crate::ir::{InstrKind, InstrType};
use crate::opcode::push_var2;
use crate::schedule::Path;

/// Name of the goto field patched during layout.
pub const GOTO_TARGET: &str = "target bit addr";

const COLOR_BITMAP_WIDTH: u64 = 4;
const ACTION_SET_VALUE: u64 = 0;

/// Direction of a ramped channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncDec {
    None = 0,
    Increment = 1,
    Decrement = 2,
}

impl IncDec {
    fn of(delta: i32) -> Self {
        match delta.signum() {
            1 => Self::Increment,
            -1 => Self::Decrement,
            _ => Self::None,
        }
    }
}

/// How a ramp approximates a color change: move `color_step` every
/// `tick_step` ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RampStep {
    pub tick_step: u64,
    pub color_step: u64,
}

/// Step for a channel that changes by `delta` over `ticks` ticks.
pub fn ramp_step(ticks: u64, delta: u32) -> RampStep {
    let delta = u64::from(delta);
    if delta == 0 {
        RampStep {
            tick_step: 1,
            color_step: 0,
        }
    } else if ticks == 0 {
        // Zero-length ramp: jump in a single step.
        RampStep {
            tick_step: 1,
            color_step: delta,
        }
    } else if ticks >= delta {
        RampStep {
            tick_step: ticks / delta,
            color_step: 1,
        }
    } else {
        RampStep {
            tick_step: 1,
            color_step: delta / ticks,
        }
    }
}

/// Encode every instruction of every path.
pub fn assign_fields(
    paths: &mut [Path],
    ctx: &CompileContext,
    cross_path: &BTreeSet<u32>,
) -> CodegenResult<()> {
    for instr in paths.iter_mut().flat_map(|p| p.instructions.iter_mut()) {
        instr.fields = encode(&instr.kind, ctx, cross_path).map_err(|e| e.at(instr.span))?;
    }
    Ok(())
}

/// Build the field list of one instruction.
pub fn encode(
    kind: &InstrKind,
    ctx: &CompileContext,
    cross_path: &BTreeSet<u32>,
) -> CodegenResult<FieldSet> {
    let ty = kind
        .instr_type()
        .ok_or_else(|| CodegenError::Internal("call marker reached the encoder".to_string()))?;
    let mut fields = FieldSet::new();
    fields.push_value("type", InstrType::WIDTH, ty.tag())?;

    match kind {
        InstrKind::Control { memory, command } => {
            fields.push_value("memory opcode", 1, *memory as u64)?;
            fields.push_value("control opcode", 3, *command as u64)?;
        }
        InstrKind::Here { .. } | InstrKind::PathEnd => {}
        InstrKind::Goto { .. } => {
            fields.push_value(GOTO_TARGET, 32, 0)?;
        }
        InstrKind::Pause { millis } => {
            let tick = ctx.tick_ms();
            if tick == 0 || millis % tick != 0 {
                return Err(CodegenError::PauseNotTickMultiple {
                    millis: *millis,
                    tick_ms: tick,
                    span: None,
                });
            }
            push_var2(&mut fields, "tick value", millis / tick)?;
        }
        InstrKind::GlowImmediate { leds, color } => {
            encode_immediate(&mut fields, leds, color, ctx.led_count())?;
        }
        InstrKind::GlowRamp {
            leds,
            from,
            to,
            millis,
        } => {
            let ticks = millis.checked_div(ctx.tick_ms()).unwrap_or(0);
            let force = leds.iter().any(|led| cross_path.contains(led));
            encode_ramp(&mut fields, leds, from, to, ticks, force, ctx.led_count())?;
        }
        InstrKind::PathActivate { target } => {
            fields.push_value("path index", 8, u64::from(*target))?;
        }
        // Rejected above.
        InstrKind::Call { .. } => {}
    }
    Ok(fields)
}

fn encode_immediate(
    fields: &mut FieldSet,
    leds: &[u32],
    color: &LedState,
    led_count: u32,
) -> CodegenResult<()> {
    fields.push_value("color bitmap", COLOR_BITMAP_WIDTH, 0b1111)?;
    fields.push_value("action opcode", 2, ACTION_SET_VALUE)?;
    for channel in Channel::ALL {
        let width = if channel == Channel::Bright { 5 } else { 8 };
        fields.push_value(
            format!("{channel} value"),
            width,
            u64::from(color.get(channel)),
        )?;
    }
    fields.push(led_bitmap(leds, led_count)?);
    Ok(())
}

fn encode_ramp(
    fields: &mut FieldSet,
    leds: &[u32],
    from: &LedState,
    to: &LedState,
    ticks: u64,
    force_all: bool,
    led_count: u32,
) -> CodegenResult<()> {
    push_var2(fields, "ramp tick value", ticks)?;
    let bitmap = fields.push_value("color bitmap", COLOR_BITMAP_WIDTH, 0)?;

    for channel in Channel::ALL {
        let delta = from.delta(to, channel);
        if delta == 0 && !force_all {
            continue;
        }
        fields.get_mut(bitmap).set_flag(u64::from(channel.bitmap_index()))?;
        fields.push_value(format!("{channel} init value"), 8, u64::from(from.get(channel)))?;
        fields.push_value(format!("{channel} inc/dec opcode"), 2, IncDec::of(delta) as u64)?;
        if delta != 0 {
            let step = ramp_step(ticks, delta.unsigned_abs());
            push_var2(fields, &format!("{channel} tick step"), step.tick_step)?;
            fields.push_value(format!("{channel} color step"), 8, step.color_step)?;
        }
    }

    fields.push(led_bitmap(leds, led_count)?);
    Ok(())
}

/// LED `i` maps to flag `led_count - 1 - i`, so LED 0 is transmitted first.
fn led_bitmap(leds: &[u32], led_count: u32) -> CodegenResult<BitPacker> {
    let mut bitmap = BitPacker::new("led bitmap", u64::from(led_count));
    for &led in leds {
        if led >= led_count {
            return Err(CodegenError::FlagOutOfRange {
                field: bitmap.name().to_string(),
                index: u64::from(led),
                width: u64::from(led_count),
                span: None,
            });
        }
        bitmap.set_flag(u64::from(led_count - 1 - led))?;
    }
    Ok(bitmap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glow_types::DeviceConfig;

    fn ctx(leds: u32, tick: u32) -> CompileContext {
        CompileContext::new(DeviceConfig {
            led_count: leds,
            tick_interval_millisecs: tick,
            ..DeviceConfig::default()
        })
    }

    #[test]
    fn ramp_step_spreads_ticks_or_colors() {
        assert_eq!(ramp_step(100, 10), RampStep { tick_step: 10, color_step: 1 });
        assert_eq!(ramp_step(10, 100), RampStep { tick_step: 1, color_step: 10 });
        assert_eq!(ramp_step(7, 7), RampStep { tick_step: 1, color_step: 1 });
        assert_eq!(ramp_step(0, 50), RampStep { tick_step: 1, color_step: 50 });
    }

    #[test]
    fn pause_must_be_whole_ticks() {
        let ctx = ctx(8, 10);
        let ok = encode(&InstrKind::Pause { millis: 500 }, &ctx, &BTreeSet::new()).unwrap();
        assert_eq!(ok.find("tick value").map(BitPacker::get), Some(50));
        assert_eq!(ok.width(), 4 + 2 + 8);
        assert!(matches!(
            encode(&InstrKind::Pause { millis: 505 }, &ctx, &BTreeSet::new()),
            Err(CodegenError::PauseNotTickMultiple { millis: 505, tick_ms: 10, .. })
        ));
    }

    #[test]
    fn immediate_led_bitmap_puts_led_zero_first() {
        let fields = encode(
            &InstrKind::GlowImmediate {
                leds: vec![0, 2],
                color: LedState::new(1, 2, 3, 4),
            },
            &ctx(4, 10),
            &BTreeSet::new(),
        )
        .unwrap();
        assert_eq!(fields.find("led bitmap").map(|b| b.to_string()), Some("1010".into()));
        assert_eq!(fields.find("bright value").map(BitPacker::width), Some(5));
        assert_eq!(fields.width(), 4 + 4 + 2 + 8 * 3 + 5 + 4);
    }

    #[test]
    fn ramp_omits_unchanged_channels() {
        let fields = encode(
            &InstrKind::GlowRamp {
                leds: vec![1],
                from: LedState::new(0, 0, 9, 31),
                to: LedState::new(200, 0, 9, 31),
                millis: 2000,
            },
            &ctx(4, 10),
            &BTreeSet::new(),
        )
        .unwrap();
        assert_eq!(fields.find("color bitmap").map(BitPacker::get), Some(0b1000));
        assert!(fields.find("blue init value").is_none());
        assert_eq!(fields.find("red tick step").map(BitPacker::get), Some(1));
        assert_eq!(fields.find("red color step").map(BitPacker::get), Some(1));
        assert_eq!(fields.find("ramp tick value").map(BitPacker::get), Some(200));
    }

    #[test]
    fn call_marker_is_not_encodable() {
        let err = encode(
            &InstrKind::Call {
                function: "@x".into(),
            },
            &ctx(4, 10),
            &BTreeSet::new(),
        )
        .unwrap_err();
        assert!(matches!(err, CodegenError::Internal(_)));
    }

    #[test]
    fn led_beyond_device_is_rejected() {
        let err = encode(
            &InstrKind::GlowImmediate {
                leds: vec![4],
                color: LedState::default(),
            },
            &ctx(4, 10),
            &BTreeSet::new(),
        )
        .unwrap_err();
        assert!(matches!(err, CodegenError::FlagOutOfRange { index: 4, width: 4, .. }));
    }
}
