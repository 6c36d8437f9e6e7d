//! Human-readable dump of every encoded field.

use std::fmt::{self, Write};

use crate::context_region::ContextRegion;
use crate::fields::FieldSet;
use crate::opcode::{Opcode2, Opcode3, WIDTH_OPCODE};
use crate::schedule::Path;

/// Render the context region and every path, field by field.
pub fn render_listing(context: &ContextRegion, paths: &[Path]) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_listing(&mut out, context, paths);
    out
}

fn write_listing(out: &mut String, context: &ContextRegion, paths: &[Path]) -> fmt::Result {
    writeln!(out, "context-region: {} bytes", context.byte_len)?;
    write_fields(out, &context.fields)?;
    writeln!(out)?;

    for path in paths {
        writeln!(
            out,
            "path {} (thread {}, z-order {}, {} bits)",
            path.id,
            path.thread,
            path.z_order,
            path.width()
        )?;
        for instr in &path.instructions {
            write!(
                out,
                "  {} @ bit {} (path bit {})",
                instr.kind.name(),
                instr.bit_address,
                instr.path_bit_address
            )?;
            if let Some(span) = instr.span {
                write!(out, " line {}", span.start_line)?;
            }
            writeln!(out)?;
            write_fields(out, &instr.fields)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_fields(out: &mut String, fields: &FieldSet) -> fmt::Result {
    let mut start = 0u64;
    for field in fields.iter() {
        let value = if field.name().ends_with(WIDTH_OPCODE) {
            match field.width() {
                2 => opcode2_name(field.get()).to_string(),
                3 => opcode3_name(field.get()).to_string(),
                _ => field.get().to_string(),
            }
        } else if field.name() == "action opcode" && field.get() == 0 {
            "SetVal".to_string()
        } else {
            field.get().to_string()
        };
        writeln!(
            out,
            "    {:<28}: {} (width={}, value={}, startbit={})",
            field.name(),
            field,
            field.width(),
            value,
            start
        )?;
        start += field.width();
    }
    Ok(())
}

fn opcode2_name(code: u64) -> &'static str {
    [Opcode2::Bytes1, Opcode2::Bytes2, Opcode2::Bytes3, Opcode2::Bytes4]
        .into_iter()
        .find(|op| op.code() == code)
        .map_or("unknown", Opcode2::name)
}

fn opcode3_name(code: u64) -> &'static str {
    [
        Opcode3::Bytes0,
        Opcode3::Bytes1,
        Opcode3::Bytes2,
        Opcode3::Bytes3,
        Opcode3::Bytes4,
    ]
    .into_iter()
    .find(|op| op.code() == code)
    .map_or("unknown", Opcode3::name)
}
