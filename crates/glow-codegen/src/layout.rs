//! Instruction-region layout: path padding, address stamping and goto
//! resolution.

use std::collections::HashMap;

use crate::bits::BitPacker;
use crate::encode::GOTO_TARGET;
use crate::error::{CodegenError, CodegenResult};
use crate::ir::InstrKind;
use crate::schedule::Path;

const BITS_PER_BYTE: u64 = 8;

/// Run every layout step in order.
pub fn finalize(paths: &mut [Path]) -> CodegenResult<()> {
    pad_paths(paths);
    stamp_addresses(paths);
    resolve_gotos(paths)?;
    check_alignment(paths)
}

/// Pad the last instruction of each path so the next path starts on a byte
/// boundary.
pub fn pad_paths(paths: &mut [Path]) {
    for path in paths.iter_mut() {
        let pad = BITS_PER_BYTE - path.width() % BITS_PER_BYTE;
        if pad == BITS_PER_BYTE {
            continue;
        }
        if let Some(last) = path.instructions.last_mut() {
            last.fields.push(BitPacker::new("byte-align padding", pad));
        }
    }
}

/// Set absolute and path-relative bit addresses in schedule order.
pub fn stamp_addresses(paths: &mut [Path]) {
    let mut absolute = 0u64;
    for path in paths.iter_mut() {
        let mut relative = 0u64;
        for instr in &mut path.instructions {
            instr.bit_address = absolute;
            instr.path_bit_address = relative;
            let width = instr.width();
            absolute += width;
            relative += width;
        }
    }
}

/// Point every goto at the path-relative address of the `here` with the same
/// label and scope in its own path.
pub fn resolve_gotos(paths: &mut [Path]) -> CodegenResult<()> {
    for path in paths.iter_mut() {
        let mut labels: HashMap<(String, u32), u64> = HashMap::new();
        for instr in &path.instructions {
            if let InstrKind::Here { label, scope } = &instr.kind {
                labels
                    .entry((label.clone(), *scope))
                    .or_insert(instr.path_bit_address);
            }
        }

        for instr in &mut path.instructions {
            let InstrKind::Goto { label, scope } = &instr.kind else {
                continue;
            };
            let Some(&target) = labels.get(&(label.clone(), *scope)) else {
                return Err(CodegenError::UnresolvedLabel {
                    label: label.clone(),
                    span: instr.span,
                });
            };
            let field = instr.fields.find_mut(GOTO_TARGET).ok_or_else(|| {
                CodegenError::Internal(format!("goto '{label}' has no target field"))
            })?;
            field.set(target).map_err(|e| e.at(instr.span))?;
        }
    }
    Ok(())
}

/// Every path must start a whole number of bytes after the first one.
pub fn check_alignment(paths: &[Path]) -> CodegenResult<()> {
    let Some(base) = paths
        .first()
        .and_then(|p| p.instructions.first())
        .map(|i| i.bit_address)
    else {
        return Ok(());
    };
    for path in paths {
        if let Some(first) = path.instructions.first() {
            if (first.bit_address - base) % BITS_PER_BYTE != 0 {
                return Err(CodegenError::MisalignedPath {
                    thread: path.thread,
                    bit_address: first.bit_address,
                });
            }
        }
    }
    Ok(())
}
