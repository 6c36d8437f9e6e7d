//! Path scheduling.
//!
//! Splits the flat instruction list into paths, orders them by
//! `(z-order, path id)` and numbers them as prioritized threads. A higher
//! thread index runs on top of a lower one on the device.

use std::collections::{BTreeMap, HashMap};

use crate::context::CompileContext;
use crate::error::{CodegenError, CodegenResult};
use crate::ir::{InstrKind, Instruction, PathId};

/// One concurrent execution unit of the show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub id: PathId,
    pub thread: u32,
    pub z_order: u32,
    pub instructions: Vec<Instruction>,
}

impl Path {
    /// Encoded width in bits.
    pub fn width(&self) -> u64 {
        self.instructions.iter().map(Instruction::width).sum()
    }
}

/// Group instructions into prioritized paths and rewrite every
/// `PathActivate` target from a path id to a thread index.
///
/// Instructions without a path are dropped.
pub fn schedule(instructions: Vec<Instruction>, ctx: &CompileContext) -> CodegenResult<Vec<Path>> {
    let mut groups: BTreeMap<PathId, Vec<Instruction>> = BTreeMap::new();
    for instr in instructions {
        if let Some(id) = instr.path {
            groups.entry(id).or_default().push(instr);
        }
    }

    let max = ctx.limits.max_threads;
    if groups.len() > max as usize {
        return Err(CodegenError::TooManyThreads {
            count: groups.len(),
            max,
        });
    }

    let mut paths: Vec<Path> = groups
        .into_iter()
        .map(|(id, instructions)| Path {
            id,
            thread: 0,
            z_order: instructions.first().and_then(|i| i.z_order).unwrap_or(0),
            instructions,
        })
        .collect();
    paths.sort_by_key(|p| (p.z_order, p.id));

    let mut threads: HashMap<PathId, u32> = HashMap::new();
    for (thread, path) in paths.iter_mut().enumerate() {
        path.thread = thread as u32;
        threads.insert(path.id, path.thread);
        for instr in &mut path.instructions {
            instr.thread = Some(path.thread);
        }
    }

    for instr in paths.iter_mut().flat_map(|p| p.instructions.iter_mut()) {
        if let InstrKind::PathActivate { target } = &mut instr.kind {
            let id = *target;
            *target = *threads.get(&id).ok_or(CodegenError::UnresolvedPath {
                path: id,
                span: instr.span,
            })?;
        }
    }

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glow_types::DeviceConfig;

    fn ctx() -> CompileContext {
        CompileContext::new(DeviceConfig::default())
    }

    #[test]
    fn launcher_instructions_are_dropped() {
        let list = vec![
            Instruction::new(InstrKind::PathActivate { target: 0 }, None, None),
            Instruction::new(InstrKind::PathEnd, Some(0), Some(0)),
        ];
        let paths = schedule(list, &ctx()).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].instructions.len(), 1);
        assert_eq!(paths[0].instructions[0].thread, Some(0));
    }

    #[test]
    fn equal_z_orders_keep_id_order() {
        let list = vec![
            Instruction::new(InstrKind::PathEnd, Some(4), Some(1)),
            Instruction::new(InstrKind::PathEnd, Some(2), Some(1)),
            Instruction::new(InstrKind::PathEnd, Some(9), Some(0)),
        ];
        let ids: Vec<_> = schedule(list, &ctx()).unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![9, 2, 4]);
    }

    #[test]
    fn activation_of_missing_path_fails() {
        let list = vec![Instruction::new(
            InstrKind::PathActivate { target: 7 },
            Some(0),
            Some(0),
        )];
        assert!(matches!(
            schedule(list, &ctx()),
            Err(CodegenError::UnresolvedPath { path: 7, .. })
        ));
    }
}
