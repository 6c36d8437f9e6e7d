//! LEDs shared between paths.
//!
//! When two paths write the same LED, a ramp on one of them can be resumed
//! by the device after the other path has touched the LED. Such ramps encode
//! every channel in full.

use std::collections::{BTreeSet, HashMap};

use crate::ir::PathId;
use crate::schedule::Path;

/// LEDs in `0..led_count` written by more than one path.
pub fn cross_path_leds(paths: &[Path], led_count: u32) -> BTreeSet<u32> {
    let mut writers: HashMap<u32, BTreeSet<PathId>> = HashMap::new();
    for path in paths {
        for instr in &path.instructions {
            for &led in instr.kind.leds() {
                writers.entry(led).or_default().insert(path.id);
            }
        }
    }
    writers
        .into_iter()
        .filter(|(led, ids)| *led < led_count && ids.len() > 1)
        .map(|(led, _)| led)
        .collect()
}
