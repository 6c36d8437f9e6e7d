//! Device resource budget.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::context::CompileContext;
use crate::error::{CodegenError, CodegenResult};

/// Thread, RAM and ROM use of a compiled show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageReport {
    pub threads_used: u64,
    pub threads_max: u64,
    pub ram_used: u64,
    pub ram_max: u64,
    pub rom_used: u64,
    pub rom_max: u64,
}

fn percent(used: u64, max: u64) -> f64 {
    if max == 0 {
        0.0
    } else {
        used as f64 * 100.0 / max as f64
    }
}

impl fmt::Display for UsageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Device threads usage: {:.1}% ({} of {} threads).",
            percent(self.threads_used, self.threads_max),
            self.threads_used,
            self.threads_max
        )?;
        writeln!(
            f,
            "Device RAM usage: {:.1}% ({} of {} bytes).",
            percent(self.ram_used, self.ram_max),
            self.ram_used,
            self.ram_max
        )?;
        write!(
            f,
            "Device ROM usage: {:.1}% ({} of {} bytes).",
            percent(self.rom_used, self.rom_max),
            self.rom_used,
            self.rom_max
        )
    }
}

/// Check the show fits the device.
///
/// A show saved to ROM runs one path at a time from RAM, so RAM holds the
/// context region plus the largest path. Otherwise the whole image lives in
/// RAM.
pub fn check_budget(
    ctx: &CompileContext,
    thread_count: usize,
    context_bytes: u64,
    max_path_bytes: u64,
    image_bytes: u64,
) -> CodegenResult<UsageReport> {
    let (ram_used, rom_used) = if ctx.device.save_to_rom {
        (context_bytes + max_path_bytes, image_bytes)
    } else {
        (image_bytes, 0)
    };
    let report = UsageReport {
        threads_used: thread_count as u64,
        threads_max: u64::from(ctx.limits.max_threads),
        ram_used,
        ram_max: u64::from(ctx.device.ram_space_bytes),
        rom_used,
        rom_max: u64::from(ctx.device.rom_space_bytes),
    };
    if report.ram_used > report.ram_max {
        return Err(CodegenError::RamExceeded {
            needed: report.ram_used,
            available: report.ram_max,
        });
    }
    if report.rom_used > report.rom_max {
        return Err(CodegenError::RomExceeded {
            needed: report.rom_used,
            available: report.rom_max,
        });
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glow_types::DeviceConfig;

    fn ctx(save_to_rom: bool) -> CompileContext {
        CompileContext::new(DeviceConfig {
            ram_space_bytes: 100,
            rom_space_bytes: 1000,
            save_to_rom,
            ..DeviceConfig::default()
        })
    }

    #[test]
    fn ram_only_show_counts_whole_image() {
        let report = check_budget(&ctx(false), 2, 10, 30, 64).unwrap();
        assert_eq!((report.ram_used, report.rom_used), (64, 0));
        assert_eq!(
            report.to_string(),
            "Device threads usage: 0.8% (2 of 256 threads).\n\
             Device RAM usage: 64.0% (64 of 100 bytes).\n\
             Device ROM usage: 0.0% (0 of 1000 bytes)."
        );
    }

    #[test]
    fn rom_show_keeps_one_path_in_ram() {
        let report = check_budget(&ctx(true), 1, 10, 30, 640).unwrap();
        assert_eq!((report.ram_used, report.rom_used), (40, 640));
        assert!(matches!(
            check_budget(&ctx(true), 1, 10, 95, 640),
            Err(CodegenError::RamExceeded { needed: 105, available: 100 })
        ));
        assert!(matches!(
            check_budget(&ctx(true), 1, 10, 30, 1024),
            Err(CodegenError::RomExceeded { needed: 1024, available: 1000 })
        ));
    }
}
