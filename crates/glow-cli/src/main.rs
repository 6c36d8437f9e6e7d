//! glowc - compiler for Glow lightshow scripts
//!
//! # Usage
//!
//! ```bash
//! # Compile a script; writes show.bin and show.packets.json next to it
//! glowc show.glow
//!
//! # Override the script's device lines and dump a field listing
//! glowc show.glow --device strip.toml --listing
//! ```
//!
//! # Device file
//!
//! ```toml
//! name = "Bench Strip"
//! ledCount = 8
//! tickIntervalMillisecs = 10
//! ramSpaceBytes = 4096
//! saveToRom = true
//! ```

mod compile;
mod device_file;
mod output;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// glowc - compile Glow lightshow scripts into device images
#[derive(Parser)]
#[command(name = "glowc")]
#[command(about = "Compile Glow lightshow scripts into device images")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    compile: compile::CompileArgs,

    /// Log every pipeline stage
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(rust_log.as_deref(), cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    match compile::execute(&cli.compile) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins when set and valid; otherwise `info`, or `debug` with
/// `--verbose`.
fn env_filter(rust_log: Option<&str>, verbose: bool) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(if verbose { "debug" } else { "info" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_log_overrides_defaults() {
        assert_eq!(env_filter(Some("warn"), false).to_string(), "warn");
        assert_eq!(env_filter(Some("error"), true).to_string(), "error");
    }

    #[test]
    fn verbose_applies_without_rust_log() {
        assert_eq!(env_filter(None, false).to_string(), "info");
        assert_eq!(env_filter(None, true).to_string(), "debug");
    }
}
