//! Compile command - script in, image and packet files out.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::{debug, info};

use glow_compiler::{compile_with, image_sha256, CompileOptions};
use glow_types::{CompileErrors, GlowError};

use crate::device_file;
use crate::output::{self, OutputPaths};

/// Arguments for a compilation
#[derive(Args)]
pub struct CompileArgs {
    /// Lightshow script to compile
    pub input: PathBuf,

    /// TOML device file; its settings override the script's device lines
    #[arg(short, long)]
    pub device: Option<PathBuf>,

    /// Also write a field-by-field listing of the image
    #[arg(short, long)]
    pub listing: bool,

    /// Directory for output files (defaults to the script's directory)
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,
}

/// Execute a compilation.
///
/// Returns `Ok(false)` when the script has errors; they have already been
/// printed to stderr.
pub fn execute(args: &CompileArgs) -> Result<bool> {
    let source = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read script: {}", args.input.display()))?;

    let device_overrides = match &args.device {
        Some(path) => device_file::load(path)?,
        None => Vec::new(),
    };
    debug!(overrides = device_overrides.len(), "loaded device settings");

    let options = CompileOptions {
        device_overrides,
        listing: args.listing,
        ..CompileOptions::default()
    };
    let filename = args.input.display().to_string();

    let compiled = match compile_with(&source, &filename, &options) {
        Ok(compiled) => compiled,
        Err(errors) => {
            print_diagnostics(&errors);
            eprintln!(
                "Compilation failed: {} error(s), {} warning(s)",
                errors.total_errors, errors.total_warnings
            );
            return Ok(false);
        }
    };
    print_diagnostics(&compiled.warnings);

    let paths = OutputPaths::for_input(&args.input, args.out_dir.as_deref());
    output::write_all(&paths, &compiled, image_sha256(&compiled.show.image))?;
    info!(
        image = %paths.image.display(),
        bytes = compiled.show.image.len(),
        "wrote lightshow"
    );

    println!("Compiled {} for {}", filename, compiled.device.name);
    println!("{}", compiled.show.report);
    Ok(true)
}

fn print_diagnostics(errors: &CompileErrors) {
    for diagnostic in errors.errors.iter().chain(&errors.warnings) {
        print_diagnostic(diagnostic);
    }
    if errors.total_errors > errors.errors.len() {
        eprintln!(
            "... and {} more error(s)",
            errors.total_errors - errors.errors.len()
        );
    }
}

fn print_diagnostic(diagnostic: &GlowError) {
    eprintln!("{diagnostic}");
    if !diagnostic.source_line.is_empty() {
        eprintln!("    {}", diagnostic.source_line.trim_end());
    }
    if let Some(suggestion) = &diagnostic.suggestion {
        eprintln!("    help: {suggestion}");
    }
}
