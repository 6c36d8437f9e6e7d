//! Glow compiler: orchestrates the full compilation pipeline.
//!
//! ```text
//! Script → Lexer → Parser → Device table → Call-graph expansion → Codegen → image
//! ```
//!
//! [`compile`] returns the compiled show or the structured diagnostics;
//! [`compile_to_result`] wraps either in a serialisable [`CompileResult`].

pub mod device;
pub mod expand;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use glow_codegen::{CodegenError, CompileContext, ControlPackets, Lightshow, UsageReport};
use glow_types::ast::ENTRY_FUNCTION;
use glow_types::{
    CompileErrors, DeviceConfig, ErrorCode, GlowError, ProtocolLimits, SourceFile, Span,
};

pub use device::resolve_device;
pub use expand::{expand, Expanded};

/// Knobs that do not come from the script itself.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// `key = value` device settings applied after the script's own.
    pub device_overrides: Vec<(String, String)>,
    pub limits: ProtocolLimits,
    /// Also render a field-by-field listing of the image.
    pub listing: bool,
}

/// Everything a successful compilation produces.
#[derive(Debug, Clone)]
pub struct Compiled {
    pub show: Lightshow,
    pub device: DeviceConfig,
    pub listing: Option<String>,
    pub warnings: CompileErrors,
}

/// The serialisable outcome of a compilation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileResult {
    pub success: bool,
    pub image: Option<Vec<u8>>,
    pub packets: Option<ControlPackets>,
    pub report: Option<UsageReport>,
    /// Hex SHA-256 of `image`.
    pub image_sha256: Option<String>,
    pub device: Option<DeviceConfig>,
    pub errors: CompileErrors,
}

/// Compile a script with default options.
pub fn compile(source: &str, filename: &str) -> Result<Lightshow, CompileErrors> {
    compile_with(source, filename, &CompileOptions::default()).map(|c| c.show)
}

/// Compile a script.
pub fn compile_with(
    source: &str,
    filename: &str,
    options: &CompileOptions,
) -> Result<Compiled, CompileErrors> {
    let sf = SourceFile::new(filename, source);

    let parsed = glow_parser::parse_source(&sf);
    if parsed.errors.has_errors() {
        return Err(parsed.errors);
    }
    let mut warnings = parsed.errors;
    debug!(
        functions = parsed.script.functions.len(),
        defines = parsed.script.defines.len(),
        "parsed script"
    );

    let device = resolve_device(&parsed.script, &sf, &options.device_overrides)?;
    let expanded = expand(&parsed.script, &sf, &device)?;
    warnings.extend(expanded.warnings);
    let instructions = expanded.instructions;
    debug!(instructions = instructions.len(), "expanded call graph");

    let ctx = CompileContext::new(device.clone()).with_limits(options.limits);
    let generated = if options.listing {
        glow_codegen::compile_with_listing(instructions, &ctx)
            .map(|(show, listing)| (show, Some(listing)))
    } else {
        glow_codegen::compile(instructions, &ctx).map(|show| (show, None))
    };
    let (show, listing) =
        generated.map_err(|e| CompileErrors::single(codegen_diagnostic(&e, &sf)))?;

    if show.simulator_brightness == 0 {
        let span = parsed
            .script
            .functions
            .iter()
            .find(|f| f.name.name == ENTRY_FUNCTION)
            .map_or(Span::point(1, 1), |f| f.span);
        warnings.push_warning(GlowError::warning(
            &sf.name,
            ErrorCode::SHOW_NEVER_LIGHTS,
            "show never lights any LED",
            span,
        ));
    }

    info!(
        device = %device.name,
        bytes = show.image.len(),
        threads = show.thread_count,
        "compiled lightshow"
    );
    Ok(Compiled {
        show,
        device,
        listing,
        warnings,
    })
}

/// Compile and wrap the outcome for serialisation.
pub fn compile_to_result(source: &str, filename: &str) -> CompileResult {
    compile_to_result_with(source, filename, &CompileOptions::default())
}

pub fn compile_to_result_with(
    source: &str,
    filename: &str,
    options: &CompileOptions,
) -> CompileResult {
    match compile_with(source, filename, options) {
        Ok(compiled) => CompileResult {
            success: true,
            image_sha256: Some(image_sha256(&compiled.show.image)),
            image: Some(compiled.show.image),
            packets: Some(compiled.show.packets),
            report: Some(compiled.show.report),
            device: Some(compiled.device),
            errors: compiled.warnings,
        },
        Err(errors) => CompileResult {
            success: false,
            image: None,
            packets: None,
            report: None,
            image_sha256: None,
            device: None,
            errors,
        },
    }
}

/// Hex SHA-256 of an image, as carried in [`CompileResult`].
pub fn image_sha256(image: &[u8]) -> String {
    hex::encode(Sha256::digest(image))
}

/// Turn a backend failure into a diagnostic against the script.
pub fn codegen_diagnostic(error: &CodegenError, source: &SourceFile) -> GlowError {
    let span = error.span().unwrap_or(Span::point(1, 1));
    GlowError::new(
        &source.name,
        error.code(),
        error.to_string(),
        span,
        source.line(span.start_line).unwrap_or(""),
    )
}
