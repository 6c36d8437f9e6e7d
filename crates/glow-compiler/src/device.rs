//! Device table resolution.
//!
//! `device:` lines are applied in source order; external overrides (for
//! example from a device file) are applied afterwards and win.

use glow_types::device::DeviceSettingError;
use glow_types::ast::Script;
use glow_types::{CompileErrors, DeviceConfig, ErrorCode, GlowError, SourceFile, Span};

/// Build the device configuration for `script`.
pub fn resolve_device(
    script: &Script,
    source: &SourceFile,
    overrides: &[(String, String)],
) -> Result<DeviceConfig, CompileErrors> {
    let mut errors = CompileErrors::empty();
    let error = |code: ErrorCode, message: String, span: Span| {
        GlowError::new(
            &source.name,
            code,
            message,
            span,
            source.line(span.start_line).unwrap_or(""),
        )
    };

    if script.devices.is_empty() && overrides.is_empty() {
        return Err(CompileErrors::single(
            error(
                ErrorCode::MISSING_DEVICE,
                "script does not describe its device".to_string(),
                Span::point(1, 1),
            )
            .with_suggestion("add lines such as 'device: ledCount = \"8\"'"),
        ));
    }

    let mut device = DeviceConfig::default();
    for setting in &script.devices {
        if let Err(e) = device.apply_setting(&setting.key.name, &setting.value) {
            errors.push_error(error(setting_code(&e), e.to_string(), setting.span));
        }
    }
    for (key, value) in overrides {
        if let Err(e) = device.apply_setting(key, value) {
            errors.push_error(error(
                setting_code(&e),
                format!("device override: {e}"),
                Span::point(1, 1),
            ));
        }
    }
    if errors.has_errors() {
        return Err(errors);
    }

    if let Err(e) = device.validate() {
        let span = script.devices.first().map_or(Span::point(1, 1), |d| d.span);
        return Err(CompileErrors::single(error(
            ErrorCode::INVALID_DEVICE_VALUE,
            e.to_string(),
            span,
        )));
    }
    Ok(device)
}

fn setting_code(e: &DeviceSettingError) -> ErrorCode {
    match e {
        DeviceSettingError::UnknownKey(_) => ErrorCode::INVALID_DEVICE_SETTING,
        _ => ErrorCode::INVALID_DEVICE_VALUE,
    }
}
