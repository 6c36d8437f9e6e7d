//! End-to-end pipeline tests.
//!
//! Tests verify the full pipeline: script → lex → parse → device → expand →
//! codegen → image, plus the structured error output of every failing stage.

use glow_compiler::{
    compile, compile_to_result, compile_to_result_with, compile_with, CompileOptions, CompileResult,
};
use glow_types::{ErrorCode, ProtocolLimits};
use sha2::{Digest, Sha256};

// ══════════════════════════════════════════════════════════════════════════════
// Scripts
// ══════════════════════════════════════════════════════════════════════════════

const DEVICE: &str = r#"device: name = "Bench Strip"
device: ledCount = "8"
device: tickIntervalMillisecs = "10"
device: ramSpaceBytes = "4096"
device: romSpaceBytes = "32768"
device: protocolVersion = "1.0"
"#;

const SINGLE_RED: &str = r#"
@start
  glowImmediate: [1] (255,0,0,31)
"#;

const SHOW: &str = r#"
define: eyes = "1-4"
define: white = "(255,255,255,31)"
define: off = "(0,0,0,0)"
define: beat = "500ms"

// Main loop
@start
  callAsync: @sparkle (zorder=2)
  here: top
  glowRamp: [eyes] off to white in 2s
  pause: beat
  call: @blink (repeat=3)
  goto: top

@blink
  here: again
  glowImmediate: [5-8] (0,0,255,31)
  pause: 100ms
  glowImmediate: [5-8] off
  pause: 100ms

@sparkle
  here: loop
  glowImmediate: [1, 8] (255,200,0,20)
  pause: 3t
  goto: loop
"#;

fn script(body: &str) -> String {
    format!("{DEVICE}{body}")
}

// ══════════════════════════════════════════════════════════════════════════════
// 1. Successful compilation
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn single_led_script_compiles_to_literal_image() {
    let show = compile(&script(SINGLE_RED), "red.glow").unwrap();
    let expected: [u8; 26] = [
        // context region (19 bytes)
        0xD0, 0x01, 0x30, 0x00, 0x00, 0x00, 0x70, 0x00, 0x80, 0x00, 0xA1, 0xEE, 0x10, 0x10,
        0x00, 0x03, 0x80, 0x00, 0x00,
        // path 0: glowImmediate, pathEnd, padding (7 bytes)
        0x4F, 0x3F, 0xC0, 0x00, 0x3F, 0x01, 0xE0,
    ];
    assert_eq!(&show.image[..expected.len()], &expected);
    assert_eq!(show.image.len(), 64);
    assert!(show.image[expected.len()..].iter().all(|&b| b == 0xFF));
    assert_eq!(show.thread_count, 1);
}

#[test]
fn full_show_compiles() {
    let show = compile(&script(SHOW), "show.glow").unwrap();
    assert_eq!(show.thread_count, 2);
    assert_eq!(show.image.len() % 64, 0);
    assert!(show.context_region_bytes + show.instruction_region_bytes <= show.image.len() as u64);
    assert_eq!(show.simulator_brightness, 765 * 31);
    assert_eq!(show.report.threads_used, 2);
    assert_eq!(show.report.ram_used, show.image.len() as u64);
}

#[test]
fn compilation_is_deterministic() {
    let a = compile(&script(SHOW), "show.glow").unwrap();
    for _ in 0..5 {
        let b = compile(&script(SHOW), "show.glow").unwrap();
        assert_eq!(a.image, b.image);
        assert_eq!(a.packets, b.packets);
    }
}

#[test]
fn result_carries_image_hash() {
    let result = compile_to_result(&script(SHOW), "show.glow");
    assert!(result.success);
    let image = result.image.as_ref().unwrap();
    assert_eq!(
        result.image_sha256.as_deref(),
        Some(hex::encode(Sha256::digest(image)).as_str())
    );
    assert_eq!(result.device.as_ref().unwrap().name, "Bench Strip");
}

#[test]
fn save_to_rom_targets_nvm() {
    let src = format!("device: saveToRom = \"yes\"\n{}", script(SINGLE_RED));
    let result = compile_to_result(&src, "rom.glow");
    assert!(result.success, "{:?}", result.errors.errors);
    let packets = result.packets.unwrap();
    assert_eq!(packets.store[0], 0x0B);
    let report = result.report.unwrap();
    assert_eq!(report.rom_used, 64);
    assert_eq!(report.ram_used, 19 + 7);

    let ram = compile_to_result(&script(SINGLE_RED), "ram.glow");
    assert_eq!(ram.packets.unwrap().store[0], 0x03);
}

#[test]
fn device_overrides_apply_after_script() {
    let options = CompileOptions {
        device_overrides: vec![("ledCount".into(), "16".into())],
        listing: true,
        ..CompileOptions::default()
    };
    let compiled = compile_with(&script(SINGLE_RED), "red.glow", &options).unwrap();
    assert_eq!(compiled.device.led_count, 16);
    let listing = compiled.listing.unwrap();
    assert!(listing.contains("glowImmediate @ bit 0"));
    assert!(listing.contains("line 9"));
}

#[test]
fn dark_show_compiles_with_warning() {
    let compiled = compile_with(
        &script("@start\n  pause: 10ms\n"),
        "dark.glow",
        &CompileOptions::default(),
    )
    .unwrap();
    assert_eq!(compiled.show.simulator_brightness, 0);
    assert_eq!(compiled.warnings.total_warnings, 1);
    assert_eq!(compiled.warnings.warnings[0].code, ErrorCode::SHOW_NEVER_LIGHTS);
    assert_eq!(compiled.warnings.warnings[0].span.start_line, 7);
    assert!(!compiled.warnings.has_errors());

    let lit = compile_with(&script(SHOW), "show.glow", &CompileOptions::default()).unwrap();
    assert_eq!(lit.warnings.total_warnings, 0);
}

#[test]
fn warnings_reach_the_serialised_result() {
    let src = script("@start\n  here: a\n  glowImmediate: [1] (9,9,9,9)\n  here: a\n  goto: a\n");
    let result = compile_to_result(&src, "labels.glow");
    assert!(result.success);
    assert_eq!(result.errors.total_warnings, 1);
    assert_eq!(result.errors.warnings[0].code, ErrorCode::DUPLICATE_LABEL);
}

// ══════════════════════════════════════════════════════════════════════════════
// 2. Structured error output
// ══════════════════════════════════════════════════════════════════════════════

fn first_code(source: &str) -> ErrorCode {
    let result = compile_to_result(source, "err.glow");
    assert!(!result.success);
    assert!(result.image.is_none());
    result.errors.errors[0].code
}

#[test]
fn syntax_error_produces_structured_json() {
    let result = compile_to_result(&script("@start\n  glowImmediate: [1 (1,1,1,1)\n"), "bad.glow");
    assert!(!result.success);
    let json = serde_json::to_string(&result).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["success"], false);
    assert!(parsed["errors"]["errors"].is_array());
    assert_eq!(parsed["errors"]["errors"][0]["code"], 100);
    assert_eq!(parsed["errors"]["errors"][0]["line"], 8);
}

#[test]
fn missing_device_is_reported() {
    assert_eq!(first_code(SINGLE_RED), ErrorCode::MISSING_DEVICE);
}

#[test]
fn protocol_mismatch_is_reported() {
    let src = script(SINGLE_RED).replace("\"1.0\"", "\"2.0\"");
    assert_eq!(first_code(&src), ErrorCode::PROTOCOL_MISMATCH);
}

#[test]
fn unresolved_goto_points_at_its_line() {
    let src = script("@start\n  call: @a\n  goto: inner\n@a\n  here: inner\n");
    let result = compile_to_result(&src, "goto.glow");
    let err = &result.errors.errors[0];
    assert_eq!(err.code, ErrorCode::UNRESOLVED_LABEL);
    assert_eq!(err.span.start_line, 9);
    assert_eq!(err.source_line.trim(), "goto: inner");
}

#[test]
fn too_many_threads_is_reported() {
    let options = CompileOptions {
        limits: ProtocolLimits { max_threads: 1 },
        ..CompileOptions::default()
    };
    let src = script("@start\n  callAsync: @a\n@a\n  pause: 10ms\n");
    let result = compile_to_result_with(&src, "threads.glow", &options);
    assert_eq!(result.errors.errors[0].code, ErrorCode::TOO_MANY_THREADS);
}

#[test]
fn ram_budget_is_reported() {
    let src = script(SINGLE_RED).replace("\"4096\"", "\"16\"");
    assert_eq!(first_code(&src), ErrorCode::RAM_EXCEEDED);
}

#[test]
fn led_outside_device_is_reported() {
    assert_eq!(
        first_code(&script("@start\n  glowImmediate: [9] (1,1,1,1)\n")),
        ErrorCode::LED_OUT_OF_RANGE
    );
}

#[test]
fn compile_result_json_roundtrip() {
    let result = compile_to_result(&script(SHOW), "show.glow");
    let json = serde_json::to_string(&result).unwrap();
    let rt: CompileResult = serde_json::from_str(&json).unwrap();
    assert_eq!(rt.success, result.success);
    assert_eq!(rt.image, result.image);
    assert_eq!(rt.image_sha256, result.image_sha256);
    assert_eq!(rt.report, result.report);
}
