//! Call-graph expansion.
//!
//! Flattens the function table into the backend's instruction list. The
//! show starts with a virtual launcher that activates `@start` as path 0.
//! Every `callAsync` allocates the next path id, activates it from the
//! caller's path and ends it with a `PathEnd`; every `call` is inlined
//! `repeat` times. Each inlined body gets a fresh label scope, so `goto`
//! only ever sees the `here` labels of its own copy.
//!
//! Emitted instructions and inlined bodies share one work budget, so a
//! deep chain of repeated calls stops even when it emits nothing.

use std::collections::{HashMap, HashSet};

use glow_codegen::{InstrKind, Instruction, PathId};
use glow_types::ast::{
    Duration, FunctionDecl, Ident, LedList, Script, Stmt, StmtKind, ENTRY_FUNCTION,
    MAX_DURATION_MS,
};
use glow_types::{CompileErrors, DeviceConfig, ErrorCode, GlowError, SourceFile, Span};

/// Upper bound on emitted instructions plus inlined function bodies. No
/// device can hold more.
pub const MAX_EXPANSION_WORK: usize = 1 << 24;

/// A successful expansion.
#[derive(Debug, Clone)]
pub struct Expanded {
    pub instructions: Vec<Instruction>,
    pub warnings: CompileErrors,
}

/// Expand `script` into a flat instruction list.
pub fn expand(
    script: &Script,
    source: &SourceFile,
    device: &DeviceConfig,
) -> Result<Expanded, CompileErrors> {
    let mut expander = Expander::new(script, source, device);
    expander.run();
    if expander.errors.has_errors() {
        Err(expander.errors)
    } else {
        Ok(Expanded {
            instructions: expander.out,
            warnings: expander.errors,
        })
    }
}

struct Expander<'a> {
    functions: HashMap<&'a str, &'a FunctionDecl>,
    source: &'a SourceFile,
    device: &'a DeviceConfig,
    next_path: PathId,
    next_scope: u32,
    /// Functions currently being expanded, innermost last.
    stack: Vec<&'a str>,
    out: Vec<Instruction>,
    /// Instructions emitted plus bodies inlined so far.
    work: usize,
    /// `here` labels seen, per scope.
    labels: HashSet<(u32, String)>,
    errors: CompileErrors,
    reported: HashSet<(ErrorCode, Span)>,
    overflowed: bool,
}

impl<'a> Expander<'a> {
    fn new(script: &'a Script, source: &'a SourceFile, device: &'a DeviceConfig) -> Self {
        let mut functions = HashMap::new();
        for f in &script.functions {
            functions.entry(f.name.name.as_str()).or_insert(f);
        }
        Self {
            functions,
            source,
            device,
            next_path: 0,
            next_scope: 0,
            stack: Vec::new(),
            out: Vec::new(),
            work: 0,
            labels: HashSet::new(),
            errors: CompileErrors::empty(),
            reported: HashSet::new(),
            overflowed: false,
        }
    }

    fn run(&mut self) {
        let Some(&start) = self.functions.get(ENTRY_FUNCTION) else {
            let err = self
                .error(
                    ErrorCode::MISSING_ENTRY_POINT,
                    format!("script has no '{ENTRY_FUNCTION}' function"),
                    Span::point(1, 1),
                )
                .with_suggestion(format!("add a line '{ENTRY_FUNCTION}' before the first instruction"));
            self.push_error(err);
            return;
        };
        // The launcher is the implicit caller of the entry function.
        self.spawn(start, None, 0, Some(0), start.span);
    }

    /// Activate `callee` on a new path from `caller`.
    fn spawn(
        &mut self,
        callee: &'a FunctionDecl,
        caller: Option<PathId>,
        caller_z: u32,
        z_order: Option<u32>,
        span: Span,
    ) {
        let path = self.next_path;
        self.next_path += 1;
        let z = z_order.unwrap_or(caller_z);
        self.emit(InstrKind::PathActivate { target: path }, caller, caller_z, span);
        self.expand_function(callee, path, z);
        self.emit(InstrKind::PathEnd, Some(path), z, span);
    }

    fn expand_function(&mut self, function: &'a FunctionDecl, path: PathId, z: u32) {
        if !self.charge(function.span) {
            return;
        }
        let scope = self.next_scope;
        let Some(next) = self.next_scope.checked_add(1) else {
            self.overflow(function.span);
            return;
        };
        self.next_scope = next;
        self.stack.push(function.name.name.as_str());
        for stmt in &function.body {
            if self.overflowed || self.errors.total_errors >= glow_types::MAX_ERRORS {
                break;
            }
            self.expand_stmt(stmt, path, z, scope);
        }
        self.stack.pop();
    }

    fn expand_stmt(&mut self, stmt: &'a Stmt, path: PathId, z: u32, scope: u32) {
        let here = Some(path);
        match &stmt.kind {
            StmtKind::GlowImmediate { leds, color } => {
                if let Some(leds) = self.leds(leds) {
                    let kind = InstrKind::GlowImmediate {
                        leds,
                        color: *color,
                    };
                    self.emit(kind, here, z, stmt.span);
                }
            }
            StmtKind::GlowRamp {
                leds,
                from,
                to,
                duration,
            } => {
                let (Some(leds), Some(millis)) = (self.leds(leds), self.millis(duration, false))
                else {
                    return;
                };
                // Snap to the start color, ramp, then snap to the end color.
                self.emit(
                    InstrKind::GlowImmediate {
                        leds: leds.clone(),
                        color: *from,
                    },
                    here,
                    z,
                    stmt.span,
                );
                self.emit(
                    InstrKind::GlowRamp {
                        leds: leds.clone(),
                        from: *from,
                        to: *to,
                        millis,
                    },
                    here,
                    z,
                    stmt.span,
                );
                self.emit(InstrKind::GlowImmediate { leds, color: *to }, here, z, stmt.span);
            }
            StmtKind::Pause { duration } => {
                if let Some(millis) = self.millis(duration, true) {
                    self.emit(InstrKind::Pause { millis }, here, z, stmt.span);
                }
            }
            StmtKind::Here { label } => {
                if !self.labels.insert((scope, label.name.clone())) {
                    let warning = GlowError::warning(
                        &self.source.name,
                        ErrorCode::DUPLICATE_LABEL,
                        format!(
                            "label '{}' appears more than once; goto uses the first",
                            label.name
                        ),
                        stmt.span,
                    );
                    self.push_warning(warning);
                }
                let kind = InstrKind::Here {
                    label: label.name.clone(),
                    scope,
                };
                self.emit(kind, here, z, stmt.span);
            }
            StmtKind::Goto { label } => {
                let kind = InstrKind::Goto {
                    label: label.name.clone(),
                    scope,
                };
                self.emit(kind, here, z, stmt.span);
            }
            StmtKind::Call { function, repeat } => {
                if let Some(callee) = self.callee(function) {
                    for _ in 0..*repeat {
                        if self.overflowed {
                            break;
                        }
                        self.expand_function(callee, path, z);
                    }
                }
            }
            StmtKind::CallAsync { function, z_order } => {
                if let Some(callee) = self.callee(function) {
                    self.spawn(callee, here, z, *z_order, stmt.span);
                }
            }
        }
    }

    /// Look up a called function, rejecting unknown names and recursion.
    fn callee(&mut self, name: &Ident) -> Option<&'a FunctionDecl> {
        let Some(&callee) = self.functions.get(name.name.as_str()) else {
            let err = self.error(
                ErrorCode::UNKNOWN_FUNCTION,
                format!("unknown function '{}'", name.name),
                name.span,
            );
            self.push_error(err);
            return None;
        };
        if self.stack.contains(&callee.name.name.as_str()) {
            let chain = self.stack.join(" -> ");
            let err = self
                .error(
                    ErrorCode::RECURSIVE_CALL,
                    format!("'{}' calls itself ({chain} -> {})", name.name, name.name),
                    name.span,
                )
                .with_suggestion("use 'goto' to loop instead");
            self.push_error(err);
            return None;
        }
        Some(callee)
    }

    /// Convert 1-based LED numbers to 0-based indices on the device.
    fn leds(&mut self, list: &LedList) -> Option<Vec<u32>> {
        let count = self.device.led_count;
        if let Some(&bad) = list.numbers.iter().find(|&&n| n == 0 || n > count) {
            let err = self.error(
                ErrorCode::LED_OUT_OF_RANGE,
                format!("LED {bad} is outside the device range 1-{count}"),
                list.span,
            );
            self.push_error(err);
            return None;
        }
        Some(list.numbers.iter().map(|n| n - 1).collect())
    }

    fn millis(&mut self, duration: &Duration, whole_ticks: bool) -> Option<u64> {
        let tick = self.device.tick_interval_millisecs;
        let millis = duration
            .to_millis(tick)
            .filter(|&ms| ms <= MAX_DURATION_MS);
        let Some(millis) = millis else {
            let err = self.error(
                ErrorCode::DURATION_TOO_LONG,
                "duration is longer than 45 days",
                duration.span,
            );
            self.push_error(err);
            return None;
        };
        if whole_ticks && tick != 0 && millis % u64::from(tick) != 0 {
            let err = self
                .error(
                    ErrorCode::DURATION_NOT_TICK_MULTIPLE,
                    format!("{millis}ms is not a multiple of the {tick}ms device tick"),
                    duration.span,
                )
                .with_suggestion("use a tick count such as '5t'");
            self.push_error(err);
            return None;
        }
        Some(millis)
    }

    fn emit(&mut self, kind: InstrKind, path: Option<PathId>, z: u32, span: Span) {
        if self.charge(span) {
            self.out
                .push(Instruction::new(kind, path, Some(z)).with_span(span));
        }
    }

    /// Take one unit of expansion work. Returns `false` once the budget is
    /// spent.
    fn charge(&mut self, span: Span) -> bool {
        if self.overflowed {
            return false;
        }
        if self.work >= MAX_EXPANSION_WORK {
            self.overflow(span);
            return false;
        }
        self.work += 1;
        true
    }

    fn overflow(&mut self, span: Span) {
        if self.overflowed {
            return;
        }
        self.overflowed = true;
        let err = self.error(
            ErrorCode::RAM_EXCEEDED,
            format!("show expands to more than {MAX_EXPANSION_WORK} instructions and calls"),
            span,
        );
        self.push_error(err);
    }

    fn error(&self, code: ErrorCode, message: impl Into<String>, span: Span) -> GlowError {
        GlowError::new(
            &self.source.name,
            code,
            message,
            span,
            self.source.line(span.start_line).unwrap_or(""),
        )
    }

    /// Report an error once, however many times its statement is expanded.
    fn push_error(&mut self, error: GlowError) {
        if self.reported.insert((error.code, error.span)) {
            self.errors.push_error(error);
        }
    }

    fn push_warning(&mut self, warning: GlowError) {
        if self.reported.insert((warning.code, warning.span)) {
            self.errors.push_warning(warning);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glow_parser::parse_source;

    fn device() -> DeviceConfig {
        DeviceConfig {
            led_count: 8,
            tick_interval_millisecs: 10,
            ..DeviceConfig::default()
        }
    }

    fn expand_full(src: &str) -> Result<Expanded, CompileErrors> {
        let sf = SourceFile::new("x.glow", src);
        let parsed = parse_source(&sf);
        assert!(!parsed.errors.has_errors(), "{:?}", parsed.errors.errors);
        expand(&parsed.script, &sf, &device())
    }

    fn expand_src(src: &str) -> Result<Vec<Instruction>, CompileErrors> {
        expand_full(src).map(|e| e.instructions)
    }

    fn kinds(list: &[Instruction]) -> Vec<(&'static str, Option<u32>)> {
        list.iter().map(|i| (i.kind.name(), i.path)).collect()
    }

    #[test]
    fn launcher_activates_start_as_path_zero() {
        let list = expand_src("@start\n  pause: 10ms\n").unwrap();
        assert_eq!(
            kinds(&list),
            vec![("pathActivate", None), ("pause", Some(0)), ("pathEnd", Some(0))]
        );
        assert_eq!(list[0].kind, InstrKind::PathActivate { target: 0 });
    }

    #[test]
    fn ramp_is_bracketed_by_snaps() {
        let list = expand_src("@start\n  glowRamp: [2] (0,0,0,0) to (9,9,9,9) in 1s\n").unwrap();
        let names: Vec<_> = list.iter().map(|i| i.kind.name()).collect();
        assert_eq!(
            names,
            vec!["pathActivate", "glowImmediate", "glowRamp", "glowImmediate", "pathEnd"]
        );
        assert_eq!(list[2].kind.leds(), &[1]);
    }

    #[test]
    fn call_async_allocates_paths_in_call_order() {
        let src = "@start\n  callAsync: @a (zorder=3)\n  callAsync: @b\n@a\n  pause: 10ms\n@b\n  pause: 20ms\n";
        let list = expand_src(src).unwrap();
        let activations: Vec<_> = list
            .iter()
            .filter_map(|i| match i.kind {
                InstrKind::PathActivate { target } => Some((target, i.path)),
                _ => None,
            })
            .collect();
        assert_eq!(activations, vec![(0, None), (1, Some(0)), (2, Some(0))]);
        let a_pause = list.iter().find(|i| i.path == Some(1)).unwrap();
        assert_eq!(a_pause.z_order, Some(3));
        let b_pause = list.iter().find(|i| i.path == Some(2)).unwrap();
        assert_eq!(b_pause.z_order, Some(0));
    }

    #[test]
    fn repeated_calls_get_fresh_scopes() {
        let src = "@start\n  call: @blink (repeat=2)\n@blink\n  here: top\n  goto: top\n";
        let list = expand_src(src).unwrap();
        let scopes: Vec<u32> = list
            .iter()
            .filter_map(|i| match &i.kind {
                InstrKind::Here { scope, .. } => Some(*scope),
                _ => None,
            })
            .collect();
        assert_eq!(scopes.len(), 2);
        assert_ne!(scopes[0], scopes[1]);
    }

    #[test]
    fn recursion_is_rejected() {
        let errs = expand_src("@start\n  call: @a\n@a\n  call: @b\n@b\n  call: @a\n").unwrap_err();
        assert_eq!(errs.errors[0].code, ErrorCode::RECURSIVE_CALL);
        assert_eq!(errs.errors[0].span.start_line, 6);
    }

    #[test]
    fn missing_start_and_unknown_function() {
        let errs = expand_src("@main\n  pause: 10ms\n").unwrap_err();
        assert_eq!(errs.errors[0].code, ErrorCode::MISSING_ENTRY_POINT);
        let errs = expand_src("@start\n  call: @nope\n").unwrap_err();
        assert_eq!(errs.errors[0].code, ErrorCode::UNKNOWN_FUNCTION);
    }

    #[test]
    fn device_range_and_durations_are_checked() {
        let errs = expand_src("@start\n  glowImmediate: [9] (1,1,1,1)\n").unwrap_err();
        assert_eq!(errs.errors[0].code, ErrorCode::LED_OUT_OF_RANGE);
        let errs = expand_src("@start\n  pause: 1081h\n").unwrap_err();
        assert_eq!(errs.errors[0].code, ErrorCode::DURATION_TOO_LONG);
        let errs = expand_src("@start\n  pause: 15ms\n").unwrap_err();
        assert_eq!(errs.errors[0].code, ErrorCode::DURATION_NOT_TICK_MULTIPLE);
        assert!(expand_src("@start\n  pause: 1080h\n").is_ok());
    }

    #[test]
    fn errors_in_shared_bodies_are_reported_once() {
        let src = "@start\n  call: @x (repeat=3)\n@x\n  pause: 15ms\n";
        let errs = expand_src(src).unwrap_err();
        assert_eq!(errs.total_errors, 1);
    }

    #[test]
    fn repeated_calls_into_empty_bodies_hit_the_budget() {
        let src = "@start\n  call: @a (repeat=2000000000)\n@a\n  call: @b (repeat=2000000000)\n@b\n";
        let errs = expand_src(src).unwrap_err();
        assert_eq!(errs.errors[0].code, ErrorCode::RAM_EXCEEDED);
        assert_eq!(errs.total_errors, 1);
    }

    #[test]
    fn duplicate_label_in_one_body_warns() {
        let src = "@start\n  here: top\n  pause: 10ms\n  here: top\n  goto: top\n";
        let expanded = expand_full(src).unwrap();
        assert_eq!(expanded.warnings.total_warnings, 1);
        let warning = &expanded.warnings.warnings[0];
        assert_eq!(warning.code, ErrorCode::DUPLICATE_LABEL);
        assert_eq!(warning.severity, glow_types::Severity::Warning);
        assert_eq!(warning.span.start_line, 4);
    }

    #[test]
    fn same_label_in_repeated_copies_does_not_warn() {
        let src = "@start\n  call: @blink (repeat=3)\n@blink\n  here: top\n  goto: top\n";
        assert_eq!(expand_full(src).unwrap().warnings.total_warnings, 0);
    }
}
