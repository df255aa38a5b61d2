use rustc_demangle::try_demangle;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::process::Command;

use crate::diagnostics::DiagnosticSink;
use crate::domain::ScanDiagnostic;

/// Demangler for kernel symbols with a per-symbol cache
///
/// Each distinct symbol costs at most one external process; results (and
/// fallbacks) are cached.
pub struct Demangler {
    command: String,
    cache: RefCell<HashMap<String, String>>,
    /// Set once the external command could not be spawned
    unavailable: Cell<bool>,
}

impl Demangler {
    /// Create a demangler using `command` for Itanium symbols
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            cache: RefCell::new(HashMap::new()),
            unavailable: Cell::new(false),
        }
    }

    /// Display name for a symbol, falling back to the symbol itself
    pub fn demangle(&self, symbol: &str, sink: &mut dyn DiagnosticSink) -> String {
        if let Some(cached) = self.cache.borrow().get(symbol) {
            return cached.clone();
        }

        let display = if is_rust_mangled(symbol) {
            Self::demangle_rust(symbol)
        } else if is_itanium_mangled(symbol) {
            self.demangle_external(symbol, sink)
        } else {
            None
        }
        .unwrap_or_else(|| symbol.to_string());

        self.cache.borrow_mut().insert(symbol.to_string(), display.clone());
        display
    }

    fn demangle_rust(symbol: &str) -> Option<String> {
        try_demangle(symbol).ok().map(|d| format!("{d:#}"))
    }

    fn demangle_external(&self, symbol: &str, sink: &mut dyn DiagnosticSink) -> Option<String> {
        if self.unavailable.get() {
            return None;
        }

        let output = match Command::new(&self.command).arg(symbol).output() {
            Ok(output) => output,
            Err(e) => {
                self.unavailable.set(true);
                sink.report(ScanDiagnostic::DemangleUnavailable {
                    symbol: symbol.to_string(),
                    reason: format!("cannot run {}: {e}", self.command),
                });
                return None;
            }
        };

        if !output.status.success() {
            sink.report(ScanDiagnostic::DemangleUnavailable {
                symbol: symbol.to_string(),
                reason: format!("{} exited with {}", self.command, output.status),
            });
            return None;
        }

        let demangled = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if demangled.is_empty() {
            None
        } else {
            Some(demangled)
        }
    }
}

/// Heuristic: Rust v0 (`_R`) or legacy (`_ZN...17h<hash>E`) mangling
#[must_use]
pub fn is_rust_mangled(symbol: &str) -> bool {
    symbol.starts_with("_R")
        || (symbol.starts_with("_ZN") && symbol.contains("17h") && symbol.ends_with('E'))
}

/// Heuristic: Itanium C++ mangling starts with `_Z`
#[must_use]
pub fn is_itanium_mangled(symbol: &str) -> bool {
    symbol.starts_with("_Z")
}
