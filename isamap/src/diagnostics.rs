//! Diagnostic sink for non-fatal scan conditions
//!
//! Nothing in the core aborts a request. Missing directories, unreadable
//! files, regions without a kernel symbol and demangler failures are handed
//! to a [`DiagnosticSink`] and the operation carries on with what it has.

use crate::domain::ScanDiagnostic;

/// Receiver for non-fatal diagnostics raised while scanning and resolving
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: ScanDiagnostic);
}

/// Forwards every diagnostic to the `log` facade at its declared level
#[derive(Debug, Default)]
pub struct LogSink {
    reported: usize,
}

impl LogSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of diagnostics seen so far
    #[must_use]
    pub fn reported(&self) -> usize {
        self.reported
    }
}

impl DiagnosticSink for LogSink {
    fn report(&mut self, diagnostic: ScanDiagnostic) {
        self.reported += 1;
        log::log!(diagnostic.level(), "{diagnostic}");
    }
}

/// Keeps diagnostics in memory, for tests and end-of-run summaries
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub diagnostics: Vec<ScanDiagnostic>,
}

impl CollectingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Diagnostics at warn level or above
    pub fn warnings(&self) -> impl Iterator<Item = &ScanDiagnostic> {
        self.diagnostics.iter().filter(|d| d.level() <= log::Level::Warn)
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&mut self, diagnostic: ScanDiagnostic) {
        log::log!(diagnostic.level(), "{diagnostic}");
        self.diagnostics.push(diagnostic);
    }
}
