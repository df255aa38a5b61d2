//! Structured error types for isamap
//!
//! Using thiserror for automatic Display implementation and error chaining.
//! [`ScanDiagnostic`] is the non-fatal taxonomy the core reports through a
//! [`DiagnosticSink`](crate::diagnostics::DiagnosticSink); the remaining enums
//! are real errors raised by the host (config loading, output writing).

use std::path::PathBuf;
use thiserror::Error;

/// Conditions the core absorbs locally, degrading to a smaller result set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanDiagnostic {
    #[error("Build directory {0} does not exist, skipping")]
    MissingBuildDirectory(PathBuf),

    #[error("Failed to read {path}: {reason}")]
    UnreadableFile { path: PathBuf, reason: String },

    #[error("No exported kernel symbol in region starting at line {line} of {path}, dropping it")]
    NoKernelSymbolInRegion { path: PathBuf, line: usize },

    #[error("Kernel {symbol} does not reference source file {query}")]
    NoSourceFileMatch { symbol: String, query: String },

    #[error("Could not demangle {symbol}: {reason}")]
    DemangleUnavailable { symbol: String, reason: String },
}

impl ScanDiagnostic {
    /// Log level this diagnostic is reported at
    ///
    /// A kernel not referencing the queried file is the normal case for most
    /// candidates, so it stays at debug level.
    #[must_use]
    pub fn level(&self) -> log::Level {
        match self {
            ScanDiagnostic::NoSourceFileMatch { .. } => log::Level::Debug,
            _ => log::Level::Warn,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No build directories configured")]
    NoBuildDirectories,

    #[error("symbolSearchWindow must be at least 1")]
    EmptySymbolSearchWindow,
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
