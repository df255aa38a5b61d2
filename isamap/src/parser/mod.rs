//! # Debug-info parsing
//!
//! Turns one assembly buffer into the two things every later stage needs:
//!
//! - a [`SourceFileTable`] built from `.file` directives, and
//! - the list of [`KernelRegion`]s, each a named span of lines.
//!
//! Both are single passes over the buffer's lines. The table is shared by
//! all regions of the buffer through an `Arc`, never copied.
//!
//! ```text
//! AsmBuffer ──► SourceFileTable::from_lines ──┐
//!           └─► detect_kernel_regions ────────┴─► ParsedBuffer
//! ```

pub mod directives;
pub mod file_table;
pub mod kernels;

use std::sync::Arc;

use crate::diagnostics::DiagnosticSink;
use crate::scanner::AsmBuffer;

pub use directives::{parse_directive, Directive};
pub use file_table::{normalize_path, resolve_declared_path, SourceFileTable};
pub use kernels::{detect_kernel_regions, is_kernel_symbol, KernelRegion, RegionContext};

/// An assembly buffer together with its parsed debug info
#[derive(Debug, Clone)]
pub struct ParsedBuffer {
    pub buffer: Arc<AsmBuffer>,
    pub file_table: Arc<SourceFileTable>,
    pub kernels: Vec<KernelRegion>,
}

impl ParsedBuffer {
    /// Region containing an asm line index, if any
    #[must_use]
    pub fn kernel_at(&self, line: usize) -> Option<&KernelRegion> {
        self.kernels.iter().find(|k| k.contains(line))
    }
}

/// Parse the file table and kernel regions of one buffer
pub fn parse_buffer(
    buffer: Arc<AsmBuffer>,
    symbol_search_window: usize,
    sink: &mut dyn DiagnosticSink,
) -> ParsedBuffer {
    let file_table = Arc::new(SourceFileTable::from_lines(&buffer.lines));

    let ctx = RegionContext {
        path: &buffer.path,
        file_table: &file_table,
        build_tag: &buffer.build_tag,
        modified: buffer.modified,
        symbol_search_window,
    };
    let kernels = detect_kernel_regions(&buffer.lines, &ctx, sink);

    log::debug!(
        "{}: {} source files, {} kernels",
        buffer.path.display(),
        file_table.len(),
        kernels.len()
    );

    ParsedBuffer { buffer, file_table, kernels }
}
