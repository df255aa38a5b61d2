//! Kernel region detection
//!
//! # Boundary strategy
//!
//! 1. **Per-function sections** - every `.section .text.<name>` line opens a
//!    region which runs until the next such line or the end of the buffer.
//! 2. **Exported symbols** - only when the buffer has no per-function
//!    sections at all, every `.globl` passing [`is_kernel_symbol`] opens a
//!    region instead.
//!
//! Each region is then named by the first `.globl` passing the same filter
//! within its first lines. Regions without one carry no addressable entry
//! point and are dropped with a warning.

use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

use super::directives::{parse_directive, Directive};
use super::file_table::SourceFileTable;
use crate::diagnostics::DiagnosticSink;
use crate::domain::{BuildTag, ScanDiagnostic};

/// Section name prefix marking a per-function code section
const FUNCTION_SECTION_PREFIX: &str = ".text.";

/// Exported names this short or shorter are metadata, not kernels
const MIN_KERNEL_SYMBOL_LEN: usize = 6;

/// One kernel's contiguous span of lines in an assembly buffer
#[derive(Debug, Clone)]
pub struct KernelRegion {
    pub symbol: String,
    /// First line index of the region
    pub start_line: usize,
    /// Last line index of the region (inclusive)
    pub end_line: usize,
    /// File table of the buffer the region belongs to
    pub file_table: Arc<SourceFileTable>,
    pub build_tag: BuildTag,
    pub modified: SystemTime,
}

impl KernelRegion {
    /// Whether an asm line index falls inside this region
    #[must_use]
    pub fn contains(&self, line: usize) -> bool {
        line >= self.start_line && line <= self.end_line
    }

    /// Number of lines in the region
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.end_line - self.start_line + 1
    }
}

/// Whether an exported name looks like a kernel entry point
///
/// Names with an embedded `.` (`foo.kd`, `.Lfunc_end0`) and very short names
/// are assembler or runtime metadata.
#[must_use]
pub fn is_kernel_symbol(symbol: &str) -> bool {
    !symbol.contains('.') && symbol.len() >= MIN_KERNEL_SYMBOL_LEN
}

/// Inputs shared by every region of one buffer
pub struct RegionContext<'a> {
    pub path: &'a Path,
    pub file_table: &'a Arc<SourceFileTable>,
    pub build_tag: &'a BuildTag,
    pub modified: SystemTime,
    pub symbol_search_window: usize,
}

/// Detect the kernel regions of a buffer, ordered by start line
pub fn detect_kernel_regions<S: AsRef<str>>(
    lines: &[S],
    ctx: &RegionContext<'_>,
    sink: &mut dyn DiagnosticSink,
) -> Vec<KernelRegion> {
    let mut starts = function_section_starts(lines);
    if starts.is_empty() {
        log::debug!(
            "No per-function sections in {}, falling back to exported symbols",
            ctx.path.display()
        );
        starts = exported_symbol_starts(lines);
    }

    let mut regions = Vec::with_capacity(starts.len());
    for (idx, &start) in starts.iter().enumerate() {
        let end = starts.get(idx + 1).map_or(lines.len() - 1, |next| next - 1);

        let window_end = end.min(start + ctx.symbol_search_window.saturating_sub(1));
        let Some(symbol) = find_kernel_symbol(&lines[start..=window_end]) else {
            sink.report(ScanDiagnostic::NoKernelSymbolInRegion {
                path: ctx.path.to_path_buf(),
                line: start + 1,
            });
            continue;
        };

        regions.push(KernelRegion {
            symbol: symbol.to_string(),
            start_line: start,
            end_line: end,
            file_table: Arc::clone(ctx.file_table),
            build_tag: ctx.build_tag.clone(),
            modified: ctx.modified,
        });
    }

    regions
}

fn function_section_starts<S: AsRef<str>>(lines: &[S]) -> Vec<usize> {
    lines
        .iter()
        .enumerate()
        .filter_map(|(idx, line)| match parse_directive(line.as_ref()) {
            Some(Directive::Section { name }) if name.starts_with(FUNCTION_SECTION_PREFIX) => {
                Some(idx)
            }
            _ => None,
        })
        .collect()
}

fn exported_symbol_starts<S: AsRef<str>>(lines: &[S]) -> Vec<usize> {
    lines
        .iter()
        .enumerate()
        .filter_map(|(idx, line)| match parse_directive(line.as_ref()) {
            Some(Directive::Globl { symbol }) if is_kernel_symbol(symbol) => Some(idx),
            _ => None,
        })
        .collect()
}

fn find_kernel_symbol<S: AsRef<str>>(window: &[S]) -> Option<&str> {
    window.iter().find_map(|line| match parse_directive(line.as_ref()) {
        Some(Directive::Globl { symbol }) if is_kernel_symbol(symbol) => Some(symbol),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;

    fn detect(lines: &[&str], sink: &mut CollectingSink) -> Vec<KernelRegion> {
        let table = Arc::new(SourceFileTable::new());
        let tag = BuildTag::from("build");
        let ctx = RegionContext {
            path: Path::new("k-hip-amdgcn-amd-amdhsa-gfx90a.s"),
            file_table: &table,
            build_tag: &tag,
            modified: SystemTime::UNIX_EPOCH,
            symbol_search_window: 21,
        };
        detect_kernel_regions(lines, &ctx, sink)
    }

    #[test]
    fn test_is_kernel_symbol() {
        assert!(is_kernel_symbol("_Z6kernelPi"));
        assert!(!is_kernel_symbol("_Z6kernelPi.kd"));
        assert!(!is_kernel_symbol("short"));
        assert!(is_kernel_symbol("kernel"));
    }

    #[test]
    fn test_section_boundaries_partition_suffix() {
        let lines = [
            "\t.amdgcn_target \"amdgcn-amd-amdhsa--gfx90a\"",
            "\t.section\t.text._Z3fooPf,\"axG\",@progbits,_Z3fooPf,comdat",
            "\t.globl\t_Z3fooPf",
            "_Z3fooPf:",
            "\ts_endpgm",
            "\t.section\t.text._Z3barPf,\"axG\",@progbits,_Z3barPf,comdat",
            "\t.globl\t_Z3barPf",
            "_Z3barPf:",
            "\ts_endpgm",
        ];
        let mut sink = CollectingSink::new();
        let regions = detect(&lines, &mut sink);

        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].symbol, "_Z3fooPf");
        assert_eq!((regions[0].start_line, regions[0].end_line), (1, 4));
        assert_eq!(regions[1].symbol, "_Z3barPf");
        assert_eq!((regions[1].start_line, regions[1].end_line), (5, 8));
        assert_eq!(regions[0].end_line + 1, regions[1].start_line);
        assert!(sink.diagnostics.is_empty());
    }

    #[test]
    fn test_fallback_to_exported_symbols() {
        let lines = [
            "\t.text",
            "\t.globl\t_Z6kernelPi",
            "\t.p2align\t8",
            "_Z6kernelPi:",
            "\ts_endpgm",
            "\t.globl\tkd.sym",
            "\t.globl\t_Z7kernel2Pi",
            "_Z7kernel2Pi:",
            "\ts_endpgm",
        ];
        let mut sink = CollectingSink::new();
        let regions = detect(&lines, &mut sink);

        let spans: Vec<(&str, usize, usize)> =
            regions.iter().map(|r| (r.symbol.as_str(), r.start_line, r.end_line)).collect();
        assert_eq!(spans, vec![("_Z6kernelPi", 1, 5), ("_Z7kernel2Pi", 6, 8)]);
    }

    #[test]
    fn test_region_without_symbol_is_dropped() {
        let lines = [
            "\t.section\t.text.startup,\"ax\",@progbits",
            "\ts_nop 0",
            "\t.section\t.text._Z3fooPf,\"axG\",@progbits,_Z3fooPf,comdat",
            "\t.globl\t_Z3fooPf",
            "\ts_endpgm",
        ];
        let mut sink = CollectingSink::new();
        let regions = detect(&lines, &mut sink);

        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].symbol, "_Z3fooPf");
        assert_eq!(
            sink.diagnostics,
            vec![ScanDiagnostic::NoKernelSymbolInRegion {
                path: Path::new("k-hip-amdgcn-amd-amdhsa-gfx90a.s").to_path_buf(),
                line: 1,
            }]
        );
    }

    #[test]
    fn test_symbol_beyond_search_window_is_not_found() {
        let mut lines = vec!["\t.section\t.text._Z3fooPf,\"axG\",@progbits,_Z3fooPf,comdat"];
        lines.extend(std::iter::repeat("\ts_nop 0").take(20));
        lines.push("\t.globl\t_Z3fooPf");

        let mut sink = CollectingSink::new();
        assert!(detect(&lines, &mut sink).is_empty());

        // The 21st line (offset 20) is still inside the window.
        lines.remove(1);
        let mut sink = CollectingSink::new();
        assert_eq!(detect(&lines, &mut sink).len(), 1);
    }

    #[test]
    fn test_empty_buffer_has_no_regions() {
        let mut sink = CollectingSink::new();
        assert!(detect(&[], &mut sink).is_empty());
    }
}
