//! # Match resolution
//!
//! Given a queried source file (and optionally a line), find every kernel in
//! every scanned build root that was compiled from it.
//!
//! ```text
//! build roots ──► scanner ──► parser ──► [KernelRegion] ─┐
//!                                                         ├─► [MatchRecord]
//! query "a.hip":42 ──► basename "a.hip" ──────────────────┘
//! ```
//!
//! A region matches when its buffer's file table has an entry whose final
//! path component equals the query's. Two different files sharing a
//! basename are indistinguishable for a bare-basename query; when the query
//! carries directories, the entry sharing the longest trailing run of path
//! components wins, and ties keep the first entry in declaration order.
//!
//! The output is unordered. Ranking is a caller policy, see [`selection`].

pub mod selection;

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::config::ScanSettings;
use crate::diagnostics::DiagnosticSink;
use crate::domain::{FileId, ScanDiagnostic, SourceLine};
use crate::mapping::LineMapping;
use crate::parser::{parse_buffer, KernelRegion, ParsedBuffer, SourceFileTable};
use crate::scanner::{scan_build_roots, AsmBuffer};

pub use selection::{rank_most_recent_first, select, SelectionPin};

/// A queried source file and optional 1-based line (0 = no line)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceQuery {
    pub file: PathBuf,
    pub line: u32,
}

impl SourceQuery {
    pub fn new(file: impl Into<PathBuf>, line: u32) -> Self {
        Self { file: file.into(), line }
    }

    /// Query for the kernel list only
    pub fn file_only(file: impl Into<PathBuf>) -> Self {
        Self::new(file, 0)
    }

    /// The queried line, if any
    #[must_use]
    pub fn source_line(&self) -> Option<SourceLine> {
        SourceLine::from_one_based(self.line)
    }

    #[must_use]
    pub fn basename(&self) -> Option<&str> {
        self.file.file_name().and_then(|n| n.to_str())
    }
}

/// A kernel known to reference the queried source file
#[derive(Debug, Clone)]
pub struct MatchRecord {
    pub kernel: KernelRegion,
    pub buffer: Arc<AsmBuffer>,
    /// File table entry the query matched
    pub matched_file: FileId,
    pub matched_path: PathBuf,
    /// Instruction lines attributed to the queried line, empty without one
    pub asm_lines: Vec<usize>,
}

impl MatchRecord {
    /// Whether two records come from the same assembly file
    #[must_use]
    pub fn same_file(&self, other: &MatchRecord) -> bool {
        self.buffer.path == other.buffer.path
    }

    /// The kernel's own lines
    #[must_use]
    pub fn kernel_lines(&self) -> &[String] {
        self.buffer.span(self.kernel.start_line, self.kernel.end_line)
    }
}

/// Runs scanner and parser over a workspace and matches queries against it
pub struct MatchResolver<'a> {
    workspace_root: &'a Path,
    settings: &'a ScanSettings,
}

impl<'a> MatchResolver<'a> {
    #[must_use]
    pub fn new(workspace_root: &'a Path, settings: &'a ScanSettings) -> Self {
        Self { workspace_root, settings }
    }

    /// Scan and parse every configured build root
    pub fn scan(&self, sink: &mut dyn DiagnosticSink) -> Vec<ParsedBuffer> {
        scan_build_roots(self.workspace_root, self.settings, sink)
            .into_iter()
            .map(|buffer| parse_buffer(Arc::new(buffer), self.settings.symbol_search_window, sink))
            .collect()
    }

    /// Full rescan followed by matching
    pub fn resolve(&self, query: &SourceQuery, sink: &mut dyn DiagnosticSink) -> Vec<MatchRecord> {
        let parsed = self.scan(sink);
        let matches = match_candidates(&parsed, query, sink);
        log::info!(
            "{} of {} kernels reference {}",
            matches.len(),
            parsed.iter().map(|p| p.kernels.len()).sum::<usize>(),
            query.file.display()
        );
        matches
    }
}

/// Match a query against already parsed buffers
pub fn match_candidates(
    parsed: &[ParsedBuffer],
    query: &SourceQuery,
    sink: &mut dyn DiagnosticSink,
) -> Vec<MatchRecord> {
    let mut matches = Vec::new();

    for buffer in parsed {
        for kernel in &buffer.kernels {
            let Some((file_id, path)) = find_source_file(&kernel.file_table, &query.file) else {
                sink.report(ScanDiagnostic::NoSourceFileMatch {
                    symbol: kernel.symbol.clone(),
                    query: query.file.display().to_string(),
                });
                continue;
            };

            let asm_lines = match query.source_line() {
                Some(line) => {
                    let mapping = LineMapping::for_region(&buffer.buffer, kernel, Some(file_id));
                    mapping.forward(path, line).to_vec()
                }
                None => Vec::new(),
            };

            matches.push(MatchRecord {
                kernel: kernel.clone(),
                buffer: Arc::clone(&buffer.buffer),
                matched_file: file_id,
                matched_path: path.to_path_buf(),
                asm_lines,
            });
        }
    }

    matches
}

/// File table entry matching a queried path by basename
///
/// Entries are visited in declaration order. Among basename matches the one
/// sharing the most trailing path components with the query wins; the first
/// such entry wins ties.
#[must_use]
pub fn find_source_file<'t>(
    table: &'t SourceFileTable,
    query: &Path,
) -> Option<(FileId, &'t Path)> {
    let basename = query.file_name()?;
    let mut best: Option<(FileId, &Path, usize)> = None;

    for (id, path) in table.iter() {
        if path.file_name() != Some(basename) {
            continue;
        }
        let score = shared_suffix_len(path, query);
        if best.is_none_or(|(_, _, best_score)| score > best_score) {
            best = Some((id, path, score));
        }
    }

    best.map(|(id, path, _)| (id, path))
}

fn shared_suffix_len(a: &Path, b: &Path) -> usize {
    let a = normal_components(a);
    let b = normal_components(b);
    a.iter().rev().zip(b.iter().rev()).take_while(|(x, y)| x == y).count()
}

fn normal_components(path: &Path) -> Vec<Component<'_>> {
    path.components().filter(|c| matches!(c, Component::Normal(_))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;
    use crate::domain::BuildTag;
    use std::time::SystemTime;

    fn parsed(text: &str) -> ParsedBuffer {
        let buffer = Arc::new(AsmBuffer::from_text(
            "k-hip-amdgcn-amd-amdhsa-gfx90a.s",
            BuildTag::from("build"),
            SystemTime::UNIX_EPOCH,
            text,
        ));
        parse_buffer(buffer, 21, &mut CollectingSink::new())
    }

    const TWO_KERNELS: &str = "\
\t.file\t1 \"/p\" \"a.hip\"
\t.file\t2 \"/p/include\" \"util.h\"
\t.section\t.text._Z6kernelPi,\"axG\",@progbits,_Z6kernelPi,comdat
\t.globl\t_Z6kernelPi
_Z6kernelPi:
\t.loc\t1 5 1
\tv_mov_b32 v2, 7
\t.loc\t2 3 0
\tv_add_u32 v2, v2, 1
\t.loc\t1 5 9
\tglobal_store_dword v[0:1], v2, off
\ts_endpgm
\t.section\t.text._Z5otherPi,\"axG\",@progbits,_Z5otherPi,comdat
\t.globl\t_Z5otherPi
_Z5otherPi:
\t.loc\t1 9 1
\ts_endpgm
";

    #[test]
    fn test_match_by_basename_with_line() {
        let buffers = vec![parsed(TWO_KERNELS)];
        let mut sink = CollectingSink::new();
        let matches = match_candidates(&buffers, &SourceQuery::new("a.hip", 5), &mut sink);

        assert_eq!(matches.len(), 2);
        let kernel = matches.iter().find(|m| m.kernel.symbol == "_Z6kernelPi").unwrap();
        assert_eq!(kernel.matched_file, FileId(1));
        assert_eq!(kernel.asm_lines, vec![6, 10, 11]);

        let other = matches.iter().find(|m| m.kernel.symbol == "_Z5otherPi").unwrap();
        assert!(other.asm_lines.is_empty(), "kernel stays selectable without hits");
    }

    #[test]
    fn test_header_query_is_restricted_to_that_file() {
        let buffers = vec![parsed(TWO_KERNELS)];
        let mut sink = CollectingSink::new();
        let matches = match_candidates(&buffers, &SourceQuery::new("util.h", 3), &mut sink);

        assert_eq!(matches.len(), 2);
        let kernel = matches.iter().find(|m| m.kernel.symbol == "_Z6kernelPi").unwrap();
        assert_eq!(kernel.asm_lines, vec![8]);
    }

    #[test]
    fn test_file_only_query_returns_kernels_without_hits() {
        let buffers = vec![parsed(TWO_KERNELS)];
        let mut sink = CollectingSink::new();
        let matches = match_candidates(&buffers, &SourceQuery::file_only("a.hip"), &mut sink);

        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|m| m.asm_lines.is_empty()));
    }

    #[test]
    fn test_unreferenced_file_excludes_kernels() {
        let buffers = vec![parsed(TWO_KERNELS)];
        let mut sink = CollectingSink::new();
        let matches = match_candidates(&buffers, &SourceQuery::new("b.hip", 5), &mut sink);

        assert!(matches.is_empty());
        assert_eq!(sink.diagnostics.len(), 2);
        assert_eq!(sink.warnings().count(), 0);
    }

    #[test]
    fn test_first_basename_match_wins() {
        let table = SourceFileTable::from_lines(&[
            ".file 4 \"/x\" \"a.hip\"",
            ".file 1 \"/y\" \"a.hip\"",
        ]);
        let (id, path) = find_source_file(&table, Path::new("a.hip")).unwrap();
        assert_eq!(id, FileId(4));
        assert_eq!(path, Path::new("/x/a.hip"));
    }

    #[test]
    fn test_path_suffix_breaks_basename_ties() {
        let table = SourceFileTable::from_lines(&[
            ".file 1 \"/src/lib\" \"a.hip\"",
            ".file 2 \"/src/app\" \"a.hip\"",
        ]);
        let (id, _) = find_source_file(&table, Path::new("app/a.hip")).unwrap();
        assert_eq!(id, FileId(2));

        let (id, _) = find_source_file(&table, Path::new("/elsewhere/a.hip")).unwrap();
        assert_eq!(id, FileId(1));
    }

    #[test]
    fn test_source_query_line() {
        assert_eq!(SourceQuery::new("a.hip", 5).source_line(), SourceLine::from_one_based(5));
        assert!(SourceQuery::file_only("a.hip").source_line().is_none());
        assert_eq!(SourceQuery::new("/p/a.hip", 0).basename(), Some("a.hip"));
    }
}
