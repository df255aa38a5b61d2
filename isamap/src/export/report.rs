//! Serializable views of core results
//!
//! The core works in 0-indexed asm lines and mangled symbols; reports carry
//! 1-based line numbers and demangled display names, ready for a
//! presentation sink.

use serde::Serialize;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::analysis::{DiffAlignment, StalenessReport};
use crate::diagnostics::DiagnosticSink;
use crate::mapping::{LineMapping, SourceLocation};
use crate::resolver::{MatchRecord, SourceQuery};
use crate::symbolization::Demangler;

/// A source location with a 1-based line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationReport {
    pub file: PathBuf,
    pub line: u32,
}

impl From<&SourceLocation> for LocationReport {
    fn from(loc: &SourceLocation) -> Self {
        Self { file: loc.path.to_path_buf(), line: loc.line.number() }
    }
}

/// One kernel candidate
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReport {
    pub symbol: String,
    pub display_name: String,
    pub build_tag: String,
    pub asm_file: PathBuf,
    pub modified_unix: u64,
    pub start_line: usize,
    pub end_line: usize,
    pub matched_path: PathBuf,
    pub asm_lines: Vec<usize>,
    pub outdated: bool,
    pub latest_build_tag: String,
}

impl MatchReport {
    pub fn new(
        record: &MatchRecord,
        staleness: &StalenessReport,
        demangler: &Demangler,
        sink: &mut dyn DiagnosticSink,
    ) -> Self {
        Self {
            symbol: record.kernel.symbol.clone(),
            display_name: demangler.demangle(&record.kernel.symbol, sink),
            build_tag: record.kernel.build_tag.to_string(),
            asm_file: record.buffer.path.clone(),
            modified_unix: unix_seconds(record.kernel.modified),
            start_line: record.kernel.start_line + 1,
            end_line: record.kernel.end_line + 1,
            matched_path: record.matched_path.clone(),
            asm_lines: record.asm_lines.iter().map(|l| l + 1).collect(),
            outdated: staleness.outdated,
            latest_build_tag: staleness.latest_build_tag.to_string(),
        }
    }
}

/// Resolver output for one query
#[derive(Debug, Clone, Serialize)]
pub struct MatchListReport {
    pub query: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    pub matches: Vec<MatchReport>,
}

impl MatchListReport {
    #[must_use]
    pub fn new(query: &SourceQuery, matches: Vec<MatchReport>) -> Self {
        Self {
            query: query.file.clone(),
            line: query.source_line().map(|l| l.number()),
            matches,
        }
    }
}

/// One line of a mapped kernel
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedLine {
    pub asm_line: usize,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<LocationReport>,
    pub highlighted: bool,
}

/// The selected kernel with every line's source location
#[derive(Debug, Clone, Serialize)]
pub struct MappingReport {
    pub kernel: MatchReport,
    pub lines: Vec<MappedLine>,
}

impl MappingReport {
    #[must_use]
    pub fn new(kernel: MatchReport, record: &MatchRecord, mapping: &LineMapping) -> Self {
        let lines = record
            .kernel_lines()
            .iter()
            .enumerate()
            .map(|(offset, text)| {
                let idx = record.kernel.start_line + offset;
                MappedLine {
                    asm_line: idx + 1,
                    text: text.clone(),
                    source: mapping.reverse(idx).map(LocationReport::from),
                    highlighted: record.asm_lines.contains(&idx),
                }
            })
            .collect();
        Self { kernel, lines }
    }
}

/// Reverse lookup of one asm line
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverseReport {
    pub asm_file: PathBuf,
    pub asm_line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<LocationReport>,
}

/// One side of a comparison
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffSide {
    pub build_tag: String,
    pub asm_file: PathBuf,
    pub outdated: bool,
}

impl DiffSide {
    #[must_use]
    pub fn new(record: &MatchRecord, staleness: &StalenessReport) -> Self {
        Self {
            build_tag: record.kernel.build_tag.to_string(),
            asm_file: record.buffer.path.clone(),
            outdated: staleness.outdated,
        }
    }
}

/// One aligned position
#[derive(Debug, Clone, Serialize)]
pub struct DiffRow {
    pub left: String,
    pub right: String,
    pub changed: bool,
}

/// Side-by-side comparison of two kernel versions
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffReport {
    pub symbol: String,
    pub display_name: String,
    pub left: DiffSide,
    pub right: DiffSide,
    pub changed_lines: usize,
    pub rows: Vec<DiffRow>,
}

impl DiffReport {
    #[must_use]
    pub fn new(
        symbol: &str,
        display_name: String,
        left: DiffSide,
        right: DiffSide,
        alignment: &DiffAlignment,
    ) -> Self {
        let rows = alignment
            .rows()
            .map(|(l, r, changed)| DiffRow { left: l.to_string(), right: r.to_string(), changed })
            .collect();
        Self {
            symbol: symbol.to_string(),
            display_name,
            left,
            right,
            changed_lines: alignment.changed_count(),
            rows,
        }
    }
}

fn unix_seconds(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH).map_or(0, |d| d.as_secs())
}
