//! # Source ↔ assembly line mapping
//!
//! A single pass over a span of assembly lines tracking the "current"
//! source location set by the most recent `.loc` directive:
//!
//! ```text
//!  idx  line                                   current       forward  reverse
//!  10   .loc 1 10 1                            (a.hip, 9)    -        -
//!  11   v_add_u32 v0, v1, v2                   (a.hip, 9)    ✓        ✓
//!  12   ; spill                                (a.hip, 9)    -        ✓
//!  13   global_store_dword v[0:1], v0, off     (a.hip, 9)    ✓        ✓
//!  14   .loc 1 11 1                            (a.hip, 10)   -        -
//!  15   s_endpgm                               (a.hip, 10)   ✓        ✓
//! ```
//!
//! - **forward** `(path, line) → [asm line]` only lists genuine instructions,
//!   several instructions may share one source line.
//! - **reverse** `asm line → (path, line)` covers every located line,
//!   comments, directives and labels included.
//!
//! Lines before the first `.loc` are unmapped in both directions. A `.loc`
//! with source line 0 marks compiler-generated code and clears the current
//! location until the next `.loc`.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use crate::domain::{FileId, SourceLine};
use crate::parser::{parse_directive, Directive, KernelRegion, SourceFileTable};
use crate::scanner::AsmBuffer;

/// A resolved source location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub path: Arc<Path>,
    pub line: SourceLine,
}

/// Bidirectional line mapping for one span of one assembly buffer
#[derive(Debug, Clone, Default)]
pub struct LineMapping {
    forward: HashMap<Arc<Path>, BTreeMap<SourceLine, Vec<usize>>>,
    reverse: BTreeMap<usize, SourceLocation>,
}

impl LineMapping {
    /// Map every line of a buffer
    pub fn build<S: AsRef<str>>(lines: &[S], file_table: &SourceFileTable) -> Self {
        Self::build_span(lines, 0, file_table, None)
    }

    /// Map the lines of one kernel region
    ///
    /// With `only_file` set, lines located in any other file are left
    /// unmapped. Files are compared by resolved path, so two ids declaring the
    /// same path (DWARF 5 emits both `.file 0` and `.file 1` for the main
    /// file) count as one.
    #[must_use]
    pub fn for_region(
        buffer: &AsmBuffer,
        region: &KernelRegion,
        only_file: Option<FileId>,
    ) -> Self {
        let span = buffer.span(region.start_line, region.end_line);
        let only_path = only_file.and_then(|id| region.file_table.get(id));
        Self::build_span(span, region.start_line, &region.file_table, only_path)
    }

    fn build_span<S: AsRef<str>>(
        lines: &[S],
        first_index: usize,
        file_table: &SourceFileTable,
        only_path: Option<&Path>,
    ) -> Self {
        let paths: HashMap<FileId, Arc<Path>> =
            file_table.iter().map(|(id, path)| (id, Arc::from(path))).collect();

        let mut mapping = Self::default();
        let mut current: Option<SourceLocation> = None;

        for (offset, line) in lines.iter().enumerate() {
            let text = line.as_ref();

            if let Some(Directive::Loc { file, line, .. }) = parse_directive(text) {
                current = match (paths.get(&file), SourceLine::from_one_based(line)) {
                    (Some(path), Some(line)) => {
                        Some(SourceLocation { path: Arc::clone(path), line })
                    }
                    _ => None,
                };
                continue;
            }

            let Some(location) = &current else {
                continue;
            };
            if only_path.is_some_and(|only| *location.path != *only) {
                continue;
            }

            let asm_line = first_index + offset;
            if is_instruction(text) {
                mapping
                    .forward
                    .entry(Arc::clone(&location.path))
                    .or_default()
                    .entry(location.line)
                    .or_default()
                    .push(asm_line);
            }
            mapping.reverse.insert(asm_line, location.clone());
        }

        mapping
    }

    /// Instruction lines generated for a source line, in buffer order
    #[must_use]
    pub fn forward(&self, path: &Path, line: SourceLine) -> &[usize] {
        self.forward
            .get(path)
            .and_then(|lines| lines.get(&line))
            .map_or(&[][..], Vec::as_slice)
    }

    /// Source location an asm line was generated for
    #[must_use]
    pub fn reverse(&self, asm_line: usize) -> Option<&SourceLocation> {
        self.reverse.get(&asm_line)
    }

    /// Every `(path, line) → instructions` bucket, grouped by path
    pub fn buckets(&self) -> impl Iterator<Item = (&Path, SourceLine, &[usize])> {
        self.forward.iter().flat_map(|(path, lines)| {
            lines.iter().map(move |(line, asm)| (path.as_ref(), *line, asm.as_slice()))
        })
    }

    /// Number of asm lines with a known source location
    #[must_use]
    pub fn located_lines(&self) -> usize {
        self.reverse.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reverse.is_empty()
    }
}

/// Whether a line is a real instruction rather than a directive, comment,
/// label or blank line
#[must_use]
pub fn is_instruction(line: &str) -> bool {
    let text = line.trim();
    if text.is_empty() || text.starts_with('.') {
        return false;
    }
    if text.starts_with(';') || text.starts_with("//") || text.starts_with('#') {
        return false;
    }
    // `foo:   ; @foo` carries a trailing comment and is not bare, so it counts
    let bare_label = text.ends_with(':') && !text.contains(char::is_whitespace);
    !bare_label
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: u32) -> SourceLine {
        SourceLine::from_one_based(n).unwrap()
    }

    fn table() -> SourceFileTable {
        SourceFileTable::from_lines(&[".file 1 \"/p\" \"a.hip\"", ".file 2 \"/p/b.h\""])
    }

    #[test]
    fn test_is_instruction() {
        assert!(is_instruction("\tv_add_u32_e32 v0, v1, v2"));
        assert!(is_instruction("s_endpgm"));
        assert!(!is_instruction(""));
        assert!(!is_instruction("   \t"));
        assert!(!is_instruction("\t.p2align 8"));
        assert!(!is_instruction("; %bb.0:"));
        assert!(!is_instruction("// comment"));
        assert!(!is_instruction("# comment"));
        assert!(!is_instruction("_Z6kernelPi:"));
        assert!(!is_instruction(".LBB0_1:"));
    }

    #[test]
    fn test_label_with_trailing_comment_counts_as_instruction() {
        assert!(is_instruction("_Z6kernelPi:                           ; @_Z6kernelPi"));
        assert!(is_instruction(".LBB0_2:                                ; %if.then"));

        let lines = [".loc 1 3 0", ".LBB0_2:    ; %if.then", "\ts_nop 0"];
        let mapping = LineMapping::build(&lines, &table());
        assert_eq!(mapping.forward(Path::new("/p/a.hip"), line(3)), &[1, 2]);
    }

    #[test]
    fn test_forward_groups_instructions_per_loc() {
        let lines = [
            ".loc 1 10 1",
            "\tv_mov_b32 v0, 0",
            "\tv_mov_b32 v1, 1",
            ".loc 1 11 1",
            "\ts_endpgm",
        ];
        let mapping = LineMapping::build(&lines, &table());
        let a = Path::new("/p/a.hip");

        assert_eq!(mapping.forward(a, line(10)), &[1, 2]);
        assert_eq!(mapping.forward(a, line(11)), &[4]);
        assert!(mapping.forward(a, line(12)).is_empty());
        assert!(mapping.forward(Path::new("/p/other.hip"), line(10)).is_empty());
    }

    #[test]
    fn test_reverse_includes_non_instruction_lines() {
        let lines = [
            ".loc 1 3 0",
            "; comment",
            ".LBB0_1:",
            "\t.p2align 2",
            "",
            "\ts_nop 0",
            ".loc 2 7 4",
            "\ts_endpgm",
        ];
        let mapping = LineMapping::build(&lines, &table());

        for idx in 1..=5 {
            let loc = mapping.reverse(idx).unwrap();
            assert_eq!(&*loc.path, Path::new("/p/a.hip"));
            assert_eq!(loc.line, line(3));
        }
        assert_eq!(&*mapping.reverse(7).unwrap().path, Path::new("/p/b.h"));
        assert_eq!(mapping.reverse(7).unwrap().line, line(7));

        // Only the real instruction made it into the forward bucket.
        assert_eq!(mapping.forward(Path::new("/p/a.hip"), line(3)), &[5]);
    }

    #[test]
    fn test_lines_before_first_loc_are_unmapped() {
        let lines = ["\ts_mov_b32 s0, 0", ".loc 1 1 0", "\ts_endpgm"];
        let mapping = LineMapping::build(&lines, &table());

        assert!(mapping.reverse(0).is_none());
        assert_eq!(mapping.located_lines(), 1);
    }

    #[test]
    fn test_unknown_file_id_and_line_zero_clear_location() {
        let lines = [
            ".loc 1 4 0",
            "\ts_nop 0",
            ".loc 9 4 0",
            "\ts_nop 1",
            ".loc 1 0 0",
            "\ts_nop 2",
            ".loc 1 5 0",
            "\ts_nop 3",
        ];
        let mapping = LineMapping::build(&lines, &table());

        assert!(mapping.reverse(1).is_some());
        assert!(mapping.reverse(3).is_none());
        assert!(mapping.reverse(5).is_none());
        assert_eq!(mapping.forward(Path::new("/p/a.hip"), line(5)), &[7]);
    }

    #[test]
    fn test_restricted_to_one_file() {
        let lines = [".loc 1 1 0", "\ts_nop 0", ".loc 2 1 0", "\ts_nop 1"];
        let table = table();
        let mapping = LineMapping::build_span(&lines, 100, &table, Some(Path::new("/p/a.hip")));

        assert_eq!(mapping.forward(Path::new("/p/a.hip"), line(1)), &[101]);
        assert!(mapping.forward(Path::new("/p/b.h"), line(1)).is_empty());
        assert!(mapping.reverse(103).is_none());
    }

    #[test]
    fn test_duplicate_ids_for_same_path_merge() {
        let table = SourceFileTable::from_lines(&[
            ".file 0 \"/p\" \"a.hip\" md5 0x00",
            ".file 1 \"/p\" \"a.hip\"",
        ]);
        let lines = [".loc 0 2 0", "\ts_nop 0", ".loc 1 2 0", "\ts_nop 1"];
        let mapping = LineMapping::build(&lines, &table);

        assert_eq!(mapping.forward(Path::new("/p/a.hip"), line(2)), &[1, 3]);
        assert_eq!(mapping.buckets().count(), 1);
    }
}
