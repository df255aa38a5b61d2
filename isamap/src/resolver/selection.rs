//! Caller-side ranking and selection of match records
//!
//! Resolution returns an unordered set. Hosts show the most recently built
//! kernel first, keep discovery order among equally old ones, and may pin a
//! symbol or build root explicitly.

use super::MatchRecord;

/// Optional constraints on which record to select
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionPin {
    pub symbol: Option<String>,
    pub build_tag: Option<String>,
}

impl SelectionPin {
    #[must_use]
    pub fn accepts(&self, record: &MatchRecord) -> bool {
        self.symbol.as_ref().is_none_or(|s| *s == record.kernel.symbol)
            && self.build_tag.as_ref().is_none_or(|t| t == record.kernel.build_tag.as_str())
    }
}

/// Sort newest first; the sort is stable so ties keep discovery order
pub fn rank_most_recent_first(records: &mut [MatchRecord]) {
    records.sort_by(|a, b| b.kernel.modified.cmp(&a.kernel.modified));
}

/// First record accepted by `pin`, in the order given
#[must_use]
pub fn select<'r>(records: &'r [MatchRecord], pin: &SelectionPin) -> Option<&'r MatchRecord> {
    records.iter().find(|r| pin.accepts(r))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::{BuildTag, FileId};
    use crate::parser::{KernelRegion, SourceFileTable};
    use crate::scanner::AsmBuffer;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::{Duration, SystemTime};

    pub(crate) fn record(symbol: &str, tag: &str, path: &str, age_secs: u64) -> MatchRecord {
        let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000 - age_secs);
        let buffer = Arc::new(AsmBuffer::from_text(
            path,
            BuildTag::from(tag),
            modified,
            &format!("\t.globl\t{symbol}\n{symbol}:\n\ts_endpgm\n"),
        ));
        MatchRecord {
            kernel: KernelRegion {
                symbol: symbol.to_string(),
                start_line: 0,
                end_line: 2,
                file_table: Arc::new(SourceFileTable::new()),
                build_tag: BuildTag::from(tag),
                modified,
            },
            buffer,
            matched_file: FileId(1),
            matched_path: PathBuf::from("/p/a.hip"),
            asm_lines: Vec::new(),
        }
    }

    #[test]
    fn test_rank_most_recent_first_is_stable() {
        let mut records = vec![
            record("_Z3fooPf", "build", "build/a.s", 50),
            record("_Z3barPf", "build", "build/a.s", 10),
            record("_Z3bazPf", "build2", "build2/a.s", 50),
        ];
        rank_most_recent_first(&mut records);

        let order: Vec<&str> = records.iter().map(|r| r.kernel.symbol.as_str()).collect();
        assert_eq!(order, vec!["_Z3barPf", "_Z3fooPf", "_Z3bazPf"]);
    }

    #[test]
    fn test_select_with_pins() {
        let records = vec![
            record("_Z3fooPf", "build", "build/a.s", 0),
            record("_Z3fooPf", "build2", "build2/a.s", 0),
            record("_Z3barPf", "build2", "build2/a.s", 0),
        ];

        let any = select(&records, &SelectionPin::default()).unwrap();
        assert_eq!(any.kernel.build_tag.as_str(), "build");

        let pin = SelectionPin { symbol: None, build_tag: Some("build2".to_string()) };
        assert_eq!(select(&records, &pin).unwrap().kernel.symbol, "_Z3fooPf");

        let pin = SelectionPin {
            symbol: Some("_Z3barPf".to_string()),
            build_tag: Some("build".to_string()),
        };
        assert!(select(&records, &pin).is_none());
    }
}
