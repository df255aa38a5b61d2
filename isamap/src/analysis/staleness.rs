//! Staleness of a selected kernel version
//!
//! The same kernel symbol can be found in several build roots (or several
//! dumps in one root). The most recently modified dump is the latest; any
//! other version is outdated. Informational only, nothing is merged.

use std::path::PathBuf;

use crate::domain::BuildTag;
use crate::resolver::MatchRecord;

/// Where the selected record stands among versions of its symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StalenessReport {
    /// Selected record is not the latest version of its symbol
    pub outdated: bool,
    /// Number of records sharing the symbol, selected one included
    pub versions: usize,
    pub latest_build_tag: BuildTag,
    pub latest_path: PathBuf,
}

/// Compare `selected` against every candidate with the identical symbol
///
/// Among equally recent versions the first candidate wins. Records are
/// identified by the assembly file they came from.
#[must_use]
pub fn detect_staleness(selected: &MatchRecord, candidates: &[MatchRecord]) -> StalenessReport {
    let mut versions = 0;
    let mut latest: Option<&MatchRecord> = None;

    for candidate in candidates.iter().filter(|c| c.kernel.symbol == selected.kernel.symbol) {
        versions += 1;
        if latest.is_none_or(|l| candidate.kernel.modified > l.kernel.modified) {
            latest = Some(candidate);
        }
    }

    let latest = latest.unwrap_or(selected);
    let outdated = versions > 1 && !latest.same_file(selected);
    if outdated {
        log::info!(
            "{} from {} is outdated, latest is {}",
            selected.kernel.symbol,
            selected.kernel.build_tag,
            latest.kernel.build_tag
        );
    }

    StalenessReport {
        outdated,
        versions: versions.max(1),
        latest_build_tag: latest.kernel.build_tag.clone(),
        latest_path: latest.buffer.path.clone(),
    }
}
