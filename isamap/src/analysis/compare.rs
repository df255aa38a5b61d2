//! Positional comparison of two kernel versions
//!
//! Lines are paired by position only: the shorter side is padded with empty
//! lines and each pair is flagged when the raw strings differ. There is no
//! sequence alignment, so one inserted line shifts every later pair.
//!
//! ```text
//!   left (build)               right (build2)
//!   s_load_dword s0, ...       s_load_dword s0, ...
//! * v_mov_b32 v1, 0            v_mov_b32 v1, 1
//! *                            s_endpgm
//! ```

use crate::resolver::MatchRecord;

/// One side of one aligned position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub text: String,
    pub changed: bool,
}

/// Two equal-length line sequences with per-position change flags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffAlignment {
    pub left: Vec<DiffLine>,
    pub right: Vec<DiffLine>,
}

impl DiffAlignment {
    #[must_use]
    pub fn len(&self) -> usize {
        self.left.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Number of positions flagged as changed
    #[must_use]
    pub fn changed_count(&self) -> usize {
        self.left.iter().filter(|l| l.changed).count()
    }

    /// Aligned pairs `(left, right, changed)`
    pub fn rows(&self) -> impl Iterator<Item = (&str, &str, bool)> {
        self.left
            .iter()
            .zip(&self.right)
            .map(|(l, r)| (l.text.as_str(), r.text.as_str(), l.changed))
    }
}

/// Align two line sequences by position
#[must_use]
pub fn align_positional<S: AsRef<str>>(left: &[S], right: &[S]) -> DiffAlignment {
    let len = left.len().max(right.len());
    let mut alignment = DiffAlignment {
        left: Vec::with_capacity(len),
        right: Vec::with_capacity(len),
    };

    for idx in 0..len {
        let l = left.get(idx).map_or("", |s| s.as_ref());
        let r = right.get(idx).map_or("", |s| s.as_ref());
        let changed = l != r;
        alignment.left.push(DiffLine { text: l.to_string(), changed });
        alignment.right.push(DiffLine { text: r.to_string(), changed });
    }

    alignment
}

/// Align the kernel spans of two match records
#[must_use]
pub fn compare_records(left: &MatchRecord, right: &MatchRecord) -> DiffAlignment {
    let alignment = align_positional(left.kernel_lines(), right.kernel_lines());
    log::debug!(
        "Compared {} ({}) with {} ({}): {} of {} lines differ",
        left.kernel.symbol,
        left.kernel.build_tag,
        right.kernel.symbol,
        right.kernel.build_tag,
        alignment.changed_count(),
        alignment.len()
    );
    alignment
}
