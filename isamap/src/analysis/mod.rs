//! Analysis over resolver output
//!
//! Pure logic over match records, separated from the presentation layer:
//! staleness of a selected kernel version, and positional comparison of two
//! kernel versions.

pub mod compare;
pub mod staleness;

pub use compare::{align_positional, compare_records, DiffAlignment, DiffLine};
pub use staleness::{detect_staleness, StalenessReport};
