//! Presentation sinks
//!
//! Everything user-facing sits behind [`PresentationSink`]: the core hands
//! over finished reports and never renders anything itself. Two sinks ship
//! with the CLI, plain text for terminals and JSON for editor integrations.

pub mod json;
pub mod report;
pub mod text;

use crate::domain::ExportError;

pub use json::JsonSink;
pub use report::{
    DiffReport, DiffRow, DiffSide, LocationReport, MappedLine, MappingReport, MatchListReport,
    MatchReport, ReverseReport,
};
pub use text::TextSink;

/// Consumer of core results
pub trait PresentationSink {
    /// Kernel candidates for a source query
    ///
    /// # Errors
    /// Returns an error if the output cannot be written
    fn matches(&mut self, report: &MatchListReport) -> Result<(), ExportError>;

    /// The selected kernel with its line mapping
    ///
    /// # Errors
    /// Returns an error if the output cannot be written
    fn mapping(&mut self, report: &MappingReport) -> Result<(), ExportError>;

    /// Source location of one asm line
    ///
    /// # Errors
    /// Returns an error if the output cannot be written
    fn location(&mut self, report: &ReverseReport) -> Result<(), ExportError>;

    /// Side-by-side comparison of two kernel versions
    ///
    /// # Errors
    /// Returns an error if the output cannot be written
    fn diff(&mut self, report: &DiffReport) -> Result<(), ExportError>;
}
