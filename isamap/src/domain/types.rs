//! Domain types providing compile-time safety and self-documentation
//!
//! These newtype wrappers keep the three kinds of "numbers" flowing through
//! the mapping engine apart: debug-info file identifiers, source lines and
//! assembly line indices never silently mix.

use serde::Serialize;
use std::fmt;

/// Debug-info file identifier
///
/// The small integer a `.file` directive binds to a path and a `.loc`
/// directive refers back to. Only meaningful inside one assembly buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FileId(pub u32);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file#{}", self.0)
    }
}

/// Source line, stored 0-indexed
///
/// `.loc` directives and editors count lines from 1; the mapping engine
/// stores them from 0. Conversions go through [`SourceLine::from_one_based`]
/// and [`SourceLine::number`] so the off-by-one lives in exactly one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "u32")]
pub struct SourceLine(u32);

impl SourceLine {
    /// Create from a 0-indexed line
    #[must_use]
    pub fn from_zero_based(index: u32) -> Self {
        Self(index)
    }

    /// Create from a 1-based line number. Line 0 has no 0-indexed form.
    #[must_use]
    pub fn from_one_based(number: u32) -> Option<Self> {
        number.checked_sub(1).map(Self)
    }

    /// 0-indexed value
    #[must_use]
    pub fn index(self) -> u32 {
        self.0
    }

    /// 1-based line number, as editors and `.loc` print it
    #[must_use]
    pub fn number(self) -> u32 {
        self.0 + 1
    }
}

impl From<SourceLine> for u32 {
    fn from(line: SourceLine) -> Self {
        line.number()
    }
}

impl fmt::Display for SourceLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Name of the scanned build root an assembly buffer came from
///
/// Two buffers defining the same kernel symbol under different tags are two
/// versions of that kernel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BuildTag(String);

impl BuildTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BuildTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BuildTag {
    fn from(s: &str) -> Self {
        BuildTag::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_line_conversions() {
        let line = SourceLine::from_one_based(10).unwrap();
        assert_eq!(line.index(), 9);
        assert_eq!(line.number(), 10);
        assert_eq!(line.to_string(), "10");
        assert_eq!(SourceLine::from_zero_based(9), line);
    }

    #[test]
    fn test_source_line_zero_has_no_index() {
        assert!(SourceLine::from_one_based(0).is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(FileId(3).to_string(), "file#3");
        assert_eq!(BuildTag::from("build2").to_string(), "build2");
    }
}
