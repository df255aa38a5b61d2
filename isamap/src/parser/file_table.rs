//! Source file table
//!
//! Maps the file ids declared by `.file` directives to normalized paths.
//! A later directive for an id overwrites the earlier path but keeps the
//! id's original position, so iteration follows first-declaration order
//! rather than numeric order.

use std::path::{Component, Path, PathBuf};

use super::directives::{parse_directive, Directive};
use crate::domain::FileId;

/// File id → normalized path table for one assembly buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFileTable {
    entries: Vec<(FileId, PathBuf)>,
}

impl SourceFileTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table from a buffer's lines in a single pass
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut table = Self::new();
        for line in lines {
            if let Some(Directive::File { id, directory, file }) = parse_directive(line.as_ref()) {
                table.insert(id, resolve_declared_path(directory.as_deref(), &file));
            }
        }
        table
    }

    /// Insert or overwrite an entry (last write wins)
    pub fn insert(&mut self, id: FileId, path: PathBuf) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == id) {
            Some(entry) => entry.1 = path,
            None => self.entries.push((id, path)),
        }
    }

    #[must_use]
    pub fn get(&self, id: FileId) -> Option<&Path> {
        self.entries.iter().find(|(existing, _)| *existing == id).map(|(_, path)| path.as_path())
    }

    /// Entries in first-declaration order
    pub fn iter(&self) -> impl Iterator<Item = (FileId, &Path)> {
        self.entries.iter().map(|(id, path)| (*id, path.as_path()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Path a `.file` directive declares: `dir` joined with `file`, or `file` alone
#[must_use]
pub fn resolve_declared_path(directory: Option<&str>, file: &str) -> PathBuf {
    match directory {
        Some(dir) => normalize_path(&Path::new(dir).join(file)),
        None => normalize_path(Path::new(file)),
    }
}

/// Lexically normalize a path: drop `.` components, fold `..` into its parent
///
/// The filesystem is never consulted; these paths usually belong to the
/// machine that ran the compiler.
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            Component::Normal(part) => out.push(part),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_argument_form_joins_directory() {
        let table = SourceFileTable::from_lines(&["\t.file\t1 \"/p\" \"a.hip\""]);
        assert_eq!(table.get(FileId(1)), Some(Path::new("/p/a.hip")));
    }

    #[test]
    fn test_one_argument_form_is_normalized() {
        let table = SourceFileTable::from_lines(&[".file 2 \"/p/./src/../a.hip\""]);
        assert_eq!(table.get(FileId(2)), Some(Path::new("/p/a.hip")));
    }

    #[test]
    fn test_absolute_filename_ignores_directory() {
        let table = SourceFileTable::from_lines(&[".file 1 \"/build\" \"/opt/rocm/include/x.h\""]);
        assert_eq!(table.get(FileId(1)), Some(Path::new("/opt/rocm/include/x.h")));
    }

    #[test]
    fn test_later_directive_overwrites_and_keeps_position() {
        let table = SourceFileTable::from_lines(&[
            ".file 3 \"/p\" \"first.hip\"",
            ".file 1 \"/p\" \"other.h\"",
            ".file 3 \"/q\" \"second.hip\"",
        ]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(FileId(3)), Some(Path::new("/q/second.hip")));
        let order: Vec<FileId> = table.iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec![FileId(3), FileId(1)]);
    }

    #[test]
    fn test_unmatched_directives_ignored() {
        let table = SourceFileTable::from_lines(&[".file \"a.hip\"", "s_endpgm", ".loc 1 2 3"]);
        assert!(table.is_empty());
    }

    #[test]
    fn test_normalize_relative_paths() {
        assert_eq!(normalize_path(Path::new("../a/./b/../c.hip")), PathBuf::from("../a/c.hip"));
        assert_eq!(normalize_path(Path::new("/../a.hip")), PathBuf::from("/a.hip"));
        assert_eq!(normalize_path(Path::new("a/..")), PathBuf::from("."));
    }
}
