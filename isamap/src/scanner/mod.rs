//! Assembly file discovery
//!
//! Walks every configured build root and reads each per-target ISA dump it
//! finds exactly once. A root that does not exist or a file that cannot be
//! read is reported to the diagnostic sink and skipped; the walk itself
//! never aborts.
//!
//! ```text
//! <workspace>/build/                       BuildTag("build")
//!   └── CMakeFiles/app.dir/
//!         └── app-hip-amdgcn-amd-amdhsa-gfx90a.s   ← picked up
//!         └── app-host-x86_64-unknown-linux-gnu.s  ← ignored
//! ```

use log::{debug, info};
use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

use crate::config::ScanSettings;
use crate::diagnostics::DiagnosticSink;
use crate::domain::{BuildTag, ScanDiagnostic};

/// One assembly text file, read once and split into lines
#[derive(Debug, Clone)]
pub struct AsmBuffer {
    pub path: PathBuf,
    pub build_tag: BuildTag,
    pub modified: SystemTime,
    pub lines: Vec<String>,
}

impl AsmBuffer {
    /// Build a buffer from in-memory text
    pub fn from_text(
        path: impl Into<PathBuf>,
        build_tag: BuildTag,
        modified: SystemTime,
        text: &str,
    ) -> Self {
        Self {
            path: path.into(),
            build_tag,
            modified,
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    /// Read a buffer from disk
    ///
    /// Bytes that are not valid UTF-8 (a Latin-1 comment, an odd `.file`
    /// path) are replaced with U+FFFD; the rest of the file stays usable.
    ///
    /// # Errors
    /// Returns an error if the file or its metadata cannot be read
    pub fn read(path: &Path, build_tag: BuildTag) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        let modified = fs::metadata(path)?.modified()?;
        let text = String::from_utf8_lossy(&bytes);
        if matches!(text, Cow::Owned(_)) {
            debug!("{} is not valid UTF-8, replacing invalid bytes", path.display());
        }
        Ok(Self::from_text(path, build_tag, modified, &text))
    }

    /// Lines `start..=end`, clipped to the buffer
    #[must_use]
    pub fn span(&self, start: usize, end: usize) -> &[String] {
        if start >= self.lines.len() || start > end {
            return &[];
        }
        let end = end.min(self.lines.len() - 1);
        &self.lines[start..=end]
    }
}

/// Scan every configured build root under `workspace_root`
///
/// Roots are visited in configuration order and files in file-name order
/// within each directory, so the result order is the discovery order later
/// used to break ranking ties.
pub fn scan_build_roots(
    workspace_root: &Path,
    settings: &ScanSettings,
    sink: &mut dyn DiagnosticSink,
) -> Vec<AsmBuffer> {
    let mut buffers = Vec::new();

    for dir in &settings.build_directories {
        let root = workspace_root.join(dir);
        if !root.is_dir() {
            sink.report(ScanDiagnostic::MissingBuildDirectory(root));
            continue;
        }

        let before = buffers.len();
        scan_root(&root, &BuildTag::new(dir.as_str()), settings, sink, &mut buffers);
        info!("Found {} assembly files under {}", buffers.len() - before, root.display());
    }

    buffers
}

fn scan_root(
    root: &Path,
    build_tag: &BuildTag,
    settings: &ScanSettings,
    sink: &mut dyn DiagnosticSink,
    buffers: &mut Vec<AsmBuffer>,
) {
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
                sink.report(ScanDiagnostic::UnreadableFile { path, reason: e.to_string() });
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !settings.is_isa_dump(name) {
            continue;
        }

        match AsmBuffer::read(entry.path(), build_tag.clone()) {
            Ok(buffer) => {
                debug!("Read {} ({} lines)", entry.path().display(), buffer.lines.len());
                buffers.push(buffer);
            }
            Err(e) => sink.report(ScanDiagnostic::UnreadableFile {
                path: entry.path().to_path_buf(),
                reason: e.to_string(),
            }),
        }
    }
}
