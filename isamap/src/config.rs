//! Scan settings
//!
//! The only knob the core strictly needs is the ordered list of build
//! directories. The file-name convention and the symbol search window are
//! exposed too so unusual toolchains can still be scanned.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::ConfigError;

/// Config file looked up in the workspace root when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = ".isamap.json";

/// Settings driving a scan
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanSettings {
    /// Build roots relative to the workspace, in priority order
    pub build_directories: Vec<String>,
    /// Target triple fragment every ISA dump file name contains
    pub target_infix: String,
    /// Assembly text suffix
    pub asm_extension: String,
    /// Lines searched for a `.globl` after a region boundary
    pub symbol_search_window: usize,
    /// External demangler command
    pub demangler: String,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            build_directories: vec!["build".to_string()],
            target_infix: "amdgcn-amd-amdhsa".to_string(),
            asm_extension: ".s".to_string(),
            symbol_search_window: 21,
            demangler: "llvm-cxxfilt".to_string(),
        }
    }
}

impl ScanSettings {
    /// Load settings from a JSON file; missing keys take their defaults
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid JSON
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|source| ConfigError::ReadFailed { path: path.to_path_buf(), source })?;
        Self::from_json(&content).map_err(|source| match source {
            ConfigError::InvalidJson { source, .. } => {
                ConfigError::InvalidJson { path: path.to_path_buf(), source }
            }
            other => other,
        })
    }

    /// Parse settings from JSON text
    ///
    /// # Errors
    /// Returns an error for malformed JSON, an explicitly empty directory list or a
    /// zero symbol search window
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(content)
            .map_err(|source| ConfigError::InvalidJson { path: PathBuf::new(), source })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Settings for a workspace: explicit file, then `.isamap.json`, then defaults
    ///
    /// # Errors
    /// Returns an error if an existing config file cannot be loaded
    pub fn discover(workspace_root: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let candidate = workspace_root.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            log::debug!("Using config file {}", candidate.display());
            return Self::from_file(&candidate);
        }
        Ok(Self::default())
    }

    /// Replace the build directory list, keeping the given order
    ///
    /// # Errors
    /// Returns an error if `dirs` is empty
    pub fn with_build_directories(mut self, dirs: Vec<String>) -> Result<Self, ConfigError> {
        self.build_directories = dirs;
        self.validate()?;
        Ok(self)
    }

    /// Whether a file name follows the per-target ISA dump convention
    #[must_use]
    pub fn is_isa_dump(&self, file_name: &str) -> bool {
        file_name.contains(&self.target_infix) && file_name.ends_with(&self.asm_extension)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.build_directories.is_empty() {
            return Err(ConfigError::NoBuildDirectories);
        }
        if self.symbol_search_window == 0 {
            return Err(ConfigError::EmptySymbolSearchWindow);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ScanSettings::default();
        assert_eq!(settings.build_directories, vec!["build".to_string()]);
        assert_eq!(settings.symbol_search_window, 21);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings =
            ScanSettings::from_json(r#"{ "buildDirectories": ["build", "build2"] }"#).unwrap();
        assert_eq!(settings.build_directories, vec!["build", "build2"]);
        assert_eq!(settings.target_infix, "amdgcn-amd-amdhsa");
        assert_eq!(settings.asm_extension, ".s");
    }

    #[test]
    fn test_empty_build_directories_rejected() {
        let result = ScanSettings::from_json(r#"{ "buildDirectories": [] }"#);
        assert!(matches!(result, Err(ConfigError::NoBuildDirectories)));
    }

    #[test]
    fn test_zero_search_window_rejected() {
        let result = ScanSettings::from_json(r#"{ "symbolSearchWindow": 0 }"#);
        assert!(matches!(result, Err(ConfigError::EmptySymbolSearchWindow)));

        let settings = ScanSettings::from_json(r#"{ "symbolSearchWindow": 1 }"#).unwrap();
        assert_eq!(settings.symbol_search_window, 1);
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(matches!(
            ScanSettings::from_json("{ not json"),
            Err(ConfigError::InvalidJson { .. })
        ));
    }

    #[test]
    fn test_is_isa_dump() {
        let settings = ScanSettings::default();
        assert!(settings.is_isa_dump("foo-hip-amdgcn-amd-amdhsa-gfx90a.s"));
        assert!(!settings.is_isa_dump("foo-hip-amdgcn-amd-amdhsa-gfx90a.bc"));
        assert!(!settings.is_isa_dump("foo-host-x86_64-unknown-linux-gnu.s"));
    }

    #[test]
    fn test_discover_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ScanSettings::discover(dir.path(), None).unwrap();
        assert_eq!(settings, ScanSettings::default());
    }

    #[test]
    fn test_discover_reads_workspace_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_CONFIG_FILE), r#"{ "buildDirectories": ["out"] }"#)
            .unwrap();
        let settings = ScanSettings::discover(dir.path(), None).unwrap();
        assert_eq!(settings.build_directories, vec!["out"]);
    }
}
