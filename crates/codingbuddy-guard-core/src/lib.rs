//! Shared types and ambient configuration for the command-safety guard.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A single simple command: an ordered sequence of word tokens with
/// assignments and redirects already stripped out by the extractor.
pub type SimpleCommand = Vec<String>;

/// Per-command classification outcome. Only two variants exist: the
/// engine never denies, it only allows or defers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Safe,
    Unknown,
}

impl Decision {
    pub fn is_safe(self) -> bool {
        matches!(self, Decision::Safe)
    }
}

/// Returns the per-user runtime directory the guard's ambient stack
/// (audit log, decision cache, config file) lives under, creating it if
/// missing. Honors `CODINGBUDDY_GUARD_HOME` for tests and containerized
/// runs, falling back to `$HOME/.codingbuddy-guard`.
pub fn runtime_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CODINGBUDDY_GUARD_HOME") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".codingbuddy-guard")
}

pub fn config_path() -> PathBuf {
    runtime_dir().join("config.toml")
}

/// Operator-facing knobs. None of these are consulted by the classifier
/// itself (SPEC_FULL §6) — they govern only the ambient logging/cache
/// layer around it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    pub audit_log_path: Option<PathBuf>,
    pub cache_ttl_secs: u64,
    pub verbose: bool,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            audit_log_path: None,
            cache_ttl_secs: 3,
            verbose: false,
        }
    }
}

impl GuardConfig {
    /// Loads config from disk, tolerating a missing or malformed file by
    /// falling back to defaults rather than failing the whole process —
    /// this mirrors the teacher's `AppConfig` loading tolerance.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => toml::from_str(&text).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    pub fn audit_log_path(&self) -> PathBuf {
        self.audit_log_path
            .clone()
            .unwrap_or_else(|| runtime_dir().join("guard-audit.log"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_ttl() {
        let cfg = GuardConfig::default();
        assert_eq!(cfg.cache_ttl_secs, 3);
        assert!(!cfg.verbose);
    }

    #[test]
    fn load_from_missing_path_falls_back_to_default() {
        let cfg = GuardConfig::load_from(Path::new("/nonexistent/does-not-exist.toml"));
        assert_eq!(cfg.cache_ttl_secs, 3);
    }

    #[test]
    fn load_from_malformed_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not valid = = toml").unwrap();
        let cfg = GuardConfig::load_from(&path);
        assert_eq!(cfg.cache_ttl_secs, 3);
    }

    #[test]
    fn load_from_valid_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "cache_ttl_secs = 42\nverbose = true\n").unwrap();
        let cfg = GuardConfig::load_from(&path);
        assert_eq!(cfg.cache_ttl_secs, 42);
        assert!(cfg.verbose);
    }

    #[test]
    fn decision_is_safe_helper() {
        assert!(Decision::Safe.is_safe());
        assert!(!Decision::Unknown.is_safe());
    }
}
