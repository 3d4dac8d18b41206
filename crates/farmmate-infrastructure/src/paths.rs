//! Path management for FarmMate's local files.

use std::path::{Path, PathBuf};

/// Environment variable that relocates every local file.
pub const HOME_ENV: &str = "FARMMATE_HOME";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Neither an override nor a platform config directory is available.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for farmmate_core::FarmmateError {
    fn from(err: PathError) -> Self {
        farmmate_core::FarmmateError::config(err.to_string())
    }
}

/// Locations of FarmMate's local files.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/farmmate/          # Config directory (or $FARMMATE_HOME)
/// ├── config.toml              # Client configuration
/// ├── local_storage.json       # Member id, crop catalog, selected crop
/// └── logs/                    # Log files
///     └── farmmate.log.YYYY-MM-DD
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FarmmatePaths {
    root: PathBuf,
}

impl FarmmatePaths {
    /// Uses `root` as the config directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves the config directory: an explicit override, then
    /// `$FARMMATE_HOME`, then the platform config directory.
    pub fn resolve(override_dir: Option<&Path>) -> Result<Self, PathError> {
        Self::resolve_with(override_dir, |key| std::env::var(key).ok())
    }

    /// Like [`FarmmatePaths::resolve`] with an injectable environment lookup.
    pub fn resolve_with<F>(override_dir: Option<&Path>, lookup: F) -> Result<Self, PathError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = override_dir {
            return Ok(Self::new(dir));
        }
        if let Some(dir) = lookup(HOME_ENV).filter(|dir| !dir.trim().is_empty()) {
            return Ok(Self::new(dir));
        }
        dirs::config_dir()
            .map(|dir| Self::new(dir.join("farmmate")))
            .ok_or(PathError::ConfigDirNotFound)
    }

    pub fn config_dir(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    /// The persisted client state document.
    pub fn cache_file(&self) -> PathBuf {
        self.root.join("local_storage.json")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }
}
