//! Configuration service.
//!
//! Loads [`ClientConfig`] from `config.toml` in the FarmMate config
//! directory, applies `FARMMATE_*` environment overrides and caches the
//! result.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use farmmate_core::config::ClientConfig;
use farmmate_core::{FarmmateError, Result};

/// Loads and caches the client configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    config: Arc<RwLock<Option<ClientConfig>>>,
}

impl ConfigService {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// The configuration, read from disk and the process environment on
    /// first access.
    pub fn get_config(&self) -> Result<ClientConfig> {
        self.get_config_with(|key| std::env::var(key).ok())
    }

    /// Like [`ConfigService::get_config`] with an injectable environment lookup.
    pub fn get_config_with<F>(&self, lookup: F) -> Result<ClientConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        {
            let read_lock = self.config.read().unwrap_or_else(|p| p.into_inner());
            if let Some(cached) = read_lock.as_ref() {
                return Ok(cached.clone());
            }
        }

        let mut loaded = self.load_file()?;
        loaded.apply_env_with(lookup)?;
        loaded.validate()?;

        tracing::debug!(
            base_url = %loaded.base_url,
            max_attempts = loaded.retry.max_attempts,
            "[ConfigService] Loaded configuration"
        );

        let mut write_lock = self.config.write().unwrap_or_else(|p| p.into_inner());
        *write_lock = Some(loaded.clone());
        Ok(loaded)
    }

    /// Writes a config file with default values if none exists yet.
    ///
    /// Returns true when a file was created.
    pub fn ensure_config_file(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let template = toml::to_string_pretty(&ClientConfig::default())?;
        fs::write(&self.path, template)?;
        tracing::info!(path = %self.path.display(), "[ConfigService] Created default config");
        Ok(true)
    }

    fn load_file(&self) -> Result<ClientConfig> {
        if !self.path.exists() {
            return Ok(ClientConfig::default());
        }

        let content = fs::read_to_string(&self.path)?;
        toml::from_str(&content).map_err(|e| {
            FarmmateError::config(format!("{}: {}", self.path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farmmate_core::config::{Backoff, DEFAULT_BASE_URL};
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(temp_dir.path().join("config.toml"));

        let config = service.get_config_with(no_env).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn test_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
base_url = "http://localhost:8080"

[retry]
max_attempts = 5
backoff = { kind = "exponential", initial_ms = 200, max_ms = 2000 }
"#,
        )
        .unwrap();

        let config = ConfigService::new(path).get_config_with(no_env).unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(
            config.retry.backoff,
            Backoff::Exponential {
                initial_ms: 200,
                max_ms: 2000
            }
        );
        assert!(config.retry.is_retryable_status(503));
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_env_overrides_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "base_url = \"http://file\"\n").unwrap();

        let config = ConfigService::new(path)
            .get_config_with(|key| match key {
                "FARMMATE_BASE_URL" => Some("http://env".into()),
                "FARMMATE_RETRY_DELAY_MS" => Some("10".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.base_url, "http://env");
        assert_eq!(config.retry.backoff, Backoff::Fixed { delay_ms: 10 });
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "base_url = [").unwrap();

        let err = ConfigService::new(path).get_config_with(no_env).unwrap_err();
        assert!(matches!(err, FarmmateError::Config(_)));
    }

    #[test]
    fn test_config_is_cached_per_service() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let service = ConfigService::new(path.clone());
        assert_eq!(service.get_config_with(no_env).unwrap().base_url, DEFAULT_BASE_URL);

        fs::write(&path, "base_url = \"http://changed\"\n").unwrap();
        assert_eq!(service.get_config_with(no_env).unwrap().base_url, DEFAULT_BASE_URL);

        let fresh = ConfigService::new(path);
        assert_eq!(fresh.get_config_with(no_env).unwrap().base_url, "http://changed");
    }

    #[test]
    fn test_ensure_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/config.toml");
        let service = ConfigService::new(path.clone());

        assert!(service.ensure_config_file().unwrap());
        assert!(!service.ensure_config_file().unwrap());

        let written: ClientConfig = toml::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written, ClientConfig::default());
    }
}
