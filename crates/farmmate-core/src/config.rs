//! Client configuration models.
//!
//! `ClientConfig` is stored as `config.toml` in the FarmMate config directory.
//! Every field has a default so a missing or partial file is valid.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{FarmmateError, Result};

/// Backend used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.farmmate.net";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_DELAY_MS: u64 = 1000;

/// Delay schedule between two attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backoff {
    /// Same delay before every retry.
    Fixed { delay_ms: u64 },
    /// `initial_ms * 2^(retry - 1)`, capped at `max_ms`.
    Exponential { initial_ms: u64, max_ms: u64 },
}

impl Backoff {
    /// Delay to wait before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        match self {
            Backoff::Fixed { delay_ms } => Duration::from_millis(*delay_ms),
            Backoff::Exponential { initial_ms, max_ms } => {
                let exponent = retry.saturating_sub(1).min(32);
                let factor = 1u64.checked_shl(exponent).unwrap_or(u64::MAX);
                let delay = initial_ms.saturating_mul(factor).min(*max_ms);
                Duration::from_millis(delay)
            }
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::Fixed {
            delay_ms: DEFAULT_DELAY_MS,
        }
    }
}

/// Retry policy shared by every backend call.
///
/// Only transient failures are retried: transport errors and the statuses
/// listed in `retryable_statuses`. Any other HTTP failure surfaces after the
/// first attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    pub backoff: Backoff,
    pub retryable_statuses: BTreeSet<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Backoff::default(),
            retryable_statuses: [408, 429, 500, 502, 503, 504].into_iter().collect(),
        }
    }
}

impl RetryPolicy {
    /// Policy used when loading a chat history (5 attempts, 1s apart).
    pub fn message_history() -> Self {
        Self {
            max_attempts: 5,
            ..Self::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Attempts actually made; a configured zero still sends the request once.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retryable_statuses.contains(&status)
    }
}

/// Top-level client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend base URL, fixed for the lifetime of the process.
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry: RetryPolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Applies `FARMMATE_*` overrides read through `lookup`.
    ///
    /// Recognised keys: `FARMMATE_BASE_URL`, `FARMMATE_MAX_ATTEMPTS`,
    /// `FARMMATE_RETRY_DELAY_MS`. Unparseable numbers are a config error.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("FARMMATE_BASE_URL") {
            self.base_url = url;
        }

        if let Some(raw) = lookup("FARMMATE_MAX_ATTEMPTS") {
            self.retry.max_attempts = raw.trim().parse().map_err(|_| {
                FarmmateError::config(format!("FARMMATE_MAX_ATTEMPTS is not a number: {raw}"))
            })?;
        }

        if let Some(raw) = lookup("FARMMATE_RETRY_DELAY_MS") {
            let delay_ms = raw.trim().parse().map_err(|_| {
                FarmmateError::config(format!("FARMMATE_RETRY_DELAY_MS is not a number: {raw}"))
            })?;
            self.retry.backoff = Backoff::Fixed { delay_ms };
        }

        Ok(())
    }

    /// Checks the values a request cannot work without.
    pub fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(FarmmateError::config(format!(
                "base_url must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if self.retry.max_attempts == 0 {
            return Err(FarmmateError::config("retry.max_attempts must be at least 1"));
        }
        if self.request_timeout_secs == 0 {
            return Err(FarmmateError::config("request_timeout_secs must be at least 1"));
        }
        Ok(())
    }

    /// Base URL without a trailing slash.
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert!(policy.is_retryable_status(503));
        assert!(policy.is_retryable_status(429));
        assert!(!policy.is_retryable_status(400));
        assert!(!policy.is_retryable_status(404));
    }

    #[test]
    fn test_fixed_backoff_is_constant() {
        let backoff = Backoff::Fixed { delay_ms: 250 };
        assert_eq!(backoff.delay_for(1), Duration::from_millis(250));
        assert_eq!(backoff.delay_for(4), Duration::from_millis(250));
    }

    #[test]
    fn test_exponential_backoff_is_capped() {
        let backoff = Backoff::Exponential {
            initial_ms: 100,
            max_ms: 1000,
        };
        assert_eq!(backoff.delay_for(1), Duration::from_millis(100));
        assert_eq!(backoff.delay_for(2), Duration::from_millis(200));
        assert_eq!(backoff.delay_for(3), Duration::from_millis(400));
        assert_eq!(backoff.delay_for(5), Duration::from_millis(1000));
        assert_eq!(backoff.delay_for(80), Duration::from_millis(1000));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            base_url = "http://localhost:8000"

            [retry]
            max_attempts = 7

            [retry.backoff]
            kind = "exponential"
            initial_ms = 50
            max_ms = 800
            "#,
        )
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.retry.max_attempts, 7);
        assert_eq!(
            config.retry.backoff,
            Backoff::Exponential {
                initial_ms: 50,
                max_ms: 800
            }
        );
        assert!(config.retry.is_retryable_status(500));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("FARMMATE_BASE_URL", "http://127.0.0.1:9000"),
            ("FARMMATE_MAX_ATTEMPTS", "4"),
            ("FARMMATE_RETRY_DELAY_MS", "10"),
        ]
        .into_iter()
        .collect();

        let mut config = ClientConfig::default();
        config
            .apply_env_with(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.retry.max_attempts, 4);
        assert_eq!(config.retry.backoff, Backoff::Fixed { delay_ms: 10 });
    }

    #[test]
    fn test_env_override_rejects_garbage() {
        let mut config = ClientConfig::default();
        let result = config.apply_env_with(|key| {
            (key == "FARMMATE_MAX_ATTEMPTS").then(|| "many".to_string())
        });
        assert!(matches!(result, Err(FarmmateError::Config(_))));
    }

    #[test]
    fn test_validate() {
        assert!(ClientConfig::default().validate().is_ok());

        let bad_url = ClientConfig {
            base_url: "ftp://example".into(),
            ..ClientConfig::default()
        };
        assert!(bad_url.validate().is_err());

        let mut zero_attempts = ClientConfig::default();
        zero_attempts.retry.max_attempts = 0;
        assert!(zero_attempts.validate().is_err());

        let zero_timeout = ClientConfig {
            request_timeout_secs: 0,
            ..ClientConfig::default()
        };
        let err = zero_timeout.validate().unwrap_err();
        assert!(err.to_string().contains("request_timeout_secs"));
    }

    #[test]
    fn test_normalized_base_url() {
        let config = ClientConfig {
            base_url: "https://api.farmmate.net/".into(),
            ..ClientConfig::default()
        };
        assert_eq!(config.normalized_base_url(), "https://api.farmmate.net");
    }
}
