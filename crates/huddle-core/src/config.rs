//! Synchronization configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Timing knobs for the subscription channel's retry policy.
///
/// The defaults encode the production policy: retry after
/// `min(retry_base * 2^attempt, retry_cap)`, at most `max_retries`
/// automatic attempts before the channel parks in its terminal error
/// state. Tests shrink these to keep the clock short.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Base delay before the first automatic reconnect, in milliseconds
    pub retry_base_ms: u64,
    /// Upper bound on a single backoff delay, in milliseconds
    pub retry_cap_ms: u64,
    /// Automatic reconnect attempts before requiring an explicit retry
    pub max_retries: u32,
    /// Capacity of the parsed-event queue between channel and applier
    pub event_queue_size: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            retry_base_ms: 1_000,
            retry_cap_ms: 10_000,
            max_retries: 3,
            event_queue_size: 64,
        }
    }
}

impl SyncConfig {
    /// Parses a configuration from a TOML document, filling absent keys
    /// with the defaults.
    ///
    /// # Errors
    ///
    /// Returns a serialization error when the document is not valid TOML
    /// or a key has the wrong type.
    pub fn from_toml_str(document: &str) -> Result<Self> {
        Ok(toml::from_str(document)?)
    }

    /// Backoff delay for the given zero-based attempt number.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = self
            .retry_base_ms
            .saturating_mul(2u64.saturating_pow(attempt));
        Duration::from_millis(exp.min(self.retry_cap_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backoff_sequence() {
        let config = SyncConfig::default();

        assert_eq!(config.backoff_delay(0), Duration::from_millis(1_000));
        assert_eq!(config.backoff_delay(1), Duration::from_millis(2_000));
        assert_eq!(config.backoff_delay(2), Duration::from_millis(4_000));
        // Capped at 10s from the fourth attempt onwards.
        assert_eq!(config.backoff_delay(4), Duration::from_millis(10_000));
        assert_eq!(config.backoff_delay(63), Duration::from_millis(10_000));
    }

    #[test]
    fn test_from_toml_str_fills_defaults() {
        let config = SyncConfig::from_toml_str("retry_cap_ms = 5000\n").unwrap();

        assert_eq!(config.retry_cap_ms, 5_000);
        assert_eq!(config.retry_base_ms, 1_000);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_from_toml_str_rejects_wrong_types() {
        assert!(SyncConfig::from_toml_str("max_retries = \"three\"\n").is_err());
    }

    #[test]
    fn test_from_toml_file_roundtrip() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "retry_base_ms = 250\nmax_retries = 1\n").unwrap();

        let document = std::fs::read_to_string(file.path()).unwrap();
        let config = SyncConfig::from_toml_str(&document).unwrap();

        assert_eq!(config.retry_base_ms, 250);
        assert_eq!(config.max_retries, 1);
    }
}
