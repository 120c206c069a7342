//! Board Configuration
//!
//! JSON configuration handed to the client by its host page.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Push-channel reconnect policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackoffConfig {
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Consecutive failures tolerated before giving up; `None` retries forever
    pub max_attempts: Option<u32>,
    /// Fraction of each delay that is randomized, in `[0, 1]`
    pub jitter: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 500,
            max_delay_ms: 30_000,
            max_attempts: Some(10),
            jitter: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardConfig {
    pub board_id: String,
    /// WebSocket endpoint of the push channel
    pub realtime_url: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub backoff: BackoffConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl BoardConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: BoardConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_id.trim().is_empty() {
            return Err(ConfigError::Invalid("boardId is empty".to_string()));
        }
        if self.realtime_url.trim().is_empty() {
            return Err(ConfigError::Invalid("realtimeUrl is empty".to_string()));
        }
        if self.backoff.base_delay_ms > self.backoff.max_delay_ms {
            return Err(ConfigError::Invalid(format!(
                "backoff baseDelayMs ({}) exceeds maxDelayMs ({})",
                self.backoff.base_delay_ms, self.backoff.max_delay_ms
            )));
        }
        if !(0.0..=1.0).contains(&self.backoff.jitter) {
            return Err(ConfigError::Invalid(format!(
                "backoff jitter {} is outside [0, 1]",
                self.backoff.jitter
            )));
        }
        Ok(())
    }

    /// `log_level` as a filter; unknown names fall back to `Info`
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}
