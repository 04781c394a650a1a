use std::env;
use std::time::Duration;

use url::Url;

use super::env::{AppConfig, ConfigError, DirectoryConfig, LoggingConfig, PollConfig};

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_env()
}

impl AppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        // The poll target is read exactly once; it never changes afterwards.
        let raw_url = env::var("STATE_URL").map_err(|_| ConfigError::Missing("STATE_URL"))?;
        let state_url = Url::parse(raw_url.trim()).map_err(|err| ConfigError::Invalid {
            key: "STATE_URL",
            reason: err.to_string(),
        })?;
        if !matches!(state_url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                key: "STATE_URL",
                reason: format!("unsupported scheme '{}'", state_url.scheme()),
            });
        }

        let poll = PollConfig {
            interval: Duration::from_millis(
                env::var("POLL_INTERVAL_MS")
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(5_000),
            ),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        };

        let directories = DirectoryConfig {
            logs_dir: env::var("LOGS_DIR").unwrap_or_else(|_| "logs".to_string()),
        };

        Ok(Self {
            state_url,
            poll,
            logging,
            directories,
        })
    }
}
