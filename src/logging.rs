//! Logging initialization.
//!
//! The engine logs through `tracing`; binaries and tests opt into output by
//! installing a subscriber here. `POKEMON_ARENA_LOG` overrides the configured
//! level with any `EnvFilter` directive.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "POKEMON_ARENA_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogFormat {
    #[default]
    Human,
    /// Newline-delimited JSON.
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Human,
        }
    }
}

/// Installs the global subscriber. Safe to call more than once.
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    match config.format {
        LogFormat::Human => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init();
        }
        LogFormat::Json => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_does_not_panic() {
        init_logging(&LogConfig::default());
        init_logging(&LogConfig {
            level: "debug".to_string(),
            format: LogFormat::Json,
        });
    }
}
