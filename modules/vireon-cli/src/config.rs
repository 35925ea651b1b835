use std::time::Duration;

use anyhow::{Context, Result};

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub simulation_api_url: String,
    pub simulation_model: String,
    pub poll_interval: Duration,
}

/// Load `.env` into the process environment. Must run before logging is set
/// up so `RUST_LOG` and `LOG_FORMAT` can come from the file.
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// `LOG_FORMAT=json` switches log output to JSON lines.
pub fn json_logs(lookup: impl Fn(&str) -> Option<String>) -> bool {
    lookup("LOG_FORMAT").is_some_and(|v| v.trim().eq_ignore_ascii_case("json"))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let poll_ms: u64 = match lookup("SIMULATION_POLL_MS") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("SIMULATION_POLL_MS must be a number, got {raw:?}"))?,
            None => 1500,
        };

        let config = Self {
            simulation_api_url: lookup("SIMULATION_API_URL")
                .unwrap_or_else(|| "http://localhost:8000".to_string()),
            simulation_model: lookup("SIMULATION_MODEL")
                .unwrap_or_else(|| simulation_client::DEFAULT_MODEL.to_string()),
            poll_interval: Duration::from_millis(poll_ms.max(1)),
        };

        tracing::debug!(
            api_url = %config.simulation_api_url,
            model = %config.simulation_model,
            poll_ms,
            "Loaded config"
        );
        Ok(config)
    }
}
