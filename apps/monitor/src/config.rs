use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use shared::protocol::DATA_PATH;
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "monitor.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub data_path: String,
    pub period_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:80".into(),
            data_path: DATA_PATH.into(),
            period_ms: poller_core::DEFAULT_POLL_PERIOD.as_millis() as u64,
            request_timeout_ms: poller_core::DEFAULT_REQUEST_TIMEOUT.as_millis() as u64,
        }
    }
}

impl Settings {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    data_path: Option<String>,
    period_ms: Option<u64>,
    request_timeout_ms: Option<u64>,
}

/// Defaults, overlaid by the config file (if present), then the environment.
pub fn load_settings(config_path: &Path) -> anyhow::Result<Settings> {
    load_settings_with_env(config_path, |key| std::env::var(key).ok())
}

fn load_settings_with_env(
    config_path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if config_path.exists() {
        let raw = fs::read_to_string(config_path)
            .with_context(|| format!("failed to read config '{}'", config_path.display()))?;
        let file_cfg: FileSettings = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config '{}'", config_path.display()))?;
        if let Some(v) = file_cfg.server_url {
            settings.server_url = v;
        }
        if let Some(v) = file_cfg.data_path {
            settings.data_path = v;
        }
        if let Some(v) = file_cfg.period_ms {
            settings.period_ms = v;
        }
        if let Some(v) = file_cfg.request_timeout_ms {
            settings.request_timeout_ms = v;
        }
    }

    if let Some(v) = env("MONITOR_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = env("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = env("MONITOR_DATA_PATH") {
        settings.data_path = v;
    }

    if let Some(v) = env("MONITOR_PERIOD_MS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.period_ms = parsed,
            Err(_) => warn!(value = %v, "ignoring invalid MONITOR_PERIOD_MS"),
        }
    }
    if let Some(v) = env("MONITOR_TIMEOUT_MS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.request_timeout_ms = parsed,
            Err(_) => warn!(value = %v, "ignoring invalid MONITOR_TIMEOUT_MS"),
        }
    }

    validate(&settings)?;
    Ok(settings)
}

pub fn validate(settings: &Settings) -> anyhow::Result<()> {
    anyhow::ensure!(settings.period_ms > 0, "poll period must be at least 1 ms");
    anyhow::ensure!(
        settings.request_timeout_ms > 0,
        "request timeout must be at least 1 ms"
    );
    anyhow::ensure!(
        settings.data_path.starts_with('/'),
        "data path '{}' must start with '/'",
        settings.data_path
    );
    Ok(())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
