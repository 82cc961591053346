use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000/";
pub const SERVER_URL_ENV: &str = "RETROFILTER_SERVER_URL";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Default, Serialize, Deserialize)]
/// Persisted UI/application settings for retrofilter.
pub struct AppConfig {
    pub window_width: Option<f32>,
    pub window_height: Option<f32>,
    /// Directory the file picker opens in.
    pub browse_path: Option<PathBuf>,
    /// Directory the save dialog opens in.
    pub download_path: Option<PathBuf>,
    pub server_url: Option<String>,
    /// `0` disables the timeout.
    pub request_timeout_secs: Option<u64>,
    pub default_filter: Option<String>,
    pub last_category: Option<String>,
}

impl AppConfig {
    /// Returns the user config file path, if a config directory is available.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("retrofilter").join("config.toml"))
    }

    /// Loads config from disk, falling back to defaults on any error.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let Ok(contents) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        toml::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(path = %path.display(), %err, "ignoring unreadable config");
            Self::default()
        })
    }

    /// Writes config to disk, logging filesystem/serialization errors.
    pub fn save(&self) {
        let Some(path) = Self::config_path() else {
            return;
        };
        if let Err(err) = self.save_to(&path) {
            tracing::warn!(path = %path.display(), %err, "config not saved");
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        match self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

/// Parses a server URL, adding `http://` when no scheme is given.
pub fn parse_server_url(raw: &str) -> anyhow::Result<reqwest::Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        anyhow::bail!("server URL is empty");
    }
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    };
    let url = reqwest::Url::parse(&with_scheme)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => anyhow::bail!("unsupported URL scheme `{}`", other),
    }
}

/// Environment beats the config file; anything unparsable falls back to the
/// local default server.
pub fn resolve_server_url(config: &AppConfig, env_value: Option<&str>) -> reqwest::Url {
    for raw in [env_value, config.server_url.as_deref()].into_iter().flatten() {
        match parse_server_url(raw) {
            Ok(url) => return url,
            Err(err) => tracing::warn!(raw, %err, "ignoring server URL"),
        }
    }
    reqwest::Url::parse(DEFAULT_SERVER_URL).expect("default server URL is valid")
}
