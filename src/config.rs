// Configuration loading and parsing (config/raceday.toml).
//
// The config file is optional: a missing file yields the compiled-in
// defaults so the client runs out of the box against a local race service.
// A present-but-broken file is an error, never silently ignored.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Default location of the config file, relative to the working directory.
pub const CONFIG_PATH: &str = "config/raceday.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub ui: UiConfig,
}

/// The `[server]` table: where the race service lives.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
}

/// The `[ui]` table: render loop tuning.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub render_tick_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            base_url: "http://localhost:3001".to_string(),
            request_timeout_ms: 5_000,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig { render_tick_ms: 33 }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl UiConfig {
    pub fn render_tick(&self) -> Duration {
        Duration::from_millis(self.render_tick_ms)
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load configuration from `config/raceday.toml` under the working
/// directory, falling back to defaults when the file does not exist.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(Path::new(CONFIG_PATH))
}

/// Lower-level loading primitive taking an explicit path.
pub(crate) fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        let config = Config::default();
        validate(&config)?;
        return Ok(config);
    }

    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    let url = config.server.base_url.trim();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::ValidationError {
            field: "server.base_url".to_string(),
            message: format!("expected an http(s) URL, got `{url}`"),
        });
    }
    if config.server.request_timeout_ms == 0 {
        return Err(ConfigError::ValidationError {
            field: "server.request_timeout_ms".to_string(),
            message: "timeout must be positive".to_string(),
        });
    }
    if config.ui.render_tick_ms == 0 {
        return Err(ConfigError::ValidationError {
            field: "ui.render_tick_ms".to_string(),
            message: "render tick must be positive".to_string(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
