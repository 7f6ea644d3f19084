//! Application configuration module
//!
//! Provides the configuration for the admin client: where the REST API
//! lives, how long a request may take, and where the session token is
//! persisted.
//!
//! Values are layered, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. an optional TOML file (`STUDIO_ADMIN_CONFIG`, or
//!    `<config dir>/studio-admin/config.toml`)
//! 3. environment variables (`STUDIO_ADMIN_API_URL`,
//!    `STUDIO_ADMIN_TIMEOUT_SECS`, `STUDIO_ADMIN_TOKEN_PATH`)

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

/// Default API base URL
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub const ENV_API_URL: &str = "STUDIO_ADMIN_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "STUDIO_ADMIN_TIMEOUT_SECS";
pub const ENV_TOKEN_PATH: &str = "STUDIO_ADMIN_TOKEN_PATH";
pub const ENV_CONFIG_FILE: &str = "STUDIO_ADMIN_CONFIG";

const APP_DIR: &str = "studio-admin";
const TOKEN_FILE: &str = "admin_token";
const CONFIG_FILE: &str = "config.toml";

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL every request path is joined onto
    pub api_base_url: Url,
    /// Transport timeout applied to every request
    pub request_timeout: Duration,
    /// Explicit token file location
    pub token_path: Option<PathBuf>,
    /// `User-Agent` header sent with every request
    pub user_agent: String,
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Load configuration from the config file and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let file = std::env::var(ENV_CONFIG_FILE)
            .ok()
            .map(PathBuf::from)
            .or_else(default_config_file);
        Self::from_sources(file.as_deref(), |key| std::env::var(key).ok())
    }

    /// Build configuration from an optional TOML file and an environment lookup.
    ///
    /// A missing file is not an error; an unreadable or malformed one is.
    pub fn from_sources<F>(file: Option<&Path>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();
        if let Some(path) = file {
            if let Some(file_config) = FileConfig::read(path)? {
                builder = builder.merge_file(file_config);
            }
        }
        builder.merge_env(env)?.build()
    }

    /// Token file location: explicit, or the platform default.
    pub fn token_path(&self) -> Option<PathBuf> {
        self.token_path.clone().or_else(default_token_path)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.api_base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(self.api_base_url.to_string()));
        }
        if self.api_base_url.cannot_be_a_base() || self.api_base_url.host().is_none() {
            return Err(ConfigError::InvalidUrl(self.api_base_url.to_string()));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "request_timeout",
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    api_base_url: Option<String>,
    request_timeout: Option<Duration>,
    token_path: Option<PathBuf>,
    user_agent: Option<String>,
}

impl AppConfigBuilder {
    /// Set the API base URL
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the token file location
    pub fn token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = Some(path.into());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    fn merge_file(mut self, file: FileConfig) -> Self {
        if let Some(url) = file.api_base_url {
            self.api_base_url = Some(url);
        }
        if let Some(secs) = file.request_timeout_secs {
            self.request_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(path) = file.token_path {
            self.token_path = Some(path);
        }
        if let Some(user_agent) = file.user_agent {
            self.user_agent = Some(user_agent);
        }
        self
    }

    fn merge_env<F>(mut self, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = env(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = Some(url.trim().to_string());
        }
        if let Some(raw) = env(ENV_TIMEOUT_SECS).filter(|v| !v.trim().is_empty()) {
            let secs = raw.trim().parse::<u64>().map_err(|e| ConfigError::InvalidValue {
                key: ENV_TIMEOUT_SECS,
                message: e.to_string(),
            })?;
            self.request_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(path) = env(ENV_TOKEN_PATH).filter(|v| !v.trim().is_empty()) {
            self.token_path = Some(PathBuf::from(path));
        }
        Ok(self)
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let raw_url = self.api_base_url.as_deref().unwrap_or(DEFAULT_API_URL);
        let api_base_url =
            Url::parse(raw_url).map_err(|_| ConfigError::InvalidUrl(raw_url.to_string()))?;

        let config = AppConfig {
            api_base_url,
            request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            token_path: self.token_path,
            user_agent: self.user_agent.unwrap_or_else(default_user_agent),
        };
        config.validate()?;
        Ok(config)
    }
}

/// On-disk shape of `config.toml`
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    api_base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    token_path: Option<PathBuf>,
    user_agent: Option<String>,
}

impl FileConfig {
    fn read(path: &Path) -> Result<Option<Self>, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        toml::from_str(&raw)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }
}

fn default_user_agent() -> String {
    format!("studio-admin/{}", env!("CARGO_PKG_VERSION"))
}

fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// Platform default location of the persisted token.
pub fn default_token_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(TOKEN_FILE))
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
