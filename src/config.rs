//! Configuration module
//!
//! TOML file, default location `~/.config/oicp-cpo/config.toml`:
//!
//! ```toml
//! [hub]
//! hostname = "service.hubject.com"
//! port = 443
//! request_timeout_secs = 60
//!
//! [operator]
//! operator_id = "DE*ABC"
//! operator_name = "ABC Charging"
//!
//! [logging]
//! level = "info"
//! format = "text"   # or "json"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::invoker::{default_user_agent, HubEndpoint, ServicePaths, DEFAULT_PORT};
use crate::domain::OperatorId;
use crate::support::errors::{ArgumentError, ConfigError};

pub const DEFAULT_HUB_HOSTNAME: &str = "service.hubject.com";

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AppConfig {
    #[validate(nested)]
    pub hub: HubConfig,
    pub operator: OperatorConfig,
    #[validate(nested)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct HubConfig {
    #[validate(length(min = 1, message = "hostname is required"))]
    pub hostname: String,
    /// Host the requests address; defaults to `hostname`.
    pub virtual_host: Option<String>,
    #[validate(range(min = 1, message = "port must be ≥ 1"))]
    pub port: u16,
    pub use_tls: bool,
    #[validate(length(min = 1, message = "user_agent must not be empty"))]
    pub user_agent: String,
    #[validate(range(min = 1, message = "request_timeout_secs must be ≥ 1"))]
    pub request_timeout_secs: u64,
    pub evse_data_path: String,
    pub evse_status_path: String,
    pub authorization_path: String,
    pub authentication_data_path: String,
}

impl Default for HubConfig {
    fn default() -> Self {
        let paths = ServicePaths::default();
        Self {
            hostname: DEFAULT_HUB_HOSTNAME.to_string(),
            virtual_host: None,
            port: DEFAULT_PORT,
            use_tls: true,
            user_agent: default_user_agent(),
            request_timeout_secs: 60,
            evse_data_path: paths.evse_data,
            evse_status_path: paths.evse_status,
            authorization_path: paths.authorization,
            authentication_data_path: paths.authentication_data,
        }
    }
}

impl HubConfig {
    pub fn endpoint(&self) -> HubEndpoint {
        HubEndpoint {
            hostname: self.hostname.clone(),
            virtual_host: self
                .virtual_host
                .clone()
                .unwrap_or_else(|| self.hostname.clone()),
            port: self.port,
            use_tls: self.use_tls,
            user_agent: self.user_agent.clone(),
            default_timeout: Duration::from_secs(self.request_timeout_secs),
            paths: ServicePaths {
                evse_data: self.evse_data_path.clone(),
                evse_status: self.evse_status_path.clone(),
                authorization: self.authorization_path.clone(),
                authentication_data: self.authentication_data_path.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorConfig {
    pub operator_id: Option<String>,
    pub operator_name: Option<String>,
}

impl OperatorConfig {
    pub fn operator_id(&self) -> Result<OperatorId, ArgumentError> {
        match &self.operator_id {
            Some(id) => OperatorId::new(id.as_str()),
            None => Err(ArgumentError::Missing("operator.operator_id")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingConfig {
    #[validate(length(min = 1, message = "level must not be empty"))]
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl AppConfig {
    /// Load and validate the file at `path`. A missing file yields the
    /// defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => return Err(e.into()),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// `~/.config/oicp-cpo/config.toml`, or `./config.toml` when the platform
/// has no config directory.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join("oicp-cpo"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("config.toml")
}
