//! Application configuration, loaded from TOML or the environment.
//!
//! ```toml
//! light_id = "2"
//!
//! [gateway]
//! base_url = "http://192.168.178.29/api"
//! application_key = "..."
//! timeout_secs = 5
//!
//! [search]
//! case_sensitive = true
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::LightClient;
use crate::error::ConfigError;
use crate::filter::CaseSensitivity;
use crate::transport::UreqTransport;

pub const ENV_GATEWAY_URL: &str = "LIGHT_GATEWAY_URL";
pub const ENV_GATEWAY_KEY: &str = "LIGHT_GATEWAY_KEY";
pub const ENV_GATEWAY_TIMEOUT: &str = "LIGHT_GATEWAY_TIMEOUT_SECS";
pub const ENV_LIGHT_ID: &str = "LIGHT_ID";
pub const ENV_CASE_SENSITIVE: &str = "SEARCH_CASE_SENSITIVE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub base_url: String,
    #[serde(default)]
    pub application_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl GatewayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn client(&self) -> LightClient {
        let client = LightClient::new(&self.base_url);
        match &self.application_key {
            Some(key) => client.with_application_key(key.clone()),
            None => client,
        }
    }

    pub fn transport(&self) -> UreqTransport {
        UreqTransport::new(self.timeout())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_true")]
    pub case_sensitive: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { case_sensitive: true }
    }
}

impl SearchConfig {
    pub fn case(&self) -> CaseSensitivity {
        if self.case_sensitive {
            CaseSensitivity::Sensitive
        } else {
            CaseSensitivity::Insensitive
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub search: SearchConfig,
    /// The light bound to the toggle button.
    #[serde(default = "default_light_id")]
    pub light_id: String,
}

impl AppConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        if config.gateway.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "gateway.timeout_secs",
                value: "0".to_string(),
            });
        }
        Ok(config)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build a config from a variable lookup; `from_env` passes the process
    /// environment.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(ENV_GATEWAY_URL).ok_or(ConfigError::Missing(ENV_GATEWAY_URL))?;
        let timeout_secs = match lookup(ENV_GATEWAY_TIMEOUT) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: ENV_GATEWAY_TIMEOUT,
                        value: raw,
                    })
                }
            },
            None => default_timeout_secs(),
        };
        let case_sensitive = match lookup(ENV_CASE_SENSITIVE) {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid {
                key: ENV_CASE_SENSITIVE,
                value: raw,
            })?,
            None => true,
        };

        let config = Self {
            gateway: GatewayConfig {
                base_url,
                application_key: lookup(ENV_GATEWAY_KEY).filter(|k| !k.is_empty()),
                timeout_secs,
            },
            search: SearchConfig { case_sensitive },
            light_id: lookup(ENV_LIGHT_ID).unwrap_or_else(default_light_id),
        };
        debug!(base_url = %config.gateway.base_url, light_id = %config.light_id, "loaded config from environment");
        Ok(config)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

fn default_light_id() -> String {
    "2".to_string()
}
