use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::proxy::ProxyConfig;
use super::server::ServerConfig;
use super::upstream::UpstreamConfig;
use crate::ListenProtocol;

const LOCAL_CONFIG_PATH: &str = "doh-relay.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/doh-relay/config.toml";

/// Main configuration structure for doh-relay
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Listener configuration (address, port, transports)
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream DoH servers
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. doh-relay.toml in current directory
    /// 3. /etc/doh-relay/config.toml
    /// 4. Default configuration
    ///
    /// Command-line overrides are applied on top of whichever source won.
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new(LOCAL_CONFIG_PATH).exists() {
            Self::from_file(LOCAL_CONFIG_PATH)?
        } else if std::path::Path::new(SYSTEM_CONFIG_PATH).exists() {
            Self::from_file(SYSTEM_CONFIG_PATH)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(address) = overrides.listen_address {
            self.server.listen_address = address;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(protocols) = overrides.protocols {
            self.server.protocols = protocols;
        }
        self.upstream.urls.extend(overrides.upstream_urls);
        if overrides.log_requests {
            self.logging.log_requests = true;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upstream.urls.is_empty() {
            return Err(ConfigError::Validation(
                "No upstream DoH servers configured".to_string(),
            ));
        }
        if self.server.protocols.is_empty() {
            return Err(ConfigError::Validation(
                "At least one listen protocol must be enabled".to_string(),
            ));
        }
        if self.upstream.query_timeout == 0 {
            return Err(ConfigError::Validation(
                "Query timeout cannot be 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_proxy_config(&self) -> Result<ProxyConfig, ConfigError> {
        self.validate()?;
        Ok(ProxyConfig::new(
            self.server.listen_address.clone(),
            self.server.port.clone(),
            self.upstream.urls.clone(),
            self.server.protocols.clone(),
            self.logging.log_requests,
        )?
        .with_query_timeout(Duration::from_secs(self.upstream.query_timeout)))
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub listen_address: Option<String>,
    pub port: Option<String>,
    /// Appended after any upstreams from the config file.
    pub upstream_urls: Vec<String>,
    /// Replaces the configured protocol list when set.
    pub protocols: Option<Vec<ListenProtocol>>,
    pub log_requests: bool,
    pub log_level: Option<String>,
}
