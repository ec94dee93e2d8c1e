use std::time::Duration;

use super::errors::ConfigError;
use crate::ListenProtocol;

pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Immutable runtime snapshot handed to the forwarder and the listeners.
///
/// Construction guarantees at least one upstream URL and at least one
/// listen protocol, so nothing downstream has to re-check either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    listen_address: String,
    port: String,
    upstream_urls: Vec<String>,
    protocols: Vec<ListenProtocol>,
    log_requests: bool,
    query_timeout: Duration,
}

impl ProxyConfig {
    pub fn new(
        listen_address: impl Into<String>,
        port: impl Into<String>,
        upstream_urls: Vec<String>,
        protocols: Vec<ListenProtocol>,
        log_requests: bool,
    ) -> Result<Self, ConfigError> {
        let upstream_urls: Vec<String> = upstream_urls
            .into_iter()
            .map(|url| url.trim().to_string())
            .collect();

        if upstream_urls.is_empty() {
            return Err(ConfigError::Validation(
                "No upstream DoH servers configured".to_string(),
            ));
        }
        if upstream_urls.iter().any(|url| url.is_empty()) {
            return Err(ConfigError::Validation(
                "Upstream DoH server URL cannot be empty".to_string(),
            ));
        }

        let mut protocols = protocols;
        protocols.sort();
        protocols.dedup();
        if protocols.is_empty() {
            return Err(ConfigError::Validation(
                "At least one listen protocol must be enabled".to_string(),
            ));
        }

        let port = port.into();
        if port.trim().is_empty() {
            return Err(ConfigError::Validation("Port cannot be empty".to_string()));
        }

        Ok(Self {
            listen_address: listen_address.into(),
            port,
            upstream_urls,
            protocols,
            log_requests,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        })
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn upstream_urls(&self) -> &[String] {
        &self.upstream_urls
    }

    pub fn protocols(&self) -> &[ListenProtocol] {
        &self.protocols
    }

    pub fn is_enabled(&self, protocol: ListenProtocol) -> bool {
        self.protocols.contains(&protocol)
    }

    pub fn log_requests(&self) -> bool {
        self.log_requests
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    /// `host:port`, with IPv6 literals bracketed.
    pub fn bind_address(&self) -> String {
        let host = self.listen_address.as_str();
        if host.contains(':') && !host.starts_with('[') {
            format!("[{}]:{}", host, self.port)
        } else {
            format!("{}:{}", host, self.port)
        }
    }
}
