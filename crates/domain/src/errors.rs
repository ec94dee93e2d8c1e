use thiserror::Error;

use crate::ListenProtocol;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("DNS codec error: {0}")]
    Codec(String),

    #[error("DoH request to {url} failed: {reason}")]
    Upstream { url: String, reason: String },

    #[error("DoH server {url} returned HTTP {status}")]
    UpstreamStatus { url: String, status: u16 },

    #[error("All {attempted} upstream DoH servers failed")]
    AllUpstreamsFailed { attempted: usize },

    #[error("Failed to bind {protocol} listener on {address}: {reason}")]
    Bind {
        protocol: ListenProtocol,
        address: String,
        reason: String,
    },

    #[error("Listener error: {0}")]
    Listener(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
