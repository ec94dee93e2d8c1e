//! doh-relay domain layer
pub mod config;
pub mod errors;
pub mod listen_protocol;

pub use config::{CliOverrides, Config, ConfigError, ProxyConfig};
pub use errors::DomainError;
pub use listen_protocol::ListenProtocol;
