//! HTTPS transport for upstream DNS queries (DNS-over-HTTPS, RFC 8484)
//!
//! Sends DNS queries as HTTP POST requests with `application/dns-message` content type.
//! The request body is the raw DNS wire format message, and the response body
//! contains the raw DNS wire format response.
//!
//! Wire format (HTTP):
//! ```text
//! POST /dns-query HTTP/2
//! Content-Type: application/dns-message
//! Accept: application/dns-message
//!
//! <raw DNS message bytes>
//! ```
//!
//! HTTP/2 is negotiated through ALPN; upstreams that only speak HTTP/1.1 are
//! served over HTTP/1.1 by the same client.

use async_trait::async_trait;
use doh_relay_application::ports::{DohUpstream, UpstreamReply};
use doh_relay_domain::DomainError;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::time::Duration;
use tracing::debug;

/// Default per-request timeout, covering connect, send and body read.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Expected content type for DNS-over-HTTPS messages (RFC 8484 §6)
const DNS_MESSAGE_CONTENT_TYPE: &str = "application/dns-message";

/// Shared DoH client. Cloning is cheap and every clone uses the same connection pool.
#[derive(Debug, Clone)]
pub struct HttpsUpstreamClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpsUpstreamClient {
    pub fn new() -> Result<Self, DomainError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| DomainError::ConfigError(format!("Failed to build DoH client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn transport_error(&self, url: &str, error: reqwest::Error) -> DomainError {
        let reason = if error.is_timeout() {
            format!("request timed out after {:?}", self.timeout)
        } else {
            error.to_string()
        };
        DomainError::Upstream {
            url: url.to_string(),
            reason,
        }
    }
}

#[async_trait]
impl DohUpstream for HttpsUpstreamClient {
    async fn send(&self, url: &str, query: &[u8]) -> Result<UpstreamReply, DomainError> {
        debug!(url = %url, message_len = query.len(), "Sending DoH query");

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, DNS_MESSAGE_CONTENT_TYPE)
            .header(ACCEPT, DNS_MESSAGE_CONTENT_TYPE)
            .body(query.to_vec())
            .send()
            .await
            .map_err(|e| self.transport_error(url, e))?;

        let status = response.status();
        let version = response.version();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(url, e))?;

        debug!(
            url = %url,
            status = status.as_u16(),
            version = ?version,
            response_len = body.len(),
            "DoH response received"
        );

        Ok(UpstreamReply::new(status.as_u16(), body))
    }
}
