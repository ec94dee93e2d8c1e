use async_trait::async_trait;
use bytes::Bytes;
use doh_relay_domain::DomainError;

/// Raw outcome of one HTTP exchange with an upstream DoH server.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: Bytes,
}

impl UpstreamReply {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Port for sending a packed DNS message to a single DoH endpoint.
///
/// Implementations must be safe to share across every in-flight request and
/// must report timeouts and transport failures as `Err`, never panic.
#[async_trait]
pub trait DohUpstream: Send + Sync {
    async fn send(&self, url: &str, query: &[u8]) -> Result<UpstreamReply, DomainError>;
}
