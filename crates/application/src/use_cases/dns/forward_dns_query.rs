use super::first_success::first_success;
use crate::ports::DohUpstream;
use bytes::Bytes;
use doh_relay_domain::{DomainError, ProxyConfig};
use hickory_proto::op::Message;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Answer produced by the forwarder, tagged with the upstream that served it.
#[derive(Debug, Clone)]
pub struct ForwardedResponse {
    pub message: Message,
    pub upstream: String,
}

/// Forwards one DNS query to the configured DoH upstreams in priority order.
///
/// Each upstream gets exactly one attempt per query. The first attempt that
/// completes with HTTP 200 wins and no later upstream is contacted.
pub struct ForwardDnsQueryUseCase {
    upstream: Arc<dyn DohUpstream>,
    upstream_urls: Arc<[String]>,
    log_requests: bool,
}

impl ForwardDnsQueryUseCase {
    pub fn new(upstream: Arc<dyn DohUpstream>, config: &ProxyConfig) -> Self {
        Self {
            upstream,
            upstream_urls: Arc::from(config.upstream_urls()),
            log_requests: config.log_requests(),
        }
    }

    pub fn upstream_urls(&self) -> &[String] {
        &self.upstream_urls
    }

    pub async fn execute(&self, query: &Message) -> Result<ForwardedResponse, DomainError> {
        let query_bytes = query.to_vec().map_err(|e| {
            let err = DomainError::Codec(format!("Failed to pack DNS request: {}", e));
            self.report_failure(&err);
            err
        })?;

        let accepted = first_success(self.upstream_urls.iter(), |url| {
            self.try_upstream(url.as_str(), &query_bytes)
        })
        .await;

        let Some((upstream, body)) = accepted else {
            let err = DomainError::AllUpstreamsFailed {
                attempted: self.upstream_urls.len(),
            };
            self.report_failure(&err);
            return Err(err);
        };

        let message = Message::from_vec(&body).map_err(|e| {
            let err = DomainError::Codec(format!(
                "Failed to unpack DNS response from {}: {}",
                upstream, e
            ));
            self.report_failure(&err);
            err
        })?;

        if self.log_requests {
            info!(upstream = %upstream, id = message.id(), "Successfully proxied request");
        }

        Ok(ForwardedResponse {
            message,
            upstream: upstream.to_string(),
        })
    }

    async fn try_upstream<'u>(
        &self,
        url: &'u str,
        query_bytes: &[u8],
    ) -> Result<(&'u str, Bytes), DomainError> {
        let reply = match self.upstream.send(url, query_bytes).await {
            Ok(reply) => reply,
            Err(e) => {
                self.report_attempt_failure(&e);
                return Err(e);
            }
        };

        if !reply.is_ok() {
            let err = DomainError::UpstreamStatus {
                url: url.to_string(),
                status: reply.status,
            };
            self.report_attempt_failure(&err);
            return Err(err);
        }

        Ok((url, reply.body))
    }

    fn report_attempt_failure(&self, error: &DomainError) {
        if self.log_requests {
            debug!(error = %error, "Upstream attempt failed, trying next");
        }
    }

    fn report_failure(&self, error: &DomainError) {
        if self.log_requests {
            warn!(error = %error, "Failed to proxy request");
        }
    }
}
