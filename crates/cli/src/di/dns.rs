use anyhow::Context;
use doh_relay_application::use_cases::ForwardDnsQueryUseCase;
use doh_relay_domain::ProxyConfig;
use doh_relay_infrastructure::dns::{DnsRequestHandler, HttpsUpstreamClient};
use std::sync::Arc;
use tracing::info;

pub struct DnsServices {
    pub forwarder: Arc<ForwardDnsQueryUseCase>,
    pub handler: DnsRequestHandler,
}

impl DnsServices {
    pub fn new(config: &ProxyConfig) -> anyhow::Result<Self> {
        let client = HttpsUpstreamClient::with_timeout(config.query_timeout())
            .context("Failed to build DoH client")?;
        info!(timeout = ?client.timeout(), "DoH client ready");

        let forwarder = Arc::new(ForwardDnsQueryUseCase::new(Arc::new(client), config));
        let handler = DnsRequestHandler::new(forwarder.clone());

        Ok(Self { forwarder, handler })
    }
}
