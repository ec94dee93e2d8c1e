use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// DoH endpoints in priority order.
    #[serde(default)]
    pub urls: Vec<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_query_timeout")]
    pub query_timeout: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            query_timeout: default_query_timeout(),
        }
    }
}

fn default_query_timeout() -> u64 {
    5
}
