use serde::{Deserialize, Serialize};

use crate::ListenProtocol;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    /// Kept as a string so service names and numeric ports both pass through to the resolver.
    #[serde(default = "default_port")]
    pub port: String,

    #[serde(default = "default_protocols")]
    pub protocols: Vec<ListenProtocol>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            port: default_port(),
            protocols: default_protocols(),
        }
    }
}

fn default_listen_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> String {
    "53".to_string()
}

fn default_protocols() -> Vec<ListenProtocol> {
    ListenProtocol::ALL.to_vec()
}
