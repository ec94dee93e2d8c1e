use serde::{Deserialize, Serialize};
use std::fmt;

/// Client-facing transport a listener accepts DNS queries on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListenProtocol {
    Tcp,
    Udp,
}

impl ListenProtocol {
    pub const ALL: [ListenProtocol; 2] = [ListenProtocol::Tcp, ListenProtocol::Udp];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "TCP",
            Self::Udp => "UDP",
        }
    }

    /// Resolves the `--tcp` / `--udp` switches. Neither switch means both transports.
    pub fn from_flags(tcp: bool, udp: bool) -> Vec<ListenProtocol> {
        let mut protocols = Vec::with_capacity(2);
        if tcp {
            protocols.push(Self::Tcp);
        }
        if udp {
            protocols.push(Self::Udp);
        }
        if protocols.is_empty() {
            protocols.extend(Self::ALL);
        }
        protocols
    }
}

impl fmt::Display for ListenProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
