use crate::dns::server::DnsRequestHandler;
use doh_relay_domain::{DomainError, ListenProtocol, ProxyConfig};
use hickory_server::ServerFuture;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, UdpSocket};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Idle timeout for a client TCP connection.
const TCP_CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Owns one bound socket per enabled transport and runs a server loop for each.
///
/// Binding and serving are split so that a bind failure surfaces before any
/// loop starts: the relay never runs with only part of its configured
/// transports.
pub struct ListenerSupervisor {
    handler: DnsRequestHandler,
    udp: Option<UdpSocket>,
    tcp: Option<TcpListener>,
}

impl ListenerSupervisor {
    pub async fn bind(
        config: &ProxyConfig,
        handler: DnsRequestHandler,
    ) -> Result<Self, DomainError> {
        let address = config.bind_address();

        let udp = if config.is_enabled(ListenProtocol::Udp) {
            let socket = UdpSocket::bind(&address)
                .await
                .map_err(|e| bind_error(ListenProtocol::Udp, &address, e))?;
            Some(socket)
        } else {
            None
        };

        let tcp = if config.is_enabled(ListenProtocol::Tcp) {
            let listener = TcpListener::bind(&address)
                .await
                .map_err(|e| bind_error(ListenProtocol::Tcp, &address, e))?;
            Some(listener)
        } else {
            None
        };

        Ok(Self { handler, udp, tcp })
    }

    pub fn local_addr(&self, protocol: ListenProtocol) -> Option<SocketAddr> {
        match protocol {
            ListenProtocol::Udp => self.udp.as_ref().and_then(|s| s.local_addr().ok()),
            ListenProtocol::Tcp => self.tcp.as_ref().and_then(|l| l.local_addr().ok()),
        }
    }

    /// Serves until `shutdown` is cancelled or one of the loops fails.
    ///
    /// A failing loop stops the remaining ones and its error is returned.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), DomainError> {
        let stop = shutdown.child_token();
        let mut join_set: JoinSet<(ListenProtocol, Result<(), DomainError>)> = JoinSet::new();

        if let Some(socket) = self.udp {
            let local = socket.local_addr().ok();
            let mut server = ServerFuture::new(self.handler.clone());
            server.register_socket(socket);
            info!(address = ?local, "Starting DoH proxy over UDP");
            join_set.spawn(serve(ListenProtocol::Udp, server, stop.clone()));
        }

        if let Some(listener) = self.tcp {
            let local = listener.local_addr().ok();
            let mut server = ServerFuture::new(self.handler.clone());
            server.register_listener(listener, TCP_CONNECTION_TIMEOUT);
            info!(address = ?local, "Starting DoH proxy over TCP");
            join_set.spawn(serve(ListenProtocol::Tcp, server, stop.clone()));
        }

        let mut outcome = Ok(());
        while let Some(joined) = join_set.join_next().await {
            let failure = match joined {
                Ok((_, Ok(()))) => None,
                Ok((protocol, Err(e))) => {
                    error!(protocol = %protocol, error = %e, "DNS listener failed");
                    Some(e)
                }
                Err(e) => {
                    error!(error = %e, "DNS listener task aborted");
                    Some(DomainError::Listener(e.to_string()))
                }
            };

            if let Some(e) = failure {
                stop.cancel();
                if outcome.is_ok() {
                    outcome = Err(e);
                }
            }
        }

        outcome
    }
}

async fn serve(
    protocol: ListenProtocol,
    mut server: ServerFuture<DnsRequestHandler>,
    stop: CancellationToken,
) -> (ListenProtocol, Result<(), DomainError>) {
    let result = tokio::select! {
        _ = stop.cancelled() => {
            info!(protocol = %protocol, "DNS listener shutting down");
            Ok(())
        }
        result = server.block_until_done() => match result {
            Ok(()) => Err(DomainError::Listener(format!("{} listener stopped unexpectedly", protocol))),
            Err(e) => Err(DomainError::Listener(format!("{} listener failed: {}", protocol, e))),
        },
    };
    (protocol, result)
}

fn bind_error(protocol: ListenProtocol, address: &str, error: io::Error) -> DomainError {
    DomainError::Bind {
        protocol,
        address: address.to_string(),
        reason: error.to_string(),
    }
}
