use anyhow::Context;
use doh_relay_domain::ProxyConfig;
use doh_relay_infrastructure::dns::{DnsRequestHandler, ListenerSupervisor};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

pub async fn start_dns_server(
    config: &ProxyConfig,
    handler: DnsRequestHandler,
) -> anyhow::Result<()> {
    let supervisor = ListenerSupervisor::bind(config, handler)
        .await
        .inspect_err(|e| error!(error = %e, "Failed to start listeners"))
        .context("Failed to bind DNS listeners")?;

    let shutdown = CancellationToken::new();
    tokio::spawn(watch_shutdown_signals(shutdown.clone()));

    info!(
        address = %config.bind_address(),
        protocols = ?config.protocols(),
        "DoH relay ready"
    );

    supervisor
        .run(shutdown)
        .await
        .inspect_err(|e| error!(error = %e, "DNS listeners stopped"))
        .context("DNS listener failed")
}

async fn watch_shutdown_signals(shutdown: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = match signal(SignalKind::terminate()) {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                wait_for_ctrl_c().await;
                shutdown.cancel();
                return;
            }
        };

        tokio::select! {
            _ = wait_for_ctrl_c() => {}
            _ = terminate.recv() => info!("Received SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    wait_for_ctrl_c().await;

    info!("Shutting down");
    shutdown.cancel();
}

async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C"),
        Err(e) => {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    }
}
