use anyhow::Context;
use clap::{CommandFactory, Parser};
use doh_relay_domain::{CliOverrides, ListenProtocol};
use std::ffi::OsString;
use tracing::info;

mod bootstrap;
mod di;
mod server;

const UPSTREAM_HELP: &str = "Upstream DoH server URL, may be given multiple times and is \
tried in order. WARNING: if this relay is the system resolver and the first upstream is \
given by hostname, a later upstream must use an IP address so that hostname can still be \
resolved";

#[derive(Parser, Debug)]
#[command(name = "doh-relay")]
#[command(version)]
#[command(about = "Relays plain DNS over TCP/UDP to DNS-over-HTTPS upstreams")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Listen address [default: 127.0.0.1]
    #[arg(short = 'l', long, value_name = "ADDR")]
    listen: Option<String>,

    /// Listen port [default: 53]
    #[arg(short = 'p', long)]
    port: Option<String>,

    /// Listen on TCP (both transports when neither --tcp nor --udp is given)
    #[arg(long)]
    tcp: bool,

    /// Listen on UDP (both transports when neither --tcp nor --udp is given)
    #[arg(long)]
    udp: bool,

    /// Log every proxied request
    #[arg(long)]
    log: bool,

    #[arg(short = 'u', long = "upstream", value_name = "URL", help = UPSTREAM_HELP)]
    upstreams: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        let protocols = if self.tcp || self.udp {
            Some(ListenProtocol::from_flags(self.tcp, self.udp))
        } else {
            None
        };

        CliOverrides {
            listen_address: self.listen.clone(),
            port: self.port.clone(),
            upstream_urls: self.upstreams.clone(),
            protocols,
            log_requests: self.log,
            log_level: self.log_level.clone(),
        }
    }
}

/// Rewrites `-tcp`, `-udp` and `-log` to their double-dash forms.
///
/// Without this, clap would read `-udp` as `-u dp` and `-log` as `-l og`.
fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut after_separator = false;
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if after_separator {
                return arg;
            }
            if arg == "--" {
                after_separator = true;
                return arg;
            }
            if matches!(arg.to_str(), Some("-tcp" | "-udp" | "-log")) {
                let mut long = OsString::from("-");
                long.push(&arg);
                long
            } else {
                arg
            }
        })
        .collect()
}

/// Help text printed to stderr when no upstream is configured.
fn usage() -> String {
    Cli::command().render_help().to_string()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));

    let config = bootstrap::load_config(cli.config.as_deref(), cli.overrides())?;

    if config.upstream.urls.is_empty() {
        eprintln!("{}", usage());
        std::process::exit(1);
    }

    bootstrap::init_logging(&config);

    info!("Starting doh-relay v{}", env!("CARGO_PKG_VERSION"));

    let proxy_config = config
        .to_proxy_config()
        .context("Invalid configuration")?;

    let dns_services = di::DnsServices::new(&proxy_config)?;

    for url in dns_services.forwarder.upstream_urls() {
        info!("Added {} as an upstream DoH server", url);
    }
    if proxy_config.log_requests() {
        info!("Logging requests");
    }

    server::start_dns_server(&proxy_config, dns_services.handler).await?;

    info!("Server shutdown complete");
    Ok(())
}
