pub mod listener;
pub mod server;
pub mod transport;

pub use listener::ListenerSupervisor;
pub use server::DnsRequestHandler;
pub use transport::https::HttpsUpstreamClient;
