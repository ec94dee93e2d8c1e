pub mod https;

pub use https::{HttpsUpstreamClient, DEFAULT_TIMEOUT};
