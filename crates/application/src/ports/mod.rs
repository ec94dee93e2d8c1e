mod doh_upstream;

pub use doh_upstream::{DohUpstream, UpstreamReply};
