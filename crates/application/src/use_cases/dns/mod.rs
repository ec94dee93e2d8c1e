mod first_success;
mod forward_dns_query;

pub use first_success::first_success;
pub use forward_dns_query::{ForwardDnsQueryUseCase, ForwardedResponse};
