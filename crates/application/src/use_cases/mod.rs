pub mod dns;

pub use dns::{first_success, ForwardDnsQueryUseCase, ForwardedResponse};
