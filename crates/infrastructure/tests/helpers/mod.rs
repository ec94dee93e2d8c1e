#![allow(dead_code)]
mod doh_stub;

pub use dns_client::{
    build_query, build_query_with_edns, first_a_record, tcp_query, udp_exchange, udp_query,
};
pub use doh_stub::{DohStub, LARGE_ANSWER_COUNT, STUB_ANSWER};
