use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use hickory_proto::op::{Edns, Message, MessageType, ResponseCode};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{RData, Record};
use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const STUB_ANSWER: Ipv4Addr = Ipv4Addr::new(93, 184, 216, 34);

/// Answers per question on `/large`, enough to overflow a 512-byte datagram.
pub const LARGE_ANSWER_COUNT: u8 = 60;

const DNS_MESSAGE: &str = "application/dns-message";

#[derive(Default)]
struct StubState {
    hits: Mutex<HashMap<&'static str, usize>>,
    last_headers: Mutex<Option<HeaderMap>>,
}

impl StubState {
    fn record(&self, route: &'static str, headers: &HeaderMap) {
        *self.hits.lock().unwrap().entry(route).or_default() += 1;
        *self.last_headers.lock().unwrap() = Some(headers.clone());
    }
}

/// Local DoH upstream with one route per behavior:
///
/// - `/dns-query` answers every A question with [`STUB_ANSWER`]
/// - `/slow` answers the same way after two seconds
/// - `/error` returns HTTP 500
/// - `/garbage` returns HTTP 200 with a body that is not a DNS message
/// - `/large` answers with [`LARGE_ANSWER_COUNT`] A records and a 4096-byte OPT record
pub struct DohStub {
    addr: SocketAddr,
    state: Arc<StubState>,
    handle: JoinHandle<()>,
}

impl DohStub {
    pub async fn start() -> Self {
        let state = Arc::new(StubState::default());
        let app = Router::new()
            .route("/dns-query", post(answer))
            .route("/slow", post(slow))
            .route("/error", post(server_error))
            .route("/garbage", post(garbage))
            .route("/large", post(large))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn url(&self, route: &str) -> String {
        format!("http://{}{}", self.addr, route)
    }

    pub fn hits(&self, route: &str) -> usize {
        self.state
            .hits
            .lock()
            .unwrap()
            .get(route)
            .copied()
            .unwrap_or(0)
    }

    pub fn last_header(&self, name: header::HeaderName) -> Option<String> {
        self.state
            .last_headers
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|headers| headers.get(name))
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }
}

impl Drop for DohStub {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn answer_response(body: &[u8]) -> Response {
    let Ok(query) = Message::from_vec(body) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    dns_response(reply_to(&query))
}

fn reply_to(query: &Message) -> Message {
    let mut response = Message::new();
    response.set_id(query.id());
    response.set_message_type(MessageType::Response);
    response.set_op_code(query.op_code());
    response.set_recursion_desired(query.recursion_desired());
    response.set_recursion_available(true);
    response.set_response_code(ResponseCode::NoError);
    for question in query.queries() {
        response.add_query(question.clone());
        response.add_answer(Record::from_rdata(
            question.name().clone(),
            60,
            RData::A(A(STUB_ANSWER)),
        ));
    }
    response
}

fn dns_response(message: Message) -> Response {
    (
        [(header::CONTENT_TYPE, DNS_MESSAGE)],
        message.to_vec().unwrap(),
    )
        .into_response()
}

async fn answer(State(state): State<Arc<StubState>>, headers: HeaderMap, body: Bytes) -> Response {
    state.record("/dns-query", &headers);
    answer_response(&body)
}

async fn slow(State(state): State<Arc<StubState>>, headers: HeaderMap, body: Bytes) -> Response {
    state.record("/slow", &headers);
    tokio::time::sleep(Duration::from_secs(2)).await;
    answer_response(&body)
}

async fn server_error(State(state): State<Arc<StubState>>, headers: HeaderMap) -> Response {
    state.record("/error", &headers);
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response()
}

async fn garbage(State(state): State<Arc<StubState>>, headers: HeaderMap) -> Response {
    state.record("/garbage", &headers);
    ([(header::CONTENT_TYPE, DNS_MESSAGE)], vec![0x01u8, 0x02, 0x03]).into_response()
}

async fn large(State(state): State<Arc<StubState>>, headers: HeaderMap, body: Bytes) -> Response {
    state.record("/large", &headers);
    let Ok(query) = Message::from_vec(&body) else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    let mut response = reply_to(&query);
    response.take_answers();
    for question in query.queries() {
        for i in 1..=LARGE_ANSWER_COUNT {
            response.add_answer(Record::from_rdata(
                question.name().clone(),
                60,
                RData::A(A(Ipv4Addr::new(10, 0, 0, i))),
            ));
        }
    }
    let mut edns = Edns::new();
    edns.set_max_payload(4096);
    response.set_edns(edns);

    dns_response(response)
}
