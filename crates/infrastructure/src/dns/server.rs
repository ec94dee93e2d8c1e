use doh_relay_application::use_cases::ForwardDnsQueryUseCase;
use hickory_proto::op::{Edns, Header, Message, MessageType, ResponseCode};
use hickory_proto::rr::Record;
use hickory_server::authority::MessageResponseBuilder;
use hickory_server::server::{Request, RequestHandler, ResponseHandler, ResponseInfo};
use std::sync::Arc;
use tracing::{debug, error};

/// Bridges hickory-server requests to the failover forwarder.
///
/// Every accepted request gets an answer: the upstream's response on success,
/// FORMERR for requests that cannot be parsed, SERVFAIL for anything that could
/// not be forwarded.
#[derive(Clone)]
pub struct DnsRequestHandler {
    forwarder: Arc<ForwardDnsQueryUseCase>,
}

impl DnsRequestHandler {
    pub fn new(forwarder: Arc<ForwardDnsQueryUseCase>) -> Self {
        Self { forwarder }
    }
}

#[async_trait::async_trait]
impl RequestHandler for DnsRequestHandler {
    async fn handle_request<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
    ) -> ResponseInfo {
        if let Err(e) = request.request_info() {
            debug!(error = %e, client = %request.src(), "Failed to parse request info");
            return send_error_response(request, &mut response_handle, ResponseCode::FormErr).await;
        }

        let query = query_message(request);

        match self.forwarder.execute(&query).await {
            Ok(forwarded) => {
                send_forwarded_response(request, &mut response_handle, &forwarded.message).await
            }
            Err(e) => {
                debug!(error = %e, client = %request.src(), "Answering SERVFAIL");
                send_error_response(request, &mut response_handle, ResponseCode::ServFail).await
            }
        }
    }
}

/// Rebuilds the client's query as a standalone message for the upstream.
fn query_message(request: &Request) -> Message {
    let header = request.header();

    let mut message = Message::new();
    message.set_id(header.id());
    message.set_message_type(MessageType::Query);
    message.set_op_code(header.op_code());
    message.set_recursion_desired(header.recursion_desired());
    message.set_authentic_data(header.authentic_data());
    message.set_checking_disabled(header.checking_disabled());

    for query in request.queries() {
        message.add_query(query.original().clone());
    }
    if let Some(edns) = request.edns() {
        message.set_edns(edns.clone());
    }

    message
}

/// OPT record for the reply, advertising the client's own payload size.
///
/// UDP replies are truncated to this size with TC set. Clients that sent no
/// OPT record get none back (RFC 6891 §7).
fn response_edns(request: &Request) -> Option<Edns> {
    let client = request.edns()?;

    let mut edns = Edns::new();
    edns.set_max_payload(client.max_payload());
    edns.set_version(0);
    edns.set_dnssec_ok(client.flags().dnssec_ok);
    Some(edns)
}

async fn send_forwarded_response<R: ResponseHandler>(
    request: &Request,
    response_handle: &mut R,
    upstream: &Message,
) -> ResponseInfo {
    let mut builder = MessageResponseBuilder::from_message_request(request);
    if let Some(edns) = response_edns(request) {
        builder.edns(edns);
    }

    let mut header = *upstream.header();
    header.set_id(request.id());

    let response = builder.build(
        header,
        upstream.answers(),
        upstream.name_servers(),
        &[] as &[Record],
        upstream.additionals(),
    );

    match response_handle.send_response(response).await {
        Ok(info) => info,
        Err(e) => {
            error!(error = %e, "Failed to send response");
            ResponseInfo::from(*request.header())
        }
    }
}

async fn send_error_response<R: ResponseHandler>(
    request: &Request,
    response_handle: &mut R,
    code: ResponseCode,
) -> ResponseInfo {
    debug!(code = ?code, "Sending error response");
    let mut builder = MessageResponseBuilder::from_message_request(request);
    if let Some(edns) = response_edns(request) {
        builder.edns(edns);
    }
    let mut header = Header::response_from_request(request.header());
    header.set_response_code(code);
    header.set_recursion_available(true);
    let response = builder.build(
        header,
        &[] as &[Record],
        &[] as &[Record],
        &[] as &[Record],
        &[] as &[Record],
    );

    match response_handle.send_response(response).await {
        Ok(info) => info,
        Err(e) => {
            error!(error = %e, "Failed to send error response");
            ResponseInfo::from(*request.header())
        }
    }
}
