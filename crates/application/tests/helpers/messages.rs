use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{Name, RData, Record, RecordType};
use std::net::Ipv4Addr;
use std::str::FromStr;

pub fn build_query(domain: &str, record_type: RecordType) -> Message {
    let mut message = Message::new();
    message.set_id(0x1234);
    message.set_message_type(MessageType::Query);
    message.set_op_code(OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(Query::query(Name::from_str(domain).unwrap(), record_type));
    message
}

/// Answers every question in `query_bytes` with a single A record.
pub fn answer_bytes(query_bytes: &[u8], addr: Ipv4Addr) -> Vec<u8> {
    let query = Message::from_vec(query_bytes).unwrap();

    let mut response = Message::new();
    response.set_id(query.id());
    response.set_message_type(MessageType::Response);
    response.set_op_code(OpCode::Query);
    response.set_recursion_desired(query.recursion_desired());
    response.set_recursion_available(true);
    response.set_response_code(ResponseCode::NoError);

    for question in query.queries() {
        response.add_query(question.clone());
        response.add_answer(Record::from_rdata(
            question.name().clone(),
            300,
            RData::A(A(addr)),
        ));
    }

    response.to_vec().unwrap()
}
