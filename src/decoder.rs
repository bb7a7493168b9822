//! DNS Wire Decoder
//!
//! Turns a raw DNS response (the `abuf` field of a DNS probe result) into a
//! structured JSON record with the section names probes report:
//! `HEADER`, `QuestionSection`, `AnswerSection`, `AuthoritySection`,
//! `AdditionalSection`.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hickory_proto::op::{Message, MessageType, Query};
use hickory_proto::rr::Record;
use serde_json::{json, Value};

use crate::error::DecodeError;

/// Bytes in, structured record out
pub trait DnsDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Value, DecodeError>;

    /// Decode a base64 (standard alphabet) encoded response
    fn decode_base64(&self, encoded: &str) -> Result<Value, DecodeError> {
        let bytes = STANDARD.decode(encoded.trim())?;
        self.decode(&bytes)
    }
}

/// `DnsDecoder` backed by hickory-proto's message parser
#[derive(Debug, Default, Clone, Copy)]
pub struct WireDecoder;

impl DnsDecoder for WireDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Value, DecodeError> {
        let message = Message::from_vec(bytes)?;
        Ok(render_message(&message))
    }
}

fn render_message(message: &Message) -> Value {
    let h = message.header();
    json!({
        "HEADER": {
            "ID": h.id(),
            "QR": h.message_type() == MessageType::Response,
            "OpCode": format!("{:?}", h.op_code()),
            "AA": h.authoritative(),
            "TC": h.truncated(),
            "RD": h.recursion_desired(),
            "RA": h.recursion_available(),
            "AD": h.authentic_data(),
            "CD": h.checking_disabled(),
            "ReturnCode": format!("{:?}", h.response_code()),
            "QDCOUNT": h.query_count(),
            "ANCOUNT": h.answer_count(),
            "NSCOUNT": h.name_server_count(),
            "ARCOUNT": h.additional_count(),
        },
        "QuestionSection": message.queries().iter().map(render_query).collect::<Vec<_>>(),
        "AnswerSection": render_records(message.answers()),
        "AuthoritySection": render_records(message.name_servers()),
        "AdditionalSection": render_records(message.additionals()),
    })
}

fn render_query(query: &Query) -> Value {
    json!({
        "Qname": query.name().to_string(),
        "Qtype": query.query_type().to_string(),
        "Qclass": query.query_class().to_string(),
    })
}

fn render_records(records: &[Record]) -> Vec<Value> {
    records
        .iter()
        .map(|r| {
            let rdata: Vec<String> = r.data().map(|d| d.to_string()).into_iter().collect();
            json!({
                "Name": r.name().to_string(),
                "Type": r.record_type().to_string(),
                "Class": r.dns_class().to_string(),
                "TTL": r.ttl(),
                "RDATA": rdata,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hickory_proto::rr::rdata::NS;
    use hickory_proto::rr::{Name, RData, RecordType};

    fn ns_response() -> Vec<u8> {
        let zone = Name::from_ascii("com.").unwrap();
        let mut message = Message::new();
        message
            .set_id(4242)
            .set_message_type(MessageType::Response)
            .set_recursion_desired(true);
        message.add_query(Query::query(zone.clone(), RecordType::NS));
        for server in ["a.gtld-servers.net.", "b.gtld-servers.net."] {
            message.add_answer(Record::from_rdata(
                zone.clone(),
                172800,
                RData::NS(NS(Name::from_ascii(server).unwrap())),
            ));
        }
        message.to_vec().unwrap()
    }

    #[test]
    fn test_decode_ns_response() {
        let record = WireDecoder.decode(&ns_response()).unwrap();

        assert_eq!(record["HEADER"]["ID"], 4242);
        assert_eq!(record["HEADER"]["QR"], true);
        assert_eq!(record["HEADER"]["ANCOUNT"], 2);
        assert_eq!(record["QuestionSection"][0]["Qname"], "com.");
        assert_eq!(record["QuestionSection"][0]["Qtype"], "NS");
        assert_eq!(record["AnswerSection"][0]["TTL"], 172800);
        assert_eq!(record["AnswerSection"][0]["RDATA"][0], "a.gtld-servers.net.");
        assert_eq!(record["AnswerSection"][1]["RDATA"][0], "b.gtld-servers.net.");
        assert_eq!(record["AuthoritySection"], json!([]));
    }

    #[test]
    fn test_decode_base64() {
        let encoded = STANDARD.encode(ns_response());
        let record = WireDecoder.decode_base64(&format!(" {}\n", encoded)).unwrap();
        assert_eq!(record["HEADER"]["ID"], 4242);
    }

    #[test]
    fn test_malformed_input() {
        assert!(matches!(
            WireDecoder.decode(&[0x12, 0x34, 0x81]),
            Err(DecodeError::Message(_))
        ));
        assert!(matches!(
            WireDecoder.decode_base64("***not base64***"),
            Err(DecodeError::Base64(_))
        ));
    }
}
