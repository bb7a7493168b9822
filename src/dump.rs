//! Raw answer dumper
//!
//! Prints the first RDATA string of the first answer in every DNS probe
//! result. Records that carry no parsed `answers` are decoded from their
//! `abuf`. Anything that does not yield an answer is skipped quietly.

use std::io::{self, Write};

use tracing::debug;

use crate::decoder::DnsDecoder;
use crate::platform::{MeasurementPlatform, RawResult};
use crate::store::IdStore;

/// First answer's first RDATA, if the record has one
pub fn first_answer<D: DnsDecoder + ?Sized>(raw: &RawResult, decoder: &D) -> Option<String> {
    let payload = raw.get("result")?;

    if let Some(rdata) = payload
        .pointer("/answers/0/RDATA/0")
        .and_then(|v| v.as_str())
    {
        return Some(rdata.to_string());
    }

    let abuf = payload.get("abuf")?.as_str()?;
    match decoder.decode_base64(abuf) {
        Ok(record) => record
            .pointer("/AnswerSection/0/RDATA/0")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        Err(e) => {
            debug!("Undecodable abuf: {}", e);
            None
        }
    }
}

/// Fetch each entry's DNS results and print their first answers.
///
/// Returns how many answers were printed.
pub async fn dump_answers<P, D, W>(
    platform: &P,
    ids: &IdStore,
    decoder: &D,
    out: &mut W,
) -> io::Result<usize>
where
    P: MeasurementPlatform,
    D: DnsDecoder + ?Sized,
    W: Write,
{
    let mut printed = 0;
    for (source, pair) in ids.iter() {
        let results = match platform.fetch_results(pair.dns_id).await {
            Ok(results) => results,
            Err(e) => {
                debug!("Skipping {}: {}", source, e);
                continue;
            }
        };

        for answer in results.iter().filter_map(|r| first_answer(r, decoder)) {
            writeln!(out, "{}", answer)?;
            printed += 1;
        }
    }
    out.flush()?;
    Ok(printed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::WireDecoder;
    use crate::platform::fake::FakePlatform;
    use crate::store::MeasurementPair;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use hickory_proto::op::{Message, MessageType, Query};
    use hickory_proto::rr::rdata::NS;
    use hickory_proto::rr::{Name, RData, Record, RecordType};
    use serde_json::json;

    fn abuf_for(server: &str) -> String {
        let zone = Name::from_ascii("com.").unwrap();
        let mut message = Message::new();
        message.set_id(7).set_message_type(MessageType::Response);
        message.add_query(Query::query(zone.clone(), RecordType::NS));
        message.add_answer(Record::from_rdata(
            zone,
            3600,
            RData::NS(NS(Name::from_ascii(server).unwrap())),
        ));
        STANDARD.encode(message.to_vec().unwrap())
    }

    #[test]
    fn test_first_answer_prefers_parsed_answers() {
        let raw = json!({"result": {
            "answers": [{"RDATA": ["k.root-servers.net."]}],
            "abuf": abuf_for("ignored.example."),
        }});
        assert_eq!(
            first_answer(&raw, &WireDecoder).as_deref(),
            Some("k.root-servers.net.")
        );
    }

    #[test]
    fn test_first_answer_falls_back_to_abuf() {
        let raw = json!({"result": {"rt": 12.0, "abuf": abuf_for("a.gtld-servers.net.")}});
        assert_eq!(
            first_answer(&raw, &WireDecoder).as_deref(),
            Some("a.gtld-servers.net.")
        );
    }

    #[test]
    fn test_first_answer_skips_garbage() {
        assert_eq!(first_answer(&json!({"error": {}}), &WireDecoder), None);
        assert_eq!(first_answer(&json!({"result": {"answers": []}}), &WireDecoder), None);
        assert_eq!(
            first_answer(&json!({"result": {"abuf": "%%%"}}), &WireDecoder),
            None
        );
    }

    #[tokio::test]
    async fn test_dump_answers() {
        let platform = FakePlatform::new().with_results(
            2,
            vec![
                json!({"result": {"answers": [{"RDATA": ["a.gtld-servers.net."]}]}}),
                json!({"error": {"timeout": 5000}}),
                json!({"result": {"abuf": abuf_for("b.gtld-servers.net.")}}),
            ],
        );
        let mut ids = IdStore::new();
        ids.insert_new("EE", MeasurementPair::new(1, 2));
        ids.insert_new("LV", MeasurementPair::new(3, 4)); // fetch fails

        let mut out = Vec::new();
        let printed = dump_answers(&platform, &ids, &WireDecoder, &mut out)
            .await
            .unwrap();

        assert_eq!(printed, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "a.gtld-servers.net.\nb.gtld-servers.net.\n"
        );
    }
}
