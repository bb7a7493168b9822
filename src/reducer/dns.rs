//! DNS round-trip time

use super::Metric;
use crate::error::ExtractError;
use crate::platform::RawResult;
use crate::store::MeasurementPair;

/// Response time (`result.rt`, milliseconds) of each DNS probe
pub struct Rtt;

impl Metric for Rtt {
    const HEADER: &'static str = "cc, num_probes,  avg_rtt";

    fn measurement_id(pair: &MeasurementPair) -> u64 {
        pair.dns_id
    }

    fn extract(raw: &RawResult) -> Result<f64, ExtractError> {
        let payload = raw.get("result").ok_or(ExtractError::MissingPayload)?;
        let rt = payload.get("rt").ok_or(ExtractError::MissingField("rt"))?;
        let rt = rt.as_f64().ok_or(ExtractError::NotANumber("rt"))?;
        if rt > 0.0 {
            Ok(rt)
        } else {
            Err(ExtractError::NonPositive(rt))
        }
    }
}
