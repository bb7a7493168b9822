//! Traceroute hop count

use super::Metric;
use crate::error::ExtractError;
use crate::platform::RawResult;
use crate::store::MeasurementPair;

/// Number of hops (`len(result.result)`) recorded by each traceroute probe
pub struct HopCount;

impl Metric for HopCount {
    const HEADER: &'static str = "cc, num_probes,  num_hops";

    fn measurement_id(pair: &MeasurementPair) -> u64 {
        pair.traceroute_id
    }

    fn extract(raw: &RawResult) -> Result<f64, ExtractError> {
        let hops = raw
            .get("result")
            .ok_or(ExtractError::MissingPayload)?
            .as_array()
            .ok_or(ExtractError::NotAList)?;
        Ok(hops.len() as f64)
    }
}
