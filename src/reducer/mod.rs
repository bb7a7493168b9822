//! Result Reducers
//!
//! Fetch raw per-probe results for each tracked source and fold them into a
//! `(source, count, average)` line. A `Metric` decides which measurement of
//! the pair to read and how to pull one sample out of a raw record.
//!
//! Both reducers share one error policy:
//! - a failed fetch drops the source from the output
//! - a record that yields no sample is skipped
//! - the average is `floor(sum / count)`, or 0 with no samples

pub mod dns;
pub mod trace;

pub use dns::Rtt;
pub use trace::HopCount;

use std::fmt;
use std::io::{self, Write};

use tracing::{debug, warn};

use crate::error::ExtractError;
use crate::platform::{MeasurementPlatform, RawResult};
use crate::store::{IdStore, MeasurementPair};

/// One reducible quantity
pub trait Metric {
    /// Column header printed before the rows
    const HEADER: &'static str;

    /// Which measurement of the pair holds this metric
    fn measurement_id(pair: &MeasurementPair) -> u64;

    /// Pull a single strictly positive sample out of one raw record
    fn extract(raw: &RawResult) -> Result<f64, ExtractError>;
}

/// Running fold over extraction outcomes
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SampleSet {
    pub count: usize,
    pub skipped: usize,
    pub sum: f64,
}

impl SampleSet {
    pub fn push(mut self, sample: Result<f64, ExtractError>) -> Self {
        match sample {
            Ok(v) => {
                self.count += 1;
                self.sum += v;
            }
            Err(_) => self.skipped += 1,
        }
        self
    }

    /// Integer floor of the mean; 0 with no samples
    pub fn average(&self) -> u64 {
        if self.count == 0 {
            return 0;
        }
        (self.sum / self.count as f64).floor() as u64
    }
}

/// Per-source output row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub source: String,
    pub count: usize,
    pub average: u64,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.source, self.count, self.average)
    }
}

/// Fold one source's raw results into a summary
pub fn summarize<M: Metric>(source: &str, results: &[RawResult]) -> Summary {
    let samples = results
        .iter()
        .map(M::extract)
        .fold(SampleSet::default(), SampleSet::push);

    if samples.skipped > 0 {
        debug!("{}: skipped {} records without a sample", source, samples.skipped);
    }

    Summary {
        source: source.to_string(),
        count: samples.count,
        average: samples.average(),
    }
}

pub struct ResultReducer<'a, P> {
    platform: &'a P,
}

impl<'a, P: MeasurementPlatform> ResultReducer<'a, P> {
    pub fn new(platform: &'a P) -> Self {
        Self { platform }
    }

    /// Reduce every source in store order, writing the header and one line
    /// per source to `out`.
    pub async fn reduce<M: Metric, W: Write>(
        &self,
        ids: &IdStore,
        out: &mut W,
    ) -> io::Result<Vec<Summary>> {
        writeln!(out, "{}", M::HEADER)?;

        let mut summaries = Vec::with_capacity(ids.len());
        for (source, pair) in ids.iter() {
            let msm_id = M::measurement_id(&pair);
            let results = match self.platform.fetch_results(msm_id).await {
                Ok(results) => results,
                Err(e) => {
                    warn!("Skipping {}: fetching results for {} failed: {}", source, msm_id, e);
                    continue;
                }
            };

            let summary = summarize::<M>(source, &results);
            writeln!(out, "{}", summary)?;
            summaries.push(summary);
        }
        out.flush()?;
        Ok(summaries)
    }

    pub async fn reduce_dns<W: Write>(&self, ids: &IdStore, out: &mut W) -> io::Result<Vec<Summary>> {
        self.reduce::<Rtt, W>(ids, out).await
    }

    pub async fn reduce_trace<W: Write>(
        &self,
        ids: &IdStore,
        out: &mut W,
    ) -> io::Result<Vec<Summary>> {
        self.reduce::<HopCount, W>(ids, out).await
    }
}
