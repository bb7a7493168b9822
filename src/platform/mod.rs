//! Measurement Platform
//!
//! The remote service that schedules probes and hands back raw results.
//! Everything above this seam talks to the `MeasurementPlatform` trait;
//! `AtlasClient` is the HTTP implementation.

pub mod atlas;
#[cfg(test)]
pub(crate) mod fake;
pub mod request;

pub use atlas::AtlasClient;
pub use request::*;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::PlatformError;

/// One platform-returned record for one probe within a measurement.
///
/// Untrusted: any field may be missing or have the wrong shape.
pub type RawResult = Value;

#[async_trait]
pub trait MeasurementPlatform: Send + Sync {
    /// Submit a combined measurement request.
    ///
    /// Returns the created measurement IDs in definition order.
    async fn submit(&self, request: &CreateRequest) -> Result<Vec<u64>, PlatformError>;

    /// Fetch every raw result recorded for one measurement.
    async fn fetch_results(&self, msm_id: u64) -> Result<Vec<RawResult>, PlatformError>;
}

