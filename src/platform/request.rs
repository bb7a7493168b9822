//! Measurement creation request body
//!
//! Mirrors the RIPE Atlas v2 `POST /measurements/` payload: a list of
//! measurement definitions sharing one probe selection.

use serde::{Deserialize, Serialize};

/// A single measurement definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MeasurementDefinition {
    Traceroute(TracerouteSpec),
    Dns(DnsSpec),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TracerouteSpec {
    pub af: u8,
    pub target: String,
    pub protocol: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnsSpec {
    pub af: u8,
    pub target: String,
    pub query_argument: String,
    pub query_type: String,
    pub query_class: String,
    pub description: String,
}

/// Probe selection: `requested` probes drawn from one population
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeSource {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    pub requested: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRequest {
    pub definitions: Vec<MeasurementDefinition>,
    pub probes: Vec<ProbeSource>,
    pub is_oneoff: bool,
    /// Unix seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
}

/// Successful creation response
#[derive(Debug, Clone, Deserialize)]
pub struct CreateResponse {
    pub measurements: Vec<u64>,
}
