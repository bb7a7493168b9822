//! Error types for the reachability toolkit
//!
//! Each seam gets its own typed error. Orchestration code wraps these in
//! `anyhow` with context, the way the binaries report everything else.

use std::path::PathBuf;

use thiserror::Error;

/// Failures reading or writing the persisted measurement-ID store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed ID store {}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures talking to the measurement platform
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("no API key configured for measurement creation")]
    MissingCredential,
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("platform rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("unexpected platform response: {0}")]
    UnexpectedResponse(String),
}

/// Why a single raw probe result yielded no sample
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    #[error("record has no result payload")]
    MissingPayload,
    #[error("result payload has no `{0}` field")]
    MissingField(&'static str),
    #[error("`{0}` is not a number")]
    NotANumber(&'static str),
    #[error("sample {0} is not strictly positive")]
    NonPositive(f64),
    #[error("result payload is not a list")]
    NotAList,
}

/// Failures turning wire bytes into a structured DNS record
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid DNS message: {0}")]
    Message(#[from] hickory_proto::error::ProtoError),
}
