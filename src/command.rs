//! Command Dispatcher
//!
//! Maps the mode selector to exactly one operation over the configured ID
//! store. Only `create` writes the store back.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::ReachabilityConfig;
use crate::platform::MeasurementPlatform;
use crate::reducer::{ResultReducer, Summary};
use crate::store::IdStore;
use crate::submitter::{CreateReport, MeasurementSubmitter};

pub const USAGE: &str =
    "please run with one of the following parameters: [create|load-rtt|load-dns|load-trace]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    LoadRtt,
    LoadTrace,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Create => "create",
            Mode::LoadRtt => "load-rtt",
            Mode::LoadTrace => "load-trace",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMode(pub String);

impl fmt::Display for UnknownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid parameter: {}", self.0)
    }
}

impl std::error::Error for UnknownMode {}

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "create" => Ok(Mode::Create),
            "load-rtt" | "load-dns" => Ok(Mode::LoadRtt),
            "load-trace" => Ok(Mode::LoadTrace),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}

/// Result of one dispatched run
#[derive(Debug)]
pub enum Outcome {
    Created(CreateReport),
    Reduced(Vec<Summary>),
}

/// Load the store, run the selected operation, and (for `create`) save.
pub async fn run<P, W>(
    mode: Mode,
    config: &ReachabilityConfig,
    platform: &P,
    out: &mut W,
) -> Result<Outcome>
where
    P: MeasurementPlatform,
    W: Write,
{
    let ids = IdStore::load(&config.ids_path)?;
    info!(
        mode = %mode,
        entries = ids.len(),
        "Loaded ID store {}",
        config.ids_path.display()
    );

    match mode {
        Mode::Create => {
            let submitter = MeasurementSubmitter::new(platform, config.submitter_config());
            let (ids, report) = submitter
                .create_all_with_report(&config.sources, ids)
                .await;
            ids.save(&config.ids_path)?;
            info!("Saved {} entries to {}", ids.len(), config.ids_path.display());
            Ok(Outcome::Created(report))
        }
        Mode::LoadRtt => {
            let summaries = ResultReducer::new(platform)
                .reduce_dns(&ids, out)
                .await
                .context("Failed to write RTT summary")?;
            Ok(Outcome::Reduced(summaries))
        }
        Mode::LoadTrace => {
            let summaries = ResultReducer::new(platform)
                .reduce_trace(&ids, out)
                .await
                .context("Failed to write hop summary")?;
            Ok(Outcome::Reduced(summaries))
        }
    }
}
