//! Root Reachability
//!
//! Schedules paired traceroute + DNS measurements toward an anchor from a set
//! of countries, then reduces the raw per-probe results into per-country
//! average RTT and hop count.

pub mod command;
pub mod config;
pub mod decoder;
pub mod dump;
pub mod error;
pub mod platform;
pub mod reducer;
pub mod store;
pub mod submitter;

pub use command::{Mode, Outcome};
pub use config::ReachabilityConfig;
pub use error::{DecodeError, ExtractError, PlatformError, StoreError};
pub use store::{IdStore, MeasurementPair};

/// Load `.env` from the working directory (or its parents) if present
pub fn load_env() {
    let _ = dotenv::dotenv();
}

/// Install the global tracing subscriber.
///
/// Logs go to stderr so tabular output on stdout stays clean.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "root_reachability=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
