//! Root Reachability CLI
//!
//! Usage:
//!   root-reachability create       # submit measurements for untracked sources
//!   root-reachability load-rtt     # per-source average DNS RTT (alias: load-dns)
//!   root-reachability load-trace   # per-source average hop count
//!
//! Environment Variables:
//!   ATLAS_API_KEY          - measurement creation key (required for `create`)
//!   ATLAS_API_URL          - API base URL (default: https://atlas.ripe.net/api/v2)
//!   REACHABILITY_IDS_FILE  - ID store path (default: meas-ids.json)
//!   REACHABILITY_SOURCES   - comma-separated country codes
//!   RUST_LOG               - log filter (default: root_reachability=info)

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::error;

use root_reachability::command::{self, Mode, USAGE};
use root_reachability::platform::AtlasClient;
use root_reachability::ReachabilityConfig;

#[derive(Parser, Debug)]
#[command(name = "root-reachability")]
#[command(about = "Schedule and summarize DNS/traceroute measurements toward a root server")]
struct Args {
    /// create | load-rtt | load-dns | load-trace
    mode: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, env = "REACHABILITY_CONFIG")]
    config: Option<PathBuf>,

    /// ID store path (overrides config and environment)
    #[arg(long)]
    ids_file: Option<PathBuf>,

    /// Measurement creation key (overrides config and environment)
    #[arg(long, hide_env_values = true)]
    api_key: Option<String>,

    /// Comma-separated country codes (overrides config and environment)
    #[arg(long, value_delimiter = ',')]
    sources: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    root_reachability::load_env();
    root_reachability::init_tracing();

    let args = Args::parse();

    let Some(raw_mode) = args.mode.as_deref() else {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    };

    let mode = match raw_mode.parse::<Mode>() {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(1);
        }
    };

    match execute(mode, &args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn resolve_config(args: &Args) -> Result<ReachabilityConfig> {
    let mut config = ReachabilityConfig::load_or_default(args.config.as_deref())?;
    config.apply_env();

    if let Some(path) = &args.ids_file {
        config.ids_path = path.clone();
    }
    if let Some(key) = &args.api_key {
        config.api.key = Some(key.clone());
    }
    if !args.sources.is_empty() {
        config.set_sources(args.sources.clone());
    }
    Ok(config)
}

async fn execute(mode: Mode, args: &Args) -> Result<()> {
    let config = resolve_config(args)?;

    if mode == Mode::Create && config.api.key.is_none() {
        bail!("`create` needs an API key (set ATLAS_API_KEY or pass --api-key)");
    }

    let platform = AtlasClient::new(&config.api)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    command::run(mode, &config, &platform, &mut out).await?;
    Ok(())
}
