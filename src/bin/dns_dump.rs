//! DNS Answer Dumper
//!
//! For every entry of an ID store file, fetches the DNS measurement's raw
//! results and prints the first answer of each.
//!
//! Usage:
//!   dns-dump meas-ids.json

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::error;

use root_reachability::decoder::WireDecoder;
use root_reachability::dump::dump_answers;
use root_reachability::platform::AtlasClient;
use root_reachability::{IdStore, ReachabilityConfig};

#[derive(Parser, Debug)]
#[command(name = "dns-dump")]
#[command(about = "Print the first DNS answer of every probe result")]
struct Args {
    /// ID store JSON file
    file: Option<PathBuf>,

    /// Path to TOML configuration file (API settings)
    #[arg(short, long, env = "REACHABILITY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    root_reachability::load_env();
    root_reachability::init_tracing();

    let args = Args::parse();
    let Some(file) = args.file.clone() else {
        println!("please provide json filename");
        return ExitCode::SUCCESS;
    };

    match run(file, &args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

async fn run(file: PathBuf, args: &Args) -> Result<()> {
    let ids = IdStore::load(&file)?;

    let mut config = ReachabilityConfig::load_or_default(args.config.as_deref())?;
    config.apply_env();
    let platform = AtlasClient::new(&config.api)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    dump_answers(&platform, &ids, &WireDecoder, &mut out).await?;
    Ok(())
}
