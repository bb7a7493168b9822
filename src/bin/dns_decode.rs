//! DNS Response Decoder
//!
//! Decodes one base64-encoded DNS response (e.g. a probe's `abuf`) and prints
//! it as a single line of JSON.
//!
//! Usage:
//!   dns-decode <BASE64>

use std::process::ExitCode;

use clap::Parser;

use root_reachability::decoder::{DnsDecoder, WireDecoder};

#[derive(Parser, Debug)]
#[command(name = "dns-decode")]
#[command(about = "Decode a base64 encoded DNS response to JSON")]
struct Args {
    /// Base64 encoded DNS response
    buf: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let Some(buf) = args.buf else {
        println!("no argument given, please provide a base64 encoded DNS response");
        return ExitCode::from(1);
    };

    match WireDecoder.decode_base64(&buf) {
        Ok(record) => {
            println!("{}", record);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(1)
        }
    }
}
