//! otpd-cli - Command-line client for otpd
//!
//! Reads a ciphertext file and a key file, sends them to an otpd server,
//! and prints the decrypted plaintext to stdout.
//!
//! Exit codes: 1 for local validation failures (bad ciphertext, short
//! key, unreadable file), 2 for connection failures and protocol
//! rejection.

use clap::Parser;
use otpd_client::{ClientConfig, Connection, PadInput};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const EXIT_VALIDATION: u8 = 1;
const EXIT_TRANSPORT: u8 = 2;

#[derive(Parser)]
#[command(name = "otpd-cli")]
#[command(about = "Decrypt a one-time-pad ciphertext via an otpd server")]
#[command(version)]
struct Cli {
    /// Path to the ciphertext file
    ciphertext: PathBuf,

    /// Path to the key file (must be at least as long as the ciphertext)
    key: PathBuf,

    /// Server address
    #[arg(short, long, env = "OTPD_SERVER", default_value_t = default_server())]
    server: SocketAddr,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout_secs: u64,
}

fn default_server() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], otpd_protocol::DEFAULT_PORT))
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Validation happens entirely before any network activity.
    let input = match PadInput::from_files(&cli.ciphertext, &cli.key) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_VALIDATION);
        }
    };

    let config = ClientConfig::new(cli.server)
        .with_request_timeout(Duration::from_secs(cli.timeout_secs));

    let connection = match Connection::connect(config).await {
        Ok(connection) => connection,
        Err(e) => {
            eprintln!("Error connecting to server at {}: {}", cli.server, e);
            return ExitCode::from(EXIT_TRANSPORT);
        }
    };

    match connection.decrypt(&input).await {
        Ok(plaintext) => {
            println!("{}", plaintext);
            ExitCode::SUCCESS
        }
        // Rejection and transport failures share an exit code; the
        // message distinguishes them.
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_TRANSPORT)
        }
    }
}
