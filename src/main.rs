use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

mod api;
mod envfile;
mod error;
mod probe;

use api::FirebaseClient;

/// Realtime Database smoke test: load credentials, sign in, write a probe
/// document, read it back.
#[derive(Parser)]
#[command(name = "rtdb-smoke")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the KEY=VALUE env file holding the admin credentials
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,

    /// Web API key used for email/password sign-in
    #[arg(long, env = "FIREBASE_API_KEY")]
    api_key: String,

    /// Realtime Database root URL (e.g. https://<project>.firebaseio.com)
    #[arg(long, env = "FIREBASE_DATABASE_URL")]
    database_url: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Every stage gates the next; a failure is logged where it occurs and
    // ends the run without aborting the process.
    let creds = match envfile::load(&cli.env_file) {
        Ok(creds) => creds,
        Err(e) => {
            error!("{}", e);
            return Ok(());
        }
    };

    let client = match FirebaseClient::new(&cli.api_key, &cli.database_url) {
        Ok(client) => client,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            return Ok(());
        }
    };

    match probe::run_smoke_test(&client, &creds).await {
        Ok(report) => {
            info!("Read OK: {}", report.raw);
            if let Some(ts) = report.server_ts {
                info!("Server timestamp resolved to {}", ts.to_rfc3339());
            }
        }
        Err(e) => error!("Smoke test failed: {}", e),
    }

    Ok(())
}
