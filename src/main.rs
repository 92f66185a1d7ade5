//! Vigilar server binary.
//!
//! # Usage
//!
//! ```bash
//! # Start with defaults (127.0.0.1:3000)
//! vigilar
//!
//! # Custom bind address and static chart UI
//! vigilar --host 0.0.0.0 --port 8080 --static-dir static
//!
//! # Cap in-memory growth
//! vigilar --max-records-per-run 10000 --max-runs 100
//! ```
//!
//! The port can also come from the `VIGILAR_PORT` environment variable;
//! an explicit `--port` flag wins.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vigilar::server::{MonitorServer, ServerConfig, DEFAULT_PORT, PORT_ENV};
use vigilar::store::StoreLimits;

/// Vigilar - remote monitor for training metrics
#[derive(Parser, Debug)]
#[command(name = "vigilar")]
#[command(about = "Collects training metrics and serves them as a live feed")]
#[command(version)]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on (overrides VIGILAR_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory of static chart UI assets
    #[arg(short, long)]
    static_dir: Option<PathBuf>,

    /// Maximum records kept per run log (default: unlimited)
    #[arg(long)]
    max_records_per_run: Option<usize>,

    /// Maximum runs per category (default: unlimited)
    #[arg(long)]
    max_runs: Option<usize>,
}

fn port_from_env() -> Option<u16> {
    std::env::var(PORT_ENV).ok()?.parse().ok()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vigilar=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port = args.port.or_else(port_from_env).unwrap_or(DEFAULT_PORT);
    let address: SocketAddr = format!("{}:{}", args.host, port).parse()?;

    let limits = StoreLimits {
        max_records_per_run: args.max_records_per_run,
        max_runs_per_category: args.max_runs,
    };

    let mut config = ServerConfig::default()
        .with_address(address)
        .with_limits(limits);
    if let Some(dir) = args.static_dir {
        config = config.with_static_dir(dir);
    }

    tracing::info!("starting vigilar v{}", env!("CARGO_PKG_VERSION"));
    MonitorServer::new(config).run().await?;

    Ok(())
}
