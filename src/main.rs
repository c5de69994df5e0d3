//! Line-protocol backend server daemon.
//!
//! Starts one listener per configured port. Every connection receives
//! `Response from Server on port <port>` for the single line it sends.
//!
//! ```text
//!   client ──"Hello Server\n"──▶ ┌──────────────┐
//!                                │ listener:5001 │──▶ handler task
//!   client ◀──"Response ..."──── └──────────────┘
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use round_robin_lb::config::loader::{load_config, ConfigError};
use round_robin_lb::config::validation::validate_config;
use round_robin_lb::config::BalancerConfig;
use round_robin_lb::lifecycle::{signals, startup};
use round_robin_lb::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "rr-backend")]
#[command(about = "Line-protocol backend server", long_about = None)]
struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to serve; repeat for several listeners. Overrides the config file.
    #[arg(short, long = "port")]
    ports: Vec<u16>,

    /// Log every received request line.
    #[arg(short, long)]
    verbose: bool,

    /// Seconds to wait for in-flight connections on shutdown.
    #[arg(long, default_value_t = 5)]
    grace_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => BalancerConfig::default(),
    };
    if !args.ports.is_empty() {
        config.server.ports = args.ports.clone();
    }
    config.server.verbose |= args.verbose;
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!(
        ports = ?config.server.ports,
        verbose = config.server.verbose,
        read_timeout_ms = config.server.read_timeout_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validated above.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let mut listeners = startup::start_listeners(&config.server).await?;

    signals::wait_for_signal().await?;

    startup::stop_listeners(&mut listeners).await;
    let grace = Duration::from_secs(args.grace_secs);
    for listener in &listeners {
        if !listener.wait_for_idle(grace).await {
            tracing::warn!(
                address = ?listener.local_addr(),
                in_flight = listener.active_connections(),
                "Connections still open after grace period"
            );
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
