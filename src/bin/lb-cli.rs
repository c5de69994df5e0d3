use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use round_robin_lb::client::send_request;
use round_robin_lb::config::loader::load_config;
use round_robin_lb::observability::logging;
use round_robin_lb::{BackendDescriptor, BackendPool};

#[derive(Parser)]
#[command(name = "lb-cli")]
#[command(about = "Management CLI for the round-robin balancer", long_about = None)]
struct Cli {
    /// Log level when RUST_LOG is unset.
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one line to a backend and print its reply
    Send {
        #[arg(long, default_value = "localhost")]
        host: String,
        #[arg(short, long, default_value_t = 5002)]
        port: u16,
        #[arg(short, long)]
        message: String,
        #[arg(long, default_value_t = 5000)]
        timeout_ms: u64,
    },
    /// Show which backends the balancer would pick
    Pick {
        /// TOML configuration listing the backends.
        #[arg(short, long)]
        config: PathBuf,
        /// Number of selections to make.
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,
        /// Backend (host:port) to mark unhealthy first; repeatable.
        #[arg(long)]
        unhealthy: Vec<BackendDescriptor>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level);

    match cli.command {
        Commands::Send { host, port, message, timeout_ms } => {
            let reply = send_request((host.as_str(), port), &message, Duration::from_millis(timeout_ms)).await?;
            println!("{}", reply);
        }
        Commands::Pick { config, count, unhealthy } => {
            let config = load_config(&config)?;
            let pool = BackendPool::from_config(&config.backends);
            for backend in &unhealthy {
                pool.set_healthy(backend, false)?;
            }

            for (backend, healthy) in pool.snapshot() {
                println!("{:<24} {}", backend, if healthy { "healthy" } else { "unhealthy" });
            }
            println!();
            for i in 1..=count {
                match pool.next_healthy() {
                    Some(backend) => println!("{:>3}: {}", i, backend),
                    None => println!("{:>3}: no healthy backend", i),
                }
            }
        }
    }

    Ok(())
}
