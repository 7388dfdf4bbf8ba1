//! watchsim: run a fleet of simulated smartwatches against a telemetry server.
//!
//! Starts one client per configured credential and keeps them streaming
//! until interrupted with Ctrl-C.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use watchsim::Supervisor;
use watchsim::config::SimulatorConfig;

#[derive(Parser)]
#[command(name = "watchsim")]
#[command(about = "Simulated smartwatches streaming telemetry over TCP")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "watchsim.toml", env = "WATCHSIM_CONFIG")]
    config: PathBuf,

    /// Telemetry server address (overrides config file)
    #[arg(short, long, env = "WATCHSIM_SERVER")]
    server: Option<SocketAddr>,

    /// Number of clients to start (overrides config file)
    #[arg(short = 'n', long, env = "WATCHSIM_CLIENTS")]
    clients: Option<usize>,

    /// Delay after each telemetry record in milliseconds (overrides config file)
    #[arg(long, env = "WATCHSIM_SEND_INTERVAL_MS")]
    send_interval_ms: Option<u64>,

    /// Reconnect back-off in milliseconds (overrides config file)
    #[arg(long, env = "WATCHSIM_RECONNECT_DELAY_MS")]
    reconnect_delay_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("watchsim=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    info!("Starting watchsim");

    let mut config = if cli.config.exists() {
        info!(path = %cli.config.display(), "Loading config");
        SimulatorConfig::from_file(&cli.config)?
    } else {
        info!("Config file not found, using defaults");
        SimulatorConfig::default()
    };

    // Apply CLI overrides
    if let Some(server) = cli.server {
        config.server = server;
    }
    if let Some(clients) = cli.clients {
        config.clients = clients;
    }
    if let Some(interval) = cli.send_interval_ms {
        config.timing.send_interval_ms = interval;
    }
    if let Some(delay) = cli.reconnect_delay_ms {
        config.timing.reconnect_delay_ms = delay;
    }
    config.validate()?;

    info!(
        server = %config.server,
        clients = config.clients,
        send_interval_ms = config.timing.send_interval_ms,
        reconnect_delay_ms = config.timing.reconnect_delay_ms,
        "Simulator configured"
    );

    let mut supervisor = Supervisor::new(config.client_config());
    for credential in config.active_credentials() {
        supervisor.spawn(credential.clone());
    }

    tokio::signal::ctrl_c().await?;
    info!("Interrupted, stopping clients");

    let summaries = supervisor.shutdown_all().await;
    let retries: u64 = summaries.iter().map(|s| s.retries).sum();
    info!(clients = summaries.len(), retries, "watchsim stopped");

    Ok(())
}
