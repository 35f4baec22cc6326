//! Remuco client — entry point.
//!
//! ```text
//! remuco-client                   Connect with defaults
//! remuco-client --config <path>   Use custom config TOML
//! remuco-client --gen-config      Dump default config and exit
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use remuco_client::config::ClientConfig;
use remuco_client::session::{EXIT_SILENTLY, SessionDriver};
use remuco_client::ui::ScreenRegistry;

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "remuco-client", about = "Remote control for media players")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "remuco-client.toml")]
    config: PathBuf,

    /// Host override (overrides config). Example: 192.168.1.100
    #[arg(long)]
    host: Option<String>,

    /// Port override (overrides config).
    #[arg(long)]
    port: Option<u16>,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.gen_config {
        let text = toml::to_string_pretty(&ClientConfig::default())?;
        println!("{text}");
        return Ok(());
    }

    let mut config = ClientConfig::load(&cli.config);
    if let Some(host) = cli.host {
        config.connection.host = host;
    }
    if let Some(port) = cli.port {
        config.connection.port = port;
    }

    // Init tracing.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("remuco-client v{}", env!("CARGO_PKG_VERSION"));

    // ── 1. Run the startup sequence ─────────────────────────────

    let mut driver = SessionDriver::new(ScreenRegistry::new());
    let shutdown = driver.shutdown_token();

    let result = driver.init(&config).await;

    if result == EXIT_SILENTLY {
        // User cancelled during negotiation; leave without an alert.
        return Ok(());
    }
    if !result.is_empty() {
        error!("{result}");
        for line in driver.log_view().lines() {
            eprintln!("{line}");
        }
        std::process::exit(1);
    }

    // ── 2. Run until shutdown ───────────────────────────────────

    tokio::select! {
        _ = shutdown.cancelled() => {
            info!("session requested shutdown");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted");
        }
    }

    // ── 3. Teardown ─────────────────────────────────────────────

    driver.shut_down();

    Ok(())
}
