//! Gladius server binary.
//!
//! ```text
//! gladius-server --bind 0.0.0.0:7777 --idle-timeout-secs 300
//! ```

use std::time::Duration;

use clap::Parser;
use gladius::prelude::*;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Turn-based two-player battle server.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Address to listen on.
    #[arg(short, long, env = "GLADIUS_BIND", default_value = "127.0.0.1:7777")]
    bind: String,

    /// Seconds a new connection has to send its login line.
    #[arg(long, env = "GLADIUS_LOGIN_TIMEOUT_SECS", default_value_t = 5)]
    login_timeout_secs: u64,

    /// Close logged-in connections after this many silent seconds.
    #[arg(long, env = "GLADIUS_IDLE_TIMEOUT_SECS")]
    idle_timeout_secs: Option<u64>,

    /// Command channel size for each arena.
    #[arg(long, env = "GLADIUS_ARENA_CHANNEL_SIZE", default_value_t = 64)]
    arena_channel_size: usize,

    /// Log filter, used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_filter: String,
}

impl Args {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            bind_addr: self.bind.clone(),
            login_timeout: Duration::from_secs(self.login_timeout_secs),
            idle_timeout: self.idle_timeout_secs.map(Duration::from_secs),
        }
    }

    fn arena_config(&self) -> ArenaConfig {
        ArenaConfig {
            channel_size: self.arena_channel_size.max(1),
        }
    }
}

fn setup_logging(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    setup_logging(&args);

    let server = GladiusServer::builder()
        .config(args.server_config())
        .arena_config(args.arena_config())
        .build()
        .await?;
    tracing::info!(addr = %server.local_addr()?, "listening");

    tokio::select! {
        result = server.run() => result?,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!("shutdown signal received");
        }
    }

    Ok(())
}
