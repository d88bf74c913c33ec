//! Pointroom server binary.
//!
//! # Usage
//!
//! ```bash
//! # Listen on all interfaces
//! pointroom --bind 0.0.0.0:8080
//!
//! # Drop participants that stay silent for five minutes
//! pointroom --idle-timeout-secs 300 --log-level debug
//! ```

use std::time::Duration;

use clap::Parser;
use pointroom::{PointroomServer, ServerConfig, DEFAULT_BIND_ADDR};
use pointroom_room::RoomConfig;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Pointroom estimation server
#[derive(Parser, Debug)]
#[command(name = "pointroom")]
#[command(about = "Real-time planning poker rooms over WebSockets")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = DEFAULT_BIND_ADDR)]
    bind: String,

    /// Detach participants silent for this many seconds (0 disables)
    #[arg(long, default_value = "0")]
    idle_timeout_secs: u64,

    /// Seconds a new connection gets to finish the WebSocket upgrade
    #[arg(long, default_value = "10")]
    handshake_timeout_secs: u64,

    /// Capacity of each room's command queue
    #[arg(long, default_value = "64")]
    room_queue: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    tracing::info!("Pointroom server starting");
    tracing::info!("Binding to {}", args.bind);

    let config = ServerConfig {
        bind_addr: args.bind,
        room: RoomConfig {
            channel_capacity: args.room_queue,
        },
        idle_timeout: (args.idle_timeout_secs > 0)
            .then(|| Duration::from_secs(args.idle_timeout_secs)),
        handshake_timeout: Duration::from_secs(args.handshake_timeout_secs),
    };

    let server = PointroomServer::builder().config(config).build().await?;

    tracing::info!("Server listening on {}", server.local_addr()?);

    server.run().await?;

    Ok(())
}
