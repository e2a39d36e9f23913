use std::time::Duration;

use clap::Parser;
use craftroom::prelude::*;
use tracing_subscriber::EnvFilter;

/// Authoritative Craftroom game server.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = "0.0.0.0:5001")]
    bind: String,

    /// Simulation ticks per second
    #[arg(short, long, default_value_t = 1)]
    tick_rate: u32,

    /// Seconds per day and per night
    #[arg(long, default_value_t = 60)]
    phase_secs: u64,

    /// Seconds an empty room lives before closing (0 keeps it)
    #[arg(long, default_value_t = 300)]
    room_idle_secs: u64,

    /// Seconds of client silence before a connection is dropped (0 waits forever)
    #[arg(long, default_value_t = 300)]
    idle_secs: u64,

    /// Fixed map seed for every room
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), CraftroomError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let room_config = RoomConfig {
        tick: TickConfig::with_rate(args.tick_rate),
        phase_duration: Duration::from_secs(args.phase_secs),
        idle_timeout: Duration::from_secs(args.room_idle_secs),
        seed: args.seed,
        ..RoomConfig::default()
    };
    let idle = (args.idle_secs > 0).then(|| Duration::from_secs(args.idle_secs));

    let server = CraftroomServer::builder()
        .bind(&args.bind)
        .room_config(room_config)
        .idle_timeout(idle)
        .build(MemoryStore::new())
        .await?;

    tokio::select! {
        result = server.run() => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
            Ok(())
        }
    }
}
