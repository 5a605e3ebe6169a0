//! Heart Match session server (default binary).
//!
//! Starts the TCP adapter and runs the synchronous session loop: every inbound
//! message is applied to its client's game in arrival order, and the replies
//! are handed back to the server for delivery.

use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::prelude::*;

use heart_match::adapter::{Adapter, ServerConfig, SessionHost};

fn main() -> Result<()> {
    init_logging();

    let config = ServerConfig::from_env();
    let base_seed = config.seed.unwrap_or_else(clock_seed);

    let mut adapter = Adapter::start(config)?;
    info!(addr = %adapter.local_addr(), base_seed, "heart-match ready");

    let mut host = SessionHost::new(base_seed);
    while let Some(inbound) = adapter.recv_blocking() {
        for reply in host.handle(inbound) {
            adapter.send(reply);
        }
    }

    info!("session server stopped");
    Ok(())
}

/// Install the fmt subscriber; `HEART_MATCH_LOG` picks the level (default info).
fn init_logging() {
    let level = std::env::var("HEART_MATCH_LOG")
        .ok()
        .and_then(|s| Level::from_str(s.trim()).ok())
        .unwrap_or(Level::INFO);

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(tracing_subscriber::filter::LevelFilter::from_level(level))
        .init();
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(1)
}
