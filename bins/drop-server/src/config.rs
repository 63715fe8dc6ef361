//! Server configuration loaded from environment variables.

use std::path::PathBuf;

use anyhow::{Context, Result};
use drop_decay::DecaySchedule;

#[derive(Clone, Debug)]
pub struct Config {
    /// CSV or JSON airdrop file to commit to.
    pub airdrop_file: PathBuf,
    /// Unix time at which entitlements start to decay.
    pub decay_start: u64,
    /// Seconds over which entitlements decay to zero.
    pub decay_duration: u64,
    /// Address to bind the HTTP server.
    pub bind_addr: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let airdrop_file = std::env::var("DROP_AIRDROP_FILE")
            .map(PathBuf::from)
            .context("DROP_AIRDROP_FILE is required")?;

        let decay_start: u64 = std::env::var("DROP_DECAY_START")
            .unwrap_or_else(|_| "0".to_string())
            .parse()
            .context("DROP_DECAY_START must be a unix timestamp in seconds")?;

        let decay_duration: u64 = std::env::var("DROP_DECAY_DURATION")
            .unwrap_or_else(|_| "0".to_string())
            .parse()
            .context("DROP_DECAY_DURATION must be a number of seconds")?;

        let bind_addr =
            std::env::var("DROP_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        Ok(Config {
            airdrop_file,
            decay_start,
            decay_duration,
            bind_addr,
        })
    }

    pub fn schedule(&self) -> DecaySchedule {
        DecaySchedule::new(self.decay_start, self.decay_duration)
    }
}
