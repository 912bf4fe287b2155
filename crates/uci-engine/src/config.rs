//! Engine process configuration from environment variables

use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Path to the engine binary
    pub path: String,

    /// Extra command line arguments for the engine
    pub args: Vec<String>,

    /// UCI `Threads` option
    pub threads: u32,

    /// UCI `Hash` option in megabytes
    pub hash_mb: u32,

    /// Upper bound for the `uci`/`isready` handshake
    pub handshake_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: "stockfish".to_string(),
            args: Vec::new(),
            threads: 1,
            hash_mb: 16,
            handshake_timeout: Duration::from_secs(5),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            path: env::var("STOCKFISH_PATH").unwrap_or(defaults.path),
            args: Vec::new(),
            threads: env::var("ENGINE_THREADS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.threads),
            hash_mb: env::var("ENGINE_HASH_MB")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.hash_mb),
            handshake_timeout: defaults.handshake_timeout,
        }
    }
}
