use std::env;
use std::time::Duration;

use uci_engine::EngineConfig;

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub engine: EngineConfig,
    /// Fixed thinking budget per engine move
    pub think_time: Duration,
    /// Consecutive engine failures on one turn before the engine forfeits
    pub max_engine_failures: u32,
    /// Buffered items on the plugin data channel before new ones are dropped
    pub plugin_data_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            engine: EngineConfig::default(),
            think_time: Duration::from_millis(1000),
            max_engine_failures: 3,
            plugin_data_capacity: 64,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            engine: EngineConfig::from_env(),
            think_time: env::var("ENGINE_THINK_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.think_time),
            max_engine_failures: env::var("ENGINE_MAX_FAILURES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_engine_failures),
            plugin_data_capacity: env::var("PLUGIN_DATA_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.plugin_data_capacity),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
