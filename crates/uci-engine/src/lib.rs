//! Analysis engine adapter: a UCI engine running as a child process.

pub mod config;
pub mod engine;
pub mod error;
pub mod uci;

pub use config::EngineConfig;
pub use engine::{AnalysisEngine, EngineLauncher, UciLauncher};
pub use error::EngineError;
pub use uci::UciEngine;
