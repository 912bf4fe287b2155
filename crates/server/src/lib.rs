//! Line-oriented plugin host with a chess session against a UCI engine.

pub mod communicator;
pub mod config;
pub mod error;
pub mod host;
pub mod output;
pub mod plugins;
pub mod registry;
pub mod session;
