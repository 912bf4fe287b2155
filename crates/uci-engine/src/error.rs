//! Engine error types

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to spawn engine '{path}': {source}")]
    Spawn {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Engine I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Engine closed its output")]
    Closed,

    #[error("Engine did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Unexpected engine reply: {0}")]
    Protocol(String),

    #[error("Engine proposed illegal move '{mv}': {reason}")]
    IllegalMove { mv: String, reason: String },
}
