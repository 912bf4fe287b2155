//! Rules adapter error types

use thiserror::Error;

/// Why a move could not be decoded or applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("cannot read '{input}' as a move: {reason}")]
    InvalidNotation { input: String, reason: String },

    #[error("'{0}' is not a legal move in this position")]
    Illegal(String),

    #[error("'{0}' is ambiguous, add the origin file or rank")]
    Ambiguous(String),

    #[error("the game is already over")]
    GameOver,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("malformed FEN: {0}")]
    Parse(String),

    #[error("FEN describes an impossible position: {0}")]
    Position(String),
}
