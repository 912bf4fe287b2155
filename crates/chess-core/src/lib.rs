//! Chess rules, position history and board rendering for interactive sessions.
//!
//! Move legality is delegated to `shakmaty`; this crate only wraps it in the
//! shapes a turn-based session needs.

pub use shakmaty;

pub mod error;
pub mod game;
pub mod position;
pub mod record;
pub mod render;
pub mod rules;

pub use error::{FenError, MoveError};
pub use game::Game;
pub use position::Position;
pub use rules::{Method, Outcome};
pub use shakmaty::{Color, Move};
