//! Immutable game position with FEN serialization.

use std::fmt;
use std::str::FromStr;

use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Piece, Position as _, Square};

use crate::error::FenError;

pub const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Complete game state: placement, side to move, castling rights,
/// en passant square and move counters.
///
/// A `Position` is never mutated. Applying a move produces a new one, see
/// [`crate::rules::apply`].
#[derive(Debug, Clone, Default)]
pub struct Position {
    inner: Chess,
}

impl Position {
    /// The standard starting position.
    pub fn start() -> Self {
        Self::default()
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let parsed: Fen = fen
            .trim()
            .parse()
            .map_err(|e| FenError::Parse(format!("{e}")))?;
        let inner: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| FenError::Position(format!("{e}")))?;
        Ok(Self { inner })
    }

    pub fn to_fen(&self) -> String {
        Fen::from_position(&self.inner, EnPassantMode::Legal).to_string()
    }

    /// Placement, side to move, castling and en passant fields of the FEN.
    /// Two positions with equal keys are repetitions of each other.
    pub fn repetition_key(&self) -> String {
        self.to_fen()
            .split_whitespace()
            .take(4)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn turn(&self) -> Color {
        self.inner.turn()
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.inner.board().piece_at(square)
    }

    pub fn is_check(&self) -> bool {
        self.inner.is_check()
    }

    pub fn fullmoves(&self) -> u32 {
        u32::from(self.inner.fullmoves())
    }

    pub(crate) fn from_chess(inner: Chess) -> Self {
        Self { inner }
    }

    pub(crate) fn chess(&self) -> &Chess {
        &self.inner
    }
}

impl FromStr for Position {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fen())
    }
}
