//! Position history for one game.

use shakmaty::{Color, Move};

use crate::error::MoveError;
use crate::position::Position;
use crate::rules::{self, Method, Outcome};

/// Occurrences of one position that end the game as a draw.
pub const FIVEFOLD: usize = 5;

/// A game from its first position to the current one.
///
/// Every accepted move appends a new [`Position`]; earlier entries stay
/// available through [`Game::history`].
#[derive(Debug, Clone)]
pub struct Game {
    positions: Vec<Position>,
    /// `repetition_key` of each entry in `positions`
    keys: Vec<String>,
    moves: Vec<String>,
    forfeited_by: Option<Color>,
}

impl Default for Game {
    fn default() -> Self {
        Self::from_position(Position::start())
    }
}

impl Game {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_position(position: Position) -> Self {
        Self {
            keys: vec![position.repetition_key()],
            positions: vec![position],
            moves: Vec::new(),
            forfeited_by: None,
        }
    }

    pub fn position(&self) -> &Position {
        // `positions` always holds at least the starting position
        &self.positions[self.positions.len() - 1]
    }

    pub fn history(&self) -> &[Position] {
        &self.positions
    }

    /// SAN of every move played so far.
    pub fn moves(&self) -> &[String] {
        &self.moves
    }

    /// Play `mv` and return its SAN. Refused once the game is over.
    pub fn play(&mut self, mv: &Move) -> Result<String, MoveError> {
        if self.outcome().is_terminal() {
            return Err(MoveError::GameOver);
        }
        let before = self.position();
        let next = rules::apply(before, mv)?;
        let san = rules::san(before, mv);
        self.keys.push(next.repetition_key());
        self.positions.push(next);
        self.moves.push(san.clone());
        Ok(san)
    }

    /// `loser` can no longer continue; the opponent wins.
    pub fn forfeit(&mut self, loser: Color) {
        if !self.outcome().is_terminal() {
            self.forfeited_by = Some(loser);
        }
    }

    pub fn outcome(&self) -> Outcome {
        if let Some(loser) = self.forfeited_by {
            return Outcome::Decisive {
                winner: !loser,
                method: Method::Forfeit,
            };
        }

        let current = self.position();
        let outcome = rules::outcome(current);
        if outcome.is_terminal() {
            return outcome;
        }

        if self.repetitions() >= FIVEFOLD {
            return Outcome::Drawn(Method::FivefoldRepetition);
        }

        Outcome::Ongoing
    }

    /// How often the current position has occurred, itself included.
    pub fn repetitions(&self) -> usize {
        match self.keys.last() {
            Some(current) => self.keys.iter().filter(|key| *key == current).count(),
            None => 0,
        }
    }
}
