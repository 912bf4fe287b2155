//! Move decoding, application and outcome evaluation.
//!
//! Thin adapter over `shakmaty`: the session only ever sees [`Position`],
//! [`Move`] and [`Outcome`], never the move generator itself.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use shakmaty::san::{San, SanError, SanPlus};
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Color, Move, Position as _};

use crate::error::MoveError;
use crate::position::Position;

/// Positions with this many halfmoves since the last capture or pawn move
/// are drawn without a claim.
pub const SEVENTY_FIVE_MOVE_HALFMOVES: u32 = 150;

static UCI_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-h][1-8][a-h][1-8][qrbn]?$").expect("valid regex"));
static ANNOTATIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[!?]+$").expect("valid regex"));
static ZERO_CASTLING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0-0(-0)?([+#]?)$").expect("valid regex"));

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    FivefoldRepetition,
    SeventyFiveMoveRule,
    Forfeit,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Method::Checkmate => "checkmate",
            Method::Stalemate => "stalemate",
            Method::InsufficientMaterial => "insufficient material",
            Method::FivefoldRepetition => "fivefold repetition",
            Method::SeventyFiveMoveRule => "the seventy-five move rule",
            Method::Forfeit => "forfeit",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ongoing,
    Decisive { winner: Color, method: Method },
    Drawn(Method),
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::Ongoing)
    }

    /// PGN result token.
    pub fn result(&self) -> &'static str {
        match self {
            Outcome::Ongoing => "*",
            Outcome::Decisive {
                winner: Color::White,
                ..
            } => "1-0",
            Outcome::Decisive {
                winner: Color::Black,
                ..
            } => "0-1",
            Outcome::Drawn(_) => "1/2-1/2",
        }
    }

    pub fn method(&self) -> Option<Method> {
        match self {
            Outcome::Ongoing => None,
            Outcome::Decisive { method, .. } => Some(*method),
            Outcome::Drawn(method) => Some(*method),
        }
    }
}

/// Decode viewer-supplied notation into a legal move for `position`.
///
/// Standard algebraic notation is the primary format (`Nf3`, `exd5`,
/// `O-O`, `e8=Q+`). Check suffixes, `!`/`?` annotations and zero castling
/// (`0-0`) are tolerated. Coordinate notation (`e2e4`) is accepted too.
pub fn decode(position: &Position, text: &str) -> Result<Move, MoveError> {
    let input = normalize(text);
    if input.is_empty() {
        return Err(MoveError::InvalidNotation {
            input,
            reason: "empty input".into(),
        });
    }

    if UCI_SHAPE.is_match(&input) {
        return decode_uci(position, &input);
    }

    let san: SanPlus = input.parse().map_err(|e| MoveError::InvalidNotation {
        input: input.clone(),
        reason: format!("{e}"),
    })?;
    to_move(position, &san.san, &input)
}

/// Decode a UCI coordinate move, as returned by analysis engines.
pub fn decode_uci(position: &Position, text: &str) -> Result<Move, MoveError> {
    let text = text.trim();
    let uci: UciMove = text.parse().map_err(|e| MoveError::InvalidNotation {
        input: text.to_string(),
        reason: format!("{e}"),
    })?;
    uci.to_move(position.chess())
        .map_err(|_| MoveError::Illegal(text.to_string()))
}

/// Apply `mv`, returning the successor position. `position` is left as is.
pub fn apply(position: &Position, mv: &Move) -> Result<Position, MoveError> {
    if !position.chess().is_legal(*mv) {
        return Err(MoveError::Illegal(uci(mv)));
    }
    let mut next = position.chess().clone();
    next.play_unchecked(*mv);
    Ok(Position::from_chess(next))
}

pub fn legal_moves(position: &Position) -> Vec<Move> {
    position.chess().legal_moves().into_iter().collect()
}

/// Terminal status that can be read off a single position.
///
/// Repetition needs the game history and is evaluated by [`crate::Game`].
pub fn outcome(position: &Position) -> Outcome {
    let chess = position.chess();
    if chess.is_checkmate() {
        Outcome::Decisive {
            winner: !chess.turn(),
            method: Method::Checkmate,
        }
    } else if chess.is_stalemate() {
        Outcome::Drawn(Method::Stalemate)
    } else if chess.is_insufficient_material() {
        Outcome::Drawn(Method::InsufficientMaterial)
    } else if chess.halfmoves() >= SEVENTY_FIVE_MOVE_HALFMOVES {
        Outcome::Drawn(Method::SeventyFiveMoveRule)
    } else {
        Outcome::Ongoing
    }
}

/// SAN for `mv` played from `before`, with a `+`/`#` suffix.
pub fn san(before: &Position, mv: &Move) -> String {
    let mut text = San::from_move(before.chess(), *mv).to_string();
    if let Ok(after) = apply(before, mv) {
        if after.chess().is_checkmate() {
            text.push('#');
        } else if after.is_check() {
            text.push('+');
        }
    }
    text
}

pub fn uci(mv: &Move) -> String {
    mv.to_uci(CastlingMode::Standard).to_string()
}

fn to_move(position: &Position, san: &San, input: &str) -> Result<Move, MoveError> {
    san.to_move(position.chess()).map_err(|e| match e {
        SanError::AmbiguousSan => MoveError::Ambiguous(input.to_string()),
        SanError::IllegalSan => MoveError::Illegal(input.to_string()),
    })
}

fn normalize(text: &str) -> String {
    let trimmed = text.trim();
    let stripped = ANNOTATIONS.replace(trimmed, "");
    if let Some(caps) = ZERO_CASTLING.captures(&stripped) {
        let side = if caps.get(1).is_some() { "O-O-O" } else { "O-O" };
        let suffix = caps.get(2).map_or("", |m| m.as_str());
        return format!("{side}{suffix}");
    }
    stripped.into_owned()
}
