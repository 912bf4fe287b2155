//! Finished-game records and PGN export.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::game::Game;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub event: String,
    pub date: String, // PGN style, "2024.01.31"
    pub white: String,
    pub black: String,
    pub result: String, // "1-0", "0-1", "1/2-1/2", "*"
    pub termination: Option<String>,
    pub moves: Vec<String>, // SAN notation
}

impl GameRecord {
    pub fn from_game(event: &str, white: &str, black: &str, date: NaiveDate, game: &Game) -> Self {
        let outcome = game.outcome();
        Self {
            event: event.to_string(),
            date: date.format("%Y.%m.%d").to_string(),
            white: white.to_string(),
            black: black.to_string(),
            result: outcome.result().to_string(),
            termination: outcome.method().map(|m| m.to_string()),
            moves: game.moves().to_vec(),
        }
    }

    pub fn to_pgn(&self) -> String {
        let mut pgn = String::new();
        for (key, value) in [
            ("Event", self.event.as_str()),
            ("Site", "?"),
            ("Date", self.date.as_str()),
            ("White", self.white.as_str()),
            ("Black", self.black.as_str()),
            ("Result", self.result.as_str()),
        ] {
            pgn.push_str(&format!("[{key} \"{}\"]\n", escape(value)));
        }
        if let Some(termination) = &self.termination {
            pgn.push_str(&format!("[Termination \"{}\"]\n", escape(termination)));
        }
        pgn.push('\n');

        let mut movetext: Vec<String> = Vec::with_capacity(self.moves.len() + 1);
        for (i, san) in self.moves.iter().enumerate() {
            if i % 2 == 0 {
                movetext.push(format!("{}. {san}", i / 2 + 1));
            } else {
                movetext.push(san.clone());
            }
        }
        movetext.push(self.result.clone());
        pgn.push_str(&movetext.join(" "));
        pgn.push('\n');
        pgn
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
