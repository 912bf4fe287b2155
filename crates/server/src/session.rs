//! Turn-based chess session between a remote viewer and an analysis engine.
//!
//! [`Session`] is the pure state machine: it owns the game, tracks whose
//! turn it is and refuses anything out of order. [`SessionRunner`] drives it,
//! reading viewer moves from a [`Communicator`] and asking an
//! [`AnalysisEngine`] for replies, strictly one side at a time.

use std::time::Duration;

use chess_core::render::render;
use chess_core::{rules, Color, Game, Move, Outcome, Position};
use tracing::{info, warn};
use uci_engine::AnalysisEngine;

use crate::communicator::Communicator;
use crate::config::Config;
use crate::error::SessionError;
use crate::output::OutputChannel;

pub const TAG: &str = "[Chess V1.0]";
pub const QUIT_TOKEN: &str = "exit";
pub const PROMPT: &str = "> ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Viewer,
    Engine,
}

impl Turn {
    fn flipped(self) -> Self {
        match self {
            Turn::Viewer => Turn::Engine,
            Turn::Engine => Turn::Viewer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingViewerMove,
    AwaitingEngineMove,
    Terminated,
}

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Quit,
    GameOver(Outcome),
    Disconnected,
    EngineUnavailable,
}

/// One accepted move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ply {
    pub san: String,
    pub uci: String,
}

#[derive(Debug, Clone)]
pub struct Session {
    viewer: Color,
    turn: Turn,
    game: Game,
    quit: bool,
}

impl Session {
    /// New game from the starting position. White moves first, so the
    /// engine opens when the viewer plays black.
    pub fn new(viewer: Color) -> Self {
        Self::from_game(viewer, Game::new())
    }

    pub fn from_game(viewer: Color, game: Game) -> Self {
        let turn = if game.position().turn() == viewer {
            Turn::Viewer
        } else {
            Turn::Engine
        };
        Self {
            viewer,
            turn,
            game,
            quit: false,
        }
    }

    pub fn viewer_side(&self) -> Color {
        self.viewer
    }

    pub fn engine_side(&self) -> Color {
        !self.viewer
    }

    pub fn turn(&self) -> Turn {
        self.turn
    }

    pub fn state(&self) -> SessionState {
        if self.quit || self.outcome().is_terminal() {
            return SessionState::Terminated;
        }
        match self.turn {
            Turn::Viewer => SessionState::AwaitingViewerMove,
            Turn::Engine => SessionState::AwaitingEngineMove,
        }
    }

    pub fn position(&self) -> &Position {
        self.game.position()
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn outcome(&self) -> Outcome {
        self.game.outcome()
    }

    /// Board as seen from the viewer's side.
    pub fn render(&self) -> String {
        render(self.position(), self.viewer)
    }

    /// Decode and play viewer input. On error nothing changes.
    pub fn submit_viewer_move(&mut self, text: &str) -> Result<Ply, SessionError> {
        self.expect(SessionState::AwaitingViewerMove)?;
        let mv = rules::decode(self.position(), text)?;
        self.play(&mv)
    }

    pub fn submit_engine_move(&mut self, mv: &Move) -> Result<Ply, SessionError> {
        self.expect(SessionState::AwaitingEngineMove)?;
        self.play(mv)
    }

    /// The engine gave up; the viewer wins.
    pub fn engine_forfeit(&mut self) {
        self.game.forfeit(self.engine_side());
    }

    pub fn quit(&mut self) {
        self.quit = true;
    }

    fn expect(&self, wanted: SessionState) -> Result<(), SessionError> {
        match self.state() {
            SessionState::Terminated => Err(SessionError::Terminated),
            state if state == wanted => Ok(()),
            _ => Err(SessionError::NotYourTurn),
        }
    }

    fn play(&mut self, mv: &Move) -> Result<Ply, SessionError> {
        let uci = rules::uci(mv);
        let san = self.game.play(mv)?;
        self.turn = self.turn.flipped();
        Ok(Ply { san, uci })
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SessionSettings {
    pub think_time: Duration,
    pub max_engine_failures: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        Self {
            think_time: config.think_time,
            max_engine_failures: config.max_engine_failures.max(1),
        }
    }
}

/// Drives one [`Session`] to its end.
pub struct SessionRunner<'a> {
    comm: &'a mut dyn Communicator,
    output: &'a OutputChannel,
    engine: &'a mut dyn AnalysisEngine,
    settings: SessionSettings,
    engine_failures: u32,
}

impl<'a> SessionRunner<'a> {
    pub fn new(
        comm: &'a mut dyn Communicator,
        output: &'a OutputChannel,
        engine: &'a mut dyn AnalysisEngine,
        settings: SessionSettings,
    ) -> Self {
        Self {
            comm,
            output,
            engine,
            settings,
            engine_failures: 0,
        }
    }

    pub async fn run(&mut self, session: &mut Session) -> EndReason {
        self.comm.say(&session.render()).await;

        loop {
            let end = match session.state() {
                SessionState::AwaitingViewerMove => self.viewer_turn(session).await,
                SessionState::AwaitingEngineMove => self.engine_turn(session).await,
                SessionState::Terminated => Some(EndReason::GameOver(session.outcome())),
            };
            if let Some(end) = end {
                info!(?end, plies = session.game().moves().len(), "Session finished");
                return end;
            }
        }
    }

    async fn viewer_turn(&mut self, session: &mut Session) -> Option<EndReason> {
        self.comm.say(PROMPT).await;
        let input = match self.comm.receive().await {
            Ok(input) => input,
            Err(e) => {
                warn!(error = %e, "Error receiving input");
                return Some(EndReason::Disconnected);
            }
        };
        let input = input.trim();
        info!(input, "Received move input");

        if input == QUIT_TOKEN {
            session.quit();
            self.announce(&format!("{TAG} Goodbye!")).await;
            return Some(EndReason::Quit);
        }

        match session.submit_viewer_move(input) {
            Ok(ply) => {
                self.output.emit(format!("{TAG} Viewer played: {}", ply.san));
                self.comm.say(&session.render()).await;
                self.finish_if_over(session).await
            }
            Err(e) => {
                self.comm
                    .say(&format!("{TAG} Invalid move: {input}. Error: {e}"))
                    .await;
                None
            }
        }
    }

    async fn engine_turn(&mut self, session: &mut Session) -> Option<EndReason> {
        let reply = self
            .engine
            .best_move(session.position(), self.settings.think_time)
            .await;

        let failure = match reply {
            Ok(mv) => match session.submit_engine_move(&mv) {
                Ok(ply) => {
                    self.engine_failures = 0;
                    let name = self.engine.name().to_string();
                    self.announce(&format!("{TAG} {name} played: {}", ply.uci))
                        .await;
                    self.comm.say(&session.render()).await;
                    return self.finish_if_over(session).await;
                }
                Err(e) => e.to_string(),
            },
            Err(e) => e.to_string(),
        };

        self.engine_failures += 1;
        warn!(
            error = %failure,
            attempt = self.engine_failures,
            max = self.settings.max_engine_failures,
            "Failed to get engine move"
        );
        if self.engine_failures < self.settings.max_engine_failures {
            return None;
        }

        session.engine_forfeit();
        let name = self.engine.name().to_string();
        self.announce(&format!("{TAG} {name} stopped responding and forfeits."))
            .await;
        self.finish_if_over(session).await
    }

    async fn finish_if_over(&mut self, session: &Session) -> Option<EndReason> {
        let outcome = session.outcome();
        let method = outcome.method()?;
        self.announce(&format!(
            "{TAG} Game completed. {} by {method}.",
            outcome.result()
        ))
        .await;
        self.comm.say(&format!("{TAG} Goodbye!")).await;
        Some(EndReason::GameOver(outcome))
    }

    /// Tell the viewer and mirror the line to the plugin data channel.
    async fn announce(&mut self, text: &str) {
        self.output.emit(text);
        self.comm.say(text).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fen_of(session: &Session) -> String {
        session.position().to_fen()
    }

    #[test]
    fn test_initial_state_follows_side() {
        assert_eq!(
            Session::new(Color::White).state(),
            SessionState::AwaitingViewerMove
        );
        assert_eq!(
            Session::new(Color::Black).state(),
            SessionState::AwaitingEngineMove
        );
    }

    #[test]
    fn test_turns_alternate_strictly() {
        let mut session = Session::new(Color::White);
        let script = ["e4", "e5", "Nf3", "Nc6", "Bb5", "a6"];
        for (i, text) in script.iter().enumerate() {
            let expected = if i % 2 == 0 { Turn::Viewer } else { Turn::Engine };
            assert_eq!(session.turn(), expected);
            match session.turn() {
                Turn::Viewer => {
                    session.submit_viewer_move(text).unwrap();
                }
                Turn::Engine => {
                    let mv = rules::decode(session.position(), text).unwrap();
                    session.submit_engine_move(&mv).unwrap();
                }
            }
        }
        assert_eq!(session.turn(), Turn::Viewer);
        assert_eq!(session.game().moves().len(), script.len());
    }

    #[test]
    fn test_rejected_input_changes_nothing() {
        let mut session = Session::new(Color::White);
        session.submit_viewer_move("d4").unwrap();
        let mv = rules::decode(session.position(), "d5").unwrap();
        session.submit_engine_move(&mv).unwrap();

        let before = fen_of(&session);
        for bad in ["", "banana", "Ke3", "d5", "e2e5", "Qxd8"] {
            assert!(session.submit_viewer_move(bad).is_err(), "{bad} accepted");
            assert_eq!(fen_of(&session), before);
            assert_eq!(session.turn(), Turn::Viewer);
            assert_eq!(session.game().moves().len(), 2);
        }
    }

    #[test]
    fn test_out_of_turn_moves_are_refused() {
        let mut session = Session::new(Color::Black);
        assert!(matches!(
            session.submit_viewer_move("e4"),
            Err(SessionError::NotYourTurn)
        ));
        let mut session = Session::new(Color::White);
        let e4 = rules::decode(session.position(), "e4").unwrap();
        assert!(matches!(
            session.submit_engine_move(&e4),
            Err(SessionError::NotYourTurn)
        ));
    }

    #[test]
    fn test_no_moves_after_terminal_outcome() {
        let mut session = Session::new(Color::Black);
        for (i, text) in ["f3", "e5", "g4", "Qh4#"].iter().enumerate() {
            if i % 2 == 0 {
                let mv = rules::decode(session.position(), text).unwrap();
                session.submit_engine_move(&mv).unwrap();
            } else {
                session.submit_viewer_move(text).unwrap();
            }
        }
        assert_eq!(session.state(), SessionState::Terminated);
        assert_eq!(session.outcome().result(), "0-1");
        assert!(matches!(
            session.submit_viewer_move("Qxf2"),
            Err(SessionError::Terminated)
        ));
        let mv = rules::legal_moves(session.position()).into_iter().next();
        assert!(mv.is_none());
    }

    #[test]
    fn test_quit_terminates() {
        let mut session = Session::new(Color::White);
        session.quit();
        assert_eq!(session.state(), SessionState::Terminated);
        assert!(session.submit_viewer_move("e4").is_err());
        assert_eq!(session.outcome(), Outcome::Ongoing);
    }

    #[test]
    fn test_engine_forfeit_awards_viewer() {
        let mut session = Session::new(Color::Black);
        session.engine_forfeit();
        assert_eq!(session.state(), SessionState::Terminated);
        assert_eq!(session.outcome().result(), "0-1");
    }
}
