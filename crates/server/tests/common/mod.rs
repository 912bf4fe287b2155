//! Scripted stand-ins for the viewer connection and the analysis engine.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chess_core::{rules, Move, Position};
use server::communicator::Communicator;
use server::error::CommError;
use uci_engine::{AnalysisEngine, EngineError, EngineLauncher};

/// Board frame line; one per rendered board.
pub const BOARD_BORDER: &str = "   +--------------------------------+";

/// Replays viewer input lines, then reports a disconnect.
#[derive(Default)]
pub struct ScriptedViewer {
    inputs: VecDeque<String>,
    pub sent: Vec<String>,
}

impl ScriptedViewer {
    pub fn new(inputs: &[&str]) -> Self {
        Self {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            sent: Vec::new(),
        }
    }

    /// Number of boards rendered so far.
    pub fn boards(&self) -> usize {
        self.sent
            .iter()
            .filter(|m| m.starts_with(BOARD_BORDER))
            .count()
    }

    pub fn saw(&self, needle: &str) -> bool {
        self.sent.iter().any(|m| m.contains(needle))
    }

    pub fn count(&self, needle: &str) -> usize {
        self.sent.iter().filter(|m| m.contains(needle)).count()
    }

    pub fn last(&self) -> Option<&str> {
        self.sent.last().map(String::as_str)
    }
}

#[async_trait]
impl Communicator for ScriptedViewer {
    async fn send(&mut self, text: &str) -> Result<(), CommError> {
        self.sent.push(text.to_string());
        Ok(())
    }

    async fn receive(&mut self) -> Result<String, CommError> {
        self.inputs.pop_front().ok_or(CommError::Disconnected)
    }
}

/// Observations shared between a test and the engine it handed out.
#[derive(Clone, Default)]
pub struct EngineProbe {
    pub searches: Arc<AtomicUsize>,
    pub new_games: Arc<AtomicUsize>,
    pub shut_down: Arc<AtomicBool>,
    pub dropped: Arc<AtomicBool>,
    pub think_times: Arc<Mutex<Vec<Duration>>>,
}

impl EngineProbe {
    pub fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    pub fn was_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    pub fn was_dropped(&self) -> bool {
        self.dropped.load(Ordering::SeqCst)
    }

    /// Budget passed to every search, in call order.
    pub fn think_times(&self) -> Vec<Duration> {
        self.think_times.lock().unwrap().clone()
    }
}

/// One scripted engine reply.
#[derive(Clone, Debug)]
pub enum Reply {
    /// Play this UCI move
    Play(&'static str),
    /// Fail the search
    Fail,
}

/// Engine that follows a script and then plays the first legal move.
pub struct ScriptedEngine {
    replies: VecDeque<Reply>,
    probe: EngineProbe,
    fail_new_game: bool,
}

impl ScriptedEngine {
    pub fn new(replies: Vec<Reply>, probe: EngineProbe) -> Self {
        Self {
            replies: replies.into(),
            probe,
            fail_new_game: false,
        }
    }
}

#[async_trait]
impl AnalysisEngine for ScriptedEngine {
    fn name(&self) -> &str {
        "Stockfish"
    }

    async fn new_game(&mut self) -> Result<(), EngineError> {
        self.probe.new_games.fetch_add(1, Ordering::SeqCst);
        if self.fail_new_game {
            return Err(EngineError::Closed);
        }
        Ok(())
    }

    async fn best_move(
        &mut self,
        position: &Position,
        think_time: Duration,
    ) -> Result<Move, EngineError> {
        self.probe.searches.fetch_add(1, Ordering::SeqCst);
        self.probe.think_times.lock().unwrap().push(think_time);
        match self.replies.pop_front() {
            Some(Reply::Play(uci)) => {
                rules::decode_uci(position, uci).map_err(|e| EngineError::IllegalMove {
                    mv: uci.to_string(),
                    reason: e.to_string(),
                })
            }
            Some(Reply::Fail) => Err(EngineError::Timeout(think_time)),
            None => rules::legal_moves(position)
                .into_iter()
                .next()
                .ok_or_else(|| EngineError::Protocol("bestmove (none)".into())),
        }
    }

    async fn shutdown(&mut self) {
        self.probe.shut_down.store(true, Ordering::SeqCst);
    }
}

impl Drop for ScriptedEngine {
    fn drop(&mut self) {
        self.probe.dropped.store(true, Ordering::SeqCst);
    }
}

/// Hands out one [`ScriptedEngine`] per launch, or fails to start.
pub struct ScriptedLauncher {
    replies: Vec<Reply>,
    pub probe: EngineProbe,
    pub fail: bool,
    pub fail_new_game: bool,
    pub launches: Arc<AtomicUsize>,
}

impl ScriptedLauncher {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies,
            probe: EngineProbe::default(),
            fail: false,
            fail_new_game: false,
            launches: Arc::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }

    /// Starts engines that refuse to begin a game.
    pub fn failing_new_game() -> Self {
        Self {
            fail_new_game: true,
            ..Self::new(Vec::new())
        }
    }
}

#[async_trait]
impl EngineLauncher for ScriptedLauncher {
    async fn launch(&self) -> Result<Box<dyn AnalysisEngine>, EngineError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(EngineError::Spawn {
                path: "stockfish".into(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not installed"),
            });
        }
        let mut engine = ScriptedEngine::new(self.replies.clone(), self.probe.clone());
        engine.fail_new_game = self.fail_new_game;
        Ok(Box::new(engine))
    }
}
