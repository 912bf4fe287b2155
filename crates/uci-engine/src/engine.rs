//! Engine traits seen by the session.

use std::time::Duration;

use async_trait::async_trait;
use chess_core::{Move, Position};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::uci::UciEngine;

/// An opponent that proposes moves for a position.
///
/// One instance serves exactly one game. Implementations must release their
/// resources on drop even when [`AnalysisEngine::shutdown`] is never called.
#[async_trait]
pub trait AnalysisEngine: Send {
    /// Display name, e.g. `Stockfish 16`.
    fn name(&self) -> &str;

    /// Reset engine state before the first move of a game.
    async fn new_game(&mut self) -> Result<(), EngineError>;

    /// Best move for `position`, searched for at most `think_time`.
    async fn best_move(
        &mut self,
        position: &Position,
        think_time: Duration,
    ) -> Result<Move, EngineError>;

    /// Stop the engine gracefully.
    async fn shutdown(&mut self);
}

/// Creates a fresh engine for every session.
#[async_trait]
pub trait EngineLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn AnalysisEngine>, EngineError>;
}

/// Launches [`UciEngine`] child processes.
#[derive(Clone, Debug)]
pub struct UciLauncher {
    config: EngineConfig,
}

impl UciLauncher {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

#[async_trait]
impl EngineLauncher for UciLauncher {
    async fn launch(&self) -> Result<Box<dyn AnalysisEngine>, EngineError> {
        let engine = UciEngine::spawn(&self.config).await?;
        Ok(Box::new(engine))
    }
}
