use std::sync::Arc;

use async_trait::async_trait;
use chess_core::record::GameRecord;
use chess_core::Color;
use tracing::{error, info};
use uci_engine::EngineLauncher;

use crate::communicator::Communicator;
use crate::output::OutputChannel;
use crate::registry::Plugin;
use crate::session::{EndReason, Session, SessionRunner, SessionSettings, TAG};

const VIEWER_NAME: &str = "Guest";

/// Chess against an analysis engine, one engine process per game.
pub struct ChessPlugin {
    launcher: Arc<dyn EngineLauncher>,
    settings: SessionSettings,
}

impl ChessPlugin {
    pub fn new(launcher: Arc<dyn EngineLauncher>, settings: SessionSettings) -> Self {
        Self { launcher, settings }
    }

    /// Play one game with the viewer on `viewer`'s side.
    pub async fn play(
        &self,
        comm: &mut dyn Communicator,
        output: &OutputChannel,
        viewer: Color,
    ) -> EndReason {
        comm.say(&format!("{TAG} Welcome to Chess! Type 'exit' to quit."))
            .await;
        comm.say(&format!("{TAG} You are playing as {}.", side_name(viewer)))
            .await;

        let mut engine = match self.launcher.launch().await {
            Ok(engine) => engine,
            Err(e) => {
                error!(error = %e, "Failed to start analysis engine");
                comm.say(&format!(
                    "{TAG} The chess engine is unavailable right now. Please try again later."
                ))
                .await;
                return EndReason::EngineUnavailable;
            }
        };

        if let Err(e) = engine.new_game().await {
            error!(error = %e, "Failed to start new game on engine");
            engine.shutdown().await;
            comm.say(&format!(
                "{TAG} The chess engine is unavailable right now. Please try again later."
            ))
            .await;
            return EndReason::EngineUnavailable;
        }

        let engine_name = engine.name().to_string();
        info!(engine = %engine_name, viewer = side_name(viewer), "Chess session started");

        let mut session = Session::new(viewer);
        let end = SessionRunner::new(comm, output, engine.as_mut(), self.settings)
            .run(&mut session)
            .await;
        engine.shutdown().await;

        if !session.game().moves().is_empty() {
            let (white, black) = match viewer {
                Color::White => (VIEWER_NAME, engine_name.as_str()),
                Color::Black => (engine_name.as_str(), VIEWER_NAME),
            };
            let date = chrono::Local::now().date_naive();
            let record = GameRecord::from_game("Casual game", white, black, date, session.game());
            output.emit(record.to_pgn());
        }

        end
    }
}

#[async_trait]
impl Plugin for ChessPlugin {
    fn description(&self) -> &str {
        "Play a game of Chess against Stockfish."
    }

    async fn execute(&self, comm: &mut dyn Communicator, output: &OutputChannel) {
        let viewer = if rand::random::<bool>() {
            Color::White
        } else {
            Color::Black
        };
        self.play(comm, output, viewer).await;
    }
}

fn side_name(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}
