//! UCI engine wrapper over a child process (async I/O)

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use chess_core::{rules, Move, Position};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::engine::AnalysisEngine;
use crate::error::EngineError;

/// Extra time allowed past `movetime` before the search is stopped.
pub const SEARCH_GRACE: Duration = Duration::from_millis(500);

/// How long `quit` may take before the process is killed.
const QUIT_TIMEOUT: Duration = Duration::from_secs(1);

/// UCI engine instance
pub struct UciEngine {
    process: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    name: String,
    handshake_timeout: Duration,
    /// A `go` whose `bestmove` has not been read yet
    search_pending: bool,
}

impl UciEngine {
    /// Spawn the engine process and complete the UCI handshake
    pub async fn spawn(config: &EngineConfig) -> Result<Self, EngineError> {
        let mut process = Command::new(&config.path)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EngineError::Spawn {
                path: config.path.clone(),
                source,
            })?;

        let stdin = process.stdin.take().ok_or(EngineError::Closed)?;
        let stdout = process.stdout.take().ok_or(EngineError::Closed)?;

        let mut engine = Self {
            process,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            name: config.path.clone(),
            handshake_timeout: config.handshake_timeout,
            search_pending: false,
        };

        match timeout(config.handshake_timeout, engine.handshake(config)).await {
            Ok(result) => result?,
            Err(_) => return Err(EngineError::Timeout(config.handshake_timeout)),
        }

        debug!(engine = %engine.name, "Engine ready");
        Ok(engine)
    }

    async fn handshake(&mut self, config: &EngineConfig) -> Result<(), EngineError> {
        self.send("uci").await?;
        loop {
            let line = self.read_line().await?;
            if let Some(name) = parse_id_name(&line) {
                self.name = name.to_string();
            } else if line == "uciok" {
                break;
            }
        }

        self.send(&format!("setoption name Threads value {}", config.threads))
            .await?;
        self.send(&format!("setoption name Hash value {}", config.hash_mb))
            .await?;
        self.send("isready").await?;
        self.wait_for("readyok").await
    }

    /// Send a command to the engine
    async fn send(&mut self, cmd: &str) -> Result<(), EngineError> {
        debug!(cmd, "engine <");
        self.stdin.write_all(format!("{cmd}\n").as_bytes()).await?;
        self.stdin.flush().await?;
        Ok(())
    }

    /// Next non-empty line. Cancel safe.
    async fn read_line(&mut self) -> Result<String, EngineError> {
        loop {
            let line = self.stdout.next_line().await?.ok_or(EngineError::Closed)?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            debug!(line = trimmed, "engine >");
            return Ok(trimmed.to_string());
        }
    }

    /// Wait for a specific response line
    async fn wait_for(&mut self, expected: &str) -> Result<(), EngineError> {
        loop {
            if self.read_line().await? == expected {
                return Ok(());
            }
        }
    }

    /// Consume the `bestmove` of an earlier search that overran, so the next
    /// reply belongs to the next `go`.
    async fn settle_search(&mut self, limit: Duration) -> Result<(), EngineError> {
        if !self.search_pending {
            return Ok(());
        }
        match timeout(limit, self.read_bestmove()).await {
            Err(_) => Err(EngineError::Timeout(limit)),
            Ok(Err(e @ (EngineError::Closed | EngineError::Io(_)))) => Err(e),
            Ok(stale) => {
                debug!(engine = %self.name, ?stale, "Discarded reply to an abandoned search");
                self.search_pending = false;
                Ok(())
            }
        }
    }

    /// Read search output until `bestmove`, returning the move in UCI notation
    async fn read_bestmove(&mut self) -> Result<String, EngineError> {
        loop {
            let line = self.read_line().await?;
            if line.starts_with("info") && line.contains(" pv ") {
                let pv = parse_pv(&line);
                debug!(
                    cp = ?parse_cp(&line),
                    mate = ?parse_mate(&line),
                    pv = %pv.join(" "),
                    "engine search info"
                );
            } else if line.starts_with("bestmove") {
                return match parse_bestmove(&line) {
                    Some("(none)") | None => Err(EngineError::Protocol(line)),
                    Some(mv) => Ok(mv.to_string()),
                };
            }
        }
    }
}

#[async_trait]
impl AnalysisEngine for UciEngine {
    fn name(&self) -> &str {
        &self.name
    }

    async fn new_game(&mut self) -> Result<(), EngineError> {
        self.send("ucinewgame").await?;
        self.send("isready").await?;
        let limit = self.handshake_timeout;
        timeout(limit, self.wait_for("readyok"))
            .await
            .map_err(|_| EngineError::Timeout(limit))?
    }

    async fn best_move(
        &mut self,
        position: &Position,
        think_time: Duration,
    ) -> Result<Move, EngineError> {
        let limit = think_time + SEARCH_GRACE;
        self.settle_search(limit).await?;

        self.send(&format!("position fen {}", position.to_fen())).await?;
        self.send(&format!("go movetime {}", think_time.as_millis()))
            .await?;
        self.search_pending = true;

        let reply = match timeout(limit, self.read_bestmove()).await {
            Ok(reply) => reply,
            Err(_) => {
                warn!(engine = %self.name, ?limit, "Engine overran its think time, stopping search");
                self.send("stop").await?;
                timeout(SEARCH_GRACE, self.read_bestmove())
                    .await
                    .map_err(|_| EngineError::Timeout(limit + SEARCH_GRACE))?
            }
        };
        self.search_pending = false;
        let reply = reply?;

        rules::decode_uci(position, &reply).map_err(|e| EngineError::IllegalMove {
            mv: reply,
            reason: e.to_string(),
        })
    }

    /// Send quit and wait for the process to exit
    async fn shutdown(&mut self) {
        let _ = self.send("quit").await;
        if timeout(QUIT_TIMEOUT, self.process.wait()).await.is_err() {
            warn!(engine = %self.name, "Engine ignored quit, killing it");
            let _ = self.process.start_kill();
            let _ = self.process.wait().await;
        }
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        // Best-effort synchronous kill in drop
        let _ = self.process.start_kill();
    }
}

/// Move token of a `bestmove` line
pub fn parse_bestmove(line: &str) -> Option<&str> {
    let mut parts = line.split_whitespace();
    match parts.next() {
        Some("bestmove") => parts.next(),
        _ => None,
    }
}

/// Engine name from an `id name` line
pub fn parse_id_name(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("id name")?;
    let name = rest.trim();
    (!name.is_empty()).then_some(name)
}

/// Parse centipawn score from info line
pub fn parse_cp(line: &str) -> Option<i32> {
    value_after(line, "cp")
}

/// Parse mate score from info line
pub fn parse_mate(line: &str) -> Option<i32> {
    value_after(line, "mate")
}

fn value_after(line: &str, key: &str) -> Option<i32> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    for (i, part) in parts.iter().enumerate() {
        if *part == key && i + 1 < parts.len() {
            return parts[i + 1].parse().ok();
        }
    }
    None
}

/// Parse PV moves from info line
pub fn parse_pv(line: &str) -> Vec<String> {
    line.split_whitespace()
        .skip_while(|part| *part != "pv")
        .skip(1)
        .take_while(|part| !part.starts_with("bmc") && *part != "string")
        .map(str::to_string)
        .collect()
}
