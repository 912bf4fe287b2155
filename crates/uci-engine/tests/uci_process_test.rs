//! Drives `UciEngine` against scripted engines run through `sh`.

#![cfg(unix)]

use std::time::Duration;

use chess_core::{rules, Position};
use uci_engine::{AnalysisEngine, EngineConfig, EngineError, EngineLauncher, UciEngine, UciLauncher};

const REPLYING_ENGINE: &str = r#"
while read -r line; do
  case "$line" in
    uci) echo "id name Scripted 1.0"; echo "id author tests"; echo "uciok" ;;
    isready) echo "readyok" ;;
    go*) echo "info depth 1 score cp 12 pv e7e5 g1f3"; echo "bestmove e7e5 ponder g1f3" ;;
    quit) exit 0 ;;
  esac
done
"#;

const SILENT_SEARCH_ENGINE: &str = r#"
while read -r line; do
  case "$line" in
    uci) echo "uciok" ;;
    isready) echo "readyok" ;;
    quit) exit 0 ;;
  esac
done
"#;

const ILLEGAL_MOVE_ENGINE: &str = r#"
while read -r line; do
  case "$line" in
    uci) echo "uciok" ;;
    isready) echo "readyok" ;;
    go*) echo "bestmove e2e4" ;;
    quit) exit 0 ;;
  esac
done
"#;

const SLOW_FIRST_SEARCH_ENGINE: &str = r#"
searches=0
while read -r line; do
  case "$line" in
    uci) echo "uciok" ;;
    isready) echo "readyok" ;;
    go*)
      searches=$((searches + 1))
      case "$searches" in
        1) sleep 1.5; echo "bestmove e7e5" ;;
        2) echo "bestmove c7c5" ;;
        *) echo "bestmove g8f6" ;;
      esac ;;
    quit) exit 0 ;;
  esac
done
"#;

fn scripted(script: &str) -> EngineConfig {
    EngineConfig {
        path: "sh".to_string(),
        args: vec!["-c".to_string(), script.to_string()],
        handshake_timeout: Duration::from_secs(2),
        ..EngineConfig::default()
    }
}

fn after_e4() -> Position {
    let start = Position::start();
    let mv = rules::decode(&start, "e4").unwrap();
    rules::apply(&start, &mv).unwrap()
}

#[tokio::test]
async fn test_handshake_and_best_move() {
    let mut engine = UciEngine::spawn(&scripted(REPLYING_ENGINE)).await.unwrap();
    assert_eq!(engine.name(), "Scripted 1.0");

    engine.new_game().await.unwrap();
    let position = after_e4();
    let mv = engine
        .best_move(&position, Duration::from_millis(50))
        .await
        .unwrap();
    assert_eq!(rules::uci(&mv), "e7e5");

    engine.shutdown().await;
}

#[tokio::test]
async fn test_launcher_yields_boxed_engine() {
    let launcher = UciLauncher::new(scripted(REPLYING_ENGINE));
    let mut engine = launcher.launch().await.unwrap();
    engine.new_game().await.unwrap();
    assert!(engine
        .best_move(&after_e4(), Duration::from_millis(50))
        .await
        .is_ok());
    engine.shutdown().await;
}

#[tokio::test]
async fn test_search_timeout() {
    let mut engine = UciEngine::spawn(&scripted(SILENT_SEARCH_ENGINE)).await.unwrap();
    let err = engine
        .best_move(&after_e4(), Duration::from_millis(50))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Timeout(_)), "got {err:?}");
    engine.shutdown().await;
}

#[tokio::test]
async fn test_illegal_engine_move_is_reported() {
    let mut engine = UciEngine::spawn(&scripted(ILLEGAL_MOVE_ENGINE)).await.unwrap();
    // e2e4 is not playable with black to move
    let err = engine
        .best_move(&after_e4(), Duration::from_millis(50))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::IllegalMove { .. }), "got {err:?}");
    engine.shutdown().await;
}

#[tokio::test]
async fn test_missing_binary() {
    let config = EngineConfig {
        path: "/nonexistent/engine-binary".to_string(),
        ..EngineConfig::default()
    };
    let err = UciEngine::spawn(&config).await.err().unwrap();
    assert!(matches!(err, EngineError::Spawn { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_engine_exiting_during_handshake() {
    let err = UciEngine::spawn(&scripted("exit 0")).await.err().unwrap();
    assert!(
        matches!(err, EngineError::Closed | EngineError::Io(_)),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_late_reply_is_not_taken_for_next_search() {
    let mut engine = UciEngine::spawn(&scripted(SLOW_FIRST_SEARCH_ENGINE))
        .await
        .unwrap();
    let position = after_e4();
    let think = Duration::from_millis(50);

    let err = engine.best_move(&position, think).await.unwrap_err();
    assert!(matches!(err, EngineError::Timeout(_)), "got {err:?}");

    // let the abandoned search answer
    tokio::time::sleep(Duration::from_secs(1)).await;

    let second = engine.best_move(&position, think).await.unwrap();
    assert_eq!(rules::uci(&second), "c7c5");
    let third = engine.best_move(&position, think).await.unwrap();
    assert_eq!(rules::uci(&third), "g8f6");

    engine.shutdown().await;
}
