//! Auxiliary one-way channel for data plugins publish to the host.

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;

/// Non-blocking sink for plugin data. Items are dropped when nobody keeps up.
#[derive(Clone, Debug)]
pub struct OutputChannel {
    tx: mpsc::Sender<String>,
}

impl OutputChannel {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    pub fn emit(&self, item: impl Into<String>) {
        match self.tx.try_send(item.into()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => debug!("Plugin data channel full, dropping item"),
            Err(TrySendError::Closed(_)) => debug!("Plugin data channel closed, dropping item"),
        }
    }
}
