//! TCP front door: accepts connections and dispatches commands to plugins.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::communicator::{Communicator, TcpCommunicator};
use crate::config::Config;
use crate::error::ServerError;
use crate::output::OutputChannel;
use crate::registry::Registry;

pub const GREETING: &str = "Welcome! Type 'help' to list commands or 'quit' to disconnect.";
pub const QUIT_COMMAND: &str = "quit";

pub struct Host {
    listener: TcpListener,
    registry: Arc<Registry>,
    output: OutputChannel,
    plugin_data: mpsc::Receiver<String>,
}

impl Host {
    pub async fn bind(config: &Config, registry: Registry) -> Result<Self, ServerError> {
        let addr = config.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        let (output, plugin_data) = OutputChannel::new(config.plugin_data_capacity);
        Ok(Self {
            listener,
            registry: Arc::new(registry),
            output,
            plugin_data,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until `shutdown` resolves. Open connections are dropped on
    /// return, which also stops any engine they own.
    pub async fn serve_until<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        let Host {
            listener,
            registry,
            output,
            plugin_data,
        } = self;

        let drain = tokio::spawn(drain_plugin_data(plugin_data));

        let mut connections = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!(open = connections.len(), "Shutting down");
                    break;
                }
                Some(joined) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(e) = joined {
                        warn!(error = %e, "Connection task failed");
                    }
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        info!(%peer, "Connection opened");
                        let registry = registry.clone();
                        let output = output.clone();
                        connections.spawn(async move {
                            handle_connection(stream, &registry, &output).await;
                            info!(%peer, "Connection closed");
                        });
                    }
                    Err(e) => warn!(error = %e, "Failed to accept connection"),
                },
            }
        }

        connections.shutdown().await;
        // The drain ends once the last sender is gone
        drop(output);
        match drain.await {
            Ok(items) => debug!(items, "Plugin data drained"),
            Err(e) => warn!(error = %e, "Plugin data drain failed"),
        }
        Ok(())
    }
}

/// Log every plugin data item until all senders are dropped. Returns the
/// number of items logged.
async fn drain_plugin_data(mut plugin_data: mpsc::Receiver<String>) -> usize {
    let mut items = 0;
    while let Some(item) = plugin_data.recv().await {
        info!(target: "plugin_data", "{item}");
        items += 1;
    }
    items
}

async fn handle_connection(stream: TcpStream, registry: &Registry, output: &OutputChannel) {
    match TcpCommunicator::new(stream) {
        Ok(mut comm) => command_loop(&mut comm, registry, output).await,
        Err(e) => warn!(error = %e, "Failed to set up connection"),
    }
}

/// Prompt for command keywords and run the matching plugin until the
/// viewer quits or disconnects.
pub async fn command_loop(
    comm: &mut dyn Communicator,
    registry: &Registry,
    output: &OutputChannel,
) {
    comm.say(GREETING).await;

    loop {
        comm.say("> ").await;
        let line = match comm.receive().await {
            Ok(line) => line,
            Err(e) => {
                debug!(error = %e, "Viewer left");
                return;
            }
        };

        let Some(keyword) = line.split_whitespace().next() else {
            continue;
        };

        if keyword.eq_ignore_ascii_case(QUIT_COMMAND) {
            comm.say("Bye!").await;
            return;
        }

        match registry.get(keyword) {
            Some(plugin) => {
                info!(keyword, "Running plugin");
                plugin.execute(comm, output).await;
            }
            None => {
                comm.say(&format!(
                    "Unknown command '{keyword}'. Type 'help' to list commands."
                ))
                .await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_drain_keeps_items_queued_before_close() {
        let (output, rx) = OutputChannel::new(8);
        let drain = tokio::spawn(drain_plugin_data(rx));
        let late = output.clone();
        output.emit("first");
        late.emit("[White \"Guest\"]");
        drop(output);
        drop(late);
        assert_eq!(drain.await.unwrap(), 2);
    }
}
