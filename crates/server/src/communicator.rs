//! Duplex text channel between a plugin and a remote viewer.

use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::warn;

use crate::error::CommError;

/// Longest input line accepted from a viewer, in bytes.
pub const MAX_LINE_BYTES: u64 = 4096;

const IAC: u8 = 255;
const SB: u8 = 250;
const SE: u8 = 240;

/// Line-oriented text channel to one viewer.
#[async_trait]
pub trait Communicator: Send {
    /// Send one message. Multi-line messages are allowed.
    async fn send(&mut self, text: &str) -> Result<(), CommError>;

    /// Wait for the next input line, without its line terminator.
    async fn receive(&mut self) -> Result<String, CommError>;

    /// Send, logging instead of returning a failure. A broken connection
    /// surfaces on the next [`Communicator::receive`].
    async fn say(&mut self, text: &str) {
        if let Err(e) = self.send(text).await {
            warn!(error = %e, "Failed to send to viewer");
        }
    }
}

/// Telnet-style communicator over a TCP connection.
pub struct TcpCommunicator {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    peer: SocketAddr,
}

impl TcpCommunicator {
    pub fn new(stream: TcpStream) -> std::io::Result<Self> {
        let peer = stream.peer_addr()?;
        let (reader, writer) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(reader),
            writer,
            peer,
        })
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Skip input up to and including the next newline, or to EOF.
    async fn discard_rest_of_line(&mut self) -> Result<(), CommError> {
        loop {
            let available = self.reader.fill_buf().await?;
            if available.is_empty() {
                return Ok(());
            }
            let (consumed, done) = match available.iter().position(|&b| b == b'\n') {
                Some(i) => (i + 1, true),
                None => (available.len(), false),
            };
            self.reader.consume(consumed);
            if done {
                return Ok(());
            }
        }
    }
}

#[async_trait]
impl Communicator for TcpCommunicator {
    async fn send(&mut self, text: &str) -> Result<(), CommError> {
        self.writer.write_all(to_wire(text).as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn receive(&mut self) -> Result<String, CommError> {
        let mut buf = Vec::new();
        let read = (&mut self.reader)
            .take(MAX_LINE_BYTES)
            .read_until(b'\n', &mut buf)
            .await?;
        if read == 0 {
            return Err(CommError::Disconnected);
        }
        if read as u64 == MAX_LINE_BYTES && buf.last() != Some(&b'\n') {
            warn!(peer = %self.peer, "Discarding overlong input line");
            self.discard_rest_of_line().await?;
            return Ok(String::new());
        }
        Ok(clean_line(&buf))
    }
}

/// CRLF line endings, always terminated.
fn to_wire(text: &str) -> String {
    let mut wire = text.replace("\r\n", "\n").replace('\n', "\r\n");
    if !wire.ends_with("\r\n") {
        wire.push_str("\r\n");
    }
    wire
}

/// Strip telnet negotiation and control characters from a raw input line.
fn clean_line(raw: &[u8]) -> String {
    let mut data = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] != IAC {
            data.push(raw[i]);
            i += 1;
            continue;
        }
        match raw.get(i + 1) {
            Some(&IAC) => {
                data.push(IAC);
                i += 2;
            }
            Some(&SB) => {
                // Subnegotiation runs until IAC SE
                i += 2;
                while i < raw.len() && !(raw[i] == IAC && raw.get(i + 1) == Some(&SE)) {
                    i += 1;
                }
                i += 2;
            }
            // WILL / WONT / DO / DONT carry one option byte
            Some(&cmd) if (251..=254).contains(&cmd) => i += 3,
            _ => i += 2,
        }
    }

    String::from_utf8_lossy(&data)
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}
