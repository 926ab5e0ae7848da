use std::net::SocketAddr;

use async_trait::async_trait;
use serde_json::Value;
use shared::protocol::Response;
use thiserror::Error;
use tokio::{
    io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpListener,
    },
};
use tracing::{debug, info};

pub const MAX_MESSAGE_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("peer closed the connection")]
    PeerClosed,
    #[error("undecodable message: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("message is not a field/value mapping")]
    NotAMapping,
    #[error("message exceeds {limit} bytes")]
    MessageTooLarge { limit: usize },
    #[error("receive attempted while a reply is still pending")]
    ReplyPending,
    #[error("send attempted without a pending request")]
    NoPendingRequest,
    #[error("response could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Strict request/reply exchange: every `receive` must be answered by exactly
/// one `send` before the next `receive`.
#[async_trait]
pub trait Transport: Send {
    async fn receive(&mut self) -> Result<Value, TransportError>;
    async fn send(&mut self, response: &Response) -> Result<(), TransportError>;
}

struct Peer {
    addr: SocketAddr,
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

/// Newline-delimited JSON over a bound TCP listener. The first client to
/// connect owns the session for the lifetime of the transport.
pub struct TcpReplyTransport {
    listener: TcpListener,
    peer: Option<Peer>,
    awaiting_reply: bool,
}

impl TcpReplyTransport {
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            peer: None,
            awaiting_reply: false,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.listener.local_addr()?)
    }

    async fn accept(&self) -> Result<Peer, TransportError> {
        let (stream, addr) = self.listener.accept().await?;
        info!(%addr, "client connected");
        let (reader, writer) = stream.into_split();
        Ok(Peer {
            addr,
            reader: BufReader::new(reader),
            writer,
        })
    }
}

#[async_trait]
impl Transport for TcpReplyTransport {
    async fn receive(&mut self) -> Result<Value, TransportError> {
        if self.awaiting_reply {
            return Err(TransportError::ReplyPending);
        }
        if self.peer.is_none() {
            self.peer = Some(self.accept().await?);
        }
        let Some(peer) = self.peer.as_mut() else {
            return Err(TransportError::PeerClosed);
        };

        let mut line = Vec::new();
        let read = (&mut peer.reader)
            .take(MAX_MESSAGE_BYTES as u64 + 1)
            .read_until(b'\n', &mut line)
            .await?;
        if read == 0 {
            info!(addr = %peer.addr, "client disconnected");
            return Err(TransportError::PeerClosed);
        }
        if read > MAX_MESSAGE_BYTES && line.last() != Some(&b'\n') {
            return Err(TransportError::MessageTooLarge {
                limit: MAX_MESSAGE_BYTES,
            });
        }

        // Bytes go straight to serde_json so invalid UTF-8 surfaces as a decode fault.
        let message: Value = serde_json::from_slice(&line).map_err(TransportError::Decode)?;
        if !message.is_object() {
            return Err(TransportError::NotAMapping);
        }
        debug!(bytes = read, "request received");
        self.awaiting_reply = true;
        Ok(message)
    }

    async fn send(&mut self, response: &Response) -> Result<(), TransportError> {
        if !self.awaiting_reply {
            return Err(TransportError::NoPendingRequest);
        }
        let Some(peer) = self.peer.as_mut() else {
            return Err(TransportError::NoPendingRequest);
        };

        let mut payload = serde_json::to_vec(response).map_err(TransportError::Encode)?;
        payload.push(b'\n');
        peer.writer.write_all(&payload).await?;
        peer.writer.flush().await?;
        self.awaiting_reply = false;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
