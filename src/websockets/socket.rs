use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::StreamExt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

use crate::fanout::ConnectionHandle;

/// Text-frame transport under one subscriber connection
///
/// Outbound frames are already-serialized broadcast envelopes; inbound frames
/// are room control messages.
#[async_trait]
pub trait SocketWrapper: Send {
    async fn send_message(&mut self, frame: String) -> Result<(), SocketError>;

    /// Next control frame; `None` once the client has gone away
    async fn receive_message(&mut self) -> Result<Option<String>, SocketError>;

    async fn close(&mut self) -> Result<(), SocketError>;
}

/// Reacts to control frames sent by a registered connection
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle_message(&self, connection: &ConnectionHandle, frame: String);
}

#[derive(Debug, Error)]
pub enum SocketError {
    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Receive failed: {0}")]
    ReceiveFailed(String),
}

#[async_trait]
impl SocketWrapper for WebSocket {
    async fn send_message(&mut self, frame: String) -> Result<(), SocketError> {
        self.send(Message::Text(frame))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }

    async fn receive_message(&mut self) -> Result<Option<String>, SocketError> {
        loop {
            match self.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text)),
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // binary and ping/pong
                Some(Err(e)) => return Err(SocketError::ReceiveFailed(e.to_string())),
            }
        }
    }

    async fn close(&mut self) -> Result<(), SocketError> {
        self.send(Message::Close(None))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }
}

/// Socket side of a registered subscriber
///
/// Forwards whatever the dispatcher queued on the connection's channel and
/// feeds control frames to the handler. Returns once either side closes.
pub struct Connection {
    handle: ConnectionHandle,
    socket: Box<dyn SocketWrapper>,
    outbound_receiver: mpsc::UnboundedReceiver<String>,
    message_handler: Arc<dyn MessageHandler>,
}

impl Connection {
    pub fn new(
        handle: ConnectionHandle,
        socket: Box<dyn SocketWrapper>,
        outbound_receiver: mpsc::UnboundedReceiver<String>,
        message_handler: Arc<dyn MessageHandler>,
    ) -> Self {
        Self {
            handle,
            socket,
            outbound_receiver,
            message_handler,
        }
    }

    pub async fn run(mut self) -> Result<(), SocketError> {
        loop {
            tokio::select! {
                queued = self.outbound_receiver.recv() => {
                    let Some(frame) = queued else { break };
                    self.socket.send_message(frame).await?;
                }

                control = self.socket.receive_message() => {
                    let Some(frame) = control? else { break };
                    self.message_handler.handle_message(&self.handle, frame).await;
                }
            }
        }

        debug!(connection_id = %self.handle.id(), "Closing socket");
        if let Err(e) = self.socket.close().await {
            debug!(connection_id = %self.handle.id(), error = %e, "Socket close failed");
        }
        Ok(())
    }
}
