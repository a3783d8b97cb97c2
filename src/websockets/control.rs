use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::fanout::{
    ClientMessage, ConnectionHandle, ConnectionRegistry, OutboundSender, WebSocketMessage,
};

use super::socket::MessageHandler;

/// Applies `joinEventRoom` / `leaveEventRoom` frames to the registry
///
/// One handler is created per connection; `reply` is that connection's own
/// outbound channel, used to report rejected frames.
pub struct RoomControlHandler {
    registry: Arc<ConnectionRegistry>,
    reply: OutboundSender,
}

impl RoomControlHandler {
    pub fn new(registry: Arc<ConnectionRegistry>, reply: OutboundSender) -> Self {
        Self { registry, reply }
    }

    /// Sends an `error` frame back to the connection; returns whether it was queued
    fn reject(&self, connection: &ConnectionHandle, reason: String) -> bool {
        let frame = match WebSocketMessage::error(reason).to_json() {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "Failed to serialize error frame");
                return false;
            }
        };

        if self.reply.send(frame).is_err() {
            debug!(
                connection_id = %connection.id(),
                "Error frame dropped, connection already closed"
            );
            return false;
        }
        true
    }
}

#[async_trait]
impl MessageHandler for RoomControlHandler {
    async fn handle_message(&self, connection: &ConnectionHandle, message: String) {
        debug!(
            connection_id = %connection.id(),
            message = %message,
            "Received control frame"
        );

        match serde_json::from_str::<ClientMessage>(&message) {
            Ok(ClientMessage::JoinEventRoom(event_id)) => {
                self.registry.join(connection, event_id);
            }
            Ok(ClientMessage::LeaveEventRoom(event_id)) => {
                self.registry.leave(connection, &event_id);
            }
            Err(e) => {
                warn!(
                    connection_id = %connection.id(),
                    error = %e,
                    "Failed to parse control frame"
                );
                self.reject(connection, format!("Unrecognized message: {}", e));
            }
        }
    }
}
