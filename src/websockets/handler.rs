use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::fanout::ConnectionRegistry;
use crate::shared::AppState;

use super::control::RoomControlHandler;
use super::socket::{Connection, SocketWrapper};

/// WebSocket endpoint for real-time event updates
///
/// GET /ws
/// Any client may connect; it receives global broadcasts immediately and
/// room broadcasts after sending `joinEventRoom`.
pub async fn websocket_handler(ws: WebSocketUpgrade, State(app_state): State<AppState>) -> Response {
    info!("WebSocket connection requested");

    let registry = Arc::clone(&app_state.registry);
    ws.on_upgrade(move |socket| serve_connection(Box::new(socket), registry))
}

/// Registers the socket, runs it until disconnect, then unregisters it
///
/// Unregistration happens on every exit path, clean or not.
pub async fn serve_connection(socket: Box<dyn SocketWrapper>, registry: Arc<ConnectionRegistry>) {
    // Create the outbound channel (dispatcher -> client)
    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();

    let handle = registry.register(outbound_sender.clone());
    let message_handler = Arc::new(RoomControlHandler::new(
        Arc::clone(&registry),
        outbound_sender,
    ));

    let connection = Connection::new(handle.clone(), socket, outbound_receiver, message_handler);

    match connection.run().await {
        Ok(()) => {
            info!(connection_id = %handle.id(), "WebSocket connection closed cleanly");
        }
        Err(e) => {
            warn!(
                connection_id = %handle.id(),
                error = ?e,
                "WebSocket connection error"
            );
        }
    }

    registry.unregister(&handle);
}
