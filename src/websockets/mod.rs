// Public API
pub use control::RoomControlHandler;
pub use handler::{serve_connection, websocket_handler};
pub use socket::{Connection, MessageHandler, SocketError, SocketWrapper};

// Internal modules
mod control;
mod handler;
mod socket;
