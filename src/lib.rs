// Library crate for the event RSVP server
// This file exposes the public API for integration tests

pub mod app;
pub mod config;
pub mod events;
pub mod fanout;
pub mod session;
pub mod shared;
pub mod store;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use app::build_router;
pub use config::ServerConfig;
pub use fanout::{BroadcastDispatcher, ConnectionRegistry, DomainEvent, GroupId};
pub use shared::{AppError, AppState};
pub use store::{EventStore, InMemoryEventStore};
