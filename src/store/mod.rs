// Persistence of users, events and attendance

// Public API - what other modules can use
pub use models::{EventRecord, NewEvent, NewUser, UserModel, UserSummary};
pub use postgres::PostgresEventStore;
pub use repository::{find_user_summary, EventStore, InMemoryEventStore};
pub use seed::seed_database;

// Internal modules
pub mod models;
mod postgres;
mod repository;
pub mod seed;
