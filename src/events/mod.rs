// Public API - what other modules can use
pub use handlers::{get_event, join_event, list_events};
pub use service::EventService;

// Internal modules
mod handlers;
mod service;
