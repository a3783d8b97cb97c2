// Public API - what other modules can use
pub use handlers::{login, me};
pub use password::{hash_password, verify_password};
pub use service::SessionService;
pub use token::TokenConfig;
pub use types::{AuthClaims, AuthPayload, LoginRequest, MeResponse};

// Internal modules
mod handlers;
mod password;
mod service;
mod token;
mod types;
