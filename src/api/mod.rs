//! API layer - HTTP endpoints and middleware

pub mod auth;
pub mod middleware;
pub mod profile;
pub mod router;
pub mod state;
pub mod types;

pub use router::create_router;
pub use state::AppState;
