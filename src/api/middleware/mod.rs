//! API middleware components

pub mod logging;
pub mod session;

pub use logging::logging_middleware;
pub use session::{require_session, AuthenticatedUser};
