//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::auth::{AuthService, SessionVerifier};
use crate::infrastructure::user::ProfileService;

/// Services shared by every handler; cloning only bumps reference counts
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub session_verifier: Arc<SessionVerifier>,
    pub profile_service: Arc<ProfileService>,
}

impl AppState {
    pub fn new(
        auth_service: Arc<AuthService>,
        session_verifier: Arc<SessionVerifier>,
        profile_service: Arc<ProfileService>,
    ) -> Self {
        Self {
            auth_service,
            session_verifier,
            profile_service,
        }
    }
}
