//! Session verification and identity resolution

use std::sync::Arc;

use tracing::debug;

use crate::domain::auth::{AuthError, BearerCredential, SubjectClaim};
use crate::domain::user::{User, UserRepository};

use super::jwt::JwtService;

/// Resolves a presented `Authorization` value to a stored user
///
/// Stateless apart from the shared signing key and store handle, so one
/// instance serves every request concurrently.
pub struct SessionVerifier {
    tokens: Arc<JwtService>,
    repository: Arc<dyn UserRepository>,
}

impl SessionVerifier {
    pub fn new(tokens: Arc<JwtService>, repository: Arc<dyn UserRepository>) -> Self {
        Self { tokens, repository }
    }

    /// Run every verification step, stopping at the first failure
    pub async fn verify(&self, presented: Option<&str>) -> Result<User, AuthError> {
        let credential = BearerCredential::parse(presented)?;

        let claims = self.tokens.validate(credential.token())?;
        debug!("Token signature and expiry verified");

        let user_id = SubjectClaim::decode(&claims.sub)?.into_user_id()?;

        let user = self
            .repository
            .get(user_id)
            .await
            .map_err(AuthError::ResolutionFailure)?
            .ok_or(AuthError::UnknownIdentity(user_id.get()))?;

        debug!(user_id = %user.id(), "Session resolved");

        Ok(user)
    }
}
