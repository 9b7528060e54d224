//! Bearer-session middleware and the authenticated-identity extractor

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::auth::AuthError;
use crate::domain::user::User;

/// Identity attached to the request once its session is verified
///
/// Also usable as an extractor; without a preceding [`require_session`]
/// the handler answers 401 `unauthenticated`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// Verify the `Authorization` header and attach the resolved user
///
/// Stops the request with the translated error on any failure; the next
/// handler only runs for a fully verified session.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let presented = match request.headers().get(header::AUTHORIZATION) {
        None => None,
        Some(value) => Some(value.to_str().map_err(|_| {
            AuthError::MalformedCredential("header is not visible ASCII".to_string())
        })?),
    };

    let user = state.session_verifier.verify(presented).await?;

    request.extensions_mut().insert(AuthenticatedUser(user));

    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(ApiError::unauthenticated)
    }
}
