//! Profile endpoints for the authenticated member

use axum::{extract::State, routing::get, Router};
use serde::{Deserialize, Serialize};

use crate::api::middleware::AuthenticatedUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::user::{Profile, User, UserId};

/// Day/month/year without zero padding, e.g. `5/3/2024`
const JOINED_AT_FORMAT: &str = "%-d/%-m/%Y";

/// Create the profile router; callers nest it under `/api` behind `require_session`
pub fn create_profile_router() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(update_profile))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
}

/// Profile view; empty optional strings are left out
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: UserId,
    pub email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub first_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub phone: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub member_code: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub membership_level: String,
    pub points: i64,
    pub joined_at: String,
}

impl ProfileResponse {
    fn from_user(user: &User) -> Self {
        let profile = user.profile();
        let membership = user.membership();

        Self {
            id: user.id(),
            email: user.email().to_string(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            phone: profile.phone.clone(),
            member_code: membership.member_code.clone(),
            membership_level: membership.level.clone(),
            points: membership.points,
            joined_at: user.created_at().format(JOINED_AT_FORMAT).to_string(),
        }
    }
}

/// GET /api/profile
pub async fn get_profile(AuthenticatedUser(user): AuthenticatedUser) -> Json<ProfileResponse> {
    Json(ProfileResponse::from_user(&user))
}

/// PUT /api/profile
pub async fn update_profile(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = Profile {
        first_name: request.first_name,
        last_name: request.last_name,
        phone: request.phone,
    };

    let updated = state
        .profile_service
        .update_profile(user, profile)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to persist profile");
            ApiError::internal("failed to update profile")
        })?;

    Ok(Json(ProfileResponse::from_user(&updated)))
}
