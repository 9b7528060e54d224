//! Profile service for authenticated users

use std::sync::Arc;

use tracing::info;

use crate::domain::user::{Profile, User, UserRepository};
use crate::domain::DomainError;

/// Reads and edits the profile of an already-resolved user
pub struct ProfileService {
    repository: Arc<dyn UserRepository>,
}

impl ProfileService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    /// Overwrite the editable profile fields and persist the record
    pub async fn update_profile(&self, mut user: User, profile: Profile) -> Result<User, DomainError> {
        user.set_profile(profile);

        let updated = self.repository.update(&user).await?;
        info!(user_id = %updated.id(), "Profile updated");

        Ok(updated)
    }
}
