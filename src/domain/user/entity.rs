//! User entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix of every generated member code
pub const MEMBER_CODE_PREFIX: &str = "LBK";

/// Membership level assigned at registration
pub const DEFAULT_MEMBERSHIP_LEVEL: &str = "Basic";

/// Store-assigned numeric user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner numeric value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for UserId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Editable personal details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

/// Loyalty membership attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub member_code: String,
    pub level: String,
    pub points: i64,
}

impl Membership {
    /// Default membership for an account registered at `now`
    ///
    /// The member code is the prefix followed by the UTC timestamp at second
    /// granularity, e.g. `LBK20240131093000`.
    pub fn new_member(now: DateTime<Utc>) -> Self {
        Self {
            member_code: format!("{}{}", MEMBER_CODE_PREFIX, now.format("%Y%m%d%H%M%S")),
            level: DEFAULT_MEMBERSHIP_LEVEL.to_string(),
            points: 0,
        }
    }
}

/// A user that has not been persisted yet
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub membership: Membership,
}

/// Registered account with its credential and profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    email: String,
    /// Password hash - never exposed in serialization
    #[serde(skip_serializing)]
    password_hash: String,
    profile: Profile,
    membership: Membership,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Materialize a freshly stored user
    pub fn new(id: UserId, new_user: NewUser) -> Self {
        let now = Utc::now();

        Self {
            id,
            email: new_user.email,
            password_hash: new_user.password_hash,
            profile: Profile::default(),
            membership: new_user.membership,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a user from stored columns
    pub fn restore(
        id: UserId,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        profile: Profile,
        membership: Membership,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            password_hash: password_hash.into(),
            profile,
            membership,
            created_at,
            updated_at,
        }
    }

    // Getters

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn membership(&self) -> &Membership {
        &self.membership
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // Mutators

    /// Replace the editable profile fields
    pub fn set_profile(&mut self, profile: Profile) {
        self.profile = profile;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn create_test_user() -> User {
        let new_user = NewUser {
            email: "a@x.com".to_string(),
            password_hash: "hashed_password".to_string(),
            membership: Membership::new_member(Utc::now()),
        };
        User::new(UserId::new(1), new_user)
    }

    #[test]
    fn test_member_code_format() {
        let now = Utc.with_ymd_and_hms(2024, 1, 31, 9, 30, 5).unwrap();
        let membership = Membership::new_member(now);

        assert_eq!(membership.member_code, "LBK20240131093005");
        assert_eq!(membership.level, "Basic");
        assert_eq!(membership.points, 0);
    }

    #[test]
    fn test_user_creation() {
        let user = create_test_user();

        assert_eq!(user.id(), UserId::new(1));
        assert_eq!(user.email(), "a@x.com");
        assert_eq!(user.password_hash(), "hashed_password");
        assert_eq!(user.profile(), &Profile::default());
        assert_eq!(user.created_at(), user.updated_at());
    }

    #[test]
    fn test_set_profile_touches_updated_at() {
        let mut user = create_test_user();
        let original_updated = user.updated_at();

        std::thread::sleep(std::time::Duration::from_millis(10));

        user.set_profile(Profile {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            phone: "0812345678".to_string(),
        });

        assert_eq!(user.profile().first_name, "Ada");
        assert!(user.updated_at() > original_updated);
    }

    #[test]
    fn test_user_serialization_excludes_password() {
        let user = create_test_user();

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("hashed_password"));
        assert!(!json.contains("password_hash"));
    }

    #[test]
    fn test_user_id_serializes_as_number() {
        let json = serde_json::to_string(&UserId::new(42)).unwrap();
        assert_eq!(json, "42");
    }
}
