//! User domain
//!
//! Domain types and the repository trait for registered accounts.

mod entity;
mod repository;
mod validation;

pub use entity::{
    Membership, NewUser, Profile, User, UserId, DEFAULT_MEMBERSHIP_LEVEL, MEMBER_CODE_PREFIX,
};
pub use repository::UserRepository;
pub use validation::{validate_credentials, UserValidationError};

#[cfg(test)]
pub use repository::MockUserRepository;
