//! Authentication infrastructure module
//!
//! Password hashing, session token issuance/validation and the orchestrators
//! for registration, login and per-request session verification.

mod jwt;
mod password;
mod service;
mod verifier;

pub use jwt::{
    JwtConfig, JwtService, SigningSecret, ACCEPTED_ALGORITHMS, DEFAULT_TOKEN_TTL_HOURS,
    SIGNING_ALGORITHM,
};
pub use password::{Argon2Hasher, PasswordHasher};
pub use service::AuthService;
pub use verifier::SessionVerifier;
