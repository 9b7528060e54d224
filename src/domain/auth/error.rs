//! Authentication error taxonomy

use thiserror::Error;

use crate::domain::DomainError;

/// Every terminal failure of registration, login and session verification
///
/// Variants carrying a `String` hold internal detail for logs; it is never sent
/// to clients.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("email already registered")]
    DuplicateEmail,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("missing authorization header")]
    MissingCredential,

    #[error("malformed authorization header: {0}")]
    MalformedCredential(String),

    #[error("unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid token signature: {0}")]
    InvalidSignature(String),

    #[error("token expired")]
    Expired,

    #[error("invalid subject claim: {0}")]
    InvalidSubjectClaim(String),

    #[error("no user for subject {0}")]
    UnknownIdentity(u64),

    #[error("store failure: {0}")]
    StoreFailure(#[source] DomainError),

    #[error("identity resolution failure: {0}")]
    ResolutionFailure(#[source] DomainError),

    #[error("token creation failure: {0}")]
    TokenCreationFailure(#[source] Box<AuthError>),

    #[error("password hashing failure: {0}")]
    HashingFailure(String),

    #[error("token signing failure: {0}")]
    SigningFailure(String),
}

impl AuthError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::DuplicateEmail => "duplicate_email",
            Self::InvalidCredentials => "invalid_credentials",
            Self::MissingCredential => "missing_credential",
            Self::MalformedCredential(_) => "malformed_credential",
            Self::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            Self::InvalidSignature(_) => "invalid_signature",
            Self::Expired => "token_expired",
            Self::InvalidSubjectClaim(_) => "invalid_subject_claim",
            Self::UnknownIdentity(_) => "unknown_identity",
            Self::StoreFailure(_) => "store_failure",
            Self::ResolutionFailure(_) => "resolution_failure",
            Self::TokenCreationFailure(_) => "token_creation_failure",
            Self::HashingFailure(_) => "hashing_failure",
            Self::SigningFailure(_) => "signing_failure",
        }
    }

    /// Server-side faults, as opposed to problems with what the client sent
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::StoreFailure(_)
                | Self::ResolutionFailure(_)
                | Self::TokenCreationFailure(_)
                | Self::HashingFailure(_)
                | Self::SigningFailure(_)
        )
    }
}
