//! Authentication domain
//!
//! Error taxonomy, bearer credential parsing and session token claims shared
//! by the token issuer and the session verifier.

mod claims;
mod credential;
mod error;

pub use claims::{PresentedClaims, SessionClaims, SubjectClaim};
pub use credential::{BearerCredential, BEARER_SCHEME};
pub use error::AuthError;
