//! Session token issuance and cryptographic validation (HMAC JWT)

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{crypto, encode, Algorithm, DecodingKey, EncodingKey, Header};
use serde::Deserialize;
use std::fmt::Debug;

use crate::domain::auth::{AuthError, PresentedClaims, SessionClaims};
use crate::domain::UserId;

/// Default lifetime of an issued token
pub const DEFAULT_TOKEN_TTL_HOURS: u64 = 72;

/// Algorithm used when signing
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Symmetric family accepted when verifying
pub const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Symmetric key shared by the issuer and the verifier
#[derive(Clone)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self(secret.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// An empty key cannot produce a meaningful signature
    pub fn is_usable(&self) -> bool {
        !self.0.is_empty()
    }
}

impl Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningSecret([hidden; {} bytes])", self.0.len())
    }
}

/// Configuration for JWT service
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: SigningSecret,
    /// Token expiration time in hours
    pub expiration_hours: u64,
}

impl JwtConfig {
    pub fn new(secret: impl Into<Vec<u8>>, expiration_hours: u64) -> Self {
        Self {
            secret: SigningSecret::new(secret),
            expiration_hours,
        }
    }
}

/// Issues and validates HMAC-signed session tokens
///
/// Holds no mutable state; a single instance is shared by all requests.
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("config", &self.config)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

#[derive(Deserialize)]
struct RawHeader {
    #[serde(default)]
    alg: Option<String>,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn expiration_hours(&self) -> u64 {
        self.config.expiration_hours
    }

    /// Sign a token for `subject` that expires `expiration_hours` from now
    pub fn issue(&self, subject: UserId, email: &str) -> Result<String, AuthError> {
        self.issue_at(subject, email, Utc::now())
    }

    /// Sign a token as if issued at `issued_at`
    pub fn issue_at(
        &self,
        subject: UserId,
        email: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        if !self.config.secret.is_usable() {
            return Err(AuthError::SigningFailure("signing secret is empty".into()));
        }

        let exp = expiry_after(issued_at, self.config.expiration_hours)?;

        let claims = SessionClaims {
            sub: subject.get(),
            email: email.to_string(),
            exp: exp.timestamp(),
        };

        encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AuthError::SigningFailure(e.to_string()))
    }

    /// Check algorithm, signature and expiry, returning the raw claims
    pub fn validate(&self, token: &str) -> Result<PresentedClaims, AuthError> {
        self.validate_at(token, Utc::now())
    }

    /// Validate against an explicit clock, with zero leeway on expiry
    ///
    /// The payload is only read after the signature checks out, and `sub` is
    /// left untouched whatever its shape.
    fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<PresentedClaims, AuthError> {
        let segments = TokenSegments::split(token)?;
        let algorithm = ensure_symmetric_algorithm(segments.header)?;

        let verified = crypto::verify(
            segments.signature,
            segments.signed.as_bytes(),
            &self.decoding_key,
            algorithm,
        )
        .map_err(|e| AuthError::InvalidSignature(e.to_string()))?;

        if !verified {
            return Err(AuthError::InvalidSignature("signature mismatch".into()));
        }

        let payload = URL_SAFE_NO_PAD.decode(segments.payload).map_err(|e| {
            AuthError::MalformedCredential(format!("token payload is not base64url: {}", e))
        })?;

        let claims: PresentedClaims = serde_json::from_slice(&payload).map_err(|e| {
            AuthError::MalformedCredential(format!("token payload is not a claims object: {}", e))
        })?;

        let exp = claims
            .exp
            .ok_or_else(|| AuthError::MalformedCredential("token has no expiry".into()))?;

        if now.timestamp() >= exp {
            return Err(AuthError::Expired);
        }

        Ok(claims)
    }
}

/// `issued_at + hours`, refusing lifetimes the clock cannot represent
fn expiry_after(issued_at: DateTime<Utc>, hours: u64) -> Result<DateTime<Utc>, AuthError> {
    i64::try_from(hours)
        .ok()
        .and_then(Duration::try_hours)
        .and_then(|ttl| issued_at.checked_add_signed(ttl))
        .ok_or_else(|| AuthError::SigningFailure(format!("token lifetime of {} hours is out of range", hours)))
}

/// The three dot-separated parts of a compact token
struct TokenSegments<'a> {
    header: &'a str,
    payload: &'a str,
    signature: &'a str,
    /// `header.payload`, the bytes covered by the signature
    signed: &'a str,
}

impl<'a> TokenSegments<'a> {
    fn split(token: &'a str) -> Result<Self, AuthError> {
        let malformed = || AuthError::MalformedCredential("token must have three segments".into());

        let (signed, signature) = token.rsplit_once('.').ok_or_else(malformed)?;
        let (header, payload) = signed.split_once('.').ok_or_else(malformed)?;

        if payload.contains('.') {
            return Err(malformed());
        }

        Ok(Self {
            header,
            payload,
            signature,
            signed,
        })
    }
}

/// Reject tokens that do not declare an HMAC algorithm
///
/// Runs on the raw header so that `none` and asymmetric algorithms are
/// reported as such rather than as generic parse failures.
fn ensure_symmetric_algorithm(header: &str) -> Result<Algorithm, AuthError> {
    let header_bytes = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|e| AuthError::MalformedCredential(format!("token header is not base64url: {}", e)))?;

    let header: RawHeader = serde_json::from_slice(&header_bytes)
        .map_err(|e| AuthError::MalformedCredential(format!("token header is not JSON: {}", e)))?;

    let alg = header
        .alg
        .ok_or_else(|| AuthError::UnsupportedAlgorithm("no algorithm declared".into()))?;

    match alg.parse::<Algorithm>() {
        Ok(parsed) if ACCEPTED_ALGORITHMS.contains(&parsed) => Ok(parsed),
        _ => Err(AuthError::UnsupportedAlgorithm(alg)),
    }
}
