//! Session token claims and subject decoding

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::AuthError;
use crate::domain::user::UserId;

/// Claims written into every issued session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (numeric user ID)
    pub sub: u64,
    pub email: String,
    /// Expiration timestamp (Unix epoch seconds)
    pub exp: i64,
}

/// Claims as read back from a presented token
///
/// `sub` is kept untyped: tokens minted elsewhere may encode the same
/// identifier as an integer, a float or a string.
#[derive(Debug, Clone, Deserialize)]
pub struct PresentedClaims {
    #[serde(default)]
    pub sub: Value,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Accepted wire encodings of the subject claim
#[derive(Debug, Clone, PartialEq)]
pub enum SubjectClaim {
    Integer(u64),
    Float(f64),
    NumericString(String),
}

impl SubjectClaim {
    /// Classify a raw claim value, rejecting every non-numeric shape
    pub fn decode(value: &Value) -> Result<Self, AuthError> {
        match value {
            Value::Number(n) => {
                if let Some(v) = n.as_u64() {
                    Ok(Self::Integer(v))
                } else if n.is_i64() {
                    Err(AuthError::InvalidSubjectClaim(format!("negative subject {}", n)))
                } else {
                    n.as_f64()
                        .map(Self::Float)
                        .ok_or_else(|| AuthError::InvalidSubjectClaim(format!("unreadable number {}", n)))
                }
            }
            Value::String(s) => Ok(Self::NumericString(s.clone())),
            Value::Null => Err(AuthError::InvalidSubjectClaim("subject is missing".into())),
            other => Err(AuthError::InvalidSubjectClaim(format!(
                "expected a number or numeric string, got {}",
                json_kind(other)
            ))),
        }
    }

    /// Convert to a user ID using the rule for this encoding
    pub fn into_user_id(self) -> Result<UserId, AuthError> {
        match self {
            Self::Integer(v) => Ok(from_integer(v)),
            Self::Float(v) => from_float(v),
            Self::NumericString(s) => from_numeric_string(&s),
        }
    }
}

fn from_integer(value: u64) -> UserId {
    UserId::new(value)
}

// 2^64, the first float past u64::MAX
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

fn from_float(value: f64) -> Result<UserId, AuthError> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value >= U64_LIMIT {
        return Err(AuthError::InvalidSubjectClaim(format!(
            "{} is not a whole non-negative number",
            value
        )));
    }

    Ok(UserId::new(value as u64))
}

fn from_numeric_string(value: &str) -> Result<UserId, AuthError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AuthError::InvalidSubjectClaim(format!(
            "'{}' is not a numeric string",
            value
        )));
    }

    value
        .parse::<u64>()
        .map(UserId::new)
        .map_err(|e| AuthError::InvalidSubjectClaim(format!("'{}': {}", value, e)))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolve(value: Value) -> Result<UserId, AuthError> {
        SubjectClaim::decode(&value)?.into_user_id()
    }

    #[test]
    fn test_all_numeric_encodings_agree() {
        assert_eq!(resolve(json!(42)).unwrap(), UserId::new(42));
        assert_eq!(resolve(json!(42.0)).unwrap(), UserId::new(42));
        assert_eq!(resolve(json!("42")).unwrap(), UserId::new(42));
    }

    #[test]
    fn test_decode_variants() {
        assert_eq!(SubjectClaim::decode(&json!(7)).unwrap(), SubjectClaim::Integer(7));
        assert_eq!(SubjectClaim::decode(&json!(7.0)).unwrap(), SubjectClaim::Float(7.0));
        assert_eq!(
            SubjectClaim::decode(&json!("7")).unwrap(),
            SubjectClaim::NumericString("7".into())
        );
    }

    #[test]
    fn test_non_numeric_string_rejected() {
        assert!(matches!(resolve(json!("abc")), Err(AuthError::InvalidSubjectClaim(_))));
        assert!(matches!(resolve(json!("")), Err(AuthError::InvalidSubjectClaim(_))));
        assert!(matches!(resolve(json!(" 42")), Err(AuthError::InvalidSubjectClaim(_))));
        assert!(matches!(resolve(json!("42abc")), Err(AuthError::InvalidSubjectClaim(_))));
        assert!(matches!(resolve(json!("-1")), Err(AuthError::InvalidSubjectClaim(_))));
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(matches!(resolve(json!(-1)), Err(AuthError::InvalidSubjectClaim(_))));
        assert!(matches!(resolve(json!(1.5)), Err(AuthError::InvalidSubjectClaim(_))));
        assert!(matches!(resolve(json!(-3.0)), Err(AuthError::InvalidSubjectClaim(_))));
        assert!(matches!(resolve(json!(1e300)), Err(AuthError::InvalidSubjectClaim(_))));
        assert!(matches!(
            resolve(json!("99999999999999999999999")),
            Err(AuthError::InvalidSubjectClaim(_))
        ));
    }

    #[test]
    fn test_non_numeric_kinds_rejected() {
        assert!(matches!(resolve(Value::Null), Err(AuthError::InvalidSubjectClaim(_))));
        assert!(matches!(resolve(json!(true)), Err(AuthError::InvalidSubjectClaim(_))));
        assert!(matches!(resolve(json!([42])), Err(AuthError::InvalidSubjectClaim(_))));
        assert!(matches!(resolve(json!({"id": 42})), Err(AuthError::InvalidSubjectClaim(_))));
    }

    #[test]
    fn test_presented_claims_tolerate_missing_subject() {
        let claims: PresentedClaims = serde_json::from_value(json!({"exp": 1})).unwrap();
        assert!(claims.sub.is_null());
        assert!(claims.email.is_none());
    }
}
