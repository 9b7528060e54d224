//! Bearer credential parsing

use super::error::AuthError;

/// Authorization scheme accepted on protected routes
pub const BEARER_SCHEME: &str = "Bearer";

/// The opaque token taken from an `Authorization: Bearer <token>` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerCredential<'a>(&'a str);

impl<'a> BearerCredential<'a> {
    /// Split a presented header value into scheme and token
    ///
    /// `None` and the empty string are `MissingCredential`. Anything other
    /// than the exact scheme, one space, and a non-empty token without
    /// further whitespace is `MalformedCredential`.
    pub fn parse(presented: Option<&'a str>) -> Result<Self, AuthError> {
        let value = match presented {
            Some(v) if !v.is_empty() => v,
            _ => return Err(AuthError::MissingCredential),
        };

        let (scheme, token) = value
            .split_once(' ')
            .ok_or_else(|| AuthError::MalformedCredential("no scheme separator".into()))?;

        if scheme != BEARER_SCHEME {
            return Err(AuthError::MalformedCredential(format!(
                "unexpected scheme '{}'",
                scheme
            )));
        }

        if token.is_empty() || token.chars().any(char::is_whitespace) {
            return Err(AuthError::MalformedCredential(
                "token must be a single non-empty value".into(),
            ));
        }

        Ok(Self(token))
    }

    pub fn token(&self) -> &'a str {
        self.0
    }
}
