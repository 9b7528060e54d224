//! User validation utilities

use thiserror::Error;

/// Errors that can occur during credential validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("email and password are required")]
    MissingCredentials,
}

/// Validate a registration or login pair
///
/// Both values must be non-empty. Emails are compared exactly as stored, so no
/// normalization happens here.
pub fn validate_credentials(email: &str, password: &str) -> Result<(), UserValidationError> {
    if email.is_empty() || password.is_empty() {
        return Err(UserValidationError::MissingCredentials);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_credentials() {
        assert!(validate_credentials("a@x.com", "pw123").is_ok());
    }

    #[test]
    fn test_empty_email() {
        assert_eq!(
            validate_credentials("", "pw123"),
            Err(UserValidationError::MissingCredentials)
        );
    }

    #[test]
    fn test_empty_password() {
        assert_eq!(
            validate_credentials("a@x.com", ""),
            Err(UserValidationError::MissingCredentials)
        );
    }

    #[test]
    fn test_whitespace_is_not_empty() {
        assert!(validate_credentials(" ", " ").is_ok());
    }
}
