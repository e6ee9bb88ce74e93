//! Password policy for new passwords.

use complyhub_core::config::auth::AuthConfig;
use complyhub_core::error::{AppError, FieldError};

/// Validates new passwords against the configured minimum length.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    min_length: usize,
}

impl PasswordValidator {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Returns a validation error naming the `password` field on failure.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            let message = format!(
                "Password must be at least {} characters long",
                self.min_length
            );
            return Err(AppError::validation(message.clone())
                .with_errors(vec![FieldError::new("password", message)]));
        }
        if password.trim().is_empty() {
            return Err(AppError::validation("Password must not be blank"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator(min: usize) -> PasswordValidator {
        PasswordValidator::new(&AuthConfig {
            password_min_length: min,
            ..AuthConfig::default()
        })
    }

    #[test]
    fn enforces_minimum_length() {
        let err = validator(8).validate("short").expect_err("too short");
        assert_eq!(err.errors[0].field, "password");
        assert!(validator(8).validate("long enough").is_ok());
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert!(validator(4).validate("ééé").is_err());
        assert!(validator(3).validate("ééé").is_ok());
    }

    #[test]
    fn rejects_whitespace_only() {
        assert!(validator(2).validate("    ").is_err());
    }
}
