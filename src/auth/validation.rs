//! Input validation for signup.
//!
//! This module provides the email format and password policy checks.

use thiserror::Error;

/// Minimum password length (in characters).
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Password and confirmation differ.
    #[error("Passwords do not match.")]
    PasswordMismatch,

    /// Password is too short.
    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters.")]
    PasswordTooShort,

    /// Email format is invalid.
    #[error("Please enter a valid email address.")]
    EmailInvalidFormat,
}

/// Validate a password and its confirmation.
///
/// The confirmation is compared first, then the length.
///
/// # Examples
///
/// ```
/// use stowage::auth::validation::validate_password;
///
/// assert!(validate_password("secret1", "secret1").is_ok());
/// assert!(validate_password("secret1", "secret2").is_err()); // mismatch
/// assert!(validate_password("abc", "abc").is_err()); // too short
/// ```
pub fn validate_password(password: &str, confirmation: &str) -> Result<(), ValidationError> {
    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

/// Validate an email address.
///
/// Accepts `local@domain.tld` shapes: exactly one `@`, no whitespace,
/// a non-empty local part, and a domain with a dot that has at least one
/// character on each side.
///
/// # Examples
///
/// ```
/// use stowage::auth::validation::validate_email;
///
/// assert!(validate_email("ada@example.com").is_ok());
/// assert!(validate_email("ada@localhost").is_err());
/// assert!(validate_email("ada example@mail.com").is_err());
/// ```
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.chars().any(char::is_whitespace) {
        return Err(ValidationError::EmailInvalidFormat);
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::EmailInvalidFormat);
    };

    if local.is_empty() || domain.contains('@') {
        return Err(ValidationError::EmailInvalidFormat);
    }

    let has_inner_dot = domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len());
    if !has_inner_dot {
        return Err(ValidationError::EmailInvalidFormat);
    }

    Ok(())
}
