//! Local single-user session for Stowage.
//!
//! [`AuthStore`] keeps at most one [`SessionRecord`] and a separate login flag
//! in a [`KeyValueStore`]. The record holds the password in plain text and
//! nothing is verified server-side; the login flag alone gates the dashboard.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use super::profile::KeyValueStore;
use super::validation::{validate_email, validate_password, ValidationError};
use crate::StowageError;

/// Profile key holding the serialized session record.
pub const USER_KEY: &str = "user";

/// Profile key holding the login flag.
pub const LOGGED_IN_KEY: &str = "isLoggedIn";

/// Session-specific errors.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Signup input failed validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// A session record already exists.
    #[error("An account already exists. Please log in.")]
    AccountExists,

    /// No session record exists.
    #[error("No account found. Please sign up first.")]
    NoAccount,

    /// Email or password does not match the stored record.
    #[error("Invalid email or password.")]
    InvalidCredentials,

    /// The login flag is not set.
    #[error("Not logged in. Please log in first.")]
    NotLoggedIn,

    /// The profile could not be read or written.
    #[error("profile error: {0}")]
    Profile(#[from] StowageError),
}

/// The single stored user identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Record ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Password, stored as entered.
    pub password: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Signup form data.
#[derive(Debug, Clone)]
pub struct SignupRequest {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
    /// Password confirmation.
    pub confirm_password: String,
}

impl SignupRequest {
    /// Create a signup request whose confirmation equals the password.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let password = password.into();
        Self {
            name: name.into(),
            email: email.into(),
            confirm_password: password.clone(),
            password,
        }
    }

    /// Set a distinct password confirmation.
    pub fn with_confirmation(mut self, confirm_password: impl Into<String>) -> Self {
        self.confirm_password = confirm_password.into();
        self
    }
}

/// Session service over a persistent keyed store.
#[derive(Clone)]
pub struct AuthStore {
    store: Arc<dyn KeyValueStore>,
}

impl AuthStore {
    /// Create a session service backed by `store`.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Create the session record and set the login flag.
    ///
    /// This function:
    /// 1. Checks the password confirmation and length
    /// 2. Checks the email format
    /// 3. Refuses if a record already exists (it is never overwritten)
    /// 4. Persists the record and sets the login flag
    pub fn signup(&self, request: SignupRequest) -> Result<SessionRecord, AuthError> {
        validate_password(&request.password, &request.confirm_password)?;
        validate_email(&request.email)?;

        if self.stored_record()?.is_some() {
            return Err(AuthError::AccountExists);
        }

        let record = SessionRecord {
            id: uuid::Uuid::new_v4().to_string(),
            name: request.name,
            email: request.email,
            password: request.password,
            created_at: Utc::now(),
        };

        let serialized = serde_json::to_string(&record).map_err(StowageError::from)?;
        self.store.set(USER_KEY, &serialized)?;
        self.store.set(LOGGED_IN_KEY, "true")?;

        info!(email = %record.email, "Account created");

        Ok(record)
    }

    /// Check credentials against the stored record and set the login flag.
    pub fn login(&self, email: &str, password: &str) -> Result<SessionRecord, AuthError> {
        let record = self.stored_record()?.ok_or(AuthError::NoAccount)?;

        if record.email != email || record.password != password {
            return Err(AuthError::InvalidCredentials);
        }

        self.store.set(LOGGED_IN_KEY, "true")?;
        info!(email = %record.email, "Logged in");

        Ok(record)
    }

    /// Clear the login flag. The session record is kept.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.store.remove(LOGGED_IN_KEY)?;
        info!("Logged out");
        Ok(())
    }

    /// Whether the login flag is set. Any non-empty value counts.
    pub fn is_logged_in(&self) -> Result<bool, AuthError> {
        Ok(self
            .store
            .get(LOGGED_IN_KEY)?
            .is_some_and(|flag| !flag.is_empty()))
    }

    /// The session record, if one exists and the login flag is set.
    pub fn current_session(&self) -> Result<Option<SessionRecord>, AuthError> {
        if !self.is_logged_in()? {
            return Ok(None);
        }
        self.stored_record()
    }

    /// Gate for the dashboard: fails unless the login flag is set.
    pub fn require_login(&self) -> Result<(), AuthError> {
        if self.is_logged_in()? {
            Ok(())
        } else {
            Err(AuthError::NotLoggedIn)
        }
    }

    /// The stored session record regardless of the login flag.
    pub fn stored_record(&self) -> Result<Option<SessionRecord>, AuthError> {
        match self.store.get(USER_KEY)? {
            Some(raw) => {
                let record = serde_json::from_str(&raw).map_err(StowageError::from)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }
}
