//! Local session module for Stowage.
//!
//! This module provides the single-user session record, the login flag,
//! signup validation, and the persistent profile they are stored in.

pub mod profile;
mod session;
pub mod validation;

pub use profile::{JsonFileStore, KeyValueStore, MemoryStore};
pub use session::{
    AuthError, AuthStore, SessionRecord, SignupRequest, LOGGED_IN_KEY, USER_KEY,
};
pub use validation::{ValidationError, MIN_PASSWORD_LENGTH};
