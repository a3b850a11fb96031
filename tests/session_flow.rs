//! Session Flow Tests
//!
//! Signup, login and logout against a profile file on disk.

use std::sync::Arc;

use tempfile::TempDir;

use stowage::auth::{
    AuthError, AuthStore, JsonFileStore, KeyValueStore, SignupRequest, ValidationError,
    LOGGED_IN_KEY, USER_KEY,
};

fn setup() -> (TempDir, Arc<JsonFileStore>, AuthStore) {
    let dir = TempDir::new().unwrap();
    let profile = Arc::new(JsonFileStore::new(dir.path().join("profile.json")));
    let auth = AuthStore::new(profile.clone());
    (dir, profile, auth)
}

fn alice() -> SignupRequest {
    SignupRequest::new("Alice", "alice@example.com", "secret1").with_confirmation("secret1")
}

#[test]
fn test_signup_then_login() {
    let (_dir, _profile, auth) = setup();

    auth.signup(alice()).unwrap();
    assert!(auth.is_logged_in().unwrap());

    auth.logout().unwrap();
    assert!(!auth.is_logged_in().unwrap());
    assert!(auth.require_login().is_err());

    let record = auth.login("alice@example.com", "secret1").unwrap();
    assert_eq!(record.name, "Alice");
    assert!(auth.require_login().is_ok());
}

#[test]
fn test_login_wrong_password_leaves_flag_unset() {
    let (_dir, _profile, auth) = setup();
    auth.signup(alice()).unwrap();
    auth.logout().unwrap();

    let err = auth.login("alice@example.com", "wrong-pass").unwrap_err();

    assert!(matches!(err, AuthError::InvalidCredentials));
    assert!(err.to_string().contains("Invalid"));
    assert!(!auth.is_logged_in().unwrap());
}

#[test]
fn test_login_without_account() {
    let (_dir, _profile, auth) = setup();

    let err = auth.login("alice@example.com", "secret1").unwrap_err();
    assert!(matches!(err, AuthError::NoAccount));
}

#[test]
fn test_signup_with_existing_record_does_not_mutate() {
    let (_dir, _profile, auth) = setup();
    let original = auth.signup(alice()).unwrap();
    auth.logout().unwrap();

    let err = auth
        .signup(SignupRequest::new("Bob", "bob@example.com", "hunter22").with_confirmation("hunter22"))
        .unwrap_err();

    assert!(matches!(err, AuthError::AccountExists));
    assert_eq!(auth.stored_record().unwrap(), Some(original));
    assert!(!auth.is_logged_in().unwrap());
}

#[test]
fn test_signup_short_password_does_not_mutate() {
    let (_dir, profile, auth) = setup();

    let err = auth
        .signup(SignupRequest::new("Alice", "alice@example.com", "12345").with_confirmation("12345"))
        .unwrap_err();

    assert!(matches!(
        err,
        AuthError::Validation(ValidationError::PasswordTooShort)
    ));
    assert!(profile.get(USER_KEY).unwrap().is_none());
    assert!(profile.get(LOGGED_IN_KEY).unwrap().is_none());
}

#[test]
fn test_session_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("profile.json");

    {
        let auth = AuthStore::new(Arc::new(JsonFileStore::new(&path)));
        auth.signup(alice()).unwrap();
    }

    let auth = AuthStore::new(Arc::new(JsonFileStore::new(&path)));
    assert!(auth.is_logged_in().unwrap());
    let session = auth.current_session().unwrap().unwrap();
    assert_eq!(session.email, "alice@example.com");
}

#[test]
fn test_logout_keeps_record() {
    let (_dir, _profile, auth) = setup();
    auth.signup(alice()).unwrap();

    auth.logout().unwrap();

    assert!(auth.current_session().unwrap().is_none());
    assert!(auth.stored_record().unwrap().is_some());
}
