//! Auth form models and client-side validation.
//!
//! Validation never reaches the network. It turns raw form input into the
//! request DTO or a `Validation` error carrying the text the form displays.

#[cfg(test)]
#[path = "forms_test.rs"]
mod forms_test;

use crate::net::error::AuthError;
use crate::net::types::{LoginRequest, SignupRequest, TemporaryUserRequest};

pub const MIN_PASSWORD_LEN: usize = 6;

const PASSWORD_MISMATCH: &str = "Passwords do not match.";
const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters long.";
const GUEST_NAME_REQUIRED: &str = "Please enter your name to continue as a guest.";
const LOGIN_FIELDS_REQUIRED: &str = "Email and password are required.";
const SIGNUP_FIELDS_REQUIRED: &str = "Name, email, and password are required.";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GuestForm {
    pub name: String,
}

impl LoginForm {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }
}

impl SignupForm {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self { name: name.into(), email: email.into(), password: password.into(), confirm_password: confirm_password.into() }
    }
}

impl GuestForm {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// # Errors
///
/// `Validation` if the email or password is blank.
pub fn validate_login(form: &LoginForm) -> Result<LoginRequest, AuthError> {
    let email = form.email.trim();
    if email.is_empty() || form.password.is_empty() {
        return Err(AuthError::validation(LOGIN_FIELDS_REQUIRED));
    }
    Ok(LoginRequest { email: email.to_owned(), password: form.password.clone() })
}

/// Password confirmation is checked before length, matching the form's
/// message order.
///
/// # Errors
///
/// `Validation` on mismatch, short password, or blank name/email.
pub fn validate_signup(form: &SignupForm) -> Result<SignupRequest, AuthError> {
    if form.password != form.confirm_password {
        return Err(AuthError::validation(PASSWORD_MISMATCH));
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::validation(PASSWORD_TOO_SHORT));
    }
    let name = form.name.trim();
    let email = form.email.trim();
    if name.is_empty() || email.is_empty() {
        return Err(AuthError::validation(SIGNUP_FIELDS_REQUIRED));
    }
    Ok(SignupRequest { name: name.to_owned(), email: email.to_owned(), password: form.password.clone() })
}

/// # Errors
///
/// `Validation` if the name is blank.
pub fn validate_guest(form: &GuestForm) -> Result<TemporaryUserRequest, AuthError> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(AuthError::validation(GUEST_NAME_REQUIRED));
    }
    Ok(TemporaryUserRequest { name: name.to_owned() })
}
