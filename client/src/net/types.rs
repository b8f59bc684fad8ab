//! Shared wire-protocol DTOs for the client/server boundary.
//!
//! DESIGN
//! ======
//! These types mirror the auth API's JSON bodies. `User` is replaced
//! wholesale on every fetch, so it carries no setters.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

// =============================================================================
// TOKEN
// =============================================================================

/// Opaque bearer credential issued by the auth API.
///
/// `Debug` is redacted so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` request header.
    #[must_use]
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}

// =============================================================================
// USER
// =============================================================================

/// Account identity as returned by the auth API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned unique identifier.
    pub id: i64,
    pub email: String,
    /// Display name (`name` on the wire).
    #[serde(rename = "name")]
    pub display_name: String,
    /// Account creation time. Signup and temporary-user responses omit it.
    #[serde(
        rename = "createdAt",
        alias = "created_at",
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<OffsetDateTime>,
}

// =============================================================================
// REQUESTS
// =============================================================================

/// `POST /api/auth/login` body.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /api/auth/signup` body. The confirmation field never leaves the client.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// `POST /api/auth/temporary` body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TemporaryUserRequest {
    pub name: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

// =============================================================================
// RESPONSES
// =============================================================================

/// Success body shared by login, signup, and temporary-user.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: String,
    pub token: Token,
    pub user: User,
}

/// `GET /api/profile` success body.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ProfileResponse {
    pub user: User,
}

/// Body of any non-2xx response.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
