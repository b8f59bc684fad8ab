//! Typed failures for auth operations.
//!
//! ERROR HANDLING
//! ==============
//! Every gateway call and controller operation resolves to one of these
//! kinds. The session controller decides the state consequence; views only
//! need `display_message` and never parse error strings.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use std::fmt;

/// Session-mutating or session-reading remote operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthOperation {
    Login,
    Signup,
    TemporaryUser,
    FetchProfile,
}

impl AuthOperation {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Signup => "signup",
            Self::TemporaryUser => "temporary_user",
            Self::FetchProfile => "fetch_profile",
        }
    }

    /// Message shown when the operation fails without a server explanation.
    #[must_use]
    pub fn fallback_message(self) -> &'static str {
        match self {
            Self::Login => "Unable to sign in. Please check your credentials and try again.",
            Self::Signup => "Unable to create account. Please try again.",
            Self::TemporaryUser => "Unable to start guest session. Please try again.",
            Self::FetchProfile => "Unable to load your profile. Please try again.",
        }
    }
}

impl fmt::Display for AuthOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced by auth operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Client-side form validation failed; no request was sent.
    #[error("{0}")]
    Validation(String),

    /// The server answered with a non-success status.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The request never produced a response (connect, timeout, body read).
    #[error("server unreachable: {0}")]
    Unreachable(String),

    /// The bearer token was refused by the profile endpoint.
    #[error("session token rejected")]
    Unauthorized,

    /// The same operation is already waiting on the server.
    #[error("{0} already in progress")]
    InFlight(AuthOperation),

    /// A success status carried a body that does not match the contract.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl AuthError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Stable machine-readable code for this error kind.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E_VALIDATION",
            Self::Rejected { .. } => "E_AUTH_REJECTED",
            Self::Unreachable(_) => "E_UNREACHABLE",
            Self::Unauthorized => "E_UNAUTHORIZED",
            Self::InFlight(_) => "E_IN_FLIGHT",
            Self::Malformed(_) => "E_MALFORMED",
        }
    }

    /// `true` when the failure is handled by falling back to anonymous
    /// browsing and must not be shown to the user.
    #[must_use]
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Display-ready text for the form that triggered `op`, or `None` for
    /// silent failures.
    #[must_use]
    pub fn display_message(&self, op: AuthOperation) -> Option<String> {
        match self {
            Self::Unauthorized => None,
            Self::Validation(message) | Self::Rejected { message, .. } => Some(message.clone()),
            Self::InFlight(_) => Some("Request already in progress. Please wait.".to_owned()),
            Self::Unreachable(_) | Self::Malformed(_) => Some(op.fallback_message().to_owned()),
        }
    }
}
