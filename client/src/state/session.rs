//! The session value observed by views and route guards.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use crate::net::types::{Token, User};

/// The client's current belief about who the visitor is.
///
/// A token exists only inside `Authenticated`, so an authenticated state
/// without a credential cannot be constructed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Session {
    /// Before the controller has been initialized.
    #[default]
    Uninitialized,
    /// A stored credential is being checked against the server.
    Loading,
    /// Anonymous browsing.
    Guest,
    Authenticated { user: User, token: Token },
}

impl Session {
    #[must_use]
    pub fn token(&self) -> Option<&Token> {
        match self {
            Self::Authenticated { token, .. } => Some(token),
            _ => None,
        }
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated { user, .. } => Some(user),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    #[must_use]
    pub fn is_guest(&self) -> bool {
        matches!(self, Self::Guest)
    }

    /// `true` once the session is known (guest or authenticated).
    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Guest | Self::Authenticated { .. })
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Loading => "loading",
            Self::Guest => "guest",
            Self::Authenticated { .. } => "authenticated",
        }
    }
}
