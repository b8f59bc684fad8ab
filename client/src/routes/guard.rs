//! Per-view admission rules.
//!
//! A deployment picks one [`RoutePolicy`]: either guests may browse the
//! catalog, or every content view requires a login. Evaluation is pure; the
//! navigator feeds it the current session on every navigation and every
//! session change.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use std::fmt;
use std::str::FromStr;

use crate::state::session::Session;

const MAX_REDIRECT_HOPS: usize = 4;

/// Named views of the app.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum View {
    Root,
    Login,
    Signup,
    Catalog,
    Profile,
    NotFound,
}

impl View {
    /// Map a URL path (query and trailing slash ignored) to a view.
    /// `/dashboard` is accepted as an alias of the catalog.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Self::Root,
            "/login" => Self::Login,
            "/signup" => Self::Signup,
            "/catalog" | "/dashboard" => Self::Catalog,
            "/profile" => Self::Profile,
            _ => Self::NotFound,
        }
    }

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Root => "/",
            Self::Login => "/login",
            Self::Signup => "/signup",
            Self::Catalog => "/catalog",
            Self::Profile => "/profile",
            Self::NotFound => "/404",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewClass {
    /// Always renders once the session is settled.
    Public,
    /// Renders for guests and authenticated users.
    GuestAllowed,
    /// Renders only for authenticated users.
    AuthRequired,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RoutePolicy {
    /// Guests browse the catalog without signing in.
    #[default]
    GuestBrowsing,
    /// Every content view requires a login.
    LoginRequired,
}

impl RoutePolicy {
    #[must_use]
    pub fn class_of(self, view: View) -> ViewClass {
        match view {
            View::Root | View::Login | View::Signup | View::NotFound => ViewClass::Public,
            View::Catalog => match self {
                Self::GuestBrowsing => ViewClass::GuestAllowed,
                Self::LoginRequired => ViewClass::AuthRequired,
            },
            View::Profile => ViewClass::AuthRequired,
        }
    }

    /// Where an unauthenticated visitor is sent from an `AuthRequired` view.
    #[must_use]
    pub fn fallback(self) -> View {
        match self {
            Self::GuestBrowsing => View::Catalog,
            Self::LoginRequired => View::Login,
        }
    }

    /// Where `/` and already-authenticated login/signup visits lead.
    #[must_use]
    pub fn landing(self) -> View {
        View::Catalog
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GuestBrowsing => "guest_browsing",
            Self::LoginRequired => "login_required",
        }
    }
}

impl FromStr for RoutePolicy {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "guest_browsing" => Ok(Self::GuestBrowsing),
            "login_required" => Ok(Self::LoginRequired),
            other => Err(format!("unknown route policy: {other}")),
        }
    }
}

/// Outcome of a navigation attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    Render,
    Redirect(View),
    /// Session still loading; show only the loading placeholder.
    Wait,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RouteGuard {
    policy: RoutePolicy,
}

impl RouteGuard {
    #[must_use]
    pub fn new(policy: RoutePolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(&self) -> RoutePolicy {
        self.policy
    }

    /// Single-step admission for `view`.
    #[must_use]
    pub fn evaluate(&self, view: View, session: &Session) -> Admission {
        if !session.is_settled() {
            return Admission::Wait;
        }
        let authenticated = session.is_authenticated();
        match view {
            View::Root => Admission::Redirect(self.policy.landing()),
            View::Login | View::Signup if authenticated => Admission::Redirect(self.policy.landing()),
            _ => match self.policy.class_of(view) {
                ViewClass::Public | ViewClass::GuestAllowed => Admission::Render,
                ViewClass::AuthRequired if authenticated => Admission::Render,
                ViewClass::AuthRequired => Admission::Redirect(self.policy.fallback()),
            },
        }
    }

    /// Admission with redirect chains collapsed: a `Redirect` names the view
    /// that will actually render.
    #[must_use]
    pub fn resolve(&self, view: View, session: &Session) -> Admission {
        let mut current = view;
        for _ in 0..MAX_REDIRECT_HOPS {
            match self.evaluate(current, session) {
                Admission::Render if current == view => return Admission::Render,
                Admission::Render => return Admission::Redirect(current),
                Admission::Wait => return Admission::Wait,
                Admission::Redirect(next) => current = next,
            }
        }
        tracing::warn!(from = %view, to = %current, "redirect chain too long");
        Admission::Redirect(current)
    }
}
