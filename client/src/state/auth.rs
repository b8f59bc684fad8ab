//! Session controller for the current visitor.
//!
//! SYSTEM CONTEXT
//! ==============
//! The only component allowed to mutate the credential store, the outbound
//! bearer header, and the shared request cache. Route guards and views read
//! the session through [`SessionController::current_session`] or a
//! [`SessionController::subscribe`] receiver.
//!
//! INVARIANTS
//! ==========
//! - Store, header, and cache are written under `commit` before the new
//!   session is published, so no subscriber sees a half-applied transition.
//! - Transitions apply in the order their gateway calls resolve.
//! - At most one call per mutating operation is in flight; a second one fails
//!   fast with `InFlight` instead of queuing.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;

use super::cache::{RequestCache, USER_CACHE_KEY};
use super::credentials::CredentialStore;
use super::session::Session;
use crate::net::api::{AuthGateway, OutboundAuth};
use crate::net::error::{AuthError, AuthOperation};
use crate::net::types::{AuthResponse, Token, User};
use crate::util::forms::{self, GuestForm, LoginForm, SignupForm};

// =============================================================================
// PENDING FLAGS
// =============================================================================

#[derive(Debug, Default)]
struct PendingFlags {
    login: AtomicBool,
    signup: AtomicBool,
    temporary_user: AtomicBool,
}

impl PendingFlags {
    fn flag(&self, op: AuthOperation) -> Option<&AtomicBool> {
        match op {
            AuthOperation::Login => Some(&self.login),
            AuthOperation::Signup => Some(&self.signup),
            AuthOperation::TemporaryUser => Some(&self.temporary_user),
            AuthOperation::FetchProfile => None,
        }
    }

    fn begin(&self, op: AuthOperation) -> Result<PendingGuard<'_>, AuthError> {
        let Some(flag) = self.flag(op) else {
            return Ok(PendingGuard { flag: None });
        };
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| AuthError::InFlight(op))?;
        Ok(PendingGuard { flag: Some(flag) })
    }

    fn is_set(&self, op: AuthOperation) -> bool {
        self.flag(op).is_some_and(|f| f.load(Ordering::Acquire))
    }
}

/// Clears the pending flag when the call resolves or its future is dropped.
struct PendingGuard<'a> {
    flag: Option<&'a AtomicBool>,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if let Some(flag) = self.flag {
            flag.store(false, Ordering::Release);
        }
    }
}

// =============================================================================
// CONTROLLER
// =============================================================================

/// Owns the session state machine and its side effects.
pub struct SessionController {
    store: Arc<dyn CredentialStore>,
    gateway: Arc<dyn AuthGateway>,
    cache: Arc<dyn RequestCache>,
    outbound: OutboundAuth,
    session: watch::Sender<Session>,
    pending: PendingFlags,
    initialized: AtomicBool,
    commit: Mutex<()>,
}

impl SessionController {
    #[must_use]
    pub fn new(
        store: Arc<dyn CredentialStore>,
        gateway: Arc<dyn AuthGateway>,
        cache: Arc<dyn RequestCache>,
        outbound: OutboundAuth,
    ) -> Self {
        let (session, _) = watch::channel(Session::Uninitialized);
        Self {
            store,
            gateway,
            cache,
            outbound,
            session,
            pending: PendingFlags::default(),
            initialized: AtomicBool::new(false),
            commit: Mutex::new(()),
        }
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn current_session(&self) -> Session {
        self.session.borrow().clone()
    }

    /// Receiver notified after every completed transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    /// `true` while a call of `op` is waiting on the server.
    #[must_use]
    pub fn is_pending(&self, op: AuthOperation) -> bool {
        self.pending.is_set(op)
    }

    /// Resolve the stored credential into a session. Runs once, and not at
    /// all if a login already settled the session; later calls return the
    /// current session untouched.
    ///
    /// A stored token that the server no longer accepts is discarded and the
    /// visitor continues as a guest, whatever the failure kind. The profile
    /// result is dropped if the session left `Loading` while it was in flight.
    pub async fn initialize(&self) -> Session {
        if self.initialized.swap(true, Ordering::AcqRel) || self.session.borrow().is_settled() {
            tracing::debug!("session already initialized");
            return self.current_session();
        }

        let stored = self.store.read().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "credential store unreadable; continuing as guest");
            None
        });

        let Some(token) = stored else {
            self.publish(Session::Guest);
            tracing::info!("no stored credential; session is guest");
            return self.current_session();
        };

        self.publish(Session::Loading);
        let result = self.gateway.fetch_profile(&token).await;

        let _commit = self.commit.lock().unwrap_or_else(PoisonError::into_inner);
        if *self.session.borrow() != Session::Loading {
            tracing::debug!("session changed while resolving stored credential; discarding result");
            return self.current_session();
        }
        match result {
            Ok(user) => {
                tracing::info!(user_id = user.id, "stored credential accepted");
                self.persist_authenticated(user, token);
            }
            Err(e) => {
                tracing::info!(error_code = e.error_code(), "stored credential rejected; clearing");
                self.apply_guest();
            }
        }
        self.current_session()
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// `Validation` for blank fields, `InFlight` if a login is pending, or
    /// the gateway failure. The session is unchanged on any error.
    pub async fn login(&self, form: &LoginForm) -> Result<User, AuthError> {
        let request = forms::validate_login(form)?;
        let _pending = self.pending.begin(AuthOperation::Login)?;
        let response = self.gateway.login(&request).await;
        self.complete(AuthOperation::Login, response)
    }

    /// Create an account and sign in.
    ///
    /// # Errors
    ///
    /// `Validation` for a mismatched or short password (no request is sent),
    /// `InFlight` if a signup is pending, or the gateway failure.
    pub async fn signup(&self, form: &SignupForm) -> Result<User, AuthError> {
        let request = forms::validate_signup(form)?;
        let _pending = self.pending.begin(AuthOperation::Signup)?;
        let response = self.gateway.signup(&request).await;
        self.complete(AuthOperation::Signup, response)
    }

    /// Obtain a short-lived server identity with just a display name.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank name, `InFlight` if one is pending, or the
    /// gateway failure.
    pub async fn enter_guest_session(&self, form: &GuestForm) -> Result<User, AuthError> {
        let request = forms::validate_guest(form)?;
        let _pending = self.pending.begin(AuthOperation::TemporaryUser)?;
        let response = self.gateway.temporary_user(&request).await;
        self.complete(AuthOperation::TemporaryUser, response)
    }

    /// Refetch the profile for the current credential.
    ///
    /// On success the user is replaced wholesale. On any failure the session
    /// falls back to guest, unless a different session was established while
    /// the request was in flight.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if there is no authenticated session, otherwise the
    /// gateway failure.
    pub async fn refresh_profile(&self) -> Result<User, AuthError> {
        let Some(token) = self.current_session().token().cloned() else {
            return Err(AuthError::Unauthorized);
        };

        self.cache.invalidate(USER_CACHE_KEY);
        let result = self.gateway.fetch_profile(&token).await;

        let _commit = self.commit.lock().unwrap_or_else(PoisonError::into_inner);
        let still_current = self.session.borrow().token() == Some(&token);
        match result {
            Ok(user) => {
                if still_current {
                    self.apply_authenticated(user.clone(), token);
                }
                Ok(user)
            }
            Err(e) => {
                if still_current {
                    tracing::info!(error_code = e.error_code(), "profile refresh failed; clearing session");
                    self.apply_guest();
                }
                Err(e)
            }
        }
    }

    /// Drop the credential, outbound header, and every cache entry. Never
    /// fails; calling it as a guest changes nothing.
    pub fn logout(&self) {
        self.reset("logout");
    }

    /// Continue browsing anonymously. Same effect as [`Self::logout`].
    pub fn enter_guest_mode(&self) {
        self.reset("guest mode");
    }

    /// Shutdown cleanup. Same effect as [`Self::logout`].
    pub fn teardown(&self) {
        self.reset("teardown");
    }

    // -------------------------------------------------------------------------
    // transitions
    // -------------------------------------------------------------------------

    fn complete(&self, op: AuthOperation, response: Result<AuthResponse, AuthError>) -> Result<User, AuthError> {
        match response {
            Ok(AuthResponse { token, user, .. }) => {
                tracing::info!(op = %op, user_id = user.id, "session authenticated");
                self.commit_authenticated(user.clone(), token);
                Ok(user)
            }
            Err(e) => {
                tracing::info!(op = %op, error_code = e.error_code(), "auth operation failed");
                Err(e)
            }
        }
    }

    fn publish(&self, next: Session) {
        let _commit = self.commit.lock().unwrap_or_else(PoisonError::into_inner);
        self.session.send_replace(next);
    }

    fn commit_authenticated(&self, user: User, token: Token) {
        let _commit = self.commit.lock().unwrap_or_else(PoisonError::into_inner);
        self.persist_authenticated(user, token);
    }

    /// Caller holds `commit`.
    fn persist_authenticated(&self, user: User, token: Token) {
        if let Err(e) = self.store.write(&token) {
            tracing::warn!(error = %e, "failed to persist credential; session will not survive restart");
        }
        self.apply_authenticated(user, token);
    }

    /// Caller holds `commit`.
    fn apply_authenticated(&self, user: User, token: Token) {
        self.outbound.set(&token);
        match serde_json::to_value(&user) {
            Ok(value) => self.cache.prime(USER_CACHE_KEY, value),
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode user for cache");
                self.cache.invalidate(USER_CACHE_KEY);
            }
        }
        self.session.send_replace(Session::Authenticated { user, token });
    }

    fn reset(&self, reason: &'static str) {
        let _commit = self.commit.lock().unwrap_or_else(PoisonError::into_inner);
        tracing::info!(reason, "resetting session to guest");
        self.apply_guest();
    }

    /// Caller holds `commit`.
    fn apply_guest(&self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "failed to clear stored credential");
        }
        self.outbound.clear();
        self.cache.clear();
        self.session.send_if_modified(|session| {
            if session.is_guest() {
                return false;
            }
            *session = Session::Guest;
            true
        });
    }
}
