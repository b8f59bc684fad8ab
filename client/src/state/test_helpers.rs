//! Shared fixtures for session tests.

use std::io;
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use super::auth::SessionController;
use super::cache::QueryCache;
use super::credentials::{CredentialStore, MemoryCredentialStore, StoreError};
use crate::net::api::{AuthGateway, OutboundAuth};
use crate::net::error::AuthError;
use crate::net::types::{AuthResponse, LoginRequest, SignupRequest, TemporaryUserRequest, Token, User};

pub(crate) fn ada() -> User {
    User { id: 1, email: "a@b.com".into(), display_name: "Ada".into(), created_at: None }
}

pub(crate) fn auth_ok(token: &str, user: User) -> Result<AuthResponse, AuthError> {
    Ok(AuthResponse { message: "ok".into(), token: Token::new(token), user })
}

// =========================================================================
// MockGateway
// =========================================================================

/// Scripted gateway. Login, signup, and temporary-user share `auth_result`.
pub(crate) struct MockGateway {
    pub auth_result: Mutex<Result<AuthResponse, AuthError>>,
    pub profile_result: Mutex<Result<User, AuthError>>,
    pub calls: Mutex<Vec<&'static str>>,
    pub profile_tokens: Mutex<Vec<Token>>,
    /// When set, every call waits for a notification before answering.
    pub gate: Option<Arc<Notify>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            auth_result: Mutex::new(auth_ok("tok-1", ada())),
            profile_result: Mutex::new(Ok(ada())),
            calls: Mutex::new(Vec::new()),
            profile_tokens: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn gated(gate: Arc<Notify>) -> Self {
        Self { gate: Some(gate), ..Self::new() }
    }

    pub fn with_auth(self, result: Result<AuthResponse, AuthError>) -> Self {
        *self.auth_result.lock().unwrap() = result;
        self
    }

    pub fn with_profile(self, result: Result<User, AuthError>) -> Self {
        *self.profile_result.lock().unwrap() = result;
        self
    }

    pub fn set_profile(&self, result: Result<User, AuthError>) {
        *self.profile_result.lock().unwrap() = result;
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    async fn answer<T: Clone>(&self, name: &'static str, result: &Mutex<Result<T, AuthError>>) -> Result<T, AuthError> {
        self.calls.lock().unwrap().push(name);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        result.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl AuthGateway for MockGateway {
    async fn login(&self, _request: &LoginRequest) -> Result<AuthResponse, AuthError> {
        self.answer("login", &self.auth_result).await
    }

    async fn signup(&self, _request: &SignupRequest) -> Result<AuthResponse, AuthError> {
        self.answer("signup", &self.auth_result).await
    }

    async fn temporary_user(&self, _request: &TemporaryUserRequest) -> Result<AuthResponse, AuthError> {
        self.answer("temporary_user", &self.auth_result).await
    }

    async fn fetch_profile(&self, token: &Token) -> Result<User, AuthError> {
        self.profile_tokens.lock().unwrap().push(token.clone());
        self.answer("fetch_profile", &self.profile_result).await
    }
}

// =========================================================================
// FailingStore
// =========================================================================

/// Storage that refuses every operation.
pub(crate) struct FailingStore;

impl CredentialStore for FailingStore {
    fn read(&self) -> Result<Option<Token>, StoreError> {
        Err(io::Error::other("storage blocked").into())
    }

    fn write(&self, _token: &Token) -> Result<(), StoreError> {
        Err(io::Error::other("storage blocked").into())
    }

    fn clear(&self) -> Result<(), StoreError> {
        Err(io::Error::other("storage blocked").into())
    }
}

// =========================================================================
// Harness
// =========================================================================

pub(crate) struct Harness {
    pub store: Arc<MemoryCredentialStore>,
    pub gateway: Arc<MockGateway>,
    pub cache: Arc<QueryCache>,
    pub outbound: OutboundAuth,
    pub controller: Arc<SessionController>,
}

impl Harness {
    pub fn new(gateway: MockGateway) -> Self {
        Self::build(MemoryCredentialStore::new(), gateway)
    }

    pub fn with_stored_token(token: &str, gateway: MockGateway) -> Self {
        Self::build(MemoryCredentialStore::with_token(Token::new(token)), gateway)
    }

    fn build(store: MemoryCredentialStore, gateway: MockGateway) -> Self {
        let store = Arc::new(store);
        let gateway = Arc::new(gateway);
        let cache = Arc::new(QueryCache::new());
        let outbound = OutboundAuth::new();
        let controller = Arc::new(SessionController::new(
            store.clone(),
            gateway.clone(),
            cache.clone(),
            outbound.clone(),
        ));
        Self { store, gateway, cache, outbound, controller }
    }

    /// Store, header, and cache are all empty.
    pub fn fully_cleared(&self) -> bool {
        self.store.peek().is_none() && !self.outbound.is_set() && self.cache.is_empty()
    }
}
