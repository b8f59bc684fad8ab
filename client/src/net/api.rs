//! REST API gateway for the marketplace auth endpoints.
//!
//! Each operation is a single round trip with no retries; failures come back
//! as [`AuthError`] and the session controller decides what they mean for the
//! session. Decoding is split into pure functions so status/body handling can
//! be tested without a server.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures map to `Unreachable`. Any non-2xx status maps to
//! `Rejected` carrying the server's `{error}` text, except a 401 from the
//! profile endpoint, which is `Unauthorized`.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::{AuthError, AuthOperation};
use super::types::{
    AuthResponse, ErrorResponse, LoginRequest, ProfileResponse, SignupRequest, TemporaryUserRequest, Token, User,
};
use crate::config::{ClientConfig, ConfigError};

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const SIGNUP_PATH: &str = "/api/auth/signup";
pub const TEMPORARY_USER_PATH: &str = "/api/auth/temporary";
pub const PROFILE_PATH: &str = "/api/profile";
pub const CATALOG_PATH: &str = "/api/furniture";

const CATALOG_OPERATION: &str = "fetch_catalog";

// =============================================================================
// GATEWAY TRAIT
// =============================================================================

/// The remote auth service contract. Enables mocking in tests.
#[async_trait::async_trait]
pub trait AuthGateway: Send + Sync {
    /// `POST /api/auth/login`.
    ///
    /// # Errors
    ///
    /// `Rejected` for bad credentials, `Unreachable` on transport failure.
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, AuthError>;

    /// `POST /api/auth/signup`.
    ///
    /// # Errors
    ///
    /// `Rejected` for a duplicate email or server-side validation failure.
    async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, AuthError>;

    /// `POST /api/auth/temporary`.
    ///
    /// # Errors
    ///
    /// `Rejected` if the server refuses the name.
    async fn temporary_user(&self, request: &TemporaryUserRequest) -> Result<AuthResponse, AuthError>;

    /// `GET /api/profile` with `token` as the bearer credential.
    ///
    /// # Errors
    ///
    /// `Unauthorized` when the token is invalid or expired.
    async fn fetch_profile(&self, token: &Token) -> Result<User, AuthError>;
}

// =============================================================================
// OUTBOUND AUTHORIZATION
// =============================================================================

/// Process-wide bearer header attached to authenticated requests.
///
/// Clones share the same slot. Only the session controller mutates it.
#[derive(Clone, Debug, Default)]
pub struct OutboundAuth {
    slot: Arc<RwLock<Option<Token>>>,
}

impl OutboundAuth {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set(&self, token: &Token) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
    }

    pub(crate) fn clear(&self) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Current `Authorization` header value, if a session is authenticated.
    #[must_use]
    pub fn header_value(&self) -> Option<String> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(Token::bearer_header)
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        self.slot.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }
}

// =============================================================================
// HTTP GATEWAY
// =============================================================================

/// [`AuthGateway`] over HTTP via `reqwest`.
pub struct HttpGateway {
    http: reqwest::Client,
    config: ClientConfig,
    outbound: OutboundAuth,
}

impl HttpGateway {
    /// Build a gateway for `config.api_url` sharing the given outbound header.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the HTTP client fails to build.
    pub fn new(config: &ClientConfig, outbound: OutboundAuth) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self { http, config: config.clone(), outbound })
    }

    async fn post_auth<B: Serialize + Sync>(
        &self,
        op: AuthOperation,
        path: &str,
        body: &B,
    ) -> Result<AuthResponse, AuthError> {
        let response = self
            .http
            .post(self.config.endpoint(path))
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(op.as_str(), &e))?;
        let (status, text) = read_body(op.as_str(), response).await?;
        tracing::debug!(op = %op, status, "auth gateway response");
        decode_success::<AuthResponse>(status, &text)
    }

    /// Fetch the furniture catalog as raw JSON, attaching the outbound
    /// bearer header when a session is authenticated.
    ///
    /// # Errors
    ///
    /// `Unreachable` on transport failure, `Rejected` on a non-2xx status.
    pub async fn fetch_catalog(&self, query: &[(&str, &str)]) -> Result<serde_json::Value, AuthError> {
        let mut request = self.http.get(self.config.endpoint(CATALOG_PATH)).query(query);
        if let Some(header) = self.outbound.header_value() {
            request = request.header(AUTHORIZATION, header);
        }
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(CATALOG_OPERATION, &e))?;
        let (status, text) = read_body(CATALOG_OPERATION, response).await?;
        tracing::debug!(op = CATALOG_OPERATION, status, "catalog response");
        decode_success::<serde_json::Value>(status, &text)
    }
}

#[async_trait::async_trait]
impl AuthGateway for HttpGateway {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, AuthError> {
        self.post_auth(AuthOperation::Login, LOGIN_PATH, request).await
    }

    async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, AuthError> {
        self.post_auth(AuthOperation::Signup, SIGNUP_PATH, request).await
    }

    async fn temporary_user(&self, request: &TemporaryUserRequest) -> Result<AuthResponse, AuthError> {
        self.post_auth(AuthOperation::TemporaryUser, TEMPORARY_USER_PATH, request)
            .await
    }

    async fn fetch_profile(&self, token: &Token) -> Result<User, AuthError> {
        let op = AuthOperation::FetchProfile;
        let response = self
            .http
            .get(self.config.endpoint(PROFILE_PATH))
            .header(AUTHORIZATION, token.bearer_header())
            .send()
            .await
            .map_err(|e| transport_error(op.as_str(), &e))?;
        let (status, text) = read_body(op.as_str(), response).await?;
        tracing::debug!(op = %op, status, "auth gateway response");
        decode_profile(status, &text)
    }
}

async fn read_body(op: &'static str, response: reqwest::Response) -> Result<(u16, String), AuthError> {
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| transport_error(op, &e))?;
    Ok((status, text))
}

fn transport_error(op: &'static str, err: &reqwest::Error) -> AuthError {
    tracing::warn!(op, error = %err, "gateway unreachable");
    AuthError::Unreachable(err.to_string())
}

// =============================================================================
// DECODING
// =============================================================================

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Text to show for a failed response: the `{error}` field when present,
/// otherwise the status's canonical reason.
fn error_message(status: u16, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(body) {
        if !parsed.error.trim().is_empty() {
            return parsed.error;
        }
    }
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .map_or_else(|| format!("request failed with status {status}"), str::to_owned)
}

fn decode_success<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, AuthError> {
    if !is_success(status) {
        return Err(AuthError::Rejected { status, message: error_message(status, body) });
    }
    serde_json::from_str(body).map_err(|e| AuthError::Malformed(e.to_string()))
}

fn decode_profile(status: u16, body: &str) -> Result<User, AuthError> {
    if status == 401 {
        return Err(AuthError::Unauthorized);
    }
    decode_success::<ProfileResponse>(status, body).map(|r| r.user)
}
