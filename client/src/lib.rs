//! # market-client
//!
//! Client-side session core for the marketplace app.
//!
//! This crate owns the visitor's session: the durable bearer credential, the
//! anonymous/guest/authenticated state machine, the shared request cache that
//! must stay consistent with it, and the route admission rules that decide
//! which views are reachable in which state. Rendering is left to whatever
//! front end embeds it; the `market` CLI is one such front end.

pub mod config;
pub mod net;
pub mod routes;
pub mod state;
pub mod util;

pub use config::{ClientConfig, ConfigError};
pub use net::api::{AuthGateway, HttpGateway, OutboundAuth};
pub use net::error::{AuthError, AuthOperation};
pub use net::types::{Token, User};
pub use routes::guard::{Admission, RouteGuard, RoutePolicy, View, ViewClass};
pub use routes::navigator::Navigator;
pub use state::auth::SessionController;
pub use state::cache::{QueryCache, RequestCache, USER_CACHE_KEY};
pub use state::credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore, StoreError};
pub use state::session::Session;
pub use util::forms::{GuestForm, LoginForm, SignupForm};
