//! Client-side session state.
//!
//! DESIGN
//! ======
//! State is split by concern so each collaborator can be swapped in tests:
//! `credentials` is the durable token slot, `cache` the shared request cache,
//! `session` the state value, and `auth` the controller that keeps all three
//! consistent.

pub mod auth;
pub mod cache;
pub mod credentials;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;
