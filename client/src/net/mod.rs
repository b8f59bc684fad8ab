//! Networking modules for the marketplace REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` performs the auth round trips and owns the outbound bearer header,
//! `error` translates transport and server failures into typed kinds, and
//! `types` defines the shared wire schema.

pub mod api;
pub mod error;
pub mod types;
