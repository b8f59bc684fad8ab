//! Helpers shared by the session controller and front ends.
//!
//! SYSTEM CONTEXT
//! ==============
//! `forms` holds the sign-in, sign-up and guest form values and the local
//! checks that run before any request leaves the client.

pub mod forms;
