//! Route admission.
//!
//! SYSTEM CONTEXT
//! ==============
//! `guard` holds the pure per-view admission rules; `navigator` applies them
//! against a live session controller and reacts to session changes.

pub mod guard;
pub mod navigator;
