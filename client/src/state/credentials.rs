//! Durable storage for the bearer credential.
//!
//! A single slot under a well-known key. Absence is the normal anonymous
//! state, not an error. Stores hold no logic; the session controller decides
//! what a storage failure means.

#[cfg(test)]
#[path = "credentials_test.rs"]
mod credentials_test;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::net::types::Token;

/// Well-known key of the credential slot.
pub const TOKEN_STORAGE_KEY: &str = "token";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("credential storage unavailable: {0}")]
    Unavailable(#[from] io::Error),
}

/// A single durable key/value slot holding the bearer token.
pub trait CredentialStore: Send + Sync {
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backing storage cannot be read.
    fn read(&self) -> Result<Option<Token>, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backing storage cannot be written.
    fn write(&self, token: &Token) -> Result<(), StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backing storage cannot be cleared.
    fn clear(&self) -> Result<(), StoreError>;
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// Process-local slot. Used by tests and embedders with their own persistence.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<Token>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: Token) -> Self {
        Self { slot: Mutex::new(Some(token)) }
    }

    /// Current slot content without going through the trait.
    #[must_use]
    pub fn peek(&self) -> Option<Token> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn read(&self) -> Result<Option<Token>, StoreError> {
        Ok(self.peek())
    }

    fn write(&self, token: &Token) -> Result<(), StoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// Slot persisted as a single file.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<dir>/token`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(TOKEN_STORAGE_KEY))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn read(&self) -> Result<Option<Token>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => {
                let trimmed = raw.trim();
                Ok((!trimmed.is_empty()).then(|| Token::new(trimmed)))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, token: &Token) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token.as_str())?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
