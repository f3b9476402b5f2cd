use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{Config, TokenBackend};

use super::{FileTokenStorage, KeyringTokenStorage};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Token storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored session is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Token storage unavailable: {0}")]
    Unavailable(String),
}

/// Persistent key-value slot holding at most one access token.
pub trait TokenStorage: Send + Sync {
    fn read(&self) -> Result<Option<String>, StorageError>;

    fn write(&self, token: &str) -> Result<(), StorageError>;

    /// Remove the token. Removing from an empty slot succeeds.
    fn remove(&self) -> Result<(), StorageError>;
}

/// Process-local storage, used in tests and for throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        Ok(self.slot.lock().clone())
    }

    fn write(&self, token: &str) -> Result<(), StorageError> {
        *self.slot.lock() = Some(token.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        self.slot.lock().take();
        Ok(())
    }
}

/// The client's view of the current session.
///
/// Clone is cheap; all clones share the same storage backend.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn TokenStorage>,
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the token itself
        f.debug_struct("TokenStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl TokenStore {
    pub fn new(storage: impl TokenStorage + 'static) -> Self {
        Self {
            storage: Arc::new(storage),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryTokenStorage::new())
    }

    /// Open the store for the backend selected in `config`
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store = match config.token_backend {
            TokenBackend::File => Self::new(FileTokenStorage::new(config.data_dir()?)),
            TokenBackend::Keyring => Self::new(KeyringTokenStorage::default()),
        };
        debug!(backend = ?config.token_backend, "Token store opened");
        Ok(store)
    }

    /// Persist the access token, replacing any previous one.
    ///
    /// A storage failure is an environment problem and is not retried.
    pub fn save(&self, token: &str) -> Result<(), StorageError> {
        self.storage.write(token)?;
        info!("Access token saved");
        Ok(())
    }

    /// Current access token, if any
    pub fn get(&self) -> Option<String> {
        match self.storage.read() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to read access token, treating session as logged out");
                None
            }
        }
    }

    /// Drop the access token. Clearing an empty store is a no-op.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove()?;
        debug!("Access token cleared");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.get().map(|t| !t.is_empty()).unwrap_or(false)
    }
}
