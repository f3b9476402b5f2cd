use keyring::Entry;

use super::store::{StorageError, TokenStorage};
use super::ACCESS_TOKEN_KEY;

const SERVICE_NAME: &str = "postboard";

/// Keeps the access token in the OS keychain
pub struct KeyringTokenStorage {
    service: String,
}

impl Default for KeyringTokenStorage {
    fn default() -> Self {
        Self::new(SERVICE_NAME)
    }
}

impl KeyringTokenStorage {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self) -> Result<Entry, StorageError> {
        Ok(Entry::new(&self.service, ACCESS_TOKEN_KEY)?)
    }
}

impl TokenStorage for KeyringTokenStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, token: &str) -> Result<(), StorageError> {
        self.entry()?.set_password(token)?;
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
