use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::store::{StorageError, TokenStorage};

/// Session file name in the data directory
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "savedAt")]
    pub saved_at: DateTime<Utc>,
}

/// Keeps the access token in `session.json` under the data directory.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    dir: PathBuf,
}

impl FileTokenStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    fn load(path: &Path) -> Result<Option<StoredSession>, StorageError> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)?;
        let session = serde_json::from_str(&contents)?;
        Ok(Some(session))
    }
}

impl TokenStorage for FileTokenStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        Ok(Self::load(&self.path())?.map(|s| s.access_token))
    }

    fn write(&self, token: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        let session = StoredSession {
            access_token: token.to_string(),
            saved_at: Utc::now(),
        };
        let contents = serde_json::to_string_pretty(&session)?;
        std::fs::write(self.path(), contents)?;
        debug!(path = %self.path().display(), "Session written");
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        let path = self.path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}
