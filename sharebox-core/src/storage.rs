//! Persistent storage for the bearer token
//!
//! Exactly one string is persisted, under [`TOKEN_KEY`]. On disk it lives in
//! the platform data directory:
//! - Linux: ~/.local/share/sharebox/accessToken
//! - macOS: ~/Library/Application Support/sharebox/accessToken
//! - Windows: %LOCALAPPDATA%\sharebox\accessToken

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

/// Fixed key the token is stored under
pub const TOKEN_KEY: &str = "accessToken";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Token storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Data directory not found")]
    NoDirFound,
}

/// Key-less storage slot for the single session token
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, StorageError>;
    fn save(&self, token: &str) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

/// Token persisted as a plain file
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store under the default data directory
    pub fn new() -> Result<Self, StorageError> {
        let dir = dirs::data_local_dir()
            .map(|p| p.join("sharebox"))
            .ok_or(StorageError::NoDirFound)?;
        Ok(Self::in_dir(&dir))
    }

    /// Store under a specific directory
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(TOKEN_KEY),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store, used by tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.token.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.slot().clone())
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        *self.slot() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.slot() = None;
        Ok(())
    }
}
