//! Local persistence for cart state.
//!
//! The device store is a key-value blob: the whole line-item vector is
//! serialized as one JSON document under a fixed namespace key. The store
//! is a mirror, not a source of truth - the in-memory cart stays
//! authoritative for the running session, and mirror failures are logged
//! and swallowed by the caller.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

use super::CartLine;

/// Namespace key under which the cart blob is stored.
pub const CART_STORAGE_KEY: &str = "zentra.cart.v1";

/// Errors from the local persistence layer.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Key-value blob persistence for cart state.
#[async_trait]
pub trait CartPersistence: Send + Sync {
    /// Overwrite the stored blob with the given lines.
    async fn save(&self, lines: &[CartLine]) -> Result<(), PersistenceError>;

    /// Load the stored lines, or `None` if nothing was ever saved.
    async fn load(&self) -> Result<Option<Vec<CartLine>>, PersistenceError>;
}

/// File-backed persistence: one JSON file named after the namespace key.
pub struct FileCartPersistence {
    path: PathBuf,
}

impl FileCartPersistence {
    /// Store the cart blob under `dir/<CART_STORAGE_KEY>.json`.
    #[must_use]
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(format!("{CART_STORAGE_KEY}.json")),
        }
    }
}

#[async_trait]
impl CartPersistence for FileCartPersistence {
    async fn save(&self, lines: &[CartLine]) -> Result<(), PersistenceError> {
        let json = serde_json::to_vec(lines)?;
        // Write to a sibling temp file then rename, so a crash mid-write
        // never leaves a truncated blob
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn load(&self) -> Result<Option<Vec<CartLine>>, PersistenceError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory persistence, for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryCartPersistence {
    blob: Mutex<Option<Vec<CartLine>>>,
}

impl MemoryCartPersistence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartPersistence for MemoryCartPersistence {
    async fn save(&self, lines: &[CartLine]) -> Result<(), PersistenceError> {
        *self.blob.lock().unwrap_or_else(std::sync::PoisonError::into_inner) =
            Some(lines.to_vec());
        Ok(())
    }

    async fn load(&self) -> Result<Option<Vec<CartLine>>, PersistenceError> {
        Ok(self
            .blob
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone())
    }
}
