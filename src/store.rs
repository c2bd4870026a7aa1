//! Credential store — durable token/user persistence across restarts.
//!
//! DESIGN
//! ======
//! One JSON document holds both slots so a save is a single write; the
//! session controller is the only reader/writer, so last-write-wins is
//! the whole consistency story. `load` never fails: a missing or corrupt
//! file is the same as signed out.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::types::UserRecord;

/// Contents of the two credential slots.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<UserRecord>,
}

/// Durable key-value persistence for the session token and user record.
pub trait CredentialStore: Send + Sync {
    /// Read both slots. Absent or unreadable data yields empty credentials.
    fn load(&self) -> Credentials;

    /// Overwrite both slots.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the credentials cannot be written.
    fn save(&self, token: &str, user: &UserRecord) -> Result<(), StoreError>;

    /// Remove both slots.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the stored credentials cannot be removed.
    fn clear(&self) -> Result<(), StoreError>;
}

impl<T: CredentialStore + ?Sized> CredentialStore for std::sync::Arc<T> {
    fn load(&self) -> Credentials {
        (**self).load()
    }

    fn save(&self, token: &str, user: &UserRecord) -> Result<(), StoreError> {
        (**self).save(token, user)
    }

    fn clear(&self) -> Result<(), StoreError> {
        (**self).clear()
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// File-backed store: one JSON document at a fixed path.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location: `<config_dir>/dma/credentials.json`, falling back
    /// to the current directory when the platform has no config dir.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dma")
            .join("credentials.json")
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileStore {
    fn load(&self) -> Credentials {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return Credentials::default(),
        };
        match serde_json::from_str(&raw) {
            Ok(credentials) => credentials,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "credential file unreadable — treating as signed out");
                Credentials::default()
            }
        }
    }

    fn save(&self, token: &str, user: &UserRecord) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let credentials = Credentials {
            token: Some(token.to_owned()),
            user: Some(user.clone()),
        };
        let rendered = serde_json::to_string_pretty(&credentials)?;

        // Write-then-rename so a crash mid-write never leaves a torn document.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, rendered)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// In-memory store for tests and embedders that manage persistence themselves.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: std::sync::Mutex<Credentials>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an existing token/user pair.
    #[must_use]
    pub fn with_credentials(token: Option<&str>, user: Option<UserRecord>) -> Self {
        Self {
            slots: std::sync::Mutex::new(Credentials {
                token: token.map(ToOwned::to_owned),
                user,
            }),
        }
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self) -> Credentials {
        self.slots.lock().map(|slots| slots.clone()).unwrap_or_default()
    }

    fn save(&self, token: &str, user: &UserRecord) -> Result<(), StoreError> {
        if let Ok(mut slots) = self.slots.lock() {
            slots.token = Some(token.to_owned());
            slots.user = Some(user.clone());
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        if let Ok(mut slots) = self.slots.lock() {
            *slots = Credentials::default();
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
