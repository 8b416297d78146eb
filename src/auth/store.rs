//! Persistent access/refresh token storage.
//!
//! Two string entries under fixed, application-namespaced keys, kept in a
//! JSON file in the client's data directory. Presence of the entries plus
//! the decoded expiry of the access token fully determines authentication
//! state at startup.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::claims::{decode_claims, Claims};

/// Token file name in the data directory
const TOKENS_FILE: &str = "tokens.json";

/// On-disk layout. The field names are the stable storage keys; renaming
/// them invalidates every existing session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Entries {
    #[serde(rename = "cookflow_access_token", skip_serializing_if = "Option::is_none")]
    access: Option<String>,
    #[serde(rename = "cookflow_refresh_token", skip_serializing_if = "Option::is_none")]
    refresh: Option<String>,
}

/// Persistent store for the credential pair.
///
/// Reads are lock-protected snapshots; writes persist to disk before
/// returning. Login, refresh-success and logout are the only writers, and
/// the gateway's refresh discipline keeps them from interleaving.
pub struct TokenStore {
    path: PathBuf,
    entries: Mutex<Entries>,
}

impl TokenStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            path: data_dir.join(TOKENS_FILE),
            entries: Mutex::new(Entries::default()),
        }
    }

    /// Load persisted tokens from disk. Returns true if an access token
    /// was present.
    pub fn load(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        let contents =
            std::fs::read_to_string(&self.path).context("Failed to read token file")?;
        let entries: Entries =
            serde_json::from_str(&contents).context("Failed to parse token file")?;
        let present = entries.access.is_some();
        *self.lock() = entries;
        Ok(present)
    }

    /// Store a full credential pair (login path).
    pub fn set_pair(&self, access: String, refresh: String) -> Result<()> {
        let snapshot = {
            let mut entries = self.lock();
            entries.access = Some(access);
            entries.refresh = Some(refresh);
            entries.clone()
        };
        self.save(&snapshot)
    }

    /// Replace only the access token (refresh path).
    pub fn set_access(&self, access: String) -> Result<()> {
        let snapshot = {
            let mut entries = self.lock();
            entries.access = Some(access);
            entries.clone()
        };
        self.save(&snapshot)
    }

    /// Remove both tokens and the backing file (logout path).
    pub fn clear(&self) -> Result<()> {
        *self.lock() = Entries::default();
        if self.path.exists() {
            std::fs::remove_file(&self.path).context("Failed to remove token file")?;
        }
        Ok(())
    }

    pub fn access_token(&self) -> Option<String> {
        self.lock().access.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.lock().refresh.clone()
    }

    /// Decoded claims of the stored access token, if one exists and decodes.
    pub fn claims(&self) -> Option<Claims> {
        let token = self.access_token()?;
        decode_claims(&token).ok()
    }

    /// Whether a stored access token exists and its expiry is in the
    /// future. Read-only: safe to call repeatedly, mutates nothing.
    pub fn is_access_valid(&self) -> bool {
        self.claims().map(|c| !c.is_expired()).unwrap_or(false)
    }

    fn save(&self, entries: &Entries) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create data directory")?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, contents).context("Failed to write token file")?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
