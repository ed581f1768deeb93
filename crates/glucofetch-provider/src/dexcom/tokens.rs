//! OAuth credential storage.
//!
//! The credential is persisted as a single JSON object at a fixed path,
//! loaded once at process start and overwritten synchronously on every
//! change. Dexcom rotates the refresh token on each refresh, so the stored
//! credential is only ever replaced as a whole.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ProviderError, ProviderResult};

/// The vendor-issued token pair plus whatever else the token endpoint sent.
///
/// Unknown fields are kept opaquely and written back verbatim, so vendor
/// additions survive a round trip through storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Bearer token for API requests.
    pub access_token: String,

    /// Token for obtaining a new pair without user interaction.
    /// Absence forces the external login flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Access token lifetime in seconds, as reported by the vendor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,

    /// Token type, normally `Bearer`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    /// Any additional vendor-supplied fields, stored opaquely.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Credential {
    /// Creates a credential from a bare token pair.
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_in: None,
            token_type: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Returns true if this credential can be refreshed without user
    /// interaction.
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.is_some()
    }
}

/// Persisted credential storage with a file-based backend.
///
/// A single owned store is shared by reference across handlers; the interior
/// lock makes the guard on the shared state explicit rather than relying on
/// single-threaded execution.
#[derive(Debug)]
pub struct TokenStore {
    /// Path to the credential file.
    path: PathBuf,

    /// In-memory cache of the current credential.
    credential: RwLock<Option<Credential>>,
}

impl TokenStore {
    /// Creates a new store at the given path. Nothing is read until
    /// [`load`](Self::load) is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            credential: RwLock::new(None),
        }
    }

    /// Loads the persisted credential into memory.
    ///
    /// Returns Ok(true) if a credential was loaded, Ok(false) if none exists.
    /// A missing file is not an error; it just means the login flow has not
    /// run yet.
    pub fn load(&self) -> ProviderResult<bool> {
        if !self.path.exists() {
            debug!("no credential file at {:?}", self.path);
            return Ok(false);
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| ProviderError::storage(format!("failed to read credential file: {}", e)))?;

        let credential: Credential = serde_json::from_str(&content).map_err(|e| {
            ProviderError::storage(format!("failed to parse credential file: {}", e))
        })?;

        info!("loaded credential from {:?}", self.path);
        *self.credential.write().unwrap() = Some(credential);
        Ok(true)
    }

    /// Replaces the credential wholesale and persists it.
    ///
    /// The write goes to a temp file first and is renamed into place, so a
    /// subsequent read never observes a partial credential.
    pub fn set(&self, credential: Credential) -> ProviderResult<()> {
        *self.credential.write().unwrap() = Some(credential);
        self.save()
    }

    /// Returns a clone of the current credential, if any.
    pub fn get(&self) -> Option<Credential> {
        self.credential.read().unwrap().clone()
    }

    /// Returns true if a credential with a refresh token is stored.
    pub fn has_refresh_token(&self) -> bool {
        self.credential
            .read()
            .unwrap()
            .as_ref()
            .is_some_and(Credential::can_refresh)
    }

    /// Clears the stored credential (both in memory and on disk).
    ///
    /// This is the operator's only reset path back to the unauthenticated
    /// state.
    pub fn clear(&self) -> ProviderResult<()> {
        *self.credential.write().unwrap() = None;
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| {
                ProviderError::storage(format!("failed to remove credential file: {}", e))
            })?;
            info!("cleared credential at {:?}", self.path);
        }
        Ok(())
    }

    /// Returns the storage path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> ProviderResult<()> {
        let credential = self.credential.read().unwrap();
        let credential = credential
            .as_ref()
            .ok_or_else(|| ProviderError::storage("no credential to save"))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                ProviderError::storage(format!("failed to create credential directory: {}", e))
            })?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(credential)
            .map_err(|e| ProviderError::storage(format!("failed to serialize credential: {}", e)))?;

        fs::write(&temp_path, &content).map_err(|e| {
            ProviderError::storage(format!("failed to write credential file: {}", e))
        })?;

        fs::rename(&temp_path, &self.path).map_err(|e| {
            ProviderError::storage(format!("failed to rename credential file: {}", e))
        })?;

        // Restrictive permissions; the file holds live tokens
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            let _ = fs::set_permissions(&self.path, perms);
        }

        debug!("saved credential to {:?}", self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> TokenStore {
        TokenStore::new(dir.path().join("tokens.json"))
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let credential = Credential::new("access-1", Some("refresh-1".to_string()));
        store.set(credential).unwrap();
        assert!(store.path().exists());

        let store2 = TokenStore::new(store.path());
        assert!(store2.load().unwrap());
        let loaded = store2.get().unwrap();
        assert_eq!(loaded.access_token, "access-1");
        assert_eq!(loaded.refresh_token, Some("refresh-1".to_string()));
    }

    #[test]
    fn load_without_file_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(!store.load().unwrap());
        assert!(store.get().is_none());
    }

    #[test]
    fn set_replaces_wholesale() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let mut first = Credential::new("access-1", Some("refresh-1".to_string()));
        first
            .extra
            .insert("scope".into(), serde_json::json!("offline_access"));
        store.set(first).unwrap();

        // The replacement has no refresh token and no extra fields; nothing
        // from the old credential may leak through.
        store.set(Credential::new("access-2", None)).unwrap();

        let store2 = TokenStore::new(store.path());
        store2.load().unwrap();
        let loaded = store2.get().unwrap();
        assert_eq!(loaded.access_token, "access-2");
        assert!(loaded.refresh_token.is_none());
        assert!(loaded.extra.is_empty());
    }

    #[test]
    fn opaque_fields_survive_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let credential: Credential = serde_json::from_str(
            r#"{
                "access_token": "acc",
                "refresh_token": "ref",
                "expires_in": 7200,
                "token_type": "Bearer",
                "scope": "offline_access",
                "issued_at": 1710000000
            }"#,
        )
        .unwrap();
        store.set(credential).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["scope"], "offline_access");
        assert_eq!(value["issued_at"], 1710000000);
        assert_eq!(value["expires_in"], 7200);
    }

    #[test]
    fn clear_removes_file_and_memory() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.set(Credential::new("access", None)).unwrap();
        assert!(store.path().exists());

        store.clear().unwrap();
        assert!(!store.path().exists());
        assert!(store.get().is_none());

        // Clearing an already-empty store is fine
        store.clear().unwrap();
    }

    #[test]
    fn has_refresh_token() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(!store.has_refresh_token());

        store.set(Credential::new("access", None)).unwrap();
        assert!(!store.has_refresh_token());

        store
            .set(Credential::new("access", Some("refresh".to_string())))
            .unwrap();
        assert!(store.has_refresh_token());
    }

    #[test]
    fn no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set(Credential::new("access", None)).unwrap();
        assert!(!store.path().with_extension("json.tmp").exists());
    }
}
