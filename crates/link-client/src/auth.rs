//! File-backed session credentials.
//!
//! One directory per session: `creds.json` holds the credentials, and each
//! piece of key material lives in its own `<category>-<id>.json` file.

use crate::backend::CredentialListener;
use crate::error::LinkError;
use crate::types::{CredentialUpdate, Credentials};
use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::debug;

const CREDS_FILE: &str = "creds.json";

/// Persists credentials and key material into a session directory.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    dir: PathBuf,
}

impl FileCredentialStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read stored credentials, if any.
    pub async fn load_creds(&self) -> Result<Option<Credentials>, LinkError> {
        match self.read_json(CREDS_FILE).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub async fn save_creds(&self, creds: &Credentials) -> Result<(), LinkError> {
        self.write_json(CREDS_FILE, &serde_json::to_value(creds)?)
            .await
    }

    pub async fn read_key(&self, category: &str, id: &str) -> Result<Option<Value>, LinkError> {
        self.read_json(&key_file_name(category, id)).await
    }

    pub async fn write_key(&self, category: &str, id: &str, value: &Value) -> Result<(), LinkError> {
        self.write_json(&key_file_name(category, id), value).await
    }

    pub async fn remove_key(&self, category: &str, id: &str) -> Result<(), LinkError> {
        match fs::remove_file(self.dir.join(key_file_name(category, id))).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_json(&self, file: &str) -> Result<Option<Value>, LinkError> {
        match fs::read(self.dir.join(file)).await {
            Ok(data) => Ok(Some(serde_json::from_slice(&data)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write atomically using temp file + rename.
    async fn write_json(&self, file: &str, value: &Value) -> Result<(), LinkError> {
        let path = self.dir.join(file);
        let temp_path = self.dir.join(format!("{}.tmp", file));

        fs::write(&temp_path, serde_json::to_vec(value)?).await?;
        fs::rename(&temp_path, &path).await?;

        debug!(path = %path.display(), "Wrote credential file");
        Ok(())
    }
}

#[async_trait]
impl CredentialListener for FileCredentialStore {
    async fn credentials_updated(&self, update: &CredentialUpdate) -> Result<(), LinkError> {
        self.save_creds(&update.creds).await?;

        for (category, entries) in &update.keys {
            for (id, value) in entries {
                match value {
                    Some(value) => self.write_key(category, id, value).await?,
                    None => self.remove_key(category, id).await?,
                }
            }
        }

        Ok(())
    }
}

/// Credentials loaded from, and persisted to, a session directory.
pub struct AuthState {
    pub creds: Credentials,
    store: Arc<FileCredentialStore>,
}

impl AuthState {
    /// Open the credential state in `dir`, creating the directory and fresh
    /// credentials when nothing is stored yet.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, LinkError> {
        let store = FileCredentialStore::new(dir);
        fs::create_dir_all(store.dir()).await?;

        let creds = match store.load_creds().await? {
            Some(creds) => creds,
            None => {
                let creds = Credentials::generate();
                store.save_creds(&creds).await?;
                creds
            }
        };

        Ok(Self {
            creds,
            store: Arc::new(store),
        })
    }

    /// The store, for registration as a credential listener.
    pub fn store(&self) -> Arc<FileCredentialStore> {
        Arc::clone(&self.store)
    }
}

/// File name for a key: `/` becomes `__` and `:` becomes `-`.
fn key_file_name(category: &str, id: &str) -> String {
    format!("{}-{}.json", category, id)
        .replace('/', "__")
        .replace(':', "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KeyUpdates;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn test_key_file_name() {
        assert_eq!(key_file_name("pre-key", "1"), "pre-key-1.json");
        assert_eq!(
            key_file_name("session", "123:4@s.whatsapp.net"),
            "session-123-4@s.whatsapp.net.json"
        );
        assert_eq!(key_file_name("app-state/sync", "a/b"), "app-state__sync-a__b.json");
    }

    #[tokio::test]
    async fn test_open_generates_and_persists_creds() {
        let dir = TempDir::new().unwrap();
        let session_dir = dir.path().join("session_test");

        let state = AuthState::open(&session_dir).await.unwrap();
        assert!(!state.creds.registered);
        assert!(session_dir.join(CREDS_FILE).exists());

        // Reopening yields the same credentials
        let reopened = AuthState::open(&session_dir).await.unwrap();
        assert_eq!(reopened.creds, state.creds);
    }

    #[tokio::test]
    async fn test_listener_writes_creds_and_keys() {
        let dir = TempDir::new().unwrap();
        let state = AuthState::open(dir.path()).await.unwrap();
        let store = state.store();

        store
            .write_key("pre-key", "2", &serde_json::json!({"stale": true}))
            .await
            .unwrap();

        let mut creds = state.creds.clone();
        creds.registered = true;

        let mut keys: KeyUpdates = BTreeMap::new();
        let mut pre_keys = BTreeMap::new();
        pre_keys.insert("1".to_string(), Some(serde_json::json!({"public": "abc"})));
        pre_keys.insert("2".to_string(), None);
        keys.insert("pre-key".to_string(), pre_keys);

        store
            .credentials_updated(&CredentialUpdate { creds, keys })
            .await
            .unwrap();

        let saved = store.load_creds().await.unwrap().unwrap();
        assert!(saved.registered);

        let key = store.read_key("pre-key", "1").await.unwrap();
        assert_eq!(key, Some(serde_json::json!({"public": "abc"})));
        assert!(store.read_key("pre-key", "2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_credential_fields_survive() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CREDS_FILE),
            r#"{"registered":true,"registrationId":42,"advSecretKey":"k","noiseKey":{"public":"x"}}"#,
        )
        .await
        .unwrap();

        let state = AuthState::open(dir.path()).await.unwrap();
        assert!(state.creds.registered);
        assert_eq!(state.creds.registration_id, 42);

        state.store().save_creds(&state.creds).await.unwrap();
        let raw = fs::read_to_string(dir.path().join(CREDS_FILE)).await.unwrap();
        assert!(raw.contains("noiseKey"));
    }

    #[tokio::test]
    async fn test_remove_missing_key_is_ok() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path());
        assert!(store.remove_key("pre-key", "404").await.is_ok());
    }
}
