//! Durable storage of the session credential (bearer token + cached user)
//!
//! Both fields are always written and removed together in one storage
//! operation so readers never observe a half cleared session

use parley_shared::{token::AuthToken, user::UserData};
use std::{
    collections::BTreeMap,
    fmt::Debug,
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tracing::{error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum::AsRefStr)]
pub enum StorageKey {
    #[strum(serialize = "authToken")]
    AuthToken,
    #[strum(serialize = "userData")]
    UserData,
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialStoreError {
    #[error("failed to access credential storage: {0}")]
    Io(#[from] std::io::Error),
    #[error("credential storage is corrupt: {0}")]
    Format(#[from] serde_json::Error),
}

/// Key value storage that outlives the process
///
/// Multi key operations must be atomic
pub trait CredentialStore: Debug + Send + Sync + 'static {
    fn get_item(&self, key: StorageKey) -> Result<Option<String>, CredentialStoreError>;
    fn multi_set(&self, items: &[(StorageKey, String)]) -> Result<(), CredentialStoreError>;
    fn multi_remove(&self, keys: &[StorageKey]) -> Result<(), CredentialStoreError>;
}

/// Shared handle to the credential store used by both the request wrapper and
/// the event channel
#[derive(Debug, Clone)]
pub struct Credentials {
    store: Arc<dyn CredentialStore>,
}

const SESSION_KEYS: [StorageKey; 2] = [StorageKey::AuthToken, StorageKey::UserData];

impl Credentials {
    pub fn new(store: impl CredentialStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Credentials that only live as long as the process
    pub fn in_memory() -> Self {
        Self::new(MemoryCredentialStore::default())
    }

    /// Returns the stored token
    ///
    /// Storage failures are logged and reported as no token. An empty token
    /// also counts as no token
    pub fn token(&self) -> Option<AuthToken> {
        match self.store.get_item(StorageKey::AuthToken) {
            Ok(token) => token.filter(|t| !t.is_empty()).map(AuthToken::from),
            Err(err) => {
                error!(?err, "error getting auth token");
                None
            }
        }
    }

    pub fn user_data(&self) -> Option<UserData> {
        let raw = match self.store.get_item(StorageKey::UserData) {
            Ok(raw) => raw?,
            Err(err) => {
                error!(?err, "error getting user data");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(user_data) => Some(user_data),
            Err(err) => {
                warn!(?err, "stored user data is not valid json");
                None
            }
        }
    }

    #[tracing::instrument(skip(token))]
    pub fn store_session(
        &self,
        token: &AuthToken,
        user_data: &UserData,
    ) -> Result<(), CredentialStoreError> {
        let user_data = serde_json::to_string(user_data)?;
        self.store.multi_set(&[
            (StorageKey::AuthToken, token.as_str().to_string()),
            (StorageKey::UserData, user_data),
        ])
    }

    #[tracing::instrument]
    pub fn clear(&self) -> Result<(), CredentialStoreError> {
        self.store.multi_remove(&SESSION_KEYS)
    }
}

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    items: Mutex<BTreeMap<StorageKey, String>>,
}

impl CredentialStore for MemoryCredentialStore {
    fn get_item(&self, key: StorageKey) -> Result<Option<String>, CredentialStoreError> {
        Ok(self.items.lock().expect("mutex poisoned").get(&key).cloned())
    }

    fn multi_set(&self, items: &[(StorageKey, String)]) -> Result<(), CredentialStoreError> {
        let mut guard = self.items.lock().expect("mutex poisoned");
        for (key, value) in items {
            guard.insert(*key, value.clone());
        }
        Ok(())
    }

    fn multi_remove(&self, keys: &[StorageKey]) -> Result<(), CredentialStoreError> {
        let mut guard = self.items.lock().expect("mutex poisoned");
        for key in keys {
            guard.remove(key);
        }
        Ok(())
    }
}

/// Stores the credentials as a json object in a file
///
/// Writes go to a temporary file that is then renamed over the original so a
/// crash mid write leaves the previous contents intact
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, CredentialStoreError> {
        match std::fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> Result<(), CredentialStoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut tmp_path = self.path.clone().into_os_string();
        tmp_path.push(".tmp");
        std::fs::write(&tmp_path, serde_json::to_vec(items)?)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn update<F>(&self, f: F) -> Result<(), CredentialStoreError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self.lock.lock().expect("mutex poisoned");
        let mut items = match self.read_all() {
            Ok(items) => items,
            Err(CredentialStoreError::Format(err)) => {
                // Same as reads, a corrupt file holds no session
                warn!(?err, path = ?self.path, "credential file is corrupt, overwriting it");
                BTreeMap::new()
            }
            Err(err) => return Err(err),
        };
        f(&mut items);
        self.write_all(&items)
    }
}

impl CredentialStore for FileCredentialStore {
    fn get_item(&self, key: StorageKey) -> Result<Option<String>, CredentialStoreError> {
        let _guard = self.lock.lock().expect("mutex poisoned");
        Ok(self.read_all()?.remove(key.as_ref()))
    }

    fn multi_set(&self, items: &[(StorageKey, String)]) -> Result<(), CredentialStoreError> {
        self.update(|stored| {
            for (key, value) in items {
                stored.insert(key.as_ref().to_string(), value.clone());
            }
        })
    }

    fn multi_remove(&self, keys: &[StorageKey]) -> Result<(), CredentialStoreError> {
        self.update(|stored| {
            for key in keys {
                stored.remove(key.as_ref());
            }
        })
    }
}
