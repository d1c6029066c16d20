//! Client-side persisted state behind an injected storage port.
//!
//! The browser original kept the auth token, profile blob, selected city and
//! in-progress sell draft in localStorage and resynchronized across tabs via
//! storage-change events. Here the same keys live behind the `StoragePort`
//! trait: a JSON file store in production, an in-memory store in tests, and
//! an explicit change broadcast standing in for the cross-tab signal. This is
//! best-effort, eventually-consistent state, not a transactional store.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use tokio::sync::broadcast;

use crate::models::UserProfile;
use crate::wizard::SellDraft;

pub const AUTH_TOKEN_KEY: &str = "carmandi.authToken";
pub const PROFILE_KEY: &str = "carmandi.profile";
pub const SELECTED_CITY_KEY: &str = "carmandi.selectedCity";
pub const SELL_DRAFT_KEY: &str = "carmandi.sellDraft";

/// Emitted whenever a key changes, including removals.
#[derive(Debug, Clone)]
pub struct StorageChange {
    pub key: String,
}

pub trait StoragePort: Send + Sync {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
    /// Change stream; the external-writer analog of a storage event.
    fn subscribe(&self) -> broadcast::Receiver<StorageChange>;
}

fn notify(sender: &broadcast::Sender<StorageChange>, key: &str) {
    // Nobody listening is fine; the signal is best-effort
    let _ = sender.send(StorageChange {
        key: key.to_string(),
    });
}

// --- In-memory store (tests, ephemeral sessions) ---

pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    changes: broadcast::Sender<StorageChange>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            values: Mutex::new(HashMap::new()),
            changes,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StoragePort for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn write(&self, key: &str, value: &str) {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
        notify(&self.changes, key);
    }

    fn remove(&self, key: &str) {
        if let Ok(mut values) = self.values.lock() {
            values.remove(key);
        }
        notify(&self.changes, key);
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.changes.subscribe()
    }
}

// --- File-backed store (one JSON document, write-through) ---

pub struct JsonFileStore {
    path: PathBuf,
    values: Mutex<HashMap<String, String>>,
    changes: broadcast::Sender<StorageChange>,
}

impl JsonFileStore {
    /// Loads the backing file if it exists; a missing or unreadable file
    /// starts an empty store rather than failing the application.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("Session store {} is corrupt, starting empty: {}", path.display(), e);
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };
        let (changes, _) = broadcast::channel(16);
        Self {
            path,
            values: Mutex::new(values),
            changes,
        }
    }

    fn persist(&self, values: &HashMap<String, String>) {
        match serde_json::to_string_pretty(values) {
            Ok(contents) => {
                if let Err(e) = std::fs::write(&self.path, contents) {
                    tracing::warn!("Failed to persist session store {}: {}", self.path.display(), e);
                }
            }
            Err(e) => tracing::warn!("Failed to serialize session store: {}", e),
        }
    }
}

impl StoragePort for JsonFileStore {
    fn read(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn write(&self, key: &str, value: &str) {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value.to_string());
            self.persist(&values);
        }
        notify(&self.changes, key);
    }

    fn remove(&self, key: &str) {
        if let Ok(mut values) = self.values.lock() {
            values.remove(key);
            self.persist(&values);
        }
        notify(&self.changes, key);
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.changes.subscribe()
    }
}

// --- Typed session accessors ---

/// Typed view over the storage port for the four fixed keys.
pub struct SessionContext {
    store: std::sync::Arc<dyn StoragePort>,
}

impl SessionContext {
    pub fn new(store: std::sync::Arc<dyn StoragePort>) -> Self {
        Self { store }
    }

    pub fn auth_token(&self) -> Option<String> {
        self.store.read(AUTH_TOKEN_KEY)
    }

    pub fn profile(&self) -> Option<UserProfile> {
        let raw = self.store.read(PROFILE_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!("Stored profile blob is unreadable, ignoring: {}", e);
                None
            }
        }
    }

    pub fn set_session(&self, token: &str, profile: &UserProfile) {
        self.store.write(AUTH_TOKEN_KEY, token);
        match serde_json::to_string(profile) {
            Ok(raw) => self.store.write(PROFILE_KEY, &raw),
            Err(e) => tracing::warn!("Failed to serialize profile blob: {}", e),
        }
    }

    pub fn clear_session(&self) {
        self.store.remove(AUTH_TOKEN_KEY);
        self.store.remove(PROFILE_KEY);
    }

    /// Id of the remembered city filter, if any.
    pub fn selected_city(&self) -> Option<String> {
        self.store.read(SELECTED_CITY_KEY)
    }

    pub fn set_selected_city(&self, city_id: &str) {
        self.store.write(SELECTED_CITY_KEY, city_id);
    }

    pub fn clear_selected_city(&self) {
        self.store.remove(SELECTED_CITY_KEY);
    }

    pub fn sell_draft(&self) -> Option<SellDraft> {
        let raw = self.store.read(SELL_DRAFT_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(draft) => Some(draft),
            Err(e) => {
                tracing::warn!("Stored sell draft is unreadable, discarding: {}", e);
                None
            }
        }
    }

    pub fn save_sell_draft(&self, draft: &SellDraft) {
        match serde_json::to_string(draft) {
            Ok(raw) => self.store.write(SELL_DRAFT_KEY, &raw),
            Err(e) => tracing::warn!("Failed to serialize sell draft: {}", e),
        }
    }

    pub fn clear_sell_draft(&self) {
        self.store.remove(SELL_DRAFT_KEY);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.store.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn profile() -> UserProfile {
        UserProfile {
            id: "u1".to_string(),
            name: Some("Asha".to_string()),
            phone: "9876543210".to_string(),
            email: None,
        }
    }

    #[test]
    fn memory_store_round_trips_values() {
        let store = MemoryStore::new();
        assert_eq!(store.read("k"), None);
        store.write("k", "v");
        assert_eq!(store.read("k"), Some("v".to_string()));
        store.remove("k");
        assert_eq!(store.read("k"), None);
    }

    #[test]
    fn writes_emit_change_events() {
        let store = MemoryStore::new();
        let mut changes = store.subscribe();
        store.write(SELECTED_CITY_KEY, "pune");
        let change = changes.try_recv().expect("change event");
        assert_eq!(change.key, SELECTED_CITY_KEY);
    }

    #[test]
    fn session_context_round_trips_session() {
        let session = SessionContext::new(Arc::new(MemoryStore::new()));
        assert_eq!(session.auth_token(), None);

        session.set_session("tok-123", &profile());
        assert_eq!(session.auth_token(), Some("tok-123".to_string()));
        assert_eq!(session.profile().map(|p| p.id), Some("u1".to_string()));

        session.clear_session();
        assert_eq!(session.auth_token(), None);
        assert!(session.profile().is_none());
    }

    #[test]
    fn external_write_is_observed_through_the_context() {
        let store = Arc::new(MemoryStore::new());
        let session = SessionContext::new(store.clone());
        let mut changes = session.subscribe();

        // Another "tab" updates the selected city directly
        store.write(SELECTED_CITY_KEY, "delhi");

        assert_eq!(changes.try_recv().map(|c| c.key).ok().as_deref(), Some(SELECTED_CITY_KEY));
        assert_eq!(session.selected_city(), Some("delhi".to_string()));
    }

    #[test]
    fn cleared_city_selection_stays_cleared() {
        let session = SessionContext::new(Arc::new(MemoryStore::new()));
        session.set_selected_city("city-del");
        assert_eq!(session.selected_city(), Some("city-del".to_string()));

        session.clear_selected_city();
        assert_eq!(session.selected_city(), None);
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("session.json");

        {
            let store = JsonFileStore::open(&path);
            store.write(AUTH_TOKEN_KEY, "tok-456");
        }

        let reopened = JsonFileStore::open(&path);
        assert_eq!(reopened.read(AUTH_TOKEN_KEY), Some("tok-456".to_string()));
    }

    #[test]
    fn corrupt_file_starts_an_empty_store() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").expect("write");

        let store = JsonFileStore::open(&path);
        assert_eq!(store.read(AUTH_TOKEN_KEY), None);
    }
}
