// Saved developers, saved repositories and search history
use chrono::Utc;
use devgraph_storage::KeyValueStore;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::models::{HasId, Profile, RepositorySummary, SavedDeveloper, SavedRepo};

pub const SAVED_DEVELOPERS_KEY: &str = "devgraph:saved-developers";
pub const SAVED_REPOS_KEY: &str = "devgraph:saved-repos";
pub const SEARCH_HISTORY_KEY: &str = "devgraph:search-history";

/// Default number of queries kept in the search history
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Source of `savedAt` timestamps
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Favorites on top of any key-value medium
///
/// Nothing here returns an error. A missing or corrupted collection reads as
/// empty, and a failed write is logged and dropped - the caller carries on
/// as if nothing happened. A mutation whose read fails is skipped, so an
/// unreadable medium never gets overwritten with an empty list.
pub struct FavoritesStore<S: KeyValueStore> {
    storage: S,
    clock: Box<dyn Clock>,
    history_limit: usize,
}

impl<S: KeyValueStore> FavoritesStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_clock(storage, Box::new(SystemClock))
    }

    pub fn with_clock(storage: S, clock: Box<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Keep a different number of history entries (at least one)
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self
    }

    // Developers

    /// Save a developer. Returns false (and changes nothing) if already saved.
    pub fn save_developer(&self, profile: &Profile) -> bool {
        let saved_at = self.clock.now_millis();
        self.insert_unique(SAVED_DEVELOPERS_KEY, SavedDeveloper::from_profile(profile, saved_at))
    }

    pub fn remove_developer(&self, id: u64) -> bool {
        self.remove_by_id::<SavedDeveloper>(SAVED_DEVELOPERS_KEY, id)
    }

    pub fn is_developer_saved(&self, id: u64) -> bool {
        self.saved_developers().iter().any(|d| d.id == id)
    }

    pub fn saved_developers(&self) -> Vec<SavedDeveloper> {
        self.read_list(SAVED_DEVELOPERS_KEY)
    }

    // Repositories

    /// Save a repository. Returns false (and changes nothing) if already saved.
    pub fn save_repo(&self, repo: &RepositorySummary) -> bool {
        let saved_at = self.clock.now_millis();
        self.insert_unique(SAVED_REPOS_KEY, SavedRepo::from_repository(repo, saved_at))
    }

    pub fn remove_repo(&self, id: u64) -> bool {
        self.remove_by_id::<SavedRepo>(SAVED_REPOS_KEY, id)
    }

    pub fn is_repo_saved(&self, id: u64) -> bool {
        self.saved_repos().iter().any(|r| r.id == id)
    }

    pub fn saved_repos(&self) -> Vec<SavedRepo> {
        self.read_list(SAVED_REPOS_KEY)
    }

    // Search history

    /// Put `query` at the front, dropping any older copy and anything past the limit
    pub fn record_query(&self, query: &str) {
        let Some(mut history) = self.load_for_update::<String>(SEARCH_HISTORY_KEY) else {
            return;
        };
        history.retain(|q| q != query);
        history.insert(0, query.to_string());
        history.truncate(self.history_limit);
        self.write_list(SEARCH_HISTORY_KEY, &history);
    }

    /// Most recent first
    pub fn search_history(&self) -> Vec<String> {
        self.read_list(SEARCH_HISTORY_KEY)
    }

    pub fn clear_search_history(&self) {
        if let Err(e) = self.storage.remove(SEARCH_HISTORY_KEY) {
            warn!("Failed to clear search history: {}", e);
        }
    }

    // Plumbing

    fn insert_unique<T>(&self, key: &str, entry: T) -> bool
    where
        T: HasId + Serialize + DeserializeOwned,
    {
        let Some(mut list) = self.load_for_update::<T>(key) else {
            return false;
        };
        if list.iter().any(|e| e.id() == entry.id()) {
            debug!("{} already holds id {}", key, entry.id());
            return false;
        }

        list.push(entry);
        self.write_list(key, &list)
    }

    fn remove_by_id<T>(&self, key: &str, id: u64) -> bool
    where
        T: HasId + Serialize + DeserializeOwned,
    {
        let Some(mut list) = self.load_for_update::<T>(key) else {
            return false;
        };
        let before = list.len();
        list.retain(|e| e.id() != id);

        if list.len() == before {
            return false;
        }
        self.write_list(key, &list)
    }

    /// Current list for display; any failure reads as empty
    fn read_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        match self.try_read_list(key) {
            Ok(list) => list,
            Err(e) => {
                warn!("Failed to read {}: {}", key, e);
                Vec::new()
            }
        }
    }

    /// Current list ahead of a write, or None when the medium couldn't be read.
    /// Callers skip their write on None; malformed contents read as empty and
    /// do get replaced.
    fn load_for_update<T: DeserializeOwned>(&self, key: &str) -> Option<Vec<T>> {
        match self.try_read_list(key) {
            Ok(list) => Some(list),
            Err(e) => {
                warn!("Not updating {}, read failed: {}", key, e);
                None
            }
        }
    }

    fn try_read_list<T: DeserializeOwned>(&self, key: &str) -> devgraph_storage::Result<Vec<T>> {
        let Some(raw) = self.storage.get(key)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&raw) {
            Ok(list) => Ok(list),
            Err(e) => {
                warn!("Ignoring malformed {} ({})", key, e);
                Ok(Vec::new())
            }
        }
    }

    fn write_list<T: Serialize>(&self, key: &str, list: &[T]) -> bool {
        let raw = match serde_json::to_string(list) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to serialize {}: {}", key, e);
                return false;
            }
        };

        match self.storage.set(key, &raw) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to write {}: {}", key, e);
                false
            }
        }
    }
}
