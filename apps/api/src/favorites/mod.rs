//! Locally persisted devotional bookmarks.
//!
//! The whole list lives under one long-lived storage key as a JSON array,
//! most recently added first. Every mutation rewrites the full array.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::errors::StorageError;
use crate::storage::KeyValueStore;

pub const FAVORITES_KEY: &str = "devotional-favorites";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    Children,
    Teenagers,
}

/// Content descriptor handed over by the page that shows the devotional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteItem {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub date: String,
    pub section: Audience,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub date: String,
    pub section: Audience,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
}

pub struct FavoritesStore {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    key: String,
    favorites: Vec<Favorite>,
}

impl FavoritesStore {
    /// Loads the persisted list. Missing, unreadable or malformed data yields an empty list.
    pub fn load(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self::load_with_key(store, clock, FAVORITES_KEY)
    }

    pub fn load_with_key(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        key: impl Into<String>,
    ) -> Self {
        let key = key.into();
        let favorites = match store.get(&key) {
            Ok(Some(raw)) => parse_favorites(&raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Could not read favorites: {e}");
                Vec::new()
            }
        };
        debug!("Loaded {} favorites", favorites.len());
        Self {
            store,
            clock,
            key,
            favorites,
        }
    }

    pub fn list(&self) -> &[Favorite] {
        &self.favorites
    }

    pub fn len(&self) -> usize {
        self.favorites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty()
    }

    pub fn by_section(&self, section: Audience) -> impl Iterator<Item = &Favorite> {
        self.favorites.iter().filter(move |f| f.section == section)
    }

    pub fn is_favorite(&self, content_id: &str) -> bool {
        self.favorites.iter().any(|f| f.id == content_id)
    }

    /// Adds or refreshes `item` at the head of the list.
    ///
    /// On a persist error the in-memory list still holds the new entry.
    pub fn add(&mut self, item: FavoriteItem) -> Result<(), StorageError> {
        let favorite = Favorite {
            id: item.id,
            slug: item.slug,
            title: item.title,
            date: item.date,
            section: item.section,
            added_at: self.clock.now(),
        };
        self.favorites.retain(|f| f.id != favorite.id);
        self.favorites.insert(0, favorite);
        self.persist()
    }

    /// Removes the entry for `content_id`. Unknown ids are a no-op.
    pub fn remove(&mut self, content_id: &str) -> Result<(), StorageError> {
        let before = self.favorites.len();
        self.favorites.retain(|f| f.id != content_id);
        if self.favorites.len() == before {
            return Ok(());
        }
        self.persist()
    }

    /// Removes the item if it is a favorite, adds it otherwise.
    ///
    /// On a persist error the toggle has still happened in memory; check
    /// [`is_favorite`](Self::is_favorite) for the resulting state.
    pub fn toggle(&mut self, item: FavoriteItem) -> Result<ToggleOutcome, StorageError> {
        if self.is_favorite(&item.id) {
            self.remove(&item.id)?;
            Ok(ToggleOutcome::Removed)
        } else {
            self.add(item)?;
            Ok(ToggleOutcome::Added)
        }
    }

    fn persist(&self) -> Result<(), StorageError> {
        let json = serde_json::to_string(&self.favorites).map_err(StorageError::Serialize)?;
        self.store.set(&self.key, &json).inspect_err(|e| {
            warn!("Failed to persist {} favorites: {e}", self.favorites.len());
        })
    }
}

/// Parses a stored list, keeping the first entry for any repeated id.
fn parse_favorites(raw: &str) -> Vec<Favorite> {
    match serde_json::from_str::<Vec<Favorite>>(raw) {
        Ok(list) => {
            let mut seen = HashSet::new();
            list.into_iter()
                .filter(|f| seen.insert(f.id.clone()))
                .collect()
        }
        Err(e) => {
            warn!("Ignoring malformed favorites data: {e}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;
    use chrono::{Duration, TimeZone};
    use std::sync::atomic::{AtomicBool, Ordering};

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 0).unwrap(),
        ))
    }

    fn item(id: &str) -> FavoriteItem {
        FavoriteItem {
            id: id.to_string(),
            slug: format!("slug-{id}"),
            title: format!("Title {id}"),
            date: "2024-01-01".to_string(),
            section: Audience::Children,
        }
    }

    fn ids(store: &FavoritesStore) -> Vec<&str> {
        store.list().iter().map(|f| f.id.as_str()).collect()
    }

    #[test]
    fn test_add_add_remove_scenario() {
        let backing = Arc::new(MemoryStore::new());
        let mut favs = FavoritesStore::load(backing, clock());

        favs.add(FavoriteItem {
            id: "d1".into(),
            slug: "hope-today".into(),
            title: "Hope Today".into(),
            date: "2024-01-01".into(),
            section: Audience::Children,
        })
        .unwrap();
        favs.add(item("d2")).unwrap();
        favs.remove("d1").unwrap();

        assert_eq!(ids(&favs), vec!["d2"]);
        assert!(!favs.is_favorite("d1"));
        assert!(favs.is_favorite("d2"));
    }

    #[test]
    fn test_re_adding_refreshes_and_moves_to_head() {
        let c = clock();
        let mut favs = FavoritesStore::load(Arc::new(MemoryStore::new()), c.clone());
        favs.add(item("a")).unwrap();
        favs.add(item("b")).unwrap();
        let len_before = favs.len();

        c.advance(Duration::minutes(5));
        let mut updated = item("a");
        updated.title = "Renamed".into();
        favs.add(updated).unwrap();

        assert_eq!(favs.len(), len_before);
        assert_eq!(ids(&favs), vec!["a", "b"]);
        assert_eq!(favs.list()[0].title, "Renamed");
        assert_eq!(
            favs.list()[0].added_at,
            Utc.with_ymd_and_hms(2024, 1, 1, 6, 5, 0).unwrap()
        );
    }

    #[test]
    fn test_size_equals_distinct_ids() {
        let mut favs = FavoritesStore::load(Arc::new(MemoryStore::new()), clock());
        for id in ["x", "y", "x", "z", "y", "x"] {
            favs.add(item(id)).unwrap();
        }
        assert_eq!(favs.len(), 3);
        assert_eq!(ids(&favs), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_toggle_twice_restores_id_set() {
        let mut favs = FavoritesStore::load(Arc::new(MemoryStore::new()), clock());
        favs.add(item("keep")).unwrap();
        let before: HashSet<String> = favs.list().iter().map(|f| f.id.clone()).collect();

        assert_eq!(favs.toggle(item("t")).unwrap(), ToggleOutcome::Added);
        assert!(favs.is_favorite("t"));
        assert_eq!(favs.toggle(item("t")).unwrap(), ToggleOutcome::Removed);

        let after: HashSet<String> = favs.list().iter().map(|f| f.id.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let backing = Arc::new(MemoryStore::new());
        let mut favs = FavoritesStore::load(backing.clone(), clock());
        favs.remove("ghost").unwrap();
        assert!(favs.is_empty());
        assert!(backing.get(FAVORITES_KEY).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_data_loads_empty() {
        let backing = Arc::new(MemoryStore::new());
        backing.set(FAVORITES_KEY, "[{\"id\": 12, oops").unwrap();
        let favs = FavoritesStore::load(backing, clock());
        assert!(favs.is_empty());
        assert!(!favs.is_favorite("12"));
    }

    #[test]
    fn test_wrong_shape_loads_empty() {
        let backing = Arc::new(MemoryStore::new());
        backing.set(FAVORITES_KEY, "{\"id\": \"d1\"}").unwrap();
        assert!(FavoritesStore::load(backing, clock()).is_empty());
    }

    #[test]
    fn test_persisted_list_survives_reload() {
        let backing = Arc::new(MemoryStore::new());
        let c = clock();
        {
            let mut favs = FavoritesStore::load(backing.clone(), c.clone());
            favs.add(item("d1")).unwrap();
            favs.add(FavoriteItem {
                section: Audience::Teenagers,
                ..item("d2")
            })
            .unwrap();
        }
        let reloaded = FavoritesStore::load(backing.clone(), c);
        assert_eq!(ids(&reloaded), vec!["d2", "d1"]);
        assert_eq!(reloaded.by_section(Audience::Teenagers).count(), 1);
        assert_eq!(reloaded.by_section(Audience::Children).count(), 1);

        let raw = backing.get(FAVORITES_KEY).unwrap().unwrap();
        assert!(raw.contains("\"addedAt\""));
        assert!(raw.contains("\"teenagers\""));
    }

    #[test]
    fn test_reads_browser_written_format() {
        let backing = Arc::new(MemoryStore::new());
        backing
            .set(
                FAVORITES_KEY,
                r#"[{"id":"d9","slug":"2024-02-02-joy","title":"Joy","date":"2024-02-02","section":"teenagers","addedAt":"2024-02-03T10:00:00.000Z"}]"#,
            )
            .unwrap();
        let favs = FavoritesStore::load(backing, clock());
        assert!(favs.is_favorite("d9"));
        assert_eq!(favs.list()[0].section, Audience::Teenagers);
    }

    #[test]
    fn test_duplicate_ids_in_storage_are_collapsed() {
        let backing = Arc::new(MemoryStore::new());
        backing
            .set(
                FAVORITES_KEY,
                r#"[{"id":"d1","slug":"a","title":"First","date":"2024-01-01","section":"children","addedAt":"2024-01-02T00:00:00Z"},
                    {"id":"d1","slug":"a","title":"Stale","date":"2024-01-01","section":"children","addedAt":"2024-01-01T00:00:00Z"}]"#,
            )
            .unwrap();
        let favs = FavoritesStore::load(backing, clock());
        assert_eq!(favs.len(), 1);
        assert_eq!(favs.list()[0].title, "First");
    }

    #[test]
    fn test_persist_failure_keeps_memory_state() {
        // Room for one favorite, not two.
        let backing = Arc::new(MemoryStore::with_quota(220));
        let mut favs = FavoritesStore::load(backing.clone(), clock());
        favs.add(item("d1")).unwrap();

        let err = favs.add(item("d2")).unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded));
        assert_eq!(ids(&favs), vec!["d2", "d1"]);

        let persisted = FavoritesStore::load(backing, clock());
        assert_eq!(ids(&persisted), vec!["d1"]);
    }

    /// Accepts writes until `fill` is called, then rejects every write.
    #[derive(Default)]
    struct FillableStore {
        inner: MemoryStore,
        full: AtomicBool,
    }

    impl FillableStore {
        fn fill(&self) {
            self.full.store(true, Ordering::SeqCst);
        }
    }

    impl KeyValueStore for FillableStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.full.load(Ordering::SeqCst) {
                return Err(StorageError::QuotaExceeded);
            }
            self.inner.set(key, value)
        }
    }

    #[test]
    fn test_toggle_persist_failure_still_toggles_in_memory() {
        let backing = Arc::new(FillableStore::default());
        let mut favs = FavoritesStore::load(backing.clone(), clock());
        favs.add(item("d1")).unwrap();
        backing.fill();

        let err = favs.toggle(item("d2")).unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded));
        assert!(favs.is_favorite("d2"));

        let err = favs.toggle(item("d1")).unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded));
        assert!(!favs.is_favorite("d1"));
        assert_eq!(ids(&favs), vec!["d2"]);

        let persisted = FavoritesStore::load(backing, clock());
        assert_eq!(ids(&persisted), vec!["d1"]);
    }
}
