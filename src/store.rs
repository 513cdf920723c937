//! Durable restaurant store at ~/.tablemap/restaurants.json.
//!
//! A flat JSON map keyed by restaurant id. Unlike the geocode cache, this
//! file is the system of record, so persistence failures surface as errors
//! instead of being swallowed.

use crate::directory::{Coordinates, Restaurant, RestaurantDraft};
use chrono::Utc;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Store errors.
#[derive(Debug)]
pub enum StoreError {
    Duplicate(String),
    NotFound(String),
    Invalid(String),
    Io(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate(id) => write!(f, "Restaurant '{}' already exists", id),
            Self::NotFound(id) => write!(f, "Restaurant '{}' not found", id),
            Self::Invalid(msg) => write!(f, "Invalid restaurant: {}", msg),
            Self::Io(msg) => write!(f, "Store I/O error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// The restaurant store.
pub struct RestaurantStore {
    path: PathBuf,
    entries: HashMap<String, Restaurant>,
}

impl RestaurantStore {
    /// Open the store at the default location (~/.tablemap/restaurants.json).
    pub fn open() -> Self {
        Self::open_at(default_data_dir().join("restaurants.json"))
    }

    /// Open the store at a specific path.
    pub fn open_at(path: PathBuf) -> Self {
        let entries = Self::read_file(&path).unwrap_or_default();
        Self { path, entries }
    }

    fn read_file(path: &PathBuf) -> Option<HashMap<String, Restaurant>> {
        let data = fs::read_to_string(path).ok()?;
        serde_json::from_str(&data).ok()
    }

    /// Create a new restaurant from a draft. Rejects duplicate ids.
    pub fn create(&mut self, draft: RestaurantDraft) -> Result<Restaurant, StoreError> {
        draft.validate().map_err(StoreError::Invalid)?;
        if self.entries.contains_key(&draft.id) {
            return Err(StoreError::Duplicate(draft.id));
        }

        let now = Utc::now();
        let RestaurantDraft { id, name, cuisines, location, address, photos, review, coordinates } =
            draft;
        let restaurant = Restaurant {
            id: id.clone(),
            name,
            cuisines,
            location,
            address,
            photos,
            review,
            coordinates,
            created_at: now,
            updated_at: now,
        };
        self.entries.insert(id, restaurant.clone());
        self.persist()?;
        Ok(restaurant)
    }

    /// Fetch a single restaurant by id.
    pub fn get(&self, id: &str) -> Option<&Restaurant> {
        self.entries.get(id)
    }

    /// Replace a restaurant's fields from a draft. `created_at` is kept,
    /// `updated_at` is bumped. The draft id must match the stored id.
    pub fn update(&mut self, id: &str, draft: RestaurantDraft) -> Result<Restaurant, StoreError> {
        draft.validate().map_err(StoreError::Invalid)?;
        if draft.id != id {
            return Err(StoreError::Invalid(format!(
                "draft id '{}' does not match '{}'",
                draft.id, id
            )));
        }
        let existing = self
            .entries
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let RestaurantDraft { id: _, name, cuisines, location, address, photos, review, coordinates } =
            draft;
        let updated = Restaurant {
            id: id.to_string(),
            name,
            cuisines,
            location,
            address,
            photos,
            review,
            coordinates,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };
        self.entries.insert(id.to_string(), updated.clone());
        self.persist()?;
        Ok(updated)
    }

    /// Remove a restaurant. Photo cleanup is the caller's concern.
    pub fn delete(&mut self, id: &str) -> Result<Restaurant, StoreError> {
        let removed = self
            .entries
            .remove(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        self.persist()?;
        Ok(removed)
    }

    /// Persist a geocoding result onto an existing record.
    pub fn set_coordinates(&mut self, id: &str, coords: Coordinates) -> Result<(), StoreError> {
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        entry.coordinates = Some(coords);
        entry.updated_at = Utc::now();
        self.persist()
    }

    /// All restaurants, newest first.
    pub fn list(&self) -> Vec<Restaurant> {
        let mut all: Vec<Restaurant> = self.entries.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        all
    }

    /// Insert the curated seed entries, skipping ids that already exist.
    /// Returns the number of restaurants added.
    pub fn seed(&mut self) -> Result<usize, StoreError> {
        let mut added = 0;
        for seed in crate::directory::SEED_RESTAURANTS {
            if self.entries.contains_key(seed.id) {
                continue;
            }
            self.create(seed.to_draft())?;
            added += 1;
        }
        Ok(added)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::Io(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| StoreError::Io(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| StoreError::Io(e.to_string()))
    }
}

/// The on-disk state directory (~/.tablemap), honoring TABLEMAP_DATA_DIR.
pub fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TABLEMAP_DATA_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".tablemap")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{Cuisine, Location, SEED_RESTAURANTS};
    use tempfile::TempDir;

    fn test_store() -> (RestaurantStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("restaurants.json");
        (RestaurantStore::open_at(path), dir)
    }

    fn draft(id: &str) -> RestaurantDraft {
        RestaurantDraft {
            id: id.to_string(),
            name: format!("Restaurant {}", id),
            cuisines: vec![Cuisine::Thai],
            location: Location::NewYork,
            address: "456 2nd Avenue, New York, NY 10010".into(),
            photos: vec![],
            review: String::new(),
            coordinates: None,
        }
    }

    #[test]
    fn test_create_and_get() {
        let (mut store, _dir) = test_store();
        let created = store.create(draft("a")).unwrap();
        assert_eq!(created.created_at, created.updated_at);

        let fetched = store.get("a").unwrap();
        assert_eq!(fetched.name, "Restaurant a");
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn test_create_duplicate_rejected() {
        let (mut store, _dir) = test_store();
        store.create(draft("a")).unwrap();
        match store.create(draft("a")) {
            Err(StoreError::Duplicate(id)) => assert_eq!(id, "a"),
            other => panic!("expected Duplicate, got {:?}", other.map(|r| r.id)),
        }
    }

    #[test]
    fn test_create_invalid_rejected() {
        let (mut store, _dir) = test_store();
        let mut d = draft("a");
        d.cuisines.clear();
        assert!(matches!(store.create(d), Err(StoreError::Invalid(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_update_keeps_created_at() {
        let (mut store, _dir) = test_store();
        let created = store.create(draft("a")).unwrap();

        std::thread::sleep(std::time::Duration::from_millis(5));
        let mut d = draft("a");
        d.name = "Renamed".into();
        let updated = store.update("a", d).unwrap();

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
    }

    #[test]
    fn test_update_missing_or_mismatched() {
        let (mut store, _dir) = test_store();
        assert!(matches!(store.update("nope", draft("nope")), Err(StoreError::NotFound(_))));

        store.create(draft("a")).unwrap();
        assert!(matches!(store.update("a", draft("b")), Err(StoreError::Invalid(_))));
    }

    #[test]
    fn test_delete() {
        let (mut store, _dir) = test_store();
        store.create(draft("a")).unwrap();
        let removed = store.delete("a").unwrap();
        assert_eq!(removed.id, "a");
        assert!(store.get("a").is_none());
        assert!(matches!(store.delete("a"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_set_coordinates() {
        let (mut store, _dir) = test_store();
        store.create(draft("a")).unwrap();
        store
            .set_coordinates("a", Coordinates { lat: 40.73, lng: -73.98 })
            .unwrap();
        let got = store.get("a").unwrap().coordinates.unwrap();
        assert!((got.lat - 40.73).abs() < 1e-9);
    }

    #[test]
    fn test_list_newest_first() {
        let (mut store, _dir) = test_store();
        store.create(draft("first")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        store.create(draft("second")).unwrap();

        let all = store.list();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "second");
        assert_eq!(all[1].id, "first");
    }

    #[test]
    fn test_persistence_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("restaurants.json");

        {
            let mut store = RestaurantStore::open_at(path.clone());
            store.create(draft("a")).unwrap();
        }

        let store = RestaurantStore::open_at(path);
        assert_eq!(store.get("a").unwrap().name, "Restaurant a");
    }

    #[test]
    fn test_corrupt_file_treated_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("restaurants.json");
        fs::write(&path, "not json at all").unwrap();

        let store = RestaurantStore::open_at(path);
        assert!(store.is_empty());
    }

    #[test]
    fn test_seed_is_idempotent() {
        let (mut store, _dir) = test_store();
        let added = store.seed().unwrap();
        assert_eq!(added, SEED_RESTAURANTS.len());

        let added_again = store.seed().unwrap();
        assert_eq!(added_again, 0);
        assert_eq!(store.len(), SEED_RESTAURANTS.len());
    }
}
