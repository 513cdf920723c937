//! Durable address → coordinate cache at ~/.tablemap/geocache.json.
//!
//! Keys are the verbatim address string — case-sensitive, no trimming, no
//! normalization — because the same string is what the resolver will ask
//! for again. Entries never expire and are never invalidated. The cache is
//! best-effort on both sides: an unreadable file is an empty cache, a
//! failed write is a no-op.

use crate::directory::Coordinates;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// The geocode cache.
pub struct GeocodeCache {
    path: PathBuf,
    entries: HashMap<String, Coordinates>,
}

impl GeocodeCache {
    /// Load the cache from the default location (~/.tablemap/geocache.json).
    pub fn load() -> Self {
        Self::load_from(crate::store::default_data_dir().join("geocache.json"))
    }

    /// Load the cache from a specific path.
    pub fn load_from(path: PathBuf) -> Self {
        let entries = Self::read_file(&path).unwrap_or_default();
        Self { path, entries }
    }

    /// An in-memory cache that never touches disk until `put` persists to
    /// the given path. Handy for tests.
    pub fn empty(path: PathBuf) -> Self {
        Self { path, entries: HashMap::new() }
    }

    fn read_file(path: &PathBuf) -> Option<HashMap<String, Coordinates>> {
        let data = fs::read_to_string(path).ok()?;
        serde_json::from_str(&data).ok()
    }

    /// Exact-string lookup.
    pub fn get(&self, address: &str) -> Option<Coordinates> {
        self.entries.get(address).copied()
    }

    /// Store a resolved coordinate under the verbatim address and persist.
    pub fn put(&mut self, address: &str, coords: Coordinates) {
        self.entries.insert(address.to_string(), coords);
        self.persist();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) {
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Ok(json) = serde_json::to_string_pretty(&self.entries) {
            let _ = fs::write(&self.path, json);
        }
    }
}
