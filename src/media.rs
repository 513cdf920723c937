//! Photo folder store at ~/.tablemap/media.
//!
//! Each restaurant's photos live under media/<restaurant-id>/ with a
//! millisecond-timestamped filename, and are addressed publicly as
//! /media/<restaurant-id>/<file>. Deleting a restaurant removes the whole
//! folder in one sweep.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Media store errors.
#[derive(Debug)]
pub enum MediaError {
    InvalidName(String),
    Io(String),
}

impl fmt::Display for MediaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidName(name) => write!(f, "Invalid file name '{}'", name),
            Self::Io(msg) => write!(f, "Media I/O error: {}", msg),
        }
    }
}

impl std::error::Error for MediaError {}

/// The photo folder store.
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    /// Open the store at the default location (~/.tablemap/media).
    pub fn open() -> Self {
        Self::open_at(crate::store::default_data_dir().join("media"))
    }

    pub fn open_at(root: PathBuf) -> Self {
        Self { root }
    }

    /// Save photo bytes for a restaurant. Returns the public URL path.
    /// The stored name is `<millis>.<ext>` so repeated uploads of the same
    /// file never collide.
    pub fn save(&self, restaurant_id: &str, filename: &str, bytes: &[u8]) -> Result<String, MediaError> {
        check_path_component(restaurant_id)?;
        check_path_component(filename)?;

        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin");
        let stored = format!("{}.{}", chrono::Utc::now().timestamp_millis(), ext);

        let dir = self.root.join(restaurant_id);
        fs::create_dir_all(&dir).map_err(|e| MediaError::Io(e.to_string()))?;
        fs::write(dir.join(&stored), bytes).map_err(|e| MediaError::Io(e.to_string()))?;

        Ok(format!("/media/{}/{}", restaurant_id, stored))
    }

    /// Resolve a public media path back to the file on disk.
    pub fn file_path(&self, restaurant_id: &str, filename: &str) -> Result<PathBuf, MediaError> {
        check_path_component(restaurant_id)?;
        check_path_component(filename)?;
        Ok(self.root.join(restaurant_id).join(filename))
    }

    /// Stored file names for a restaurant, sorted.
    pub fn list(&self, restaurant_id: &str) -> Vec<String> {
        let dir = self.root.join(restaurant_id);
        let mut names: Vec<String> = match fs::read_dir(dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .filter_map(|e| e.file_name().into_string().ok())
                .collect(),
            Err(_) => vec![],
        };
        names.sort();
        names
    }

    /// Remove a restaurant's whole photo folder. Missing folders are fine.
    pub fn remove_all(&self, restaurant_id: &str) -> Result<(), MediaError> {
        check_path_component(restaurant_id)?;
        let dir = self.root.join(restaurant_id);
        if !dir.exists() {
            return Ok(());
        }
        fs::remove_dir_all(dir).map_err(|e| MediaError::Io(e.to_string()))
    }
}

/// Reject anything that could escape the media root.
fn check_path_component(name: &str) -> Result<(), MediaError> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
    {
        return Err(MediaError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Content type for a stored photo, by extension.
pub fn content_type_for(filename: &str) -> &'static str {
    match Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (MediaStore, TempDir) {
        let dir = TempDir::new().unwrap();
        (MediaStore::open_at(dir.path().join("media")), dir)
    }

    #[test]
    fn test_save_returns_public_url() {
        let (store, _dir) = test_store();
        let url = store.save("ramen-king-ny", "front.jpg", b"bytes").unwrap();
        assert!(url.starts_with("/media/ramen-king-ny/"));
        assert!(url.ends_with(".jpg"));
    }

    #[test]
    fn test_saved_file_is_listed_and_readable() {
        let (store, _dir) = test_store();
        let url = store.save("a", "photo.png", b"png-bytes").unwrap();
        let stored_name = url.rsplit('/').next().unwrap();

        assert_eq!(store.list("a"), vec![stored_name.to_string()]);
        let path = store.file_path("a", stored_name).unwrap();
        assert_eq!(fs::read(path).unwrap(), b"png-bytes");
    }

    #[test]
    fn test_remove_all_clears_folder() {
        let (store, _dir) = test_store();
        store.save("a", "one.jpg", b"1").unwrap();
        store.remove_all("a").unwrap();
        assert!(store.list("a").is_empty());
        // Removing again is a no-op.
        store.remove_all("a").unwrap();
    }

    #[test]
    fn test_path_traversal_rejected() {
        let (store, _dir) = test_store();
        assert!(store.save("../escape", "x.jpg", b"").is_err());
        assert!(store.save("a", "../../x.jpg", b"").is_err());
        assert!(store.file_path("a", "..").is_err());
    }

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for("x.JPG"), "image/jpeg");
        assert_eq!(content_type_for("x.png"), "image/png");
        assert_eq!(content_type_for("x.webp"), "image/webp");
        assert_eq!(content_type_for("x"), "application/octet-stream");
    }
}
