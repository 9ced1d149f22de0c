//! Favorite city list with JSON persistence
//!
//! Favorites are a flat, ordered list of city-name strings. Only the names
//! are stored; weather for a favorite is re-fetched on demand by running
//! the full resolution pipeline against the stored name. The list lives in
//! a JSON file under the platform data directory and is written back after
//! every successful mutation.

use directories::ProjectDirs;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

/// Storage key for the favorites list (becomes `favorite_cities.json`)
const FAVORITES_KEY: &str = "favorite_cities";

/// Persists named string lists as JSON files in a data directory
///
/// The backing capability for [`Favorites`]: `load` returns an empty list
/// for a missing or corrupt file, `save` rewrites the whole list.
#[derive(Debug, Clone)]
pub struct StringListStore {
    data_dir: PathBuf,
}

impl StringListStore {
    /// Creates a store under the platform data directory
    ///
    /// Uses `~/.local/share/skycast/` on Linux, or the equivalent path on
    /// other platforms. Returns `None` if no home directory can be
    /// determined.
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "skycast")?;
        let data_dir = project_dirs.data_dir().to_path_buf();
        Some(Self { data_dir })
    }

    /// Creates a store rooted at a custom directory
    pub fn with_dir(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Returns the path of the file backing the given key
    fn list_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", key))
    }

    /// Reads a string list; a missing or unreadable file is an empty list
    pub fn load(&self, key: &str) -> Vec<String> {
        let read = || -> Option<Vec<String>> {
            let content = fs::read_to_string(self.list_path(key)).ok()?;
            serde_json::from_str(&content).ok()
        };
        read().unwrap_or_default()
    }

    /// Writes a string list, creating the directory if needed
    pub fn save(&self, key: &str, values: &[String]) -> std::io::Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        let json = serde_json::to_string_pretty(values)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(self.list_path(key), json)
    }
}

/// User-managed list of favorite cities, persisted between runs
///
/// Uniqueness is by exact string match and enforced on add only; a list
/// loaded from disk is taken as-is.
#[derive(Debug)]
pub struct Favorites {
    store: Option<StringListStore>,
    names: Vec<String>,
}

impl Favorites {
    /// Loads the favorites list from the given store
    ///
    /// `None` keeps the list purely in memory, which is how tests and
    /// homeless environments run.
    pub fn load(store: Option<StringListStore>) -> Self {
        let names = store
            .as_ref()
            .map(|s| s.load(FAVORITES_KEY))
            .unwrap_or_default();
        Self { store, names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Appends a city unless it is already present. Returns whether the
    /// list changed.
    pub fn add(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.names.push(name);
        self.persist();
        true
    }

    /// Removes a city if present, preserving the order of the rest.
    /// Removing a non-member is a no-op. Returns whether the list changed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.names.len();
        self.names.retain(|n| n != name);
        let changed = self.names.len() != before;
        if changed {
            self.persist();
        }
        changed
    }

    /// Writes the current list back to the store. A failed write keeps the
    /// in-memory list authoritative for this run.
    fn persist(&self) {
        if let Some(store) = &self.store {
            if let Err(err) = store.save(FAVORITES_KEY, &self.names) {
                warn!("failed to persist favorites: {err}");
            }
        }
    }
}
