use std::path::Path;
use std::sync::Arc;

use ns_core::{Error, Result};

pub mod backends;
pub mod preferences;
pub mod saved;

pub use backends::*;
pub use preferences::{Preferences, Theme};
pub use saved::{SaveToggle, SavedArticle, SavedArticles};

/// String key-value store surviving across sessions, modeled on a browser's
/// local storage. Calls are synchronous.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Available backends: memory, file (requires `path`).
pub fn create_store(kind: &str, path: Option<&Path>) -> Result<Arc<dyn KeyValueStore>> {
    match (kind.to_lowercase().as_str(), path) {
        ("memory", _) => Ok(Arc::new(MemoryStore::new())),
        ("file", Some(path)) => Ok(Arc::new(FileStore::open(path)?)),
        ("file", None) => Err(Error::Storage("file store needs a path".to_string())),
        (other, _) => Err(Error::Storage(format!(
            "Unknown store: {}. Available stores: memory, file",
            other
        ))),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_store, KeyValueStore, Preferences, SavedArticles};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_store() {
        let store = create_store("memory", None).unwrap();
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));

        assert!(create_store("file", None).is_err());
        assert!(create_store("redis", None).is_err());

        let dir = tempfile::tempdir().unwrap();
        let store = create_store("file", Some(dir.path().join("store.json").as_path())).unwrap();
        assert_eq!(store.get("missing").unwrap(), None);
    }
}
