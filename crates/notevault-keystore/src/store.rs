//! Key-value persistence boundary
//!
//! The real store (platform keychain, encrypted preferences, ...) lives
//! outside this crate; the lifecycle manager only needs three string
//! entries. The trait is async because every real backend is an I/O call.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;

/// Well-known storage entry names
pub mod keys {
    /// The base64 content key
    pub const CONTENT_KEY: &str = "content-key";
    /// The 10-digit recovery code
    pub const RECOVERY_CODE: &str = "recovery-code";
    /// The wrapped-key envelope (base64 of JSON)
    pub const WRAPPED_KEY: &str = "wrapped-key";
}

/// Minimal persistence interface the lifecycle manager runs against.
#[allow(async_fn_in_trait)]
pub trait KeyValueStore {
    /// Read an entry, `None` if absent.
    async fn read(&self, key: &str) -> Result<Option<String>>;

    /// Write an entry, overwriting any existing value.
    async fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Delete every entry this store holds.
    async fn delete_all(&self) -> Result<()>;
}

/// In-memory backend, the reference store for tests.
///
/// Clones share the same underlying map, so one store can be observed both
/// by a service and by the test driving it.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, String>,
    writes: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `write` calls observed since creation.
    pub async fn write_count(&self) -> u64 {
        self.inner.lock().await.writes
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.inner.lock().await.entries.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.entries.insert(key.to_string(), value.to_string());
        inner.writes += 1;
        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        self.inner.lock().await.entries.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.read("missing").await.unwrap(), None);

        store.write("a", "1").await.unwrap();
        store.write("a", "2").await.unwrap();
        assert_eq!(store.read("a").await.unwrap().as_deref(), Some("2"));
        assert_eq!(store.write_count().await, 2);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_memory_store_clones_share_state() {
        let store = MemoryStore::new();
        let view = store.clone();

        store.write("a", "1").await.unwrap();
        assert_eq!(view.read("a").await.unwrap().as_deref(), Some("1"));

        view.delete_all().await.unwrap();
        assert!(store.is_empty().await);
    }
}
