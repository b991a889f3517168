//! Keyed string store
//!
//! The reader keeps every persistent piece of client state (record cache,
//! favorites, language-name lookups) in a flat string-keyed store, the way a
//! browser keeps `localStorage`. Callers go through [`KeyedStore`] so the
//! caches and the curation exports do not care which backend is underneath.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::Result;

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Flat key/value store with prefix enumeration
#[async_trait]
pub trait KeyedStore: Send + Sync {
    /// Read the raw value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or overwrite `key`
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    async fn delete(&self, key: &str) -> Result<()>;

    /// All keys starting with `prefix`, in ascending key order
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Read and decode a JSON value
///
/// A value that fails to decode is reported as [`crate::Error::Serialization`]
/// so callers can decide whether to treat it as a miss or purge it.
pub async fn get_json<T: DeserializeOwned>(store: &dyn KeyedStore, key: &str) -> Result<Option<T>> {
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encode and store a JSON value
pub async fn set_json<T: Serialize + ?Sized>(store: &dyn KeyedStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw).await
}
