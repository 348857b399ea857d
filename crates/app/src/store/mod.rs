//! Key-value store
//!
//! Records are kept as JSON documents under string keys. Secondary indexes
//! are unordered string sets. Writes are last-write-wins on the full value.

use async_trait::async_trait;
use mockall::automock;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

mod memory;
mod postgres;

pub use memory::MemoryKvStore;
pub use postgres::PgKvStore;

/// Key-value store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage error")]
    Sql(#[from] sqlx::Error),

    #[error("stored value for {key} could not be decoded")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("value for {key} could not be encoded")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("sequence {0} overflowed")]
    SequenceOverflow(String),
}

#[automock]
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Fetch the raw JSON stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store raw JSON under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Remove `key`. Returns whether it existed.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Add `member` to the set at `key`.
    async fn set_add(&self, key: &str, member: &str) -> Result<(), StoreError>;

    /// Remove `member` from the set at `key`.
    async fn set_remove(&self, key: &str, member: &str) -> Result<(), StoreError>;

    /// All members of the set at `key`, in no particular order.
    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError>;

    /// Increment and return the named counter, starting at 1.
    async fn next_sequence(&self, name: &str) -> Result<u64, StoreError>;
}

/// Fetch and decode a JSON record.
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn KvStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Decode {
            key: key.to_string(),
            source,
        })
}

/// Encode and store a JSON record.
pub async fn set_json<T: Serialize + Sync>(
    store: &dyn KvStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })?;

    store.set(key, raw).await
}
