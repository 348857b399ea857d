//! In-memory store for tests and local development.

use std::sync::Arc;

use async_trait::async_trait;
use rustc_hash::{FxHashMap, FxHashSet};
use tokio::sync::RwLock;

use super::{KvStore, StoreError};

#[derive(Debug, Default)]
struct Inner {
    entries: FxHashMap<String, String>,
    sets: FxHashMap<String, FxHashSet<String>>,
    sequences: FxHashMap<String, u64>,
}

/// Process-local [`KvStore`]. Contents are lost on restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryKvStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.inner.read().await.entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .entries
            .insert(key.to_string(), value);

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.inner.write().await.entries.remove(key).is_some())
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string());

        Ok(())
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;

        if let Some(set) = inner.sets.get_mut(key) {
            set.remove(member);

            if set.is_empty() {
                inner.sets.remove(key);
            }
        }

        Ok(())
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .sets
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn next_sequence(&self, name: &str) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        let counter = inner.sequences.entry(name.to_string()).or_default();

        *counter = counter
            .checked_add(1)
            .ok_or_else(|| StoreError::SequenceOverflow(name.to_string()))?;

        Ok(*counter)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[tokio::test]
    async fn delete_reports_presence() -> TestResult {
        let store = MemoryKvStore::new();

        store.set("a", "1".to_string()).await?;

        assert!(store.delete("a").await?);
        assert!(!store.delete("a").await?);
        assert_eq!(store.get("a").await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn set_membership_is_idempotent() -> TestResult {
        let store = MemoryKvStore::new();

        store.set_add("bookings:all", "b1").await?;
        store.set_add("bookings:all", "b1").await?;
        store.set_add("bookings:all", "b2").await?;

        let mut members = store.set_members("bookings:all").await?;
        members.sort();

        assert_eq!(members, vec!["b1".to_string(), "b2".to_string()]);

        store.set_remove("bookings:all", "b1").await?;
        store.set_remove("bookings:all", "missing").await?;

        assert_eq!(store.set_members("bookings:all").await?, vec!["b2".to_string()]);

        Ok(())
    }

    #[tokio::test]
    async fn sequences_are_independent_and_start_at_one() -> TestResult {
        let store = MemoryKvStore::new();

        assert_eq!(store.next_sequence("invoice:20260301").await?, 1);
        assert_eq!(store.next_sequence("invoice:20260301").await?, 2);
        assert_eq!(store.next_sequence("invoice:20260302").await?, 1);

        Ok(())
    }
}
