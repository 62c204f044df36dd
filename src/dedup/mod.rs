//! Deduplication against previously processed works.
//!
//! The pipeline only ever reads from a [`DedupStore`]. Recording works as
//! processed is the caller's job, through the adapter's own writer
//! ([`MemoryDedupStore::record`], [`SqliteDedupStore::record_processed`]).
//!
//! # Example
//!
//! ```
//! use discovery_core::dedup::{DedupStore, MemoryDedupStore};
//! use discovery_core::work::{WorkKey, WorkKind};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryDedupStore::new();
//! store.record(WorkKey::new(WorkKind::Image, "1"));
//!
//! let fresh = store
//!     .filter_new(&[WorkKey::new(WorkKind::Image, "1"), WorkKey::new(WorkKind::Image, "2")])
//!     .await?;
//! assert_eq!(fresh, vec![WorkKey::new(WorkKind::Image, "2")]);
//! # Ok(())
//! # }
//! ```

mod sqlite;

pub use sqlite::SqliteDedupStore;

use async_trait::async_trait;
use dashmap::DashSet;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::work::WorkKey;

/// Errors from dedup store queries.
#[derive(Debug, Error)]
pub enum DedupError {
    /// Backing database query failed.
    #[error("dedup query failed: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored row could not be decoded.
    #[error("corrupt processed-work row: {0}")]
    CorruptRow(String),
}

/// Read-only view of the set of processed works.
///
/// Implementations must be safe to query concurrently from independent runs.
#[async_trait]
pub trait DedupStore: Send + Sync {
    /// Returns the keys from `keys` that have not been recorded, in input order.
    ///
    /// Called once per page with the whole accepted batch.
    async fn filter_new(&self, keys: &[WorkKey]) -> Result<Vec<WorkKey>, DedupError>;
}

/// In-memory store backed by a concurrent set.
#[derive(Debug, Default)]
pub struct MemoryDedupStore {
    recorded: DashSet<WorkKey>,
}

impl MemoryDedupStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `key` as processed. Returns false if it was already recorded.
    pub fn record(&self, key: WorkKey) -> bool {
        self.recorded.insert(key)
    }

    /// Records every key in `keys`.
    pub fn record_all<I>(&self, keys: I)
    where
        I: IntoIterator<Item = WorkKey>,
    {
        for key in keys {
            self.recorded.insert(key);
        }
    }

    /// Returns whether `key` has been recorded.
    #[must_use]
    pub fn contains(&self, key: &WorkKey) -> bool {
        self.recorded.contains(key)
    }

    /// Number of recorded keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recorded.len()
    }

    /// Returns true when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recorded.is_empty()
    }
}

impl FromIterator<WorkKey> for MemoryDedupStore {
    fn from_iter<I: IntoIterator<Item = WorkKey>>(iter: I) -> Self {
        let store = Self::new();
        store.record_all(iter);
        store
    }
}

#[async_trait]
impl DedupStore for MemoryDedupStore {
    #[instrument(skip(self, keys), fields(batch = keys.len()))]
    async fn filter_new(&self, keys: &[WorkKey]) -> Result<Vec<WorkKey>, DedupError> {
        let fresh: Vec<WorkKey> = keys
            .iter()
            .filter(|key| !self.recorded.contains(*key))
            .cloned()
            .collect();
        debug!(fresh = fresh.len(), "memory dedup complete");
        Ok(fresh)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::work::WorkKind;

    fn keys(ids: &[&str]) -> Vec<WorkKey> {
        ids.iter().map(|id| WorkKey::new(WorkKind::Image, *id)).collect()
    }

    #[tokio::test]
    async fn test_empty_store_returns_everything() {
        let store = MemoryDedupStore::new();
        let input = keys(&["3", "1", "2"]);
        assert_eq!(store.filter_new(&input).await.unwrap(), input);
    }

    #[tokio::test]
    async fn test_output_is_ordered_subsequence() {
        let store: MemoryDedupStore = keys(&["2", "4"]).into_iter().collect();
        let input = keys(&["5", "4", "3", "2", "1"]);
        let output = store.filter_new(&input).await.unwrap();
        assert_eq!(output, keys(&["5", "3", "1"]));

        // Every output key appears in the input in the same relative order.
        let mut positions = output
            .iter()
            .map(|key| input.iter().position(|k| k == key).unwrap());
        let mut last = positions.next().unwrap();
        for position in positions {
            assert!(position > last);
            last = position;
        }
        assert!(output.iter().all(|key| !store.contains(key)));
    }

    #[tokio::test]
    async fn test_kind_is_part_of_identity() {
        let store = MemoryDedupStore::new();
        store.record(WorkKey::new(WorkKind::Image, "7"));
        let input = vec![
            WorkKey::new(WorkKind::Image, "7"),
            WorkKey::new(WorkKind::Text, "7"),
        ];
        let output = store.filter_new(&input).await.unwrap();
        assert_eq!(output, vec![WorkKey::new(WorkKind::Text, "7")]);
    }

    #[tokio::test]
    async fn test_filter_new_does_not_write() {
        let store = MemoryDedupStore::new();
        store.filter_new(&keys(&["1", "2"])).await.unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_record_reports_duplicates() {
        let store = MemoryDedupStore::new();
        assert!(store.record(WorkKey::new(WorkKind::Image, "1")));
        assert!(!store.record(WorkKey::new(WorkKind::Image, "1")));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_queries_see_consistent_state() {
        let store: Arc<MemoryDedupStore> =
            Arc::new(keys(&["1", "3", "5"]).into_iter().collect());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .filter_new(&keys(&["1", "2", "3", "4", "5", "6"]))
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), keys(&["2", "4", "6"]));
        }
    }
}
