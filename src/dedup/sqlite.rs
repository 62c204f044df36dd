//! `SQLite`-backed processed-work history.

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::{QueryBuilder, Row, Sqlite};
use tracing::{debug, instrument};

use super::{DedupError, DedupStore};
use crate::db::Database;
use crate::work::WorkKey;

/// Keys bound per lookup query; stays well below `SQLite`'s parameter limit.
const LOOKUP_CHUNK_SIZE: usize = 400;

/// Dedup store persisted in the `processed_works` table.
#[derive(Debug, Clone)]
pub struct SqliteDedupStore {
    db: Database,
}

impl SqliteDedupStore {
    /// Creates a store over an opened database.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Records `keys` as processed, ignoring ones already present.
    ///
    /// This is the writer side of the history. The discovery pipeline never
    /// calls it.
    ///
    /// # Returns
    ///
    /// Number of newly recorded keys.
    ///
    /// # Errors
    ///
    /// Returns [`DedupError::Database`] if the transaction fails.
    #[instrument(skip(self, keys), fields(batch = keys.len()))]
    pub async fn record_processed(&self, keys: &[WorkKey]) -> Result<u64, DedupError> {
        let mut tx = self.db.pool().begin().await?;
        let mut inserted = 0;
        for key in keys {
            let result =
                sqlx::query("INSERT OR IGNORE INTO processed_works (kind, work_id) VALUES (?, ?)")
                    .bind(key.kind.as_str())
                    .bind(&key.id)
                    .execute(&mut *tx)
                    .await?;
            inserted += result.rows_affected();
        }
        tx.commit().await?;

        debug!(inserted, "recorded processed works");
        Ok(inserted)
    }

    /// Number of recorded works.
    ///
    /// # Errors
    ///
    /// Returns [`DedupError::Database`] if the query fails.
    pub async fn count(&self) -> Result<i64, DedupError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM processed_works")
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }

    async fn recorded_among(
        &self,
        keys: &[WorkKey],
    ) -> Result<HashSet<(String, String)>, DedupError> {
        let mut recorded = HashSet::new();
        for chunk in keys.chunks(LOOKUP_CHUNK_SIZE) {
            let mut query: QueryBuilder<Sqlite> =
                QueryBuilder::new("SELECT kind, work_id FROM processed_works WHERE work_id IN (");
            let mut ids = query.separated(", ");
            for key in chunk {
                ids.push_bind(key.id.clone());
            }
            ids.push_unseparated(")");

            let rows = query.build().fetch_all(self.db.pool()).await?;
            for row in rows {
                let kind: String = row
                    .try_get("kind")
                    .map_err(|e| DedupError::CorruptRow(e.to_string()))?;
                let work_id: String = row
                    .try_get("work_id")
                    .map_err(|e| DedupError::CorruptRow(e.to_string()))?;
                recorded.insert((kind, work_id));
            }
        }
        Ok(recorded)
    }
}

#[async_trait]
impl DedupStore for SqliteDedupStore {
    #[instrument(skip(self, keys), fields(batch = keys.len()))]
    async fn filter_new(&self, keys: &[WorkKey]) -> Result<Vec<WorkKey>, DedupError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let recorded = self.recorded_among(keys).await?;
        let fresh: Vec<WorkKey> = keys
            .iter()
            .filter(|key| !recorded.contains(&(key.kind.as_str().to_string(), key.id.clone())))
            .cloned()
            .collect();

        debug!(
            recorded = keys.len() - fresh.len(),
            fresh = fresh.len(),
            "sqlite dedup complete"
        );
        Ok(fresh)
    }
}
