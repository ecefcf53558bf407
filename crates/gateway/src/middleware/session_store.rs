//! In-memory session store backed by a moka cache.
//!
//! Preferences can be saved without logging in, so every cookieless visitor
//! creates a record. Records are dropped by the cache once their expiry date
//! passes, and the cache is bounded so a flood of new visitors evicts old
//! records instead of growing the process.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use tower_sessions::SessionStore;
use tower_sessions::cookie::time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store;

/// Default upper bound on live session records.
pub const DEFAULT_MAX_SESSIONS: u64 = 100_000;

/// Per-entry expiry taken from the record's own expiry date.
struct RecordExpiry;

impl Expiry<Id, Record> for RecordExpiry {
    fn expire_after_create(&self, _id: &Id, record: &Record, _created_at: Instant) -> Option<Duration> {
        Some(time_left(record))
    }

    fn expire_after_update(
        &self,
        _id: &Id,
        record: &Record,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(time_left(record))
    }
}

fn time_left(record: &Record) -> Duration {
    Duration::try_from(record.expiry_date - OffsetDateTime::now_utc()).unwrap_or(Duration::ZERO)
}

/// Session store holding records in a bounded, expiring cache.
#[derive(Clone)]
pub struct SessionCache {
    records: Cache<Id, Record>,
}

impl SessionCache {
    /// Create a store that keeps at most `max_sessions` records.
    #[must_use]
    pub fn new(max_sessions: u64) -> Self {
        Self {
            records: Cache::builder()
                .max_capacity(max_sessions)
                .expire_after(RecordExpiry)
                .build(),
        }
    }

    /// Number of live records, after pending evictions have run.
    pub async fn entry_count(&self) -> u64 {
        self.records.run_pending_tasks().await;
        self.records.entry_count()
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SESSIONS)
    }
}

impl std::fmt::Debug for SessionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCache")
            .field("entries", &self.records.entry_count())
            .finish()
    }
}

#[async_trait]
impl SessionStore for SessionCache {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        while self.records.contains_key(&record.id) {
            record.id = Id::default();
        }
        self.save(record).await
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.records.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn load(&self, id: &Id) -> session_store::Result<Option<Record>> {
        Ok(self
            .records
            .get(id)
            .await
            .filter(|record| record.expiry_date > OffsetDateTime::now_utc()))
    }

    async fn delete(&self, id: &Id) -> session_store::Result<()> {
        self.records.invalidate(id).await;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use tower_sessions::cookie::time::Duration as TimeDuration;

    use super::*;

    fn record(expires_in: TimeDuration) -> Record {
        Record {
            id: Id::default(),
            data: HashMap::from([("theme".to_string(), serde_json::json!("dark"))]),
            expiry_date: OffsetDateTime::now_utc() + expires_in,
        }
    }

    #[tokio::test]
    async fn test_save_load_delete() {
        let store = SessionCache::default();
        let mut record = record(TimeDuration::hours(1));

        store.create(&mut record).await.unwrap();
        let loaded = store.load(&record.id).await.unwrap().unwrap();
        assert_eq!(loaded.data["theme"], "dark");

        store.delete(&record.id).await.unwrap();
        assert!(store.load(&record.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_records_are_evicted() {
        let store = SessionCache::default();
        let mut stale = record(TimeDuration::minutes(-5));
        let mut fresh = record(TimeDuration::hours(1));

        store.create(&mut stale).await.unwrap();
        store.create(&mut fresh).await.unwrap();

        assert!(store.load(&stale.id).await.unwrap().is_none());
        assert!(store.load(&fresh.id).await.unwrap().is_some());
        assert_eq!(store.entry_count().await, 1);
    }

    #[tokio::test]
    async fn test_capacity_is_bounded() {
        let store = SessionCache::new(3);
        for _ in 0..50 {
            store.create(&mut record(TimeDuration::hours(1))).await.unwrap();
        }
        assert!(store.entry_count().await <= 3);
    }
}
