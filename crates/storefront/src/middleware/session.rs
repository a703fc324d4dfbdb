//! Session middleware configuration.
//!
//! Sessions are held in process memory by [`MokaSessionStore`]. Records are
//! evicted once idle for the session expiry, so a visitor's session (and the
//! cart keyed by it) is gone after inactivity or a server restart.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tower_sessions::cookie::time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore, session_store};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "bookstore_session";

/// In-memory session store with idle eviction and a size bound.
#[derive(Debug, Clone)]
pub struct MokaSessionStore {
    records: Cache<Id, Record>,
}

impl MokaSessionStore {
    /// Create a store holding at most `max_sessions` records, each dropped
    /// after `idle` without being read or written.
    #[must_use]
    pub fn new(max_sessions: u64, idle: Duration) -> Self {
        Self {
            records: Cache::builder()
                .max_capacity(max_sessions)
                .time_to_idle(idle)
                .build(),
        }
    }

    /// Number of records currently held.
    ///
    /// Pending evictions are applied first.
    pub async fn record_count(&self) -> u64 {
        self.records.run_pending_tasks().await;
        self.records.entry_count()
    }
}

#[async_trait]
impl SessionStore for MokaSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        loop {
            let entry = self.records.entry(record.id).or_insert(record.clone()).await;
            if entry.is_fresh() {
                return Ok(());
            }
            // Id collision
            record.id = Id::default();
        }
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.records.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        match self.records.get(session_id).await {
            Some(record) if record.expiry_date > OffsetDateTime::now_utc() => Ok(Some(record)),
            Some(_) => {
                self.records.invalidate(session_id).await;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.records.invalidate(session_id).await;
        Ok(())
    }
}

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MokaSessionStore> {
    let expiry_seconds = i64::try_from(config.session_expiry.as_secs()).unwrap_or(i64::MAX);
    let store = MokaSessionStore::new(config.max_sessions, config.session_expiry);

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(expiry_seconds),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        // Refresh the inactivity deadline on every request, not only on writes
        .with_always_save(true)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower_sessions::cookie::time::Duration as TimeDuration;

    use super::*;

    fn record(expires_in: TimeDuration) -> Record {
        Record {
            id: Id::default(),
            data: Default::default(),
            expiry_date: OffsetDateTime::now_utc() + expires_in,
        }
    }

    #[tokio::test]
    async fn test_create_load_delete() {
        let store = MokaSessionStore::new(10, Duration::from_secs(60));
        let mut record = record(TimeDuration::minutes(5));
        store.create(&mut record).await.unwrap();

        let loaded = store.load(&record.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, record.id);

        store.delete(&record.id).await.unwrap();
        assert!(store.load(&record.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_resolves_id_collision() {
        let store = MokaSessionStore::new(10, Duration::from_secs(60));
        let mut first = record(TimeDuration::minutes(5));
        store.create(&mut first).await.unwrap();

        let mut second = record(TimeDuration::minutes(5));
        second.id = first.id;
        store.create(&mut second).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.record_count().await, 2);
    }

    #[tokio::test]
    async fn test_expired_record_is_removed_on_load() {
        let store = MokaSessionStore::new(10, Duration::from_secs(60));
        let mut record = record(TimeDuration::seconds(-1));
        store.create(&mut record).await.unwrap();

        assert!(store.load(&record.id).await.unwrap().is_none());
        assert_eq!(store.record_count().await, 0);
    }

    #[tokio::test]
    async fn test_idle_records_are_evicted() {
        let store = MokaSessionStore::new(10, Duration::from_millis(100));
        let mut record = record(TimeDuration::minutes(5));
        store.create(&mut record).await.unwrap();
        assert_eq!(store.record_count().await, 1);

        tokio::time::sleep(Duration::from_millis(300)).await;

        assert!(store.load(&record.id).await.unwrap().is_none());
        assert_eq!(store.record_count().await, 0);
    }
}
