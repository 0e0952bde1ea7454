use async_trait::async_trait;
use time::OffsetDateTime;
use tower_sessions::{session::Id, session::Record, session_store, ExpiredDeletion, SessionStore};
use tracing::{debug, warn};

use crate::handler::{HandlerConfig, SessionHandler, TableSessionHandler};
use crate::table::TableStore;


/// A tower-sessions store persisting sessions in a partitioned table service.
///
/// `TableSessionStore` drives a [`TableSessionHandler`] from the
/// [`SessionStore`] trait, so any [`TableStore`] can back an axum or tower
/// application. Session records are serialized using MessagePack and stored
/// as the opaque payload of the handler.
///
/// [`ExpiredDeletion::delete_expired`] removes the sessions whose
/// `expiry_date` has passed; sessions that are still valid survive the sweep
/// however long they have been idle.
///
/// # Usage
///
/// ```no_run
/// use time::Duration;
/// use tower_sessions::Expiry;
/// use tower_sessions_table_store::{MemoryTableStore, TableSessionStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = TableSessionStore::new(MemoryTableStore::new())
///     .with_table_name("sessions");
/// store.init().await?;
///
/// let session_layer = tower_sessions::SessionManagerLayer::new(store)
///     .with_expiry(Expiry::OnInactivity(Duration::days(7)));
/// # Ok(())
/// # }
/// ```
///
/// # Error Handling
///
/// The handler absorbs backend faults, so most operations cannot fail:
///
/// - An unreachable store reads as a missing session
/// - Failed writes are logged and dropped
/// - `init` and `delete_expired` report `session_store::Error::Backend`
/// - Serialization errors → `session_store::Error::Encode`
/// - Deserialization errors → `session_store::Error::Decode`
#[derive(Debug, Clone)]
pub struct TableSessionStore<S> {
    handler: TableSessionHandler<S>,
    /// Seconds without writes before a session is examined by a sweep.
    max_lifetime: u64,
}

impl<S: TableStore> TableSessionStore<S> {
    /// Creates a store with the default table and partition names.
    pub fn new(tables: S) -> Self {
        Self::from_handler(TableSessionHandler::new(tables))
    }

    pub fn with_config(tables: S, config: HandlerConfig) -> Self {
        Self::from_handler(TableSessionHandler::with_config(tables, config))
    }

    pub fn from_handler(handler: TableSessionHandler<S>) -> Self {
        Self {
            handler,
            max_lifetime: 0,
        }
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.handler = self.handler.with_table_name(table_name);
        self
    }

    pub fn with_partition_key(mut self, partition_key: impl Into<String>) -> Self {
        self.handler = self.handler.with_partition_key(partition_key);
        self
    }

    /// Sets how long a session must go without writes before
    /// [`ExpiredDeletion::delete_expired`] looks at it.
    ///
    /// Only expired sessions are ever deleted; a longer lifetime narrows each
    /// sweep to sessions idle at least that long. Negative durations are
    /// ignored.
    pub fn with_max_lifetime(mut self, max_lifetime: time::Duration) -> Self {
        match u64::try_from(max_lifetime.whole_seconds()) {
            Ok(seconds) => self.max_lifetime = seconds,
            Err(_) => warn!(%max_lifetime, "ignoring negative session lifetime"),
        }
        self
    }

    pub fn max_lifetime(&self) -> time::Duration {
        time::Duration::seconds(i64::try_from(self.max_lifetime).unwrap_or(i64::MAX))
    }

    pub fn handler(&self) -> &TableSessionHandler<S> {
        &self.handler
    }

    /// Makes sure the backing table exists.
    pub async fn init(&self) -> session_store::Result<()> {
        if self.handler.open("", "").await {
            Ok(())
        } else {
            Err(session_store::Error::Backend(format!(
                "could not open session table `{}`",
                self.handler.table_name()
            )))
        }
    }
}

#[async_trait]
impl<S> SessionStore for TableSessionStore<S>
where
    S: TableStore + std::fmt::Debug,
{
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        // Session ID collision mitigation
        while !self.handler.read(&record.id.to_string()).await.is_empty() {
            record.id = Id::default();
        }

        self.save(record).await
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let data =
            rmp_serde::to_vec(record).map_err(|e| session_store::Error::Encode(e.to_string()))?;

        self.handler.write(&record.id.to_string(), &data).await;
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let data = self.handler.read(&session_id.to_string()).await;
        if data.is_empty() {
            return Ok(None);
        }

        let record: Record = rmp_serde::from_slice(&data)
            .map_err(|e| session_store::Error::Decode(e.to_string()))?;

        // Expired sessions may linger until the next sweep
        if record.expiry_date <= OffsetDateTime::now_utc() {
            return Ok(None);
        }
        Ok(Some(record))
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        if !self.handler.destroy(&session_id.to_string()).await {
            debug!(%session_id, "session was not deleted");
        }
        Ok(())
    }
}

#[async_trait]
impl<S> ExpiredDeletion for TableSessionStore<S>
where
    S: TableStore + std::fmt::Debug,
{
    async fn delete_expired(&self) -> session_store::Result<()> {
        let now = OffsetDateTime::now_utc();
        let still_valid = |data: &[u8]| {
            rmp_serde::from_slice::<Record>(data).is_ok_and(|record| record.expiry_date > now)
        };

        match self
            .handler
            .sweep_expired_retaining(self.max_lifetime, still_valid)
            .await
        {
            Some(report) => {
                debug!(
                    deleted = report.deleted,
                    retained = report.retained,
                    "expired sessions deleted"
                );
                Ok(())
            }
            None => Err(session_store::Error::Backend(
                "expired session query failed".to_string(),
            )),
        }
    }
}
