use async_trait::async_trait;
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::error::Outcome;
use crate::record::{SessionRecord, LAST_ACCESSED};
use crate::table::{Filter, TableStore};

/// Pluggable session handler lifecycle.
///
/// A host session manager calls `open` once, then any mix of `read`,
/// `write` and `destroy`, then `close`. `gc` runs independently, usually on
/// a timer. No method reports an error: backend failures are folded into the
/// returned booleans and byte strings.
#[async_trait]
pub trait SessionHandler: Send + Sync {
    async fn open(&self, save_path: &str, session_name: &str) -> bool;

    async fn close(&self) -> bool;

    /// Returns the stored payload, or an empty vector when there is nothing
    /// usable to return.
    async fn read(&self, session_id: &str) -> Vec<u8>;

    async fn write(&self, session_id: &str, data: &[u8]);

    async fn destroy(&self, session_id: &str) -> bool;

    /// Removes sessions not written during the last `max_lifetime` seconds.
    async fn gc(&self, max_lifetime: u64) -> bool;
}

/// Construction-time settings for [`TableSessionHandler`].
///
/// Deserializable so hosts can embed it in their own configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HandlerConfig {
    /// Table holding the session entities.
    pub table_name: String,
    /// Partition shared by every session entity.
    pub partition_key: String,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            table_name: "table".to_string(),
            partition_key: "partitionkey".to_string(),
        }
    }
}

/// Result of one expired-session sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Entities the query selected for deletion.
    pub matched: usize,
    /// Selected entities kept because their payload asked to be retained.
    pub retained: usize,
    pub deleted: usize,
    pub failed: usize,
}

/// Session handler persisting sessions as entities of a [`TableStore`].
///
/// Every session lives in one partition of one table. The row key is the
/// session id, and each entity carries a `last_accessed` Unix timestamp and
/// the base64-encoded payload in `data`.
///
/// # Examples
///
/// ```
/// use tower_sessions_table_store::{MemoryTableStore, SessionHandler, TableSessionHandler};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let handler = TableSessionHandler::new(MemoryTableStore::new())
///     .with_table_name("sessions")
///     .with_partition_key("web");
///
/// assert!(handler.open("", "SESSID").await);
/// handler.write("abc123", b"payload").await;
/// assert_eq!(handler.read("abc123").await, b"payload");
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TableSessionHandler<S> {
    store: S,
    table_name: String,
    partition_key: String,
}

impl<S: TableStore> TableSessionHandler<S> {
    /// Creates a handler using table `"table"` and partition `"partitionkey"`.
    pub fn new(store: S) -> Self {
        Self::with_config(store, HandlerConfig::default())
    }

    pub fn with_config(store: S, config: HandlerConfig) -> Self {
        Self {
            store,
            table_name: config.table_name,
            partition_key: config.partition_key,
        }
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    pub fn with_partition_key(mut self, partition_key: impl Into<String>) -> Self {
        self.partition_key = partition_key.into();
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn partition_key(&self) -> &str {
        &self.partition_key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Deletes every session last written before `now - max_lifetime`.
    ///
    /// Returns `None` when the query itself fails. Individual delete
    /// failures are counted in the report and do not stop the sweep.
    pub async fn sweep_expired(&self, max_lifetime: u64) -> Option<SweepReport> {
        self.sweep_expired_retaining(max_lifetime, |_| false).await
    }

    /// Like [`sweep_expired`](Self::sweep_expired), but keeps every selected
    /// session whose payload `retain` returns `true` for.
    ///
    /// Entities whose payload cannot be decoded are deleted.
    pub async fn sweep_expired_retaining<F>(
        &self,
        max_lifetime: u64,
        retain: F,
    ) -> Option<SweepReport>
    where
        F: Fn(&[u8]) -> bool + Send + Sync,
    {
        let lifetime = i64::try_from(max_lifetime).unwrap_or(i64::MAX);
        let deadline = unix_now().saturating_sub(lifetime);
        let filter = Filter::partition(&self.partition_key).and_lt(LAST_ACCESSED, deadline);

        let expired = match self.store.query_entities(&self.table_name, &filter).await {
            Ok(entities) => entities,
            Err(e) => {
                warn!(table = %self.table_name, %filter, error = %e, "expired session query failed");
                return None;
            }
        };

        let mut report = SweepReport {
            matched: expired.len(),
            ..SweepReport::default()
        };
        for entity in expired {
            let session_id = entity.row_key.clone();
            if SessionRecord::try_from(entity).is_ok_and(|record| retain(&record.data)) {
                report.retained += 1;
                continue;
            }

            match self
                .store
                .delete_entity(&self.table_name, &self.partition_key, &session_id)
                .await
            {
                Ok(()) => report.deleted += 1,
                Err(e) => {
                    report.failed += 1;
                    debug!(%session_id, error = %e, "expired session delete failed");
                }
            }
        }

        if report.failed > 0 {
            warn!(
                table = %self.table_name,
                matched = report.matched,
                failed = report.failed,
                "expired session sweep left sessions behind"
            );
        } else {
            debug!(table = %self.table_name, deleted = report.deleted, "expired sessions swept");
        }
        Some(report)
    }
}

#[async_trait]
impl<S: TableStore> SessionHandler for TableSessionHandler<S> {
    async fn open(&self, _save_path: &str, _session_name: &str) -> bool {
        match self.store.create_table(&self.table_name).await {
            Ok(()) => {
                debug!(table = %self.table_name, "session table created");
                true
            }
            Err(e) if e.is_conflict() => true,
            Err(e) => {
                warn!(table = %self.table_name, error = %e, "failed to open session table");
                false
            }
        }
    }

    async fn close(&self) -> bool {
        true
    }

    async fn read(&self, session_id: &str) -> Vec<u8> {
        let result = self
            .store
            .get_entity(&self.table_name, &self.partition_key, session_id)
            .await
            .and_then(SessionRecord::try_from);

        match Outcome::from(result) {
            Outcome::Found(record) => record.data,
            Outcome::NotFound => Vec::new(),
            Outcome::Failed(e) => {
                warn!(%session_id, error = %e, "failed to read session");
                Vec::new()
            }
        }
    }

    async fn write(&self, session_id: &str, data: &[u8]) {
        let entity = SessionRecord {
            partition_key: self.partition_key.clone(),
            session_id: session_id.to_string(),
            last_accessed: unix_now(),
            data: data.to_vec(),
        }
        .into_entity();

        if let Err(e) = self
            .store
            .insert_or_replace_entity(&self.table_name, entity)
            .await
        {
            warn!(%session_id, error = %e, "failed to write session");
        }
    }

    async fn destroy(&self, session_id: &str) -> bool {
        let result = self
            .store
            .delete_entity(&self.table_name, &self.partition_key, session_id)
            .await;

        match Outcome::from(result) {
            Outcome::Found(()) => true,
            Outcome::NotFound => {
                debug!(%session_id, "destroy of unknown session");
                false
            }
            Outcome::Failed(e) => {
                warn!(%session_id, error = %e, "failed to destroy session");
                false
            }
        }
    }

    async fn gc(&self, max_lifetime: u64) -> bool {
        self.sweep_expired(max_lifetime).await.is_some()
    }
}

pub(crate) fn unix_now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}
