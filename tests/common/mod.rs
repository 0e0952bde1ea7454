//! Test utilities: a fault-injecting table store and record seeding helpers.

#![allow(dead_code)]

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use tower_sessions_table_store::error::Result;
use tower_sessions_table_store::record::SessionRecord;
use tower_sessions_table_store::{Entity, Filter, MemoryTableStore, TableError, TableStore};

/// Store operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    CreateTable,
    Get,
    InsertOrReplace,
    Delete,
    Query,
}

/// [`MemoryTableStore`] wrapper returning scripted errors.
///
/// A failure registered with [`FaultyStore::fail`] applies to every call of
/// that operation; [`FaultyStore::fail_delete_of`] only hits one row key.
#[derive(Debug, Default)]
pub struct FaultyStore {
    pub inner: MemoryTableStore,
    failures: DashMap<Op, TableError>,
    undeletable: DashSet<String>,
    deleted: DashSet<String>,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(self, op: Op, error: TableError) -> Self {
        self.failures.insert(op, error);
        self
    }

    pub fn fail_delete_of(self, row_key: &str) -> Self {
        self.undeletable.insert(row_key.to_string());
        self
    }

    /// Row keys successfully deleted so far.
    pub fn deleted(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.deleted.iter().map(|k| k.key().clone()).collect();
        keys.sort();
        keys
    }

    fn check(&self, op: Op) -> Result<()> {
        match self.failures.get(&op) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TableStore for FaultyStore {
    async fn create_table(&self, table: &str) -> Result<()> {
        self.check(Op::CreateTable)?;
        self.inner.create_table(table).await
    }

    async fn get_entity(&self, table: &str, partition_key: &str, row_key: &str) -> Result<Entity> {
        self.check(Op::Get)?;
        self.inner.get_entity(table, partition_key, row_key).await
    }

    async fn insert_or_replace_entity(&self, table: &str, entity: Entity) -> Result<()> {
        self.check(Op::InsertOrReplace)?;
        self.inner.insert_or_replace_entity(table, entity).await
    }

    async fn delete_entity(&self, table: &str, partition_key: &str, row_key: &str) -> Result<()> {
        self.check(Op::Delete)?;
        if self.undeletable.contains(row_key) {
            return Err(TableError::Backend("connection reset".into()));
        }
        self.inner.delete_entity(table, partition_key, row_key).await?;
        self.deleted.insert(row_key.to_string());
        Ok(())
    }

    async fn query_entities(&self, table: &str, filter: &Filter) -> Result<Vec<Entity>> {
        self.check(Op::Query)?;
        self.inner.query_entities(table, filter).await
    }
}

/// Stores a session entity with an explicit `last_accessed` timestamp.
pub async fn seed_session<S: TableStore>(
    store: &S,
    table: &str,
    partition_key: &str,
    session_id: &str,
    last_accessed: i64,
) {
    let entity = SessionRecord {
        partition_key: partition_key.to_string(),
        session_id: session_id.to_string(),
        last_accessed,
        data: session_id.as_bytes().to_vec(),
    }
    .into_entity();
    store
        .insert_or_replace_entity(table, entity)
        .await
        .expect("failed to seed session");
}

pub fn unix_now() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}
