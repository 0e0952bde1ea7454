//! In-process table store for development and testing.
//!
//! Uses `DashMap` for concurrent access without external locks. Data is lost
//! on restart and not shared across processes.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use time::OffsetDateTime;

use crate::error::{Result, TableError};
use crate::table::{Entity, Filter, TableStore};

type Rows = BTreeMap<(String, String), Entity>;

/// [`TableStore`] kept in memory. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryTableStore {
    tables: Arc<DashMap<String, Rows>>,
}

impl MemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entities currently stored in `table`.
    pub fn len(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, |rows| rows.len())
    }

    pub fn is_empty(&self, table: &str) -> bool {
        self.len(table) == 0
    }
}

fn table_not_found(table: &str) -> TableError {
    TableError::not_found(format!("table `{table}` does not exist"))
}

fn entity_not_found(partition_key: &str, row_key: &str) -> TableError {
    TableError::not_found(format!("entity ({partition_key}, {row_key}) does not exist"))
}

#[async_trait]
impl TableStore for MemoryTableStore {
    async fn create_table(&self, table: &str) -> Result<()> {
        match self.tables.entry(table.to_string()) {
            Entry::Occupied(_) => Err(TableError::conflict(format!(
                "table `{table}` already exists"
            ))),
            Entry::Vacant(slot) => {
                slot.insert(Rows::new());
                Ok(())
            }
        }
    }

    async fn get_entity(
        &self,
        table: &str,
        partition_key: &str,
        row_key: &str,
    ) -> Result<Entity> {
        let rows = self.tables.get(table).ok_or_else(|| table_not_found(table))?;
        let entity = rows
            .get(&(partition_key.to_string(), row_key.to_string()))
            .cloned();
        entity.ok_or_else(|| entity_not_found(partition_key, row_key))
    }

    async fn insert_or_replace_entity(&self, table: &str, mut entity: Entity) -> Result<()> {
        let mut rows = self
            .tables
            .get_mut(table)
            .ok_or_else(|| table_not_found(table))?;
        entity.timestamp = Some(OffsetDateTime::now_utc());
        rows.insert(
            (entity.partition_key.clone(), entity.row_key.clone()),
            entity,
        );
        Ok(())
    }

    async fn delete_entity(&self, table: &str, partition_key: &str, row_key: &str) -> Result<()> {
        let mut rows = self
            .tables
            .get_mut(table)
            .ok_or_else(|| table_not_found(table))?;
        match rows.remove(&(partition_key.to_string(), row_key.to_string())) {
            Some(_) => Ok(()),
            None => Err(entity_not_found(partition_key, row_key)),
        }
    }

    async fn query_entities(&self, table: &str, filter: &Filter) -> Result<Vec<Entity>> {
        let rows = self.tables.get(table).ok_or_else(|| table_not_found(table))?;
        let matched = rows
            .values()
            .filter(|entity| filter.matches(entity))
            .cloned()
            .collect();
        Ok(matched)
    }
}
