//! Abstract partitioned table service.
//!
//! The session handler only needs a handful of primitives from the backing
//! store: table creation, point reads, upserts, point deletes and filtered
//! queries within a partition. [`TableStore`] captures exactly those, so any
//! service with a partition key / row key data model can back the handler.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::Result;

/// Typed property value stored on an [`Entity`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Property {
    Int32(i32),
    Int64(i64),
    Boolean(bool),
    String(String),
}

impl Property {
    /// Integer view of the value, used by numeric filter comparisons.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Property::Int32(v) => Some(i64::from(*v)),
            Property::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Property::String(v) => Some(v),
            _ => None,
        }
    }
}

/// A single row of a table, addressed by partition key and row key.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub partition_key: String,
    pub row_key: String,
    pub properties: BTreeMap<String, Property>,
    /// Last modification time assigned by the service; ignored on writes.
    pub timestamp: Option<OffsetDateTime>,
}

impl Entity {
    pub fn new(partition_key: impl Into<String>, row_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            row_key: row_key.into(),
            properties: BTreeMap::new(),
            timestamp: None,
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: Property) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }
}

/// Query predicate: every entity of one partition whose integer properties
/// are strictly below the given bounds.
///
/// Renders as the service's textual filter syntax, e.g.
/// `PartitionKey eq 'sessions' and last_accessed lt 1700000000`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    partition_key: String,
    less_than: Vec<(String, i64)>,
}

impl Filter {
    pub fn partition(partition_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            less_than: Vec::new(),
        }
    }

    /// Adds `<property> lt <bound>` to the predicate.
    pub fn and_lt(mut self, property: impl Into<String>, bound: i64) -> Self {
        self.less_than.push((property.into(), bound));
        self
    }

    pub fn partition_key(&self) -> &str {
        &self.partition_key
    }

    /// Evaluates the predicate against an entity.
    ///
    /// Entities missing a compared property, or holding a non-integer value
    /// there, do not match.
    pub fn matches(&self, entity: &Entity) -> bool {
        entity.partition_key == self.partition_key
            && self.less_than.iter().all(|(name, bound)| {
                entity
                    .property(name)
                    .and_then(Property::as_i64)
                    .is_some_and(|value| value < *bound)
            })
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // String literals escape a quote by doubling it.
        write!(
            f,
            "PartitionKey eq '{}'",
            self.partition_key.replace('\'', "''")
        )?;
        for (name, bound) in &self.less_than {
            write!(f, " and {name} lt {bound}")?;
        }
        Ok(())
    }
}

/// Capability the session handler consumes.
///
/// Implementations own transport, authentication, retries and timeouts.
/// Structured service failures are reported as
/// [`TableError::Service`](crate::TableError::Service); a missing table or
/// entity uses status 404 and creating an existing table uses status 409.
#[async_trait]
pub trait TableStore: Send + Sync + 'static {
    /// Creates a table, failing with a conflict if it already exists.
    async fn create_table(&self, table: &str) -> Result<()>;

    /// Fetches a single entity.
    async fn get_entity(&self, table: &str, partition_key: &str, row_key: &str)
        -> Result<Entity>;

    /// Creates the entity or overwrites an existing one with the same keys.
    async fn insert_or_replace_entity(&self, table: &str, entity: Entity) -> Result<()>;

    /// Deletes a single entity, failing with not-found if it does not exist.
    async fn delete_entity(&self, table: &str, partition_key: &str, row_key: &str)
        -> Result<()>;

    /// Returns every entity matching the filter.
    async fn query_entities(&self, table: &str, filter: &Filter) -> Result<Vec<Entity>>;
}
