//! Mapping between session payloads and table entities.

use base64::prelude::*;

use crate::error::{Result, TableError};
use crate::table::{Entity, Property};

/// Property holding the last write time as a Unix timestamp.
pub const LAST_ACCESSED: &str = "last_accessed";
/// Property holding the base64-encoded session payload.
pub const DATA: &str = "data";

/// One persisted session.
///
/// The payload is opaque. It is stored base64-encoded because the service's
/// string properties cannot carry arbitrary bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub partition_key: String,
    pub session_id: String,
    pub last_accessed: i64,
    pub data: Vec<u8>,
}

impl SessionRecord {
    pub fn into_entity(self) -> Entity {
        Entity::new(self.partition_key, self.session_id)
            .with_property(LAST_ACCESSED, Property::Int64(self.last_accessed))
            .with_property(DATA, Property::String(BASE64_STANDARD.encode(&self.data)))
    }
}

impl TryFrom<Entity> for SessionRecord {
    type Error = TableError;

    fn try_from(entity: Entity) -> Result<Self> {
        let encoded = entity
            .property(DATA)
            .and_then(Property::as_str)
            .ok_or_else(|| TableError::Codec(format!("entity has no string `{DATA}` property")))?;
        let data = BASE64_STANDARD
            .decode(encoded)
            .map_err(|e| TableError::Codec(format!("invalid base64 session data: {e}")))?;
        // Older writers stored the timestamp as a 32-bit integer.
        let last_accessed = entity
            .property(LAST_ACCESSED)
            .and_then(Property::as_i64)
            .unwrap_or_default();

        Ok(Self {
            partition_key: entity.partition_key,
            session_id: entity.row_key,
            last_accessed,
            data,
        })
    }
}
