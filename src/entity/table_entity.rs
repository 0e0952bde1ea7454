//! Entity rows of every logical table.

use sea_orm::entity::prelude::*;

/// Sea-ORM model of one stored entity.
///
/// The composite primary key mirrors the table service's addressing: a row
/// is unique per logical table, partition key and row key.
///
/// | Column        | Type        | Description                                  |
/// |---------------|-------------|----------------------------------------------|
/// | table_name    | TEXT (PK)   | Logical table the entity belongs to          |
/// | partition_key | TEXT (PK)   | Partition key                                |
/// | row_key       | TEXT (PK)   | Row key                                      |
/// | properties    | BYTEA       | MessagePack-encoded property map             |
/// | timestamp     | TIMESTAMPTZ | Last modification time                       |
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "table_store_entities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub table_name: String,
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub partition_key: String,
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub row_key: String,
    pub properties: Vec<u8>,
    pub timestamp: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
