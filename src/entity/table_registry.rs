//! Registry of created logical tables.

use sea_orm::entity::prelude::*;

/// One logical table.
///
/// | Column     | Type               | Description                   |
/// |------------|--------------------|-------------------------------|
/// | name       | TEXT (Primary Key) | Logical table name            |
/// | created_at | TIMESTAMPTZ        | When the table was created    |
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "table_store_tables")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub name: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
