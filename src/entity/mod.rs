//! Sea-ORM entity models backing [`SqlTableStore`](crate::SqlTableStore).
//!
//! A relational database emulates the table service with two tables: one
//! registering the logical tables that have been created, and one holding
//! every entity keyed by table name, partition key and row key.

/// Registry of logical tables.
pub mod table_registry;

/// Entity rows of all logical tables.
pub mod table_entity;
