#![cfg(feature = "migration")]

mod common;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, EntityTrait, Set};
use tower_sessions_table_store::entity::table_entity;
use tower_sessions_table_store::{
    Entity, Filter, Property, SessionHandler, SqlTableStore, TableSessionHandler, TableStore,
};

async fn sqlite_conn() -> DatabaseConnection {
    // A single connection keeps the in-memory database alive and shared.
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    Database::connect(opt).await.expect("failed to open sqlite")
}

async fn sqlite_store() -> SqlTableStore {
    let store = SqlTableStore::new(sqlite_conn().await);
    store.migrate().await.expect("failed to migrate");
    store
}

fn entity(row_key: &str, last_accessed: i64) -> Entity {
    Entity::new("p", row_key)
        .with_property("last_accessed", Property::Int64(last_accessed))
        .with_property("data", Property::String(row_key.to_string()))
}

#[tokio::test]
async fn test_create_table_conflicts() {
    let store = sqlite_store().await;
    store.create_table("sessions").await.unwrap();
    let err = store.create_table("sessions").await.unwrap_err();
    assert!(err.is_conflict(), "{err}");
}

#[tokio::test]
async fn test_missing_table_is_not_found() {
    let store = sqlite_store().await;
    assert!(store.get_entity("nope", "p", "r").await.unwrap_err().is_not_found());
    assert!(store
        .insert_or_replace_entity("nope", entity("r", 1))
        .await
        .unwrap_err()
        .is_not_found());
    assert!(store.delete_entity("nope", "p", "r").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_entity_lifecycle() {
    let store = sqlite_store().await;
    store.create_table("sessions").await.unwrap();

    store.insert_or_replace_entity("sessions", entity("r", 1)).await.unwrap();
    store.insert_or_replace_entity("sessions", entity("r", 2)).await.unwrap();

    let stored = store.get_entity("sessions", "p", "r").await.unwrap();
    assert_eq!(stored.property("last_accessed"), Some(&Property::Int64(2)));
    assert_eq!(stored.property("data"), Some(&Property::String("r".into())));
    assert!(stored.timestamp.is_some());

    store.delete_entity("sessions", "p", "r").await.unwrap();
    assert!(store.get_entity("sessions", "p", "r").await.unwrap_err().is_not_found());
    assert!(store.delete_entity("sessions", "p", "r").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_tables_are_isolated() {
    let store = sqlite_store().await;
    store.create_table("a").await.unwrap();
    store.create_table("b").await.unwrap();
    store.insert_or_replace_entity("a", entity("r", 1)).await.unwrap();
    assert!(store.get_entity("b", "p", "r").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_query_filters_partition_and_property() {
    let store = sqlite_store().await;
    store.create_table("sessions").await.unwrap();
    store.insert_or_replace_entity("sessions", entity("old", 10)).await.unwrap();
    store.insert_or_replace_entity("sessions", entity("new", 50)).await.unwrap();
    store
        .insert_or_replace_entity(
            "sessions",
            Entity::new("q", "old").with_property("last_accessed", Property::Int64(10)),
        )
        .await
        .unwrap();

    let filter = Filter::partition("p").and_lt("last_accessed", 20);
    let matched = store.query_entities("sessions", &filter).await.unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].row_key, "old");
}

#[tokio::test]
async fn test_handler_over_sql() {
    let handler = TableSessionHandler::new(sqlite_store().await);
    assert!(handler.open("", "").await);
    assert!(handler.open("", "").await);

    handler.write("abc123", &[0x00, 0xFF, 0x10]).await;
    assert_eq!(handler.read("abc123").await, vec![0x00, 0xFF, 0x10]);

    let now = common::unix_now();
    common::seed_session(handler.store(), "table", "partitionkey", "stale", now - 7200).await;
    assert!(handler.gc(3600).await);
    assert!(handler.read("stale").await.is_empty());
    assert!(!handler.read("abc123").await.is_empty());

    assert!(handler.destroy("abc123").await);
    assert!(!handler.destroy("abc123").await);
    assert!(handler.read("abc123").await.is_empty());
}

#[tokio::test]
async fn test_query_skips_undecodable_rows() {
    let conn = sqlite_conn().await;
    let store = SqlTableStore::new(conn.clone());
    store.migrate().await.unwrap();

    let handler = TableSessionHandler::new(store);
    assert!(handler.open("", "").await);
    let stale = common::unix_now() - 7200;
    common::seed_session(handler.store(), "table", "partitionkey", "stale", stale).await;

    let corrupt = table_entity::ActiveModel {
        table_name: Set("table".to_string()),
        partition_key: Set("partitionkey".to_string()),
        row_key: Set("corrupt".to_string()),
        properties: Set(vec![0xc1, 0x00]),
        timestamp: Set(chrono::Utc::now().into()),
    };
    table_entity::Entity::insert(corrupt)
        .exec_without_returning(&conn)
        .await
        .unwrap();

    let filter = Filter::partition("partitionkey").and_lt("last_accessed", common::unix_now());
    let matched = handler.store().query_entities("table", &filter).await.unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].row_key, "stale");

    assert!(handler.gc(3600).await);
    assert!(handler.read("stale").await.is_empty());
}
