//! # Tower Sessions Store for Partitioned Table Services
//!
//! A session store for [`tower-sessions`](https://crates.io/crates/tower-sessions)
//! that keeps session blobs in a partitioned key-value table service instead
//! of local disk or process memory.
//!
//! The crate is built around two seams:
//!
//! - [`TableStore`], the table service capability: table creation, entity
//!   get, insert-or-replace, delete and filtered queries.
//! - [`SessionHandler`], the classic open/close/read/write/destroy/gc session
//!   lifecycle, implemented by [`TableSessionHandler`] on top of any
//!   [`TableStore`].
//!
//! [`TableSessionStore`] adapts the handler to tower-sessions'
//! [`SessionStore`] and [`ExpiredDeletion`] traits.
//!
//! ## Features
//!
//! - One row per session: partition key, row key = session id,
//!   `last_accessed` timestamp and base64-encoded payload
//! - Idempotent writes through insert-or-replace
//! - Best-effort garbage collection of sessions idle past a lifetime
//! - In-memory [`MemoryTableStore`] for development and testing
//! - [`SqlTableStore`] emulating the table service on PostgreSQL or SQLite
//!   through Sea-ORM
//!
//! ## Quick Start
//!
//! ```no_run
//! use time::Duration;
//! use tower_sessions::Expiry;
//! use tower_sessions_table_store::{MemoryTableStore, TableSessionStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = TableSessionStore::new(MemoryTableStore::new())
//!     .with_table_name("sessions")
//!     .with_partition_key("web");
//! store.init().await?;
//!
//! let session_layer = tower_sessions::SessionManagerLayer::new(store)
//!     .with_expiry(Expiry::OnInactivity(Duration::days(7)));
//! # Ok(())
//! # }
//! ```
//!
//! ## Driving the lifecycle directly
//!
//! ```
//! use tower_sessions_table_store::{MemoryTableStore, SessionHandler, TableSessionHandler};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let handler = TableSessionHandler::new(MemoryTableStore::new());
//!
//! assert!(handler.open("", "SESSID").await);
//! handler.write("abc123", &[0x00, 0xFF, 0x10]).await;
//! assert_eq!(handler.read("abc123").await, vec![0x00, 0xFF, 0x10]);
//! assert!(handler.destroy("abc123").await);
//! assert!(handler.read("abc123").await.is_empty());
//! assert!(handler.gc(1440).await);
//! assert!(handler.close().await);
//! # }
//! ```

pub mod entity;
pub mod error;
mod handler;
mod memory_store;
#[cfg(feature = "migration")]
pub mod migration;
pub mod record;
mod sql_store;
mod table_session_store;
pub mod table;

pub use error::TableError;
pub use handler::{HandlerConfig, SessionHandler, SweepReport, TableSessionHandler};
pub use memory_store::MemoryTableStore;
pub use sql_store::SqlTableStore;
pub use table_session_store::TableSessionStore;
pub use table::{Entity, Filter, Property, TableStore};

/// Trait for implementing session storage backends
///
/// Re-exported from `tower-sessions` for convenience.
pub use tower_sessions::SessionStore;

/// Trait for implementing session store expiration cleanup
pub use tower_sessions::ExpiredDeletion;

/// Session storage error types and results
pub use tower_sessions::session_store;

/// Session identifier and record types
pub use tower_sessions::session::{Id, Record};
