//! Durable store for the Bluejay bot engine.
//!
//! Two implementations of the [`bluejay_interface::BotStore`] traits:
//!
//! - [`SqliteStore`]: embedded SQLite through diesel, with an r2d2 pool and
//!   migrations applied on open. Every operation is a single statement run on
//!   the blocking pool.
//! - [`InMemoryStore`]: `HashMap`-backed, for tests and dry runs.
//!
//! # Example
//!
//! ```rust,ignore
//! use bluejay_database::SqliteStore;
//! use bluejay_interface::SeenLedger;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::open("/var/lib/bluejay/bots.db")?;
//! store.mark_seen("at://did:plc:abc/app.bsky.feed.post/1").await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod connection;
mod memory_store;
mod models;
mod sqlite_store;

/// Diesel table definitions.
pub mod schema;

pub use connection::{SqlitePool, establish_pool, run_migrations};
pub use memory_store::InMemoryStore;
pub use sqlite_store::SqliteStore;

/// Result type for database operations.
pub type DatabaseResult<T> = Result<T, bluejay_error::DatabaseError>;
