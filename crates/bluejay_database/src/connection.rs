//! Database connection utilities.

use crate::DatabaseResult;
use bluejay_error::{DatabaseError, DatabaseErrorKind};
use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Pool of SQLite connections.
pub type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;

/// Applies pragmas to every connection the pool hands out.
#[derive(Debug, Clone, Copy)]
struct SqlitePragmas {
    busy_timeout: Duration,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {}; PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;",
            self.busy_timeout.as_millis()
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Open a connection pool on the database file at `path`.
///
/// The parent directory is created if missing.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the pool cannot
/// open its first connection.
pub fn establish_pool(path: impl AsRef<Path>) -> DatabaseResult<SqlitePool> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            DatabaseError::new(DatabaseErrorKind::Connection(format!(
                "Cannot create {}: {}",
                parent.display(),
                e
            )))
        })?;
    }

    debug!(path = %path.display(), "Opening SQLite pool");
    let manager = ConnectionManager::<SqliteConnection>::new(path.to_string_lossy());
    let pool = Pool::builder()
        .max_size(8)
        .connection_customizer(Box::new(SqlitePragmas {
            busy_timeout: Duration::from_secs(5),
        }))
        .build(manager)?;
    Ok(pool)
}

/// Run pending migrations.
pub fn run_migrations(conn: &mut SqliteConnection) -> DatabaseResult<()> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Migration(e.to_string())))?;
    if !applied.is_empty() {
        info!(count = applied.len(), "Applied database migrations");
    }
    Ok(())
}
