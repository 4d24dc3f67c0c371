//! Storage layer
//!
//! # Architecture
//!
//! ```text
//! ListingRepo<E>  (filter → order → query → annotate)
//!   ├─→ SqliteCatalog  (live column names via pragma_table_info)
//!   └─→ SqliteStore    (pool of SQLite connections)
//! ```
//!
//! The store hands out connections round-robin, each behind its own mutex,
//! so concurrent listing requests only contend when they land on the same
//! connection. Nothing is held across the catalog lookup and the listing
//! query.

pub mod catalog;
pub mod repo;
pub mod seed;

pub use catalog::SqliteCatalog;
pub use repo::ListingRepo;
pub use seed::Seed;

use parking_lot::Mutex;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::info;

use crate::error::{Error, Result};

/// Default number of pooled connections for file-backed stores.
pub const DEFAULT_POOL_SIZE: usize = 4;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed store shared by every request of a service.
pub struct SqliteStore {
    connections: Vec<Mutex<Connection>>,
    cursor: AtomicUsize,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.path)
            .field("connections", &self.connections.len())
            .finish()
    }
}

impl SqliteStore {
    /// Open (or create) a database file with `pool_size` connections.
    pub fn open(path: impl AsRef<Path>, pool_size: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::Internal(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }

        let connections = (0..pool_size.max(1))
            .map(|_| -> Result<Mutex<Connection>> {
                let conn = Connection::open(&path)?;
                conn.pragma_update(None, "journal_mode", "WAL")?;
                conn.busy_timeout(BUSY_TIMEOUT)?;
                Ok(Mutex::new(conn))
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            path = %path.display(),
            connections = connections.len(),
            "Opened SQLite store"
        );

        Ok(Self {
            connections,
            cursor: AtomicUsize::new(0),
            path: Some(path),
        })
    }

    /// Single-connection in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            connections: vec![Mutex::new(Connection::open_in_memory()?)],
            cursor: AtomicUsize::new(0),
            path: None,
        })
    }

    /// Run `f` on the next pooled connection.
    pub fn with_connection<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&Connection) -> T,
    {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.connections.len();
        let conn = self.connections[index].lock();
        f(&conn)
    }

    /// Execute `sql` with positional `args`, mapping every row.
    pub fn query<T, F>(&self, sql: &str, args: &[Value], mut map: F) -> rusqlite::Result<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt.query_map(params_from_iter(args.iter()), |row| map(row))?;
            rows.collect()
        })
    }

    /// Execute a single statement with positional `args`.
    pub fn execute(&self, sql: &str, args: &[Value]) -> rusqlite::Result<usize> {
        self.with_connection(|conn| conn.execute(sql, params_from_iter(args.iter())))
    }
}
