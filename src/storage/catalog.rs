//! Live column catalog backed by SQLite metadata.

use std::sync::Arc;

use super::SqliteStore;
use crate::query::{CatalogError, ColumnCatalog, ColumnSet};

const TABLE_COLUMNS: &str = "SELECT name FROM pragma_table_info(?1)";

/// Reads column names from `pragma_table_info` on every call.
#[derive(Debug, Clone)]
pub struct SqliteCatalog {
    store: Arc<SqliteStore>,
}

impl SqliteCatalog {
    pub fn new(store: Arc<SqliteStore>) -> Self {
        Self { store }
    }
}

impl ColumnCatalog for SqliteCatalog {
    fn columns(&self, table: &str) -> Result<ColumnSet, CatalogError> {
        self.store.with_connection(|conn| {
            let mut stmt = conn.prepare(TABLE_COLUMNS).map_err(|source| CatalogError::Query {
                table: table.to_string(),
                source,
            })?;

            let names = stmt
                .query_map([table], |row| row.get::<_, String>(0))
                .map_err(|source| CatalogError::Query {
                    table: table.to_string(),
                    source,
                })?;

            names
                .collect::<Result<ColumnSet, _>>()
                .map_err(|source| CatalogError::Parse {
                    table: table.to_string(),
                    source,
                })
        })
    }
}
