//! Column catalog lookup.
//!
//! The order compiler only accepts sort fields that the backing table
//! currently reports as columns. The catalog is consulted on every call and
//! never cached, so a schema change is picked up without a redeploy.

use std::collections::HashSet;

use thiserror::Error;

/// Set of column names currently present in a table.
pub type ColumnSet = HashSet<String>;

/// Failure to read a table's column catalog.
///
/// Never crosses the listing boundary: callers log it and skip ordering.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to query column catalog for {table}: {source}")]
    Query {
        table: String,
        source: rusqlite::Error,
    },

    #[error("failed to parse column catalog for {table}: {source}")]
    Parse {
        table: String,
        source: rusqlite::Error,
    },

    #[error("column catalog unavailable: {0}")]
    Unavailable(String),
}

/// Source of live column names for a table.
pub trait ColumnCatalog: Send + Sync {
    fn columns(&self, table: &str) -> Result<ColumnSet, CatalogError>;
}

/// Fixed catalog, mainly for tests and tools that know their schema up front.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    columns: ColumnSet,
}

impl StaticCatalog {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

impl ColumnCatalog for StaticCatalog {
    fn columns(&self, _table: &str) -> Result<ColumnSet, CatalogError> {
        Ok(self.columns.clone())
    }
}

/// Catalog that always fails.
#[derive(Debug, Clone, Default)]
pub struct UnavailableCatalog;

impl ColumnCatalog for UnavailableCatalog {
    fn columns(&self, table: &str) -> Result<ColumnSet, CatalogError> {
        Err(CatalogError::Unavailable(table.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_catalog() {
        let catalog = StaticCatalog::new(["id", "name"]);
        let columns = catalog.columns("races").unwrap();

        assert_eq!(columns.len(), 2);
        assert!(columns.contains("id"));
        assert!(!columns.contains("ID"));
    }

    #[test]
    fn test_unavailable_catalog() {
        let err = UnavailableCatalog.columns("events").unwrap_err();
        assert!(err.to_string().contains("events"));
    }
}
