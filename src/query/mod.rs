//! Query construction
//!
//! Builds parameterized SQL for listing requests:
//! - [`filter`] compiles structured filters into a `WHERE` clause
//! - [`order`] compiles sort requests into an `ORDER BY` clause
//! - [`catalog`] supplies the live column names sort fields are checked against

pub mod catalog;
pub mod filter;
pub mod order;

pub use catalog::{CatalogError, ColumnCatalog, ColumnSet, StaticCatalog, UnavailableCatalog};
pub use filter::{compile_filter, Filterable, Predicate};
pub use order::{DefaultFieldPolicy, Direction, OrderCompiler, OrderOutcome, OrderSpec};

/// Base select statement for `table` over `columns`, with no trailing clause.
pub fn select_all(table: &str, columns: &[&str]) -> String {
    format!("SELECT {} FROM {}", columns.join(", "), table)
}
