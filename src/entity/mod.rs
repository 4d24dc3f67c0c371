//! Listable entities
//!
//! Races and sporting events share one shape: a flat row with an identifier,
//! some descriptive columns, a visibility flag and an advertised start time.
//! The [`Listing`] trait describes that shape to the generic query, storage
//! and annotation code so each piece is written once.
//!
//! Derived fields (`status`, and `name` for events) are computed on every
//! read by [`annotate`] and never stored.

pub mod event;
pub mod race;

pub use event::{Event, EventFilter};
pub use race::{Race, RaceFilter};

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::query::Filterable;

/// Time-derived listing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Status {
    /// No advertised start time.
    #[default]
    #[serde(rename = "")]
    Unset,
    /// Starts strictly after the evaluation instant.
    #[serde(rename = "OPEN")]
    Open,
    /// Starts at or before the evaluation instant.
    #[serde(rename = "CLOSED")]
    Closed,
}

impl Status {
    /// Status of something starting at `start`, evaluated at `now`.
    pub fn at(start: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        match start {
            None => Status::Unset,
            Some(start) if start > now => Status::Open,
            Some(_) => Status::Closed,
        }
    }

    pub fn is_unset(&self) -> bool {
        *self == Status::Unset
    }
}

/// An entity type served by a listing service.
pub trait Listing: Sized + Send + 'static {
    /// Structured filter accepted by list requests.
    type Filter: Filterable + Send + Sync + 'static;

    /// Backing table.
    const TABLE: &'static str;

    /// Persisted columns, in scan order.
    const COLUMNS: &'static [&'static str];

    /// Sort field used when an order spec names no field.
    const DEFAULT_ORDER_FIELD: &'static str = "advertised_start_time";

    /// Scan one row selected with [`Listing::COLUMNS`].
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Filter matching exactly one identifier.
    fn id_filter(id: i64) -> Self::Filter;

    fn advertised_start_time(&self) -> Option<DateTime<Utc>>;

    fn set_status(&mut self, status: Status);

    /// Recompute entity-specific derived fields.
    fn derive_fields(&mut self) {}
}

/// Annotate `entities` with derived fields, evaluated against the current time.
pub fn annotate<E: Listing>(entities: Vec<E>) -> Vec<E> {
    annotate_at(entities, Utc::now())
}

/// Annotate `entities` with derived fields, evaluated at `now`.
pub fn annotate_at<E: Listing>(mut entities: Vec<E>, now: DateTime<Utc>) -> Vec<E> {
    for entity in entities.iter_mut() {
        entity.derive_fields();
        if let Some(start) = entity.advertised_start_time() {
            entity.set_status(Status::at(Some(start), now));
        }
    }
    entities
}

/// Read an advertised start time column.
///
/// NULL or unparseable values are treated as "no start time".
pub(crate) fn start_time_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    Ok(raw.as_deref().and_then(parse_start_time))
}

fn parse_start_time(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    // SQLite's own datetime() format
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
