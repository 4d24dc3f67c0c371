//! Races

use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::{start_time_column, Listing, Status};
use crate::query::{Filterable, Predicate};

/// A race on a meeting card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Race {
    pub id: i64,
    pub meeting_id: i64,
    pub name: String,
    pub number: i64,
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advertised_start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Status::is_unset")]
    pub status: Status,
}

/// Race list filter. Unset fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceFilter {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meeting_ids: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl Filterable for RaceFilter {
    fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();

        if !self.meeting_ids.is_empty() {
            predicates.push(Predicate::in_list(
                "meeting_id",
                self.meeting_ids.iter().copied(),
            ));
        }

        if let Some(visible) = self.visible {
            predicates.push(Predicate::flag("visible", visible));
        }

        if let Some(id) = self.id {
            predicates.push(Predicate::eq("id", id));
        }

        predicates
    }
}

impl Listing for Race {
    type Filter = RaceFilter;

    const TABLE: &'static str = "races";

    const COLUMNS: &'static [&'static str] = &[
        "id",
        "meeting_id",
        "name",
        "number",
        "visible",
        "advertised_start_time",
    ];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Race {
            id: row.get(0)?,
            meeting_id: row.get::<_, Option<i64>>(1)?.unwrap_or_default(),
            name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            number: row.get::<_, Option<i64>>(3)?.unwrap_or_default(),
            visible: row.get::<_, Option<bool>>(4)?.unwrap_or_default(),
            advertised_start_time: start_time_column(row, 5)?,
            status: Status::Unset,
        })
    }

    fn id_filter(id: i64) -> RaceFilter {
        RaceFilter {
            id: Some(id),
            ..RaceFilter::default()
        }
    }

    fn advertised_start_time(&self) -> Option<DateTime<Utc>> {
        self.advertised_start_time
    }

    fn set_status(&mut self, status: Status) {
        self.status = status;
    }
}
