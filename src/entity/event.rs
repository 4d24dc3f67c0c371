//! Sporting events

use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::{start_time_column, Listing, Status};
use crate::query::{Filterable, Predicate};

/// A fixture between two teams.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    /// Derived: `"<away_team> vs <home_team>"`.
    #[serde(default)]
    pub name: String,
    pub home_team: String,
    pub away_team: String,
    pub venue_location: String,
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advertised_start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Status::is_unset")]
    pub status: Status,
}

/// Event list filter. Unset fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away_team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl Filterable for EventFilter {
    fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();

        if let Some(home_team) = &self.home_team {
            predicates.push(Predicate::eq("home_team", home_team.clone()));
        }
        if let Some(away_team) = &self.away_team {
            predicates.push(Predicate::eq("away_team", away_team.clone()));
        }
        if let Some(venue_location) = &self.venue_location {
            predicates.push(Predicate::eq("venue_location", venue_location.clone()));
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

impl Listing for Event {
    type Filter = EventFilter;

    const TABLE: &'static str = "events";

    const COLUMNS: &'static [&'static str] = &[
        "id",
        "home_team",
        "away_team",
        "venue_location",
        "visible",
        "advertised_start_time",
    ];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Event {
            id: row.get(0)?,
            name: String::new(),
            home_team: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            away_team: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            venue_location: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            visible: row.get::<_, Option<bool>>(4)?.unwrap_or_default(),
            advertised_start_time: start_time_column(row, 5)?,
            status: Status::Unset,
        })
    }

    fn id_filter(id: i64) -> EventFilter {
        EventFilter {
            id: Some(id),
            ..EventFilter::default()
        }
    }

    fn advertised_start_time(&self) -> Option<DateTime<Utc>> {
        self.advertised_start_time
    }

    fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    fn derive_fields(&mut self) {
        self.name = format!("{} vs {}", self.away_team, self.home_team);
    }
}
