//! Demonstration data.
//!
//! Tables are created if absent and filled with random rows whose start
//! times fall between one day ago and two days from now, so a fresh service
//! lists a mix of open and closed entries.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use rusqlite::types::Value;

use crate::entity::{Event, Listing, Race};

const RACE_PLACES: &[&str] = &[
    "Flemington", "Randwick", "Ascot", "Caulfield", "Eagle Farm", "Moonee Valley",
    "Rosehill", "Morphettville", "Doomben", "Ellerslie", "Sandown", "Warwick Farm",
];

const RACE_KINDS: &[&str] = &[
    "Handicap", "Stakes", "Cup", "Plate", "Maiden", "Classic", "Sprint", "Mile",
];

const TEAM_CITIES: &[&str] = &[
    "Chicago", "Miami", "Boston", "Denver", "Seattle", "Dallas", "Phoenix",
    "Portland", "Atlanta", "Detroit", "Houston", "Minnesota", "Orlando", "Utah",
];

const TEAM_NAMES: &[&str] = &[
    "Bulls", "Heat", "Celtics", "Nuggets", "Storm", "Mavericks", "Suns",
    "Blazers", "Hawks", "Pistons", "Rockets", "Wolves", "Magic", "Jazz",
];

const STATES: &[&str] = &[
    "Pennsylvania", "Minnesota", "Illinois", "Florida", "Texas", "Colorado",
    "Washington", "Arizona", "Oregon", "Georgia", "Michigan", "Utah",
];

/// Schema and demo rows for a listing table.
pub trait Seed: Listing {
    /// DDL creating the backing table if it does not exist.
    const CREATE_TABLE: &'static str;

    /// Values for one demo row, in [`Listing::COLUMNS`] order.
    fn demo_row<R: Rng + ?Sized>(id: i64, now: DateTime<Utc>, rng: &mut R) -> Vec<Value>;
}

/// `INSERT OR IGNORE` statement covering every column of `E`.
pub fn insert_statement<E: Listing>() -> String {
    format!(
        "INSERT OR IGNORE INTO {}({}) VALUES ({})",
        E::TABLE,
        E::COLUMNS.join(", "),
        vec!["?"; E::COLUMNS.len()].join(",")
    )
}

fn pick<R: Rng + ?Sized>(rng: &mut R, values: &[&str]) -> String {
    values.choose(rng).copied().unwrap_or_default().to_string()
}

/// A start time between one day before and two days after `now`.
fn demo_start_time<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> String {
    let offset = Duration::seconds(rng.gen_range(-86_400..=2 * 86_400));
    (now + offset).to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl Seed for Race {
    const CREATE_TABLE: &'static str = "CREATE TABLE IF NOT EXISTS races (id INTEGER PRIMARY KEY, meeting_id INTEGER, name TEXT, number INTEGER, visible INTEGER, advertised_start_time DATETIME)";

    fn demo_row<R: Rng + ?Sized>(id: i64, now: DateTime<Utc>, rng: &mut R) -> Vec<Value> {
        vec![
            Value::Integer(id),
            Value::Integer(rng.gen_range(1..=10)),
            Value::Text(format!("{} {}", pick(rng, RACE_PLACES), pick(rng, RACE_KINDS))),
            Value::Integer(rng.gen_range(1..=12)),
            Value::Integer(rng.gen_range(0..=1)),
            Value::Text(demo_start_time(now, rng)),
        ]
    }
}

impl Seed for Event {
    const CREATE_TABLE: &'static str = "CREATE TABLE IF NOT EXISTS events (id INTEGER PRIMARY KEY, home_team TEXT, away_team TEXT, venue_location TEXT, visible INTEGER, advertised_start_time DATETIME)";

    fn demo_row<R: Rng + ?Sized>(id: i64, now: DateTime<Utc>, rng: &mut R) -> Vec<Value> {
        let home = format!("{} {}", pick(rng, TEAM_CITIES), pick(rng, TEAM_NAMES));
        let away = format!("{} {}", pick(rng, TEAM_CITIES), pick(rng, TEAM_NAMES));

        vec![
            Value::Integer(id),
            Value::Text(home),
            Value::Text(away),
            Value::Text(pick(rng, STATES)),
            Value::Integer(rng.gen_range(0..=1)),
            Value::Text(demo_start_time(now, rng)),
        ]
    }
}
