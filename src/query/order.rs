//! Order compiler.
//!
//! Appends an `ORDER BY` clause for a client-supplied sort field, but only
//! when the field is a column the table currently reports. Every failure
//! path degrades to an unordered query instead of an error.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use super::catalog::ColumnCatalog;

/// Client sort request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
}

impl OrderSpec {
    pub fn by(field: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            direction: None,
        }
    }

    pub fn with_direction(mut self, direction: impl Into<String>) -> Self {
        self.direction = Some(direction.into());
        self
    }

    /// The requested field, treating an empty string as absent.
    fn requested_field(&self) -> Option<&str> {
        self.field.as_deref().filter(|field| !field.is_empty())
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// Case-insensitive parse of `ASC` / `DESC`. Anything else is `None`.
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_uppercase().as_str() {
            "ASC" => Some(Direction::Asc),
            "DESC" => Some(Direction::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do with an order spec that names a direction but no field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultFieldPolicy {
    /// Sort by the entity's default field.
    #[default]
    UseDefault,
    /// Ignore the order spec entirely.
    RequireExplicit,
}

/// Result of planning an order request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderOutcome {
    /// No order spec, or nothing to sort by under the active policy.
    NotRequested,
    /// Field validated against the catalog.
    Applied {
        field: String,
        direction: Option<Direction>,
    },
    /// Field is not a column of the table.
    SkippedInvalidField { field: String },
    /// Column catalog could not be read.
    SkippedCatalogUnavailable,
}

impl OrderOutcome {
    /// Render the outcome onto `base`.
    pub fn apply(&self, base: &str) -> String {
        match self {
            OrderOutcome::Applied { field, direction } => match direction {
                Some(direction) => format!("{} ORDER BY {} {}", base, field, direction),
                None => format!("{} ORDER BY {}", base, field),
            },
            _ => base.to_string(),
        }
    }

    /// Short label used for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            OrderOutcome::NotRequested => "not_requested",
            OrderOutcome::Applied { .. } => "applied",
            OrderOutcome::SkippedInvalidField { .. } => "skipped_invalid_field",
            OrderOutcome::SkippedCatalogUnavailable => "skipped_catalog_unavailable",
        }
    }
}

/// Order compiler bound to one table.
pub struct OrderCompiler<'a> {
    catalog: &'a dyn ColumnCatalog,
    table: &'a str,
    default_field: &'a str,
    policy: DefaultFieldPolicy,
}

impl<'a> OrderCompiler<'a> {
    pub fn new(catalog: &'a dyn ColumnCatalog, table: &'a str, default_field: &'a str) -> Self {
        Self {
            catalog,
            table,
            default_field,
            policy: DefaultFieldPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: DefaultFieldPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Decide how `order` applies, consulting the live column catalog.
    pub fn plan(&self, order: Option<&OrderSpec>) -> OrderOutcome {
        let Some(order) = order else {
            return OrderOutcome::NotRequested;
        };

        let field = match (order.requested_field(), self.policy) {
            (Some(field), _) => field,
            (None, DefaultFieldPolicy::UseDefault) => self.default_field,
            (None, DefaultFieldPolicy::RequireExplicit) => return OrderOutcome::NotRequested,
        };

        let columns = match self.catalog.columns(self.table) {
            Ok(columns) => columns,
            Err(e) => {
                warn!(
                    table = %self.table,
                    error = %e,
                    "Failed to read column catalog, continuing without ordering"
                );
                return OrderOutcome::SkippedCatalogUnavailable;
            }
        };

        if !columns.contains(field) {
            debug!(table = %self.table, field = %field, "Ignoring unknown sort field");
            return OrderOutcome::SkippedInvalidField {
                field: field.to_string(),
            };
        }

        OrderOutcome::Applied {
            field: field.to_string(),
            direction: order.direction.as_deref().and_then(Direction::parse),
        }
    }

    /// Append an `ORDER BY` clause for `order` to `base`.
    pub fn compile(&self, base: &str, order: Option<&OrderSpec>) -> String {
        self.plan(order).apply(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::catalog::{StaticCatalog, UnavailableCatalog};

    const BASE: &str =
        "SELECT id, meeting_id, name, number, visible, advertised_start_time FROM races";

    fn catalog() -> StaticCatalog {
        StaticCatalog::new([
            "id",
            "meeting_id",
            "name",
            "number",
            "visible",
            "advertised_start_time",
        ])
    }

    fn compile(order: Option<&OrderSpec>) -> String {
        let catalog = catalog();
        OrderCompiler::new(&catalog, "races", "advertised_start_time").compile(BASE, order)
    }

    #[test]
    fn test_no_order() {
        assert_eq!(compile(None), BASE);
    }

    #[test]
    fn test_unknown_field_is_ignored() {
        assert_eq!(compile(Some(&OrderSpec::by("unknown"))), BASE);
        assert_eq!(
            compile(Some(&OrderSpec::by("unknown").with_direction("ASC"))),
            BASE
        );
    }

    #[test]
    fn test_field_match_is_case_sensitive() {
        assert_eq!(compile(Some(&OrderSpec::by("MEETING_ID"))), BASE);
    }

    #[test]
    fn test_injection_attempt_is_ignored() {
        let order = OrderSpec::by("id; DROP TABLE races");
        assert_eq!(compile(Some(&order)), BASE);
    }

    #[test]
    fn test_valid_field_without_direction() {
        assert_eq!(
            compile(Some(&OrderSpec::by("meeting_id"))),
            format!("{} ORDER BY meeting_id", BASE)
        );
    }

    #[test]
    fn test_directions() {
        let cases = [
            ("ASC", " ASC"),
            ("DESC", " DESC"),
            ("asc", " ASC"),
            ("Desc", " DESC"),
            ("INCORRECT", ""),
            ("", ""),
        ];

        for (token, suffix) in cases {
            let order = OrderSpec::by("meeting_id").with_direction(token);
            assert_eq!(
                compile(Some(&order)),
                format!("{} ORDER BY meeting_id{}", BASE, suffix),
                "direction {:?}",
                token
            );
        }
    }

    #[test]
    fn test_default_field_when_absent_or_empty() {
        let direction_only = OrderSpec {
            field: None,
            direction: Some("DESC".to_string()),
        };
        assert_eq!(
            compile(Some(&direction_only)),
            format!("{} ORDER BY advertised_start_time DESC", BASE)
        );

        let empty_field = OrderSpec::by("");
        assert_eq!(
            compile(Some(&empty_field)),
            format!("{} ORDER BY advertised_start_time", BASE)
        );
    }

    #[test]
    fn test_require_explicit_policy() {
        let catalog = catalog();
        let compiler = OrderCompiler::new(&catalog, "races", "advertised_start_time")
            .with_policy(DefaultFieldPolicy::RequireExplicit);

        let direction_only = OrderSpec {
            field: None,
            direction: Some("ASC".to_string()),
        };
        assert_eq!(compiler.plan(Some(&direction_only)), OrderOutcome::NotRequested);
        assert_eq!(compiler.compile(BASE, Some(&direction_only)), BASE);

        assert_eq!(
            compiler.compile(BASE, Some(&OrderSpec::by("name").with_direction("asc"))),
            format!("{} ORDER BY name ASC", BASE)
        );
    }

    #[test]
    fn test_catalog_unavailable() {
        let compiler = OrderCompiler::new(&UnavailableCatalog, "races", "advertised_start_time");
        let order = OrderSpec::by("meeting_id").with_direction("DESC");

        assert_eq!(
            compiler.plan(Some(&order)),
            OrderOutcome::SkippedCatalogUnavailable
        );
        assert_eq!(compiler.compile(BASE, Some(&order)), BASE);
    }

    #[test]
    fn test_outcomes() {
        let catalog = catalog();
        let compiler = OrderCompiler::new(&catalog, "races", "advertised_start_time");

        assert_eq!(compiler.plan(None), OrderOutcome::NotRequested);
        assert_eq!(
            compiler.plan(Some(&OrderSpec::by("status"))),
            OrderOutcome::SkippedInvalidField {
                field: "status".to_string()
            }
        );
        assert_eq!(
            compiler.plan(Some(&OrderSpec::by("number").with_direction("desc"))),
            OrderOutcome::Applied {
                field: "number".to_string(),
                direction: Some(Direction::Desc),
            }
        );
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!(Direction::parse("aSc"), Some(Direction::Asc));
        assert_eq!(Direction::parse("descending"), None);
        assert_eq!(Direction::Desc.to_string(), "DESC");
    }
}
