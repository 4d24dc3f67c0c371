//! Filter compiler.
//!
//! Turns a structured, per-entity filter into a SQL `WHERE` fragment plus the
//! positional arguments bound to its placeholders.
//!
//! # Output Format
//!
//! ```text
//! <base> WHERE meeting_id IN (?,?) AND visible = true AND id = ?
//! ```
//!
//! - Membership predicates emit one `?` per value.
//! - Boolean predicates are inlined as `true` / `false` and never bind.
//! - Equality predicates emit a single `?`.
//!
//! Arguments are returned in the same left-to-right order as the
//! placeholders in the emitted clause.

use rusqlite::types::Value;

/// A single SQL predicate over a persisted column.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `<column> IN (?,...)`
    In {
        column: &'static str,
        values: Vec<Value>,
    },
    /// `<column> = true|false`, inlined into the SQL text
    Flag { column: &'static str, value: bool },
    /// `<column> = ?`
    Eq { column: &'static str, value: Value },
}

impl Predicate {
    pub fn in_list<I, V>(column: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Predicate::In {
            column,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn flag(column: &'static str, value: bool) -> Self {
        Predicate::Flag { column, value }
    }

    pub fn eq(column: &'static str, value: impl Into<Value>) -> Self {
        Predicate::Eq {
            column,
            value: value.into(),
        }
    }

    /// Render the predicate, pushing any bound values onto `args`.
    ///
    /// Returns `None` for an empty membership list.
    fn render(self, args: &mut Vec<Value>) -> Option<String> {
        match self {
            Predicate::In { column, values } => {
                if values.is_empty() {
                    return None;
                }
                let placeholders = vec!["?"; values.len()].join(",");
                args.extend(values);
                Some(format!("{} IN ({})", column, placeholders))
            }
            Predicate::Flag { column, value } => Some(format!("{} = {}", column, value)),
            Predicate::Eq { column, value } => {
                args.push(value);
                Some(format!("{} = ?", column))
            }
        }
    }
}

/// A filter that can be expressed as a conjunction of predicates.
///
/// Implementations must yield predicates in a fixed order; the order decides
/// both the emitted SQL text and the argument binding order.
pub trait Filterable {
    fn predicates(&self) -> Vec<Predicate>;
}

/// Append a `WHERE` clause for `filter` to `base`.
///
/// With no filter, or a filter with no set fields, `base` is returned
/// unchanged together with an empty argument list.
pub fn compile_filter<F>(base: &str, filter: Option<&F>) -> (String, Vec<Value>)
where
    F: Filterable + ?Sized,
{
    let mut args = Vec::new();

    let Some(filter) = filter else {
        return (base.to_string(), args);
    };

    let clauses: Vec<String> = filter
        .predicates()
        .into_iter()
        .filter_map(|predicate| predicate.render(&mut args))
        .collect();

    if clauses.is_empty() {
        return (base.to_string(), args);
    }

    (format!("{} WHERE {}", base, clauses.join(" AND ")), args)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "SELECT id, name FROM things";

    struct Preds(Vec<Predicate>);

    impl Filterable for Preds {
        fn predicates(&self) -> Vec<Predicate> {
            self.0.clone()
        }
    }

    #[test]
    fn test_no_filter() {
        let (query, args) = compile_filter::<Preds>(BASE, None);
        assert_eq!(query, BASE);
        assert!(args.is_empty());
    }

    #[test]
    fn test_empty_filter() {
        let (query, args) = compile_filter(BASE, Some(&Preds(vec![])));
        assert_eq!(query, BASE);
        assert!(args.is_empty());
    }

    #[test]
    fn test_membership_placeholders() {
        let filter = Preds(vec![Predicate::in_list("kind", [3_i64, 1, 2])]);
        let (query, args) = compile_filter(BASE, Some(&filter));

        assert_eq!(query, format!("{} WHERE kind IN (?,?,?)", BASE));
        assert_eq!(
            args,
            vec![Value::Integer(3), Value::Integer(1), Value::Integer(2)]
        );
    }

    #[test]
    fn test_empty_membership_is_skipped() {
        let filter = Preds(vec![
            Predicate::in_list("kind", Vec::<i64>::new()),
            Predicate::flag("visible", false),
        ]);
        let (query, args) = compile_filter(BASE, Some(&filter));

        assert_eq!(query, format!("{} WHERE visible = false", BASE));
        assert!(args.is_empty());
    }

    #[test]
    fn test_flags_never_bind() {
        for value in [true, false] {
            let filter = Preds(vec![Predicate::flag("visible", value)]);
            let (query, args) = compile_filter(BASE, Some(&filter));

            assert_eq!(query, format!("{} WHERE visible = {}", BASE, value));
            assert!(args.is_empty());
        }
    }

    #[test]
    fn test_args_follow_placeholder_order() {
        let filter = Preds(vec![
            Predicate::eq("owner", "alice".to_string()),
            Predicate::in_list("kind", [7_i64, 8]),
            Predicate::flag("visible", true),
            Predicate::eq("id", 5_i64),
        ]);
        let (query, args) = compile_filter(BASE, Some(&filter));

        assert_eq!(
            query,
            format!(
                "{} WHERE owner = ? AND kind IN (?,?) AND visible = true AND id = ?",
                BASE
            )
        );
        assert_eq!(
            args,
            vec![
                Value::Text("alice".to_string()),
                Value::Integer(7),
                Value::Integer(8),
                Value::Integer(5),
            ]
        );
    }
}
