//! Row filtering: a global text query ANDed with per-column predicates.

use std::cmp::Ordering;

use log::debug;
use nucleo_matcher::pattern::AtomKind;
use nucleo_matcher::pattern::CaseMatching;
use nucleo_matcher::pattern::Normalization;
use nucleo_matcher::pattern::Pattern;
use nucleo_matcher::Config;
use nucleo_matcher::Matcher;
use nucleo_matcher::Utf32Str;
use serde::Deserialize;
use serde::Serialize;

use crate::error::Capability;
use crate::error::ConfigError;
use crate::model::Column;
use crate::model::ColumnType;
use crate::model::Value;
use crate::store::RowStore;

/// How the global query is matched against cell text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// Case-insensitive substring match.
    #[default]
    Substring,
    /// Fuzzy match via nucleo-matcher (case-insensitive).
    Fuzzy,
}

/// A condition on a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    /// Cell equals the value.
    Equals { value: Value },
    /// Cell equals any of the values.
    OneOf { values: Vec<Value> },
    /// Cell lies within inclusive bounds. Either bound may be open.
    Range {
        #[serde(default)]
        min: Option<Value>,
        #[serde(default)]
        max: Option<Value>,
    },
}

impl Predicate {
    /// Creates an equality predicate.
    pub fn eq(value: impl Into<Value>) -> Self {
        Predicate::Equals {
            value: value.into(),
        }
    }

    /// Creates a set-membership predicate.
    pub fn one_of<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Predicate::OneOf {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a closed range predicate.
    pub fn between(min: impl Into<Value>, max: impl Into<Value>) -> Self {
        Predicate::Range {
            min: Some(min.into()),
            max: Some(max.into()),
        }
    }

    /// Creates a lower-bounded range predicate.
    pub fn at_least(min: impl Into<Value>) -> Self {
        Predicate::Range {
            min: Some(min.into()),
            max: None,
        }
    }

    /// Creates an upper-bounded range predicate.
    pub fn at_most(max: impl Into<Value>) -> Self {
        Predicate::Range {
            min: None,
            max: Some(max.into()),
        }
    }
}

/// A predicate bound to a column id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnFilter {
    pub column: String,
    pub predicate: Predicate,
}

/// Filter state: a global query plus zero or more column predicates.
///
/// # Example
///
/// ```
/// use datagrid::filter::{FilterSpec, Predicate};
///
/// let spec = FilterSpec::query("ada")
///     .and("role", Predicate::one_of(["admin", "editor"]))
///     .and("age", Predicate::between(18, 65));
/// assert_eq!(spec.columns.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    /// Global query. Empty matches everything.
    pub query: String,
    pub mode: QueryMode,
    pub columns: Vec<ColumnFilter>,
}

impl FilterSpec {
    /// Creates an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a filter with only a global query.
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    /// Replaces the global query.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Sets the query matching mode.
    pub fn with_mode(mut self, mode: QueryMode) -> Self {
        self.mode = mode;
        self
    }

    /// Adds a column predicate (ANDed with everything else).
    pub fn and(mut self, column: impl Into<String>, predicate: Predicate) -> Self {
        self.columns.push(ColumnFilter {
            column: column.into(),
            predicate,
        });
        self
    }

    /// Returns `true` if the filter accepts every row.
    pub fn is_empty(&self) -> bool {
        self.query.is_empty() && self.columns.is_empty()
    }

    /// Checks every predicate targets a filterable column.
    pub fn validate(&self, store: &RowStore) -> Result<(), ConfigError> {
        for filter in &self.columns {
            store.require_column(&filter.column, Capability::Filter)?;
        }
        Ok(())
    }
}

/// A predicate with its operands coerced to the column type.
struct Bound<'a> {
    column: &'a Column,
    test: Test,
}

enum Test {
    Any(Vec<Value>),
    Range(Option<Value>, Option<Value>),
    /// Can never match (operand not coercible, or min > max).
    Never,
}

impl Test {
    fn compile(predicate: &Predicate, column_type: ColumnType) -> Test {
        let coerce = |v: &Value| v.coerce(column_type);
        match predicate {
            Predicate::Equals { value } => match coerce(value) {
                Some(v) => Test::Any(vec![v]),
                None => Test::Never,
            },
            Predicate::OneOf { values } => {
                Test::Any(values.iter().filter_map(coerce).collect())
            }
            Predicate::Range { min, max } => {
                let min = min.as_ref().filter(|v| !v.is_null());
                let max = max.as_ref().filter(|v| !v.is_null());
                let (min, max) = match (min.map(coerce), max.map(coerce)) {
                    (Some(None), _) | (_, Some(None)) => return Test::Never,
                    (min, max) => (min.flatten(), max.flatten()),
                };
                if let (Some(lo), Some(hi)) = (&min, &max)
                    && lo.compare(hi, column_type) == Ordering::Greater
                {
                    return Test::Never;
                }
                Test::Range(min, max)
            }
        }
    }

    fn matches(&self, cell: &Value, column_type: ColumnType) -> bool {
        match self {
            Test::Any(values) => values.iter().any(|v| cell.equals(v, column_type)),
            Test::Range(min, max) => {
                if cell.is_null() {
                    return false;
                }
                let above = min
                    .as_ref()
                    .is_none_or(|lo| cell.compare(lo, column_type) != Ordering::Less);
                let below = max
                    .as_ref()
                    .is_none_or(|hi| cell.compare(hi, column_type) != Ordering::Greater);
                above && below
            }
            Test::Never => false,
        }
    }
}

/// Global query matcher.
enum QueryMatcher {
    All,
    Substring(String),
    Fuzzy(Box<Matcher>, Pattern),
}

impl QueryMatcher {
    fn new(query: &str, mode: QueryMode) -> Self {
        if query.is_empty() {
            return QueryMatcher::All;
        }
        match mode {
            QueryMode::Substring => QueryMatcher::Substring(query.to_lowercase()),
            QueryMode::Fuzzy => QueryMatcher::Fuzzy(
                Box::new(Matcher::new(Config::DEFAULT)),
                Pattern::new(
                    query,
                    CaseMatching::Ignore,
                    Normalization::Smart,
                    AtomKind::Fuzzy,
                ),
            ),
        }
    }

    fn matches(&mut self, text: &str) -> bool {
        match self {
            QueryMatcher::All => true,
            QueryMatcher::Substring(needle) => text.to_lowercase().contains(needle.as_str()),
            QueryMatcher::Fuzzy(matcher, pattern) => {
                let mut buf = Vec::new();
                let haystack = Utf32Str::new(text, &mut buf);
                pattern.score(haystack, matcher).is_some()
            }
        }
    }
}

/// Reduce the store to rows matching `spec`.
///
/// Returns snapshot positions in original store order. A degenerate range
/// (`min > max`) yields an empty result rather than an error.
pub fn filter_rows(store: &RowStore, spec: &FilterSpec) -> Result<Vec<usize>, ConfigError> {
    spec.validate(store)?;

    let mut bound = Vec::with_capacity(spec.columns.len());
    for filter in &spec.columns {
        // validate() already checked the column exists
        let Some(column) = store.column(&filter.column) else {
            continue;
        };
        let test = Test::compile(&filter.predicate, column.column_type);
        if matches!(test, Test::Never) {
            debug!(
                "Predicate on '{}' can never match, filter result is empty",
                filter.column
            );
            return Ok(Vec::new());
        }
        bound.push(Bound { column, test });
    }

    let searchable: Vec<&Column> = store
        .visible_columns()
        .into_iter()
        .filter(|c| c.filterable)
        .collect();
    let mut query = QueryMatcher::new(&spec.query, spec.mode);

    let matched: Vec<usize> = (0..store.len())
        .filter(|&i| {
            bound.iter().all(|b| {
                let cell = store.cell(i, b.column);
                b.test.matches(&cell, b.column.column_type)
            })
        })
        .filter(|&i| {
            matches!(query, QueryMatcher::All)
                || searchable
                    .iter()
                    .any(|c| query.matches(&store.cell(i, c).to_string()))
        })
        .collect();

    debug!(
        "Filtered {} of {} rows (query {:?}, {} predicates)",
        matched.len(),
        store.len(),
        spec.query,
        spec.columns.len()
    );
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;

    fn store() -> RowStore {
        let columns = vec![
            Column::new("name", ColumnType::String).filterable(),
            Column::new("role", ColumnType::String).filterable(),
            Column::new("age", ColumnType::Number).filterable(),
            Column::new("note", ColumnType::String).filterable().hidden(),
            Column::new("city", ColumnType::String),
        ];
        let rows = vec![
            Record::new("1").set("name", "Ada").set("role", "admin").set("age", 36).set("city", "London"),
            Record::new("2").set("name", "Linus").set("role", "user").set("age", 28).set("note", "kernel"),
            Record::new("3").set("name", "Grace").set("role", "editor").set("age", 45),
            Record::new("4").set("name", "Ken").set("role", "user"),
        ];
        RowStore::new(columns, rows).unwrap()
    }

    #[test]
    fn test_empty_spec_keeps_everything_in_order() {
        let store = store();
        assert_eq!(filter_rows(&store, &FilterSpec::new()).unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_query_is_case_insensitive_substring() {
        let store = store();
        let rows = filter_rows(&store, &FilterSpec::query("GRA")).unwrap();
        assert_eq!(rows, vec![2]);
    }

    #[test]
    fn test_query_skips_hidden_and_unfilterable_columns() {
        let store = store();
        // "kernel" is only in a hidden column, "London" only in a non-filterable one
        assert!(filter_rows(&store, &FilterSpec::query("kernel")).unwrap().is_empty());
        assert!(filter_rows(&store, &FilterSpec::query("london")).unwrap().is_empty());
    }

    #[test]
    fn test_query_matches_numbers_as_text() {
        let store = store();
        assert_eq!(filter_rows(&store, &FilterSpec::query("45")).unwrap(), vec![2]);
    }

    #[test]
    fn test_predicates_and_query_are_anded() {
        let store = store();
        let spec = FilterSpec::query("n").and("role", Predicate::eq("user"));
        assert_eq!(filter_rows(&store, &spec).unwrap(), vec![1, 3]);

        let spec = FilterSpec::query("ada").and("role", Predicate::eq("user"));
        assert!(filter_rows(&store, &spec).unwrap().is_empty());
    }

    #[test]
    fn test_one_of() {
        let store = store();
        let spec = FilterSpec::new().and("role", Predicate::one_of(["admin", "editor"]));
        assert_eq!(filter_rows(&store, &spec).unwrap(), vec![0, 2]);
    }

    #[test]
    fn test_numeric_range_excludes_nulls() {
        let store = store();
        let spec = FilterSpec::new().and("age", Predicate::between(30, 50));
        assert_eq!(filter_rows(&store, &spec).unwrap(), vec![0, 2]);

        let spec = FilterSpec::new().and("age", Predicate::at_most("30"));
        assert_eq!(filter_rows(&store, &spec).unwrap(), vec![1]);
    }

    #[test]
    fn test_degenerate_range_is_empty_not_error() {
        let store = store();
        let spec = FilterSpec::new().and("age", Predicate::between(50, 10));
        assert_eq!(filter_rows(&store, &spec).unwrap(), Vec::<usize>::new());
    }

    fn dated_store() -> RowStore {
        let columns = vec![Column::new("joined", ColumnType::Date).filterable()];
        let rows = vec![
            Record::new("a").set("joined", "2024-01-09"),
            Record::new("b").set("joined", "2024-01-10"),
            Record::new("c").set("joined", "2024-01-11T15:30:00Z"),
            Record::new("d").set("joined", "2024-01-12"),
            Record::new("e").set("joined", "2024-01-13"),
            Record::new("f").set("joined", "soon"),
            Record::new("g"),
        ];
        RowStore::new(columns, rows).unwrap()
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let store = dated_store();
        let spec = FilterSpec::new().and("joined", Predicate::between("2024-01-10", "2024-01-12"));
        assert_eq!(filter_rows(&store, &spec).unwrap(), vec![1, 2, 3]);

        let spec = FilterSpec::new().and("joined", Predicate::at_least("2024-01-12"));
        assert_eq!(filter_rows(&store, &spec).unwrap(), vec![3, 4]);
    }

    #[test]
    fn test_reversed_date_range_is_empty_not_error() {
        let store = dated_store();
        let spec = FilterSpec::new().and("joined", Predicate::between("2024-01-12", "2024-01-10"));
        assert_eq!(filter_rows(&store, &spec).unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn test_unfilterable_column_is_config_error() {
        let store = store();
        let spec = FilterSpec::new().and("city", Predicate::eq("London"));
        assert_eq!(
            filter_rows(&store, &spec).unwrap_err(),
            ConfigError::missing_capability("city", Capability::Filter)
        );
        let spec = FilterSpec::new().and("zip", Predicate::eq("1000"));
        assert_eq!(
            filter_rows(&store, &spec).unwrap_err(),
            ConfigError::unknown_column("zip")
        );
    }

    #[test]
    fn test_fuzzy_query() {
        let store = store();
        let spec = FilterSpec::query("lns").with_mode(QueryMode::Fuzzy);
        assert_eq!(filter_rows(&store, &spec).unwrap(), vec![1]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let store = store();
        let spec = FilterSpec::query("a").and("age", Predicate::at_least(30));
        let first = filter_rows(&store, &spec).unwrap();
        let second = filter_rows(&store, &spec).unwrap();
        assert_eq!(first, second);
    }
}
