//! Multi-key stable sorting and header-click sort state.

use std::cmp::Ordering;

use log::debug;
use serde::Deserialize;
use serde::Serialize;

use crate::error::Capability;
use crate::error::ConfigError;
use crate::model::ColumnType;
use crate::model::Value;
use crate::store::RowStore;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending order (A-Z, 0-9).
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

impl Direction {
    /// Returns the opposite direction.
    pub fn reverse(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }
}

/// How header clicks combine with an existing sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// A click on a new column replaces the sort.
    #[default]
    Single,
    /// A click on a new column appends it as the lowest-priority key.
    Multi,
}

/// One (column, direction) pair of a sort spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub column: String,
    pub direction: Direction,
}

/// Ordered list of sort keys, highest priority first.
///
/// # Example
///
/// ```
/// use datagrid::sort::{Direction, SortSpec};
///
/// let spec = SortSpec::desc("age").then_asc("name");
/// assert_eq!(spec.direction_of("name"), Some(Direction::Asc));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    /// Creates an empty sort (filtered order is kept).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an ascending sort on a column.
    pub fn asc(column: impl Into<String>) -> Self {
        Self::new().then_asc(column)
    }

    /// Creates a descending sort on a column.
    pub fn desc(column: impl Into<String>) -> Self {
        Self::new().then_desc(column)
    }

    /// Adds a lower-priority ascending key.
    pub fn then_asc(mut self, column: impl Into<String>) -> Self {
        self.push(column.into(), Direction::Asc);
        self
    }

    /// Adds a lower-priority descending key.
    pub fn then_desc(mut self, column: impl Into<String>) -> Self {
        self.push(column.into(), Direction::Desc);
        self
    }

    fn push(&mut self, column: String, direction: Direction) {
        self.keys.retain(|k| k.column != column);
        self.keys.push(SortKey { column, direction });
    }

    /// Returns the keys in priority order.
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Current direction of a column, if it is part of the sort.
    pub fn direction_of(&self, column: &str) -> Option<Direction> {
        self.keys
            .iter()
            .find(|k| k.column == column)
            .map(|k| k.direction)
    }

    /// Removes all keys.
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Applies a header click on `column`.
    ///
    /// - unsorted column: ascending (replaces the sort in single mode,
    ///   appended in multi mode)
    /// - ascending: flips to descending
    /// - descending: single mode clears the sort, multi mode removes only
    ///   this key
    ///
    /// Returns the column's new direction, `None` if it is no longer sorted.
    pub fn toggle(&mut self, column: &str, mode: SortMode) -> Option<Direction> {
        match self.keys.iter().position(|k| k.column == column) {
            None => {
                if mode == SortMode::Single {
                    self.keys.clear();
                }
                self.push(column.to_string(), Direction::Asc);
                Some(Direction::Asc)
            }
            Some(i) if self.keys[i].direction == Direction::Asc => {
                self.keys[i].direction = Direction::Desc;
                Some(Direction::Desc)
            }
            Some(i) => {
                match mode {
                    SortMode::Single => self.keys.clear(),
                    SortMode::Multi => {
                        self.keys.remove(i);
                    }
                }
                None
            }
        }
    }

    /// Checks every key targets a sortable column.
    pub fn validate(&self, store: &RowStore) -> Result<(), ConfigError> {
        for key in &self.keys {
            store.require_column(&key.column, Capability::Sort)?;
        }
        Ok(())
    }
}

/// Compares two cells. Nulls sort after every defined value in both
/// directions.
pub fn compare_cells(a: &Value, b: &Value, column_type: ColumnType, direction: Direction) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => direction.apply(a.compare(b, column_type)),
    }
}

/// Order `rows` (snapshot positions) by `spec`.
///
/// Rows tying on every key keep their relative input order, so sorting is
/// stable across repeated calls and direction toggles.
pub fn sort_rows(store: &RowStore, rows: &[usize], spec: &SortSpec) -> Result<Vec<usize>, ConfigError> {
    let mut keys = Vec::with_capacity(spec.keys.len());
    for key in &spec.keys {
        let column = store.require_column(&key.column, Capability::Sort)?;
        keys.push((column, key.direction));
    }
    if keys.is_empty() {
        return Ok(rows.to_vec());
    }

    // Resolve every sort cell once up front
    let decorated: Vec<(usize, Vec<Value>)> = rows
        .iter()
        .map(|&i| (i, keys.iter().map(|(c, _)| store.cell(i, c)).collect()))
        .collect();

    let mut order: Vec<usize> = (0..decorated.len()).collect();
    order.sort_by(|&a, &b| {
        let (va, vb) = (&decorated[a].1, &decorated[b].1);
        keys.iter()
            .enumerate()
            .map(|(k, (column, direction))| {
                compare_cells(&va[k], &vb[k], column.column_type, *direction)
            })
            .find(|o| o.is_ne())
            .unwrap_or_else(|| a.cmp(&b))
    });

    debug!("Sorted {} rows by {} keys", rows.len(), keys.len());
    Ok(order.into_iter().map(|p| decorated[p].0).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Column;
    use crate::model::Record;

    fn store() -> RowStore {
        let columns = vec![
            Column::new("name", ColumnType::String).sortable(),
            Column::new("team", ColumnType::String).sortable(),
            Column::new("score", ColumnType::Number).sortable(),
            Column::new("note", ColumnType::String),
        ];
        let rows = vec![
            Record::new("a").set("name", "Cleo").set("team", "red").set("score", 10),
            Record::new("b").set("name", "Abe").set("team", "blue").set("score", 7),
            Record::new("c").set("name", "Bea").set("team", "red"),
            Record::new("d").set("name", "Dan").set("team", "blue").set("score", 10),
            Record::new("e").set("name", "Eve").set("team", "red").set("score", 2),
        ];
        RowStore::new(columns, rows).unwrap()
    }

    fn ids(store: &RowStore, rows: &[usize]) -> Vec<String> {
        rows.iter().map(|&i| store.id_at(i).to_string()).collect()
    }

    #[test]
    fn test_empty_spec_keeps_input_order() {
        let store = store();
        let sorted = sort_rows(&store, &[4, 2, 0], &SortSpec::new()).unwrap();
        assert_eq!(sorted, vec![4, 2, 0]);
    }

    #[test]
    fn test_numeric_sort_with_nulls_last_both_ways() {
        let store = store();
        let all: Vec<usize> = (0..5).collect();
        let asc = sort_rows(&store, &all, &SortSpec::asc("score")).unwrap();
        assert_eq!(ids(&store, &asc), vec!["e", "b", "a", "d", "c"]);
        let desc = sort_rows(&store, &all, &SortSpec::desc("score")).unwrap();
        assert_eq!(ids(&store, &desc), vec!["a", "d", "b", "e", "c"]);
    }

    #[test]
    fn test_multi_key_priority() {
        let store = store();
        let all: Vec<usize> = (0..5).collect();
        let spec = SortSpec::asc("team").then_desc("score");
        let sorted = sort_rows(&store, &all, &spec).unwrap();
        assert_eq!(ids(&store, &sorted), vec!["d", "b", "a", "e", "c"]);
    }

    #[test]
    fn test_ties_keep_input_order_across_repeats() {
        let store = store();
        let all: Vec<usize> = (0..5).collect();
        let spec = SortSpec::asc("team");
        let once = sort_rows(&store, &all, &spec).unwrap();
        assert_eq!(ids(&store, &once), vec!["b", "d", "a", "c", "e"]);
        let twice = sort_rows(&store, &once, &spec).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_unsortable_column_rejected() {
        let store = store();
        assert_eq!(
            sort_rows(&store, &[0], &SortSpec::asc("note")).unwrap_err(),
            ConfigError::missing_capability("note", Capability::Sort)
        );
    }

    #[test]
    fn test_toggle_single_mode_cycle() {
        let mut spec = SortSpec::new();
        assert_eq!(spec.toggle("name", SortMode::Single), Some(Direction::Asc));
        assert_eq!(spec.toggle("name", SortMode::Single), Some(Direction::Desc));
        assert_eq!(spec.toggle("name", SortMode::Single), None);
        assert!(spec.is_empty());
    }

    #[test]
    fn test_toggle_single_mode_replaces_other_column() {
        let mut spec = SortSpec::asc("name");
        spec.toggle("team", SortMode::Single);
        assert_eq!(spec, SortSpec::asc("team"));
    }

    #[test]
    fn test_toggle_multi_mode_removes_only_that_key() {
        let mut spec = SortSpec::new();
        spec.toggle("team", SortMode::Multi);
        spec.toggle("score", SortMode::Multi);
        assert_eq!(spec, SortSpec::asc("team").then_asc("score"));

        spec.toggle("team", SortMode::Multi);
        assert_eq!(spec, SortSpec::desc("team").then_asc("score"));

        assert_eq!(spec.toggle("team", SortMode::Multi), None);
        assert_eq!(spec, SortSpec::asc("score"));
    }
}
