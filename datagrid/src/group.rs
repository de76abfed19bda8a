//! Grouping and aggregation.
//!
//! Rows are partitioned by the stringified value of one or more group-by
//! columns, with null cells kept apart from empty strings. Grouping runs after sorting, so groups appear in the order their
//! first row appears in the sorted sequence and rows inside a group keep
//! their sorted order. An explicit [`GroupOrder`] overrides the group order.
//!
//! # Example
//!
//! ```
//! use datagrid::group::GroupSpec;
//!
//! let spec = GroupSpec::by("role")
//!     .count("role", "members")
//!     .avg("salary", "avg_salary");
//! assert_eq!(spec.aggregations().len(), 2);
//! ```

use std::cmp::Ordering;
use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt;

use log::debug;
use serde::Deserialize;
use serde::Serialize;

use crate::error::Capability;
use crate::error::ConfigError;
use crate::model::Column;
use crate::model::ColumnType;
use crate::model::RowId;
use crate::model::Value;
use crate::sort::Direction;
use crate::sort::compare_cells;
use crate::store::RowStore;

/// The aggregation function to compute per group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFn {
    /// Number of rows in the group.
    Count,
    /// Sum of numeric values.
    Sum,
    /// Average of numeric values.
    Avg,
    /// Minimum value.
    Min,
    /// Maximum value.
    Max,
    /// Count of distinct values.
    Distinct,
}

impl AggregateFn {
    pub fn name(&self) -> &'static str {
        match self {
            AggregateFn::Count => "count",
            AggregateFn::Sum => "sum",
            AggregateFn::Avg => "avg",
            AggregateFn::Min => "min",
            AggregateFn::Max => "max",
            AggregateFn::Distinct => "distinct",
        }
    }
}

impl fmt::Display for AggregateFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One aggregate column of a group summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregation {
    /// Column id the aggregate reads.
    pub field: String,
    pub function: AggregateFn,
    /// Name of the result.
    pub label: String,
}

impl Aggregation {
    pub fn new(field: impl Into<String>, function: AggregateFn, label: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            function,
            label: label.into(),
        }
    }
}

/// Order of groups in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupOrder {
    /// Order in which each group's first row appears in the sorted rows.
    #[default]
    FirstSeen,
    /// By group key, ascending, nulls last.
    KeyAscending,
    /// By group key, descending, nulls last.
    KeyDescending,
}

/// Group-by columns and aggregations.
///
/// An empty column list disables grouping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupSpec {
    pub columns: Vec<String>,
    pub aggregations: Vec<Aggregation>,
    pub order: GroupOrder,
}

impl GroupSpec {
    /// No grouping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Group by a single column.
    pub fn by(column: impl Into<String>) -> Self {
        Self::new().then_by(column)
    }

    /// Add another group-by column, forming a composite key.
    pub fn then_by(mut self, column: impl Into<String>) -> Self {
        self.columns.push(column.into());
        self
    }

    pub fn with_order(mut self, order: GroupOrder) -> Self {
        self.order = order;
        self
    }

    /// Add an aggregation.
    pub fn aggregate(
        mut self,
        field: impl Into<String>,
        function: AggregateFn,
        label: impl Into<String>,
    ) -> Self {
        self.aggregations.push(Aggregation::new(field, function, label));
        self
    }

    pub fn count(self, field: impl Into<String>, label: impl Into<String>) -> Self {
        self.aggregate(field, AggregateFn::Count, label)
    }

    pub fn sum(self, field: impl Into<String>, label: impl Into<String>) -> Self {
        self.aggregate(field, AggregateFn::Sum, label)
    }

    pub fn avg(self, field: impl Into<String>, label: impl Into<String>) -> Self {
        self.aggregate(field, AggregateFn::Avg, label)
    }

    pub fn min(self, field: impl Into<String>, label: impl Into<String>) -> Self {
        self.aggregate(field, AggregateFn::Min, label)
    }

    pub fn max(self, field: impl Into<String>, label: impl Into<String>) -> Self {
        self.aggregate(field, AggregateFn::Max, label)
    }

    pub fn distinct(self, field: impl Into<String>, label: impl Into<String>) -> Self {
        self.aggregate(field, AggregateFn::Distinct, label)
    }

    /// Explicit aggregations in declaration order.
    pub fn aggregations(&self) -> &[Aggregation] {
        &self.aggregations
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Aggregations actually computed for the store.
    ///
    /// Without explicit aggregations, every column declaring a default
    /// aggregate contributes one, labelled `<function>_<column>`.
    pub fn effective_aggregations(&self, store: &RowStore) -> Vec<Aggregation> {
        if !self.aggregations.is_empty() {
            return self.aggregations.clone();
        }
        store
            .columns()
            .iter()
            .filter_map(|c| {
                c.aggregate
                    .map(|f| Aggregation::new(&c.id, f, format!("{}_{}", f, c.id)))
            })
            .collect()
    }

    /// Checks group-by columns are groupable and aggregation fields exist.
    pub fn validate(&self, store: &RowStore) -> Result<(), ConfigError> {
        for column in &self.columns {
            store.require_column(column, Capability::Group)?;
        }
        for aggregation in &self.aggregations {
            store
                .column(&aggregation.field)
                .ok_or_else(|| ConfigError::unknown_column(&aggregation.field))?;
        }
        Ok(())
    }
}

/// Composite group key: one stringified value per group-by column.
///
/// Null cells are kept as `None` so they never share a group with empty
/// strings. Serializes as a JSON array of strings and nulls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupKey(Vec<Option<String>>);

impl GroupKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(|p| Some(p.into())).collect())
    }

    fn from_cells(values: &[Value]) -> Self {
        Self(
            values
                .iter()
                .map(|v| (!v.is_null()).then(|| v.to_string()))
                .collect(),
        )
    }

    pub fn parts(&self) -> &[Option<String>] {
        &self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" / ")?;
            }
            f.write_str(part.as_deref().unwrap_or("(none)"))?;
        }
        Ok(())
    }
}

/// Collapsed groups, tracked by key so they survive recomputation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollapseState {
    collapsed: HashSet<GroupKey>,
}

impl CollapseState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_collapsed(&self, key: &GroupKey) -> bool {
        self.collapsed.contains(key)
    }

    /// Flip a group. Returns `true` if it is now collapsed.
    pub fn toggle(&mut self, key: &GroupKey) -> bool {
        if self.collapsed.remove(key) {
            false
        } else {
            self.collapsed.insert(key.clone());
            true
        }
    }

    pub fn collapse(&mut self, key: GroupKey) {
        self.collapsed.insert(key);
    }

    pub fn expand(&mut self, key: &GroupKey) {
        self.collapsed.remove(key);
    }

    /// Expand every group.
    pub fn clear(&mut self) {
        self.collapsed.clear();
    }

    /// Drop keys that no row of `store` produces under `spec`.
    ///
    /// Keys are checked against the whole snapshot, not the filtered rows, so
    /// a group hidden by a filter stays collapsed. Returns the number of keys
    /// dropped.
    pub fn prune(&mut self, store: &RowStore, spec: &GroupSpec) -> usize {
        let before = self.collapsed.len();
        let columns: Vec<&Column> = spec.columns.iter().filter_map(|id| store.column(id)).collect();
        if columns.is_empty() || columns.len() != spec.columns.len() {
            self.collapsed.clear();
            return before;
        }
        let live: HashSet<GroupKey> = (0..store.len())
            .map(|row| {
                let values: Vec<Value> = columns.iter().map(|c| store.cell(row, c)).collect();
                GroupKey::from_cells(&values)
            })
            .collect();
        self.collapsed.retain(|key| live.contains(key));
        before - self.collapsed.len()
    }

    pub fn len(&self) -> usize {
        self.collapsed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collapsed.is_empty()
    }
}

/// Computed aggregate of one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub label: String,
    pub function: AggregateFn,
    pub field: String,
    pub value: Value,
}

/// One group of rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub key: GroupKey,
    /// Member rows in sorted order.
    pub rows: Vec<RowId>,
    pub aggregates: Vec<AggregateResult>,
    pub collapsed: bool,
}

impl Group {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Aggregate result by label.
    pub fn aggregate(&self, label: &str) -> Option<&Value> {
        self.aggregates
            .iter()
            .find(|a| a.label == label)
            .map(|a| &a.value)
    }
}

/// Entry of the flattened, renderable sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GridItem {
    GroupHeader {
        key: GroupKey,
        count: usize,
        collapsed: bool,
    },
    Row { id: RowId },
}

impl GridItem {
    /// Row id, `None` for headers.
    pub fn row_id(&self) -> Option<&RowId> {
        match self {
            GridItem::Row { id } => Some(id),
            GridItem::GroupHeader { .. } => None,
        }
    }
}

struct Bucket {
    key: GroupKey,
    values: Vec<Value>,
    members: Vec<usize>,
}

/// Partition `rows` (sorted snapshot positions) into groups.
///
/// Returns no groups when the spec has no group-by columns.
pub fn group_rows(
    store: &RowStore,
    rows: &[usize],
    spec: &GroupSpec,
    collapse: &CollapseState,
) -> Result<Vec<Group>, ConfigError> {
    spec.validate(store)?;
    if spec.is_empty() {
        return Ok(Vec::new());
    }
    let columns: Vec<&Column> = spec
        .columns
        .iter()
        .map(|id| store.require_column(id, Capability::Group))
        .collect::<Result<_, _>>()?;

    let mut buckets: Vec<Bucket> = Vec::new();
    let mut lookup: HashMap<GroupKey, usize> = HashMap::new();
    for &row in rows {
        let values: Vec<Value> = columns.iter().map(|c| store.cell(row, c)).collect();
        let key = GroupKey::from_cells(&values);
        match lookup.get(&key) {
            Some(&b) => buckets[b].members.push(row),
            None => {
                lookup.insert(key.clone(), buckets.len());
                buckets.push(Bucket {
                    key,
                    values,
                    members: vec![row],
                });
            }
        }
    }

    let direction = match spec.order {
        GroupOrder::FirstSeen => None,
        GroupOrder::KeyAscending => Some(Direction::Asc),
        GroupOrder::KeyDescending => Some(Direction::Desc),
    };
    if let Some(direction) = direction {
        buckets.sort_by(|a, b| {
            columns
                .iter()
                .enumerate()
                .map(|(i, c)| compare_cells(&a.values[i], &b.values[i], c.column_type, direction))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        });
    }

    let aggregations = spec.effective_aggregations(store);
    let groups: Vec<Group> = buckets
        .into_iter()
        .map(|bucket| {
            let aggregates = aggregations
                .iter()
                .map(|agg| AggregateResult {
                    label: agg.label.clone(),
                    function: agg.function,
                    field: agg.field.clone(),
                    value: aggregate(store, &bucket.members, agg),
                })
                .collect();
            Group {
                collapsed: collapse.is_collapsed(&bucket.key),
                key: bucket.key,
                rows: store.ids(&bucket.members),
                aggregates,
            }
        })
        .collect();

    debug!(
        "Grouped {} rows into {} groups by {:?}",
        rows.len(),
        groups.len(),
        spec.columns
    );
    Ok(groups)
}

/// Interleave headers and rows. Collapsed groups contribute only a header.
pub fn flatten(groups: &[Group]) -> Vec<GridItem> {
    let mut items = Vec::with_capacity(groups.iter().map(|g| g.len() + 1).sum());
    for group in groups {
        items.push(GridItem::GroupHeader {
            key: group.key.clone(),
            count: group.len(),
            collapsed: group.collapsed,
        });
        if !group.collapsed {
            items.extend(group.rows.iter().map(|id| GridItem::Row { id: id.clone() }));
        }
    }
    items
}

fn aggregate(store: &RowStore, members: &[usize], aggregation: &Aggregation) -> Value {
    let Some(column) = store.column(&aggregation.field) else {
        return Value::Null;
    };
    match aggregation.function {
        AggregateFn::Count => Value::Int(members.len() as i64),
        AggregateFn::Sum => sum(numbers(store, members, column)),
        AggregateFn::Avg => {
            let values = numbers(store, members, column);
            if values.is_empty() {
                return Value::Null;
            }
            let total: f64 = values.iter().filter_map(Value::as_f64).sum();
            Value::Float(total / values.len() as f64)
        }
        AggregateFn::Min => extreme(store, members, column, Ordering::Less),
        AggregateFn::Max => extreme(store, members, column, Ordering::Greater),
        AggregateFn::Distinct => {
            let distinct: HashSet<String> = members
                .iter()
                .map(|&i| store.cell(i, column).to_string())
                .collect();
            Value::Int(distinct.len() as i64)
        }
    }
}

/// Numeric values of a column. Values that are not numbers are skipped.
fn numbers(store: &RowStore, members: &[usize], column: &Column) -> Vec<Value> {
    members
        .iter()
        .filter_map(|&i| store.row(i))
        .filter_map(|record| column.read(record).ok())
        .filter_map(|raw| raw.coerce(ColumnType::Number))
        .filter(|v| !v.is_null())
        .collect()
}

/// Sums as an integer while every input is an integer and the total fits.
fn sum(values: Vec<Value>) -> Value {
    let mut total = Some(0i64);
    for value in &values {
        total = match (total, value) {
            (Some(acc), Value::Int(v)) => acc.checked_add(*v),
            _ => None,
        };
    }
    match total {
        Some(total) => Value::Int(total),
        None => Value::Float(values.iter().filter_map(Value::as_f64).sum()),
    }
}

/// Smallest or largest value. Nulls and unreadable cells are skipped.
fn extreme(store: &RowStore, members: &[usize], column: &Column, wanted: Ordering) -> Value {
    members
        .iter()
        .filter_map(|&i| store.row(i))
        .filter_map(|record| column.resolve(record).ok())
        .filter(|v| !v.is_null())
        .reduce(|best, v| {
            if v.compare(&best, column.column_type) == wanted {
                v
            } else {
                best
            }
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;

    fn store() -> RowStore {
        let columns = vec![
            Column::new("name", ColumnType::String).sortable(),
            Column::new("role", ColumnType::String).groupable(),
            Column::new("team", ColumnType::String).groupable(),
            Column::new("salary", ColumnType::Number).aggregate(AggregateFn::Sum),
            Column::new("note", ColumnType::String),
        ];
        let rows = vec![
            Record::new("1").set("name", "Ada").set("role", "admin").set("team", "core").set("salary", 100),
            Record::new("2").set("name", "Bob").set("role", "user").set("team", "core").set("salary", 50),
            Record::new("3").set("name", "Cy").set("role", "editor").set("team", "web").set("salary", "n/a"),
            Record::new("4").set("name", "Di").set("role", "user").set("team", "web").set("salary", 70),
            Record::new("5").set("name", "Ed").set("role", "admin").set("team", "core").set("salary", 20.5),
        ];
        RowStore::new(columns, rows).unwrap()
    }

    fn all() -> Vec<usize> {
        (0..5).collect()
    }

    fn keys(groups: &[Group]) -> Vec<String> {
        groups.iter().map(|g| g.key.to_string()).collect()
    }

    #[test]
    fn test_first_seen_group_order() {
        let store = store();
        let groups = group_rows(&store, &all(), &GroupSpec::by("role"), &CollapseState::new()).unwrap();
        assert_eq!(keys(&groups), vec!["admin", "user", "editor"]);
        let sizes: Vec<usize> = groups.iter().map(Group::len).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
        assert_eq!(groups[0].rows, vec![RowId::from("1"), RowId::from("5")]);
    }

    #[test]
    fn test_key_order_override() {
        let store = store();
        let spec = GroupSpec::by("role").with_order(GroupOrder::KeyDescending);
        let groups = group_rows(&store, &all(), &spec, &CollapseState::new()).unwrap();
        assert_eq!(keys(&groups), vec!["user", "editor", "admin"]);
    }

    #[test]
    fn test_composite_keys() {
        let store = store();
        let spec = GroupSpec::by("team").then_by("role");
        let groups = group_rows(&store, &all(), &spec, &CollapseState::new()).unwrap();
        assert_eq!(
            keys(&groups),
            vec!["core / admin", "core / user", "web / editor", "web / user"]
        );
    }

    #[test]
    fn test_aggregates_skip_non_numeric() {
        let store = store();
        let spec = GroupSpec::by("team")
            .count("salary", "n")
            .sum("salary", "total")
            .avg("salary", "mean")
            .min("name", "first")
            .max("salary", "top")
            .distinct("role", "roles");
        let groups = group_rows(&store, &all(), &spec, &CollapseState::new()).unwrap();

        let core = &groups[0];
        assert_eq!(core.aggregate("n"), Some(&Value::Int(3)));
        assert_eq!(core.aggregate("total"), Some(&Value::Float(170.5)));
        assert_eq!(core.aggregate("first"), Some(&Value::from("Ada")));
        assert_eq!(core.aggregate("top"), Some(&Value::Int(100)));
        assert_eq!(core.aggregate("roles"), Some(&Value::Int(2)));

        let web = &groups[1];
        assert_eq!(web.aggregate("n"), Some(&Value::Int(2)));
        assert_eq!(web.aggregate("total"), Some(&Value::Int(70)));
        assert_eq!(web.aggregate("mean"), Some(&Value::Float(70.0)));
    }

    #[test]
    fn test_column_default_aggregations() {
        let store = store();
        let groups = group_rows(&store, &all(), &GroupSpec::by("role"), &CollapseState::new()).unwrap();
        assert_eq!(groups[1].aggregate("sum_salary"), Some(&Value::Int(120)));
    }

    #[test]
    fn test_collapsed_group_keeps_header_only() {
        let store = store();
        let mut collapse = CollapseState::new();
        assert!(collapse.toggle(&GroupKey::new(["admin"])));
        let groups = group_rows(&store, &all(), &GroupSpec::by("role"), &collapse).unwrap();
        let items = flatten(&groups);
        assert_eq!(items.len(), 3 + 3);
        assert_eq!(
            items[0],
            GridItem::GroupHeader {
                key: GroupKey::new(["admin"]),
                count: 2,
                collapsed: true,
            }
        );
        assert!(matches!(items[1], GridItem::GroupHeader { .. }));
    }

    #[test]
    fn test_null_and_empty_string_group_apart() {
        let store = RowStore::new(
            vec![Column::new("team", ColumnType::String).groupable()],
            vec![
                Record::new("1").set("team", ""),
                Record::new("2"),
                Record::new("3").set("team", ""),
            ],
        )
        .unwrap();
        let groups = group_rows(&store, &[0, 1, 2], &GroupSpec::by("team"), &CollapseState::new()).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key.parts(), &[Some(String::new())]);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[1].key.parts(), &[None]);
        assert_eq!(groups[1].key.to_string(), "(none)");
    }

    #[test]
    fn test_prune_keeps_keys_hidden_by_filter() {
        let store = store();
        let spec = GroupSpec::by("role");
        let mut collapse = CollapseState::new();
        collapse.collapse(GroupKey::new(["editor"]));
        collapse.collapse(GroupKey::new(["guest"]));
        assert_eq!(collapse.prune(&store, &spec), 1);
        assert!(collapse.is_collapsed(&GroupKey::new(["editor"])));
        assert!(!collapse.is_collapsed(&GroupKey::new(["guest"])));
    }

    #[test]
    fn test_ungroupable_column_rejected() {
        let store = store();
        assert_eq!(
            group_rows(&store, &all(), &GroupSpec::by("name"), &CollapseState::new()).unwrap_err(),
            ConfigError::missing_capability("name", Capability::Group)
        );
    }

    #[test]
    fn test_empty_spec_yields_no_groups() {
        let store = store();
        let groups = group_rows(&store, &all(), &GroupSpec::new(), &CollapseState::new()).unwrap();
        assert!(groups.is_empty());
    }
}
