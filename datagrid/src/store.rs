//! Immutable dataset snapshot.

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::error::Capability;
use crate::error::ConfigError;
use crate::model::Column;
use crate::model::Record;
use crate::model::RowId;
use crate::model::Value;

/// A versioned batch of rows as delivered by a data source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u64,
    pub rows: Vec<Record>,
}

impl Snapshot {
    pub fn new(version: u64, rows: Vec<Record>) -> Self {
        Self { version, rows }
    }
}

/// One immutable dataset snapshot plus its column descriptors.
///
/// A store is never mutated. A new snapshot replaces it wholesale via
/// [`RowStore::replace`], which keeps the columns and bumps the version.
/// Rows and columns sit behind `Arc`s so clones are cheap and snapshots can
/// be shared with readers.
#[derive(Debug, Clone)]
pub struct RowStore {
    version: u64,
    columns: Arc<[Column]>,
    rows: Arc<[Record]>,
    index: Arc<HashMap<RowId, usize>>,
}

impl RowStore {
    /// Creates a store at version 0.
    pub fn new(columns: Vec<Column>, rows: Vec<Record>) -> Result<Self, ConfigError> {
        Self::with_version(0, columns, rows)
    }

    /// Creates a store tagged with an explicit snapshot version.
    pub fn with_version(
        version: u64,
        columns: Vec<Column>,
        rows: Vec<Record>,
    ) -> Result<Self, ConfigError> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.id.as_str()) {
                return Err(ConfigError::DuplicateColumn {
                    column: column.id.clone(),
                });
            }
        }
        Self::build(version, columns.into(), rows)
    }

    fn build(version: u64, columns: Arc<[Column]>, rows: Vec<Record>) -> Result<Self, ConfigError> {
        let mut index = HashMap::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            if index.insert(row.id().clone(), i).is_some() {
                return Err(ConfigError::DuplicateRowId {
                    id: row.id().to_string(),
                });
            }
        }
        Ok(Self {
            version,
            columns,
            rows: rows.into(),
            index: Arc::new(index),
        })
    }

    /// Builds the next snapshot with the same columns.
    pub fn replace(&self, version: u64, rows: Vec<Record>) -> Result<Self, ConfigError> {
        Self::build(version, Arc::clone(&self.columns), rows)
    }

    /// Snapshot version.
    pub fn version(&self) -> u64 {
        self.version
    }

    // -------------------------------------------------------------------------
    // Columns
    // -------------------------------------------------------------------------

    /// All column descriptors in declaration order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Find a column by id.
    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    /// Find a column and check it has the capability a spec needs.
    pub fn require_column(&self, id: &str, capability: Capability) -> Result<&Column, ConfigError> {
        let column = self
            .column(id)
            .ok_or_else(|| ConfigError::unknown_column(id))?;
        if !column.has(capability) {
            return Err(ConfigError::missing_capability(id, capability));
        }
        Ok(column)
    }

    /// Visible columns in display order.
    pub fn visible_columns(&self) -> Vec<&Column> {
        let mut visible: Vec<&Column> = self.columns.iter().filter(|c| c.visible).collect();
        visible.sort_by_key(|c| c.order);
        visible
    }

    // -------------------------------------------------------------------------
    // Rows
    // -------------------------------------------------------------------------

    /// All rows in snapshot order.
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row at a snapshot position.
    pub fn row(&self, index: usize) -> Option<&Record> {
        self.rows.get(index)
    }

    /// Row by id.
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.position(id).map(|i| &self.rows[i])
    }

    /// Snapshot position of a row id.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Id of the row at a snapshot position.
    pub(crate) fn id_at(&self, index: usize) -> &RowId {
        self.rows[index].id()
    }

    /// Ids for a list of snapshot positions.
    pub(crate) fn ids(&self, indices: &[usize]) -> Vec<RowId> {
        indices.iter().map(|&i| self.id_at(i).clone()).collect()
    }

    /// Resolved cell value, with the column type's fallback on failure.
    pub fn cell(&self, index: usize, column: &Column) -> Value {
        column.cell(&self.rows[index])
    }
}
