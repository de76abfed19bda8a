//! Column descriptors.

use std::fmt;
use std::sync::Arc;

use log::warn;
use serde::Deserialize;
use serde::Serialize;

use super::Record;
use super::Value;
use crate::error::Capability;
use crate::error::FieldError;
use crate::group::AggregateFn;

/// Declared value type of a column. Drives coercion and comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    String,
    Number,
    Date,
    Boolean,
}

impl ColumnType {
    /// Name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Number => "number",
            ColumnType::Date => "date",
            ColumnType::Boolean => "boolean",
        }
    }

    /// Value substituted for a cell that failed to read or coerce.
    pub fn fallback(&self) -> Value {
        match self {
            ColumnType::String => Value::String(String::new()),
            ColumnType::Number => Value::Int(0),
            ColumnType::Boolean => Value::Bool(false),
            // There is no zero date.
            ColumnType::Date => Value::Null,
        }
    }
}

/// Closure used by computed columns.
pub type ComputedFn = Arc<dyn Fn(&Record) -> Result<Value, FieldError> + Send + Sync>;

/// How a column reads its value out of a record.
#[derive(Clone)]
pub enum Accessor {
    /// Reads the named field. Missing fields read as `Null`.
    Field(String),
    /// Derives the value from the whole record. May fail.
    Computed(ComputedFn),
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Field(name) => f.debug_tuple("Field").field(name).finish(),
            Accessor::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Column configuration.
///
/// Columns describe how to read a cell (accessor + declared type), which
/// operations may reference the column, and display metadata the renderer
/// needs (header, width, order, visibility).
///
/// # Examples
///
/// ```
/// use datagrid::model::{Column, ColumnType};
///
/// let columns = vec![
///     Column::new("name", ColumnType::String).sortable().filterable(),
///     Column::new("age", ColumnType::Number).sortable().width(6),
///     Column::new("role", ColumnType::String).groupable().header("Role"),
/// ];
/// ```
#[derive(Debug, Clone)]
pub struct Column {
    /// Unique column id referenced by specs.
    pub id: String,
    /// Header text.
    pub header: String,
    pub accessor: Accessor,
    pub column_type: ColumnType,
    pub sortable: bool,
    pub filterable: bool,
    pub groupable: bool,
    /// Aggregation applied when grouping without explicit aggregations.
    pub aggregate: Option<AggregateFn>,
    /// Width in display units.
    pub width: u16,
    /// Display order; ties keep declaration order.
    pub order: i32,
    pub visible: bool,
}

impl Column {
    /// Create a column reading the field with the same name as its id.
    pub fn new(id: impl Into<String>, column_type: ColumnType) -> Self {
        let id = id.into();
        Self {
            header: id.clone(),
            accessor: Accessor::Field(id.clone()),
            id,
            column_type,
            sortable: false,
            filterable: false,
            groupable: false,
            aggregate: None,
            width: 10,
            order: 0,
            visible: true,
        }
    }

    /// Set the header text.
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    /// Read a differently named field.
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.accessor = Accessor::Field(field.into());
        self
    }

    /// Derive the value with a closure.
    pub fn computed<F>(mut self, f: F) -> Self
    where
        F: Fn(&Record) -> Result<Value, FieldError> + Send + Sync + 'static,
    {
        self.accessor = Accessor::Computed(Arc::new(f));
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    pub fn groupable(mut self) -> Self {
        self.groupable = true;
        self
    }

    /// Set the default aggregation used in group summaries.
    pub fn aggregate(mut self, function: AggregateFn) -> Self {
        self.aggregate = Some(function);
        self
    }

    pub fn width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Hide the column. Hidden columns are skipped by the global query.
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Check whether the column has a capability.
    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Sort => self.sortable,
            Capability::Filter => self.filterable,
            Capability::Group => self.groupable,
        }
    }

    /// Read the raw value of this column from a record, without coercion.
    pub fn read(&self, record: &Record) -> Result<Value, FieldError> {
        match &self.accessor {
            Accessor::Field(name) => Ok(record.get(name).cloned().unwrap_or_default()),
            Accessor::Computed(f) => f(record),
        }
    }

    /// Read and coerce the value to the declared type.
    pub fn resolve(&self, record: &Record) -> Result<Value, FieldError> {
        let raw = self.read(record)?;
        raw.coerce(self.column_type).ok_or_else(|| {
            FieldError::type_mismatch(&self.id, self.column_type.name(), raw.type_name())
        })
    }

    /// Resolve the cell, substituting the type's fallback on failure.
    ///
    /// Failures are logged and never abort processing of other rows.
    pub fn cell(&self, record: &Record) -> Value {
        match self.resolve(record) {
            Ok(value) => value,
            Err(err) => {
                warn!("Row '{}', column '{}': {}", record.id(), self.id, err);
                self.column_type.fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_reads_as_null() {
        let column = Column::new("email", ColumnType::String);
        let record = Record::new("1");
        assert_eq!(column.cell(&record), Value::Null);
    }

    #[test]
    fn test_uncoercible_value_uses_fallback() {
        let column = Column::new("age", ColumnType::Number);
        let record = Record::new("1").set("age", "unknown");
        assert!(matches!(
            column.resolve(&record),
            Err(FieldError::TypeMismatch { .. })
        ));
        assert_eq!(column.cell(&record), Value::Int(0));
    }

    #[test]
    fn test_failing_accessor_uses_fallback() {
        let column = Column::new("initials", ColumnType::String)
            .computed(|_| Err(FieldError::invalid("initials", "boom")));
        let record = Record::new("1");
        assert_eq!(column.cell(&record), Value::String(String::new()));
    }

    #[test]
    fn test_computed_accessor() {
        let column = Column::new("full", ColumnType::String).computed(|r| {
            let first = r.require("first")?;
            let last = r.require("last")?;
            Ok(Value::from(format!("{first} {last}")))
        });
        let record = Record::new("1").set("first", "Ada").set("last", "Lovelace");
        assert_eq!(column.cell(&record), Value::from("Ada Lovelace"));
    }
}
