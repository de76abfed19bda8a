//! Row records and their identifiers

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use super::Value;
use crate::error::FieldError;

/// Stable, unique identifier of a row.
///
/// Ids are compared as strings. Numeric primary keys are accepted when
/// deserializing and converted to their decimal form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RowId(String);

impl RowId {
    /// Creates a row id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for RowId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RowId {
    fn from(v: &str) -> Self {
        Self(v.to_string())
    }
}

impl From<String> for RowId {
    fn from(v: String) -> Self {
        Self(v)
    }
}

impl From<u64> for RowId {
    fn from(v: u64) -> Self {
        Self(v.to_string())
    }
}

impl From<usize> for RowId {
    fn from(v: usize) -> Self {
        Self(v.to_string())
    }
}

impl<'de> Deserialize<'de> for RowId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => RowId(s),
            RawId::Number(n) => RowId(n.to_string()),
        })
    }
}

/// An immutable row record.
///
/// Fields are held in a `HashMap<String, Value>` and reached through a
/// column's accessor. Records are never mutated once they are part of a
/// snapshot; per-row UI state lives in [`RowStateMap`](crate::RowStateMap).
///
/// # Example
///
/// ```
/// use datagrid::model::Record;
///
/// let record = Record::new("1")
///     .set("name", "Ada")
///     .set("age", 36);
///
/// assert_eq!(record.get("name").and_then(|v| v.as_str()), Some("Ada"));
/// assert!(record.get("email").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    id: RowId,
    #[serde(flatten)]
    fields: HashMap<String, Value>,
}

impl Record {
    /// Creates an empty record with the given id.
    pub fn new(id: impl Into<RowId>) -> Self {
        Self {
            id: id.into(),
            fields: HashMap::new(),
        }
    }

    /// Sets a field value, returning the record for chaining.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Returns the record's id.
    pub fn id(&self) -> &RowId {
        &self.id
    }

    /// Returns a field value, if present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns a field value or a [`FieldError::Missing`].
    pub fn require(&self, field: &str) -> Result<&Value, FieldError> {
        self.fields.get(field).ok_or_else(|| FieldError::missing(field))
    }

    /// Returns all fields.
    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }
}
