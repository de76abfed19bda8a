//! Value enum for dynamic cell values

use std::cmp::Ordering;
use std::fmt;

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::ColumnType;

/// A dynamic value held by a record field.
///
/// # Type Mapping
///
/// | Column type | Variants after coercion |
/// |-------------|-------------------------|
/// | string | `String` |
/// | number | `Int`, `Float` |
/// | date | `DateTime` |
/// | boolean | `Bool` |
///
/// `Null` is valid for every column type.
///
/// # Example
///
/// ```
/// use datagrid::model::Value;
///
/// let name = Value::from("Ada");
/// let age = Value::from(36);
/// let empty = Value::Null;
/// assert_eq!(empty.to_string(), "");
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null/missing value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// Date and time in UTC.
    DateTime(DateTime<Utc>),
    /// String value.
    String(String),
}

impl Value {
    /// Returns `true` if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::DateTime(_) => "datetime",
            Value::String(_) => "string",
        }
    }

    /// Returns the value as a float if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string slice if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Converts the value to the given column type.
    ///
    /// Returns `None` when the value cannot represent that type. `Null`
    /// converts to `Null` for every type.
    pub fn coerce(&self, column_type: ColumnType) -> Option<Value> {
        if self.is_null() {
            return Some(Value::Null);
        }
        match column_type {
            ColumnType::String => match self {
                Value::String(_) => Some(self.clone()),
                other => Some(Value::String(other.to_string())),
            },
            ColumnType::Number => match self {
                Value::Int(_) | Value::Float(_) => Some(self.clone()),
                Value::String(s) => parse_number(s),
                _ => None,
            },
            ColumnType::Boolean => match self {
                Value::Bool(_) => Some(self.clone()),
                Value::Int(0) => Some(Value::Bool(false)),
                Value::Int(1) => Some(Value::Bool(true)),
                Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" => Some(Value::Bool(true)),
                    "false" => Some(Value::Bool(false)),
                    _ => None,
                },
                _ => None,
            },
            ColumnType::Date => match self {
                Value::DateTime(_) => Some(self.clone()),
                Value::String(s) => parse_date(s).map(Value::DateTime),
                Value::Int(secs) => DateTime::from_timestamp(*secs, 0).map(Value::DateTime),
                _ => None,
            },
        }
    }

    /// Compares two non-null values using the strategy of a column type.
    ///
    /// Values that do not fit the type (mixed content) fall back to comparing
    /// their string forms.
    pub fn compare(&self, other: &Value, column_type: ColumnType) -> Ordering {
        if column_type == ColumnType::Number
            && let (Some(a), Some(b)) = (self.as_f64(), other.as_f64())
        {
            return a.total_cmp(&b);
        }
        match (column_type, self, other) {
            (ColumnType::Date, Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            (ColumnType::Boolean, Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (_, Value::String(a), Value::String(b)) => a.cmp(b),
            (_, a, b) => a.to_string().cmp(&b.to_string()),
        }
    }

    /// Typed equality used by filter predicates.
    pub fn equals(&self, other: &Value, column_type: ColumnType) -> bool {
        match (self.is_null(), other.is_null()) {
            (true, true) => true,
            (false, false) => self.compare(other, column_type) == Ordering::Equal,
            _ => false,
        }
    }
}

fn parse_number(s: &str) -> Option<Value> {
    let s = s.trim();
    if let Ok(v) = s.parse::<i64>() {
        return Some(Value::Int(v));
    }
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Value::Float)
}

fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::DateTime(dt) if dt.time() == NaiveTime::MIN => {
                write!(f, "{}", dt.format("%Y-%m-%d"))
            }
            Value::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Value::String(s) => f.write_str(s),
        }
    }
}

// =============================================================================
// From implementations
// =============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::DateTime(v.and_time(NaiveTime::MIN).and_utc())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_stringifies_null_as_empty() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::from(true).to_string(), "true");
    }

    #[test]
    fn test_display_dates() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(Value::from(day).to_string(), "2024-03-09");
    }

    #[test]
    fn test_coerce_number_from_string() {
        assert_eq!(
            Value::from("42").coerce(ColumnType::Number),
            Some(Value::Int(42))
        );
        assert_eq!(
            Value::from(" 1.5 ").coerce(ColumnType::Number),
            Some(Value::Float(1.5))
        );
        assert_eq!(Value::from("n/a").coerce(ColumnType::Number), None);
        assert_eq!(Value::from(true).coerce(ColumnType::Number), None);
    }

    #[test]
    fn test_coerce_date_from_string() {
        let parsed = Value::from("2024-01-31").coerce(ColumnType::Date).unwrap();
        assert_eq!(parsed.to_string(), "2024-01-31");
        assert!(Value::from("yesterday").coerce(ColumnType::Date).is_none());
    }

    #[test]
    fn test_coerce_null_is_always_null() {
        for ty in [
            ColumnType::String,
            ColumnType::Number,
            ColumnType::Date,
            ColumnType::Boolean,
        ] {
            assert_eq!(Value::Null.coerce(ty), Some(Value::Null));
        }
    }

    #[test]
    fn test_compare_numbers_numerically() {
        let a = Value::from(9);
        let b = Value::from(10.5);
        assert_eq!(a.compare(&b, ColumnType::Number), Ordering::Less);
        // As strings "9" > "10.5"
        assert_eq!(a.compare(&b, ColumnType::String), Ordering::Greater);
    }

    #[test]
    fn test_mixed_values_fall_back_to_strings() {
        let a = Value::from("abc");
        let b = Value::from(3);
        assert_eq!(a.compare(&b, ColumnType::Number), Ordering::Greater);
    }
}
