//! FieldError for cell accessors

/// Error produced while reading a single cell.
///
/// The pipeline never propagates these: the cell is replaced with the
/// column type's fallback value and the error is logged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// The requested field does not exist in the record.
    #[error("Field '{field}' not found in record")]
    Missing { field: String },

    /// A computed accessor rejected the record.
    #[error("Field '{field}' could not be read: {message}")]
    Invalid { field: String, message: String },

    /// The value cannot be coerced to the column's declared type.
    #[error("Field '{field}' type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },
}

impl FieldError {
    /// Creates a new missing field error.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::Missing {
            field: field.into(),
        }
    }

    /// Creates a new accessor failure.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a new type mismatch error.
    pub fn type_mismatch(
        field: impl Into<String>,
        expected: &'static str,
        actual: &'static str,
    ) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected,
            actual,
        }
    }
}
