//! Configuration error types

use std::fmt;

/// A column capability that a spec can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Column may appear in a sort spec.
    Sort,
    /// Column may appear in a filter spec.
    Filter,
    /// Column may appear as a group-by key.
    Group,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Sort => "sortable",
            Capability::Filter => "filterable",
            Capability::Group => "groupable",
        };
        f.write_str(name)
    }
}

/// Errors caused by a spec or snapshot that does not fit the column setup.
///
/// These are caller bugs and are raised immediately instead of being
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The spec references a column id that does not exist.
    #[error("Unknown column '{column}'")]
    UnknownColumn { column: String },

    /// The column exists but lacks the capability the spec needs.
    #[error("Column '{column}' is not {capability}")]
    MissingCapability {
        column: String,
        capability: Capability,
    },

    /// Two column descriptors share the same id.
    #[error("Duplicate column id '{column}'")]
    DuplicateColumn { column: String },

    /// Two rows in one snapshot share the same id.
    #[error("Duplicate row id '{id}'")]
    DuplicateRowId { id: String },

    /// Pages must hold at least one item.
    #[error("Page size must be greater than zero")]
    ZeroPageSize,
}

impl ConfigError {
    /// Creates an unknown column error.
    pub fn unknown_column(column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            column: column.into(),
        }
    }

    /// Creates a missing capability error.
    pub fn missing_capability(column: impl Into<String>, capability: Capability) -> Self {
        Self::MissingCapability {
            column: column.into(),
            capability,
        }
    }

    /// Returns the column id this error is about, if any.
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::UnknownColumn { column }
            | Self::MissingCapability { column, .. }
            | Self::DuplicateColumn { column } => Some(column),
            Self::DuplicateRowId { .. } | Self::ZeroPageSize => None,
        }
    }
}
