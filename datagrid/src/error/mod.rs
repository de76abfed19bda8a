//! Error types

mod config;
mod field;

pub use config::*;
pub use field::*;

/// Any error the engine can hand back to a caller.
///
/// Only configuration errors ever escape the pipeline; field errors are
/// caught per cell and substituted. The variant is still part of the public
/// type so boundary code can surface accessor failures it runs itself.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A spec or snapshot is inconsistent with the column configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A cell could not be read or coerced.
    #[error(transparent)]
    Field(#[from] FieldError),
}

impl Error {
    /// Returns the configuration error, if this is one.
    pub fn as_config(&self) -> Option<&ConfigError> {
        match self {
            Self::Config(err) => Some(err),
            Self::Field(_) => None,
        }
    }
}

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
