//! Grid configuration

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfigError;
use crate::filter::QueryMode;
use crate::selection::SelectionMode;
use crate::sort::SortMode;

/// Tunables of a [`DataGrid`](crate::DataGrid).
///
/// Every field has a default, so a partial JSON object deserializes.
///
/// # Example
///
/// ```
/// use datagrid::GridConfig;
/// use datagrid::sort::SortMode;
///
/// let config = GridConfig::default()
///     .with_page_size(50)
///     .with_sort_mode(SortMode::Multi);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Rows (or header+row items when grouped) per page.
    ///
    /// Default: 25
    pub page_size: usize,

    /// Fixed row height in pixels.
    ///
    /// Default: 32
    pub row_height: u32,

    /// Height of the scroll area in pixels.
    ///
    /// Default: 480
    pub viewport_height: u32,

    /// Rows rendered beyond each edge of the viewport.
    ///
    /// Default: 3
    pub overscan: usize,

    pub sort_mode: SortMode,
    pub selection_mode: SelectionMode,
    pub query_mode: QueryMode,

    /// Quiet period before filter text is applied, in milliseconds.
    ///
    /// Default: 300
    pub debounce_ms: u64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            page_size: 25,
            row_height: 32,
            viewport_height: 480,
            overscan: 3,
            sort_mode: SortMode::default(),
            selection_mode: SelectionMode::default(),
            query_mode: QueryMode::default(),
            debounce_ms: 300,
        }
    }
}

impl GridConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_row_height(mut self, row_height: u32) -> Self {
        self.row_height = row_height;
        self
    }

    pub fn with_viewport_height(mut self, viewport_height: u32) -> Self {
        self.viewport_height = viewport_height;
        self
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_sort_mode(mut self, mode: SortMode) -> Self {
        self.sort_mode = mode;
        self
    }

    pub fn with_selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    pub fn with_query_mode(mut self, mode: QueryMode) -> Self {
        self.query_mode = mode;
        self
    }

    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.debounce_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Debounce window for filter text.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Rejects settings the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GridConfig =
            serde_json::from_str(r#"{"page_size": 10, "sort_mode": "multi"}"#).unwrap();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.sort_mode, SortMode::Multi);
        assert_eq!(config.debounce(), Duration::from_millis(300));
        assert_eq!(config.selection_mode, SelectionMode::Multiple);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        assert_eq!(
            GridConfig::default().with_page_size(0).validate(),
            Err(ConfigError::ZeroPageSize)
        );
    }
}
