//! Tabular data engine for grid widgets
//!
//! A synchronous pipeline that filters, sorts, groups, aggregates and
//! paginates an in-memory row snapshot, plus selection tracking and
//! virtual-scroll windowing over the same row ids. Rendering is left to the
//! caller.

pub mod boundary;
pub mod error;
pub mod filter;
pub mod group;
pub mod model;
pub mod page;
pub mod selection;
pub mod sort;
pub mod store;
pub mod viewport;

mod config;
mod grid;
mod row_state;
mod view;

pub use config::GridConfig;
pub use error::Error;
pub use error::Result;
pub use grid::*;
pub use row_state::RowStateMap;
pub use row_state::RowUiState;
pub use view::DerivedView;
pub use view::recompute;
