//! Data model: values, records and column descriptors.

mod column;
mod record;
mod value;

pub use column::Accessor;
pub use column::Column;
pub use column::ColumnType;
pub use column::ComputedFn;
pub use record::Record;
pub use record::RowId;
pub use value::Value;
