//! JSON input document: columns, rows and the view to compute.

use datagrid::GridConfig;
use datagrid::filter::FilterSpec;
use datagrid::group::AggregateFn;
use datagrid::group::GroupKey;
use datagrid::group::GroupSpec;
use datagrid::model::Column;
use datagrid::model::ColumnType;
use datagrid::model::Record;
use datagrid::model::RowId;
use datagrid::sort::SortSpec;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub config: GridConfig,
    pub columns: Vec<ColumnDef>,
    #[serde(default)]
    pub rows: Vec<Record>,
    #[serde(default)]
    pub view: ViewDef,
}

/// Serializable column descriptor. Computed columns cannot be expressed in
/// JSON, so every column reads a field.
#[derive(Debug, Deserialize)]
pub struct ColumnDef {
    pub id: String,
    pub header: Option<String>,
    /// Field to read, defaults to the id.
    pub field: Option<String>,
    #[serde(rename = "type", default)]
    pub column_type: ColumnType,
    #[serde(default)]
    pub sortable: bool,
    #[serde(default)]
    pub filterable: bool,
    #[serde(default)]
    pub groupable: bool,
    pub aggregate: Option<AggregateFn>,
    pub width: Option<u16>,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub hidden: bool,
}

impl From<ColumnDef> for Column {
    fn from(def: ColumnDef) -> Self {
        let mut column = Column::new(def.id, def.column_type).order(def.order);
        if let Some(header) = def.header {
            column = column.header(header);
        }
        if let Some(field) = def.field {
            column = column.field(field);
        }
        if let Some(width) = def.width {
            column = column.width(width);
        }
        if let Some(function) = def.aggregate {
            column = column.aggregate(function);
        }
        column.sortable = def.sortable;
        column.filterable = def.filterable;
        column.groupable = def.groupable;
        column.visible = !def.hidden;
        column
    }
}

/// View state applied on top of the dataset.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ViewDef {
    pub filter: FilterSpec,
    pub sort: SortSpec,
    pub group: GroupSpec,
    pub page: usize,
    pub selected: Vec<RowId>,
    pub collapsed: Vec<GroupKey>,
}
