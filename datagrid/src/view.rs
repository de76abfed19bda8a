//! The derived view and the single recomputation entry point.

use log::debug;
use serde::Serialize;

use crate::error::Result;
use crate::filter::FilterSpec;
use crate::filter::filter_rows;
use crate::group::CollapseState;
use crate::group::GridItem;
use crate::group::Group;
use crate::group::GroupSpec;
use crate::group::flatten;
use crate::group::group_rows;
use crate::model::RowId;
use crate::page::Page;
use crate::page::PageRequest;
use crate::page::paginate;
use crate::selection::Selection;
use crate::selection::SelectionSummary;
use crate::sort::SortSpec;
use crate::sort::sort_rows;
use crate::store::RowStore;
use crate::viewport::ViewportState;
use crate::viewport::ViewportWindow;

/// Everything a renderer needs for one snapshot and one set of specs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedView {
    /// Snapshot version the view was computed from.
    pub version: u64,
    /// Filtered ids in snapshot order. Reference set for "select all".
    pub filtered: Vec<RowId>,
    /// Filtered ids in sorted order.
    pub sorted: Vec<RowId>,
    /// Empty when not grouped.
    pub groups: Vec<Group>,
    /// Header and row items, or plain rows when not grouped.
    pub sequence: Vec<GridItem>,
    pub page: Page<GridItem>,
    pub selection: SelectionSummary,
}

impl DerivedView {
    pub fn filtered_count(&self) -> usize {
        self.filtered.len()
    }

    pub fn sorted_row_ids(&self) -> &[RowId] {
        &self.sorted
    }

    pub fn grouped_sequence(&self) -> &[GridItem] {
        &self.sequence
    }

    pub fn is_grouped(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Row ids on the current page, skipping group headers.
    pub fn current_page_rows(&self) -> Vec<&RowId> {
        self.page.items().iter().filter_map(GridItem::row_id).collect()
    }

    pub fn selection_summary(&self) -> &SelectionSummary {
        &self.selection
    }

    /// Rendered window over the items of the current page.
    pub fn viewport_window(&self, viewport: &ViewportState) -> ViewportWindow {
        viewport.window(self.page.len())
    }
}

/// Runs filter, sort, group and paginate over `store` as one transaction.
///
/// Every spec is validated before any work is done, so a configuration
/// error never yields a partial view. Selection is read, not modified: its
/// summary is taken relative to the filtered rows.
pub fn recompute(
    store: &RowStore,
    filter: &FilterSpec,
    sort: &SortSpec,
    group: &GroupSpec,
    page: &PageRequest,
    selection: &Selection,
    collapse: &CollapseState,
) -> Result<DerivedView> {
    filter.validate(store)?;
    sort.validate(store)?;
    group.validate(store)?;
    page.validate()?;

    let filtered = filter_rows(store, filter)?;
    let sorted = sort_rows(store, &filtered, sort)?;
    let groups = group_rows(store, &sorted, group, collapse)?;

    let sorted_ids = store.ids(&sorted);
    let sequence = if group.is_empty() {
        sorted_ids
            .iter()
            .map(|id| GridItem::Row { id: id.clone() })
            .collect()
    } else {
        flatten(&groups)
    };
    let page = paginate(&sequence, *page)?;

    let filtered_ids = store.ids(&filtered);
    let selection = selection.summary(&filtered_ids);

    debug!(
        "Recomputed v{}: {} of {} rows, {} groups, page {}/{}",
        store.version(),
        filtered_ids.len(),
        store.len(),
        groups.len(),
        page.page(),
        page.total_pages()
    );

    Ok(DerivedView {
        version: store.version(),
        filtered: filtered_ids,
        sorted: sorted_ids,
        groups,
        sequence,
        page,
        selection,
    })
}
