//! Grid controller: owns the snapshot and all view state, applies
//! interactions and notifies listeners.

use std::fmt;

use log::debug;
use log::trace;
use log::warn;
use serde::Deserialize;
use serde::Serialize;

use crate::config::GridConfig;
use crate::error::Capability;
use crate::error::Result;
use crate::filter::FilterSpec;
use crate::group::CollapseState;
use crate::group::GroupKey;
use crate::group::GroupSpec;
use crate::model::Record;
use crate::model::RowId;
use crate::page::PageRequest;
use crate::row_state::RowStateMap;
use crate::selection::Selection;
use crate::selection::SelectionChange;
use crate::selection::SelectionSummary;
use crate::selection::TriState;
use crate::sort::Direction;
use crate::sort::SortSpec;
use crate::store::RowStore;
use crate::store::Snapshot;
use crate::view::DerivedView;
use crate::view::recompute;
use crate::viewport::ViewportState;
use crate::viewport::ViewportWindow;

/// User interaction fed into [`DataGrid::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Interaction {
    /// Header click on a column.
    SortClick { column: String },
    /// New global filter text (already debounced).
    FilterTextChange { query: String },
    PageChange { page: usize },
    RowSelectToggle { id: RowId },
    /// Shift+click. `extend` keeps rows outside the range selected.
    RowRangeSelect { id: RowId, extend: bool },
    /// The "select all" checkbox.
    SelectAllToggle,
    Scroll { scroll_top: u32 },
    GroupCollapseToggle { key: GroupKey },
}

/// Change notification carrying the concrete new value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GridEvent {
    /// Sort state after a header click. `direction` is `None` when the column
    /// dropped out of the sort.
    Sorted {
        column: String,
        direction: Option<Direction>,
        sort: SortSpec,
    },
    SelectionChanged {
        change: SelectionChange,
        summary: SelectionSummary,
    },
    /// Current page after a change or after clamping.
    PageChanged { page: usize, total_pages: usize },
    GroupToggled { key: GroupKey, collapsed: bool },
}

type Listener = Box<dyn FnMut(&GridEvent) + Send>;

/// Stateful grid over one dataset.
///
/// Holds the current [`RowStore`] and every piece of view state. Any change
/// to an input of the pipeline recomputes the [`DerivedView`] synchronously.
/// Spec changes are validated before they are applied, so a rejected change
/// leaves the grid untouched.
///
/// # Example
///
/// ```
/// use datagrid::{DataGrid, GridConfig, Interaction};
/// use datagrid::model::{Column, ColumnType, Record};
/// use datagrid::store::RowStore;
///
/// let store = RowStore::new(
///     vec![Column::new("name", ColumnType::String).sortable()],
///     vec![Record::new("1").set("name", "Ada")],
/// ).unwrap();
/// let mut grid = DataGrid::new(store, GridConfig::default()).unwrap();
/// let events = grid
///     .dispatch(Interaction::SortClick { column: "name".into() })
///     .unwrap();
/// assert_eq!(events.len(), 1);
/// ```
pub struct DataGrid {
    config: GridConfig,
    store: RowStore,
    filter: FilterSpec,
    sort: SortSpec,
    group: GroupSpec,
    page: usize,
    selection: Selection,
    collapse: CollapseState,
    viewport: ViewportState,
    row_state: RowStateMap,
    view: DerivedView,
    listeners: Vec<Listener>,
}

impl fmt::Debug for DataGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataGrid")
            .field("version", &self.store.version())
            .field("rows", &self.store.len())
            .field("filter", &self.filter)
            .field("sort", &self.sort)
            .field("group", &self.group)
            .field("page", &self.page)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl DataGrid {
    /// Creates a grid with empty specs.
    pub fn new(store: RowStore, config: GridConfig) -> Result<Self> {
        config.validate()?;
        let filter = FilterSpec::new().with_mode(config.query_mode);
        let selection = Selection::with_mode(config.selection_mode);
        let viewport = ViewportState::new(config.row_height, config.viewport_height)
            .with_overscan(config.overscan);
        let collapse = CollapseState::new();
        let view = recompute(
            &store,
            &filter,
            &SortSpec::new(),
            &GroupSpec::new(),
            &PageRequest::first(config.page_size),
            &selection,
            &collapse,
        )?;
        Ok(Self {
            config,
            store,
            filter,
            sort: SortSpec::new(),
            group: GroupSpec::new(),
            page: 0,
            selection,
            collapse,
            viewport,
            row_state: RowStateMap::new(),
            view,
            listeners: Vec::new(),
        })
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn store(&self) -> &RowStore {
        &self.store
    }

    pub fn view(&self) -> &DerivedView {
        &self.view
    }

    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    pub fn group(&self) -> &GroupSpec {
        &self.group
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn collapse(&self) -> &CollapseState {
        &self.collapse
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    /// Window over the current page.
    pub fn viewport_window(&self) -> ViewportWindow {
        self.view.viewport_window(&self.viewport)
    }

    pub fn row_state(&self) -> &RowStateMap {
        &self.row_state
    }

    pub fn row_state_mut(&mut self) -> &mut RowStateMap {
        &mut self.row_state
    }

    /// Selected records resolved against the current snapshot.
    pub fn selected_rows(&self) -> Vec<&Record> {
        self.selection.selected_rows(&self.store)
    }

    /// Register a listener for every emitted event.
    pub fn on_event<F>(&mut self, listener: F)
    where
        F: FnMut(&GridEvent) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    // -------------------------------------------------------------------------
    // Spec changes
    // -------------------------------------------------------------------------

    /// Replace the filter. The page is clamped, not reset.
    pub fn set_filter(&mut self, filter: FilterSpec) -> Result<Vec<GridEvent>> {
        filter.validate(&self.store)?;
        self.filter = filter;
        self.refresh()
    }

    pub fn set_sort(&mut self, sort: SortSpec) -> Result<Vec<GridEvent>> {
        sort.validate(&self.store)?;
        self.sort = sort;
        self.refresh()
    }

    pub fn set_group(&mut self, group: GroupSpec) -> Result<Vec<GridEvent>> {
        group.validate(&self.store)?;
        self.group = group;
        self.collapse.prune(&self.store, &self.group);
        self.refresh()
    }

    /// Change the page size, keeping the first visible item on screen.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<Vec<GridEvent>> {
        PageRequest::first(page_size).validate()?;
        let first_item = self.page * self.config.page_size;
        self.config.page_size = page_size;
        self.page = first_item / page_size;
        self.refresh()
    }

    // -------------------------------------------------------------------------
    // Interactions
    // -------------------------------------------------------------------------

    /// Apply one interaction and return the events it produced.
    ///
    /// Listeners registered with [`on_event`](Self::on_event) see the same
    /// events before this returns.
    pub fn dispatch(&mut self, interaction: Interaction) -> Result<Vec<GridEvent>> {
        trace!("Dispatching {:?}", interaction);
        let events = match interaction {
            Interaction::SortClick { column } => {
                self.store.require_column(&column, Capability::Sort)?;
                let direction = self.sort.toggle(&column, self.config.sort_mode);
                let mut events = vec![GridEvent::Sorted {
                    column,
                    direction,
                    sort: self.sort.clone(),
                }];
                events.extend(self.refresh_quiet()?);
                events
            }
            Interaction::FilterTextChange { query } => {
                self.filter.query = query;
                self.refresh_quiet()?
            }
            Interaction::PageChange { page } => {
                self.page = page;
                self.refresh_quiet()?
            }
            Interaction::RowSelectToggle { id } | Interaction::RowRangeSelect { id, .. }
                if !self.store.contains(id.as_str()) =>
            {
                warn!("Ignoring selection of unknown row {}", id);
                Vec::new()
            }
            Interaction::RowSelectToggle { id } => {
                let change = self.selection.toggle(&id);
                self.selection_event(change).into_iter().collect()
            }
            Interaction::RowRangeSelect { id, extend } => {
                let change = self
                    .selection
                    .range_select(&id, &self.view.sorted, extend);
                self.selection_event(change).into_iter().collect()
            }
            Interaction::SelectAllToggle => {
                let change = if self.view.selection.tri_state == TriState::All {
                    self.selection.clear()
                } else {
                    self.selection.select_all(&self.view.filtered)
                };
                self.selection_event(change).into_iter().collect()
            }
            Interaction::Scroll { scroll_top } => {
                self.viewport.scroll_top = scroll_top;
                self.viewport.clamp(self.view.page.len());
                Vec::new()
            }
            Interaction::GroupCollapseToggle { key } => {
                let collapsed = self.collapse.toggle(&key);
                let mut events = vec![GridEvent::GroupToggled { key, collapsed }];
                events.extend(self.refresh_quiet()?);
                events
            }
        };
        self.emit(&events);
        Ok(events)
    }

    // -------------------------------------------------------------------------
    // Snapshots
    // -------------------------------------------------------------------------

    /// Replace the dataset with a newer snapshot.
    ///
    /// Snapshots whose version is not newer than the current one are ignored.
    /// A snapshot that fails to build (duplicate ids) leaves the grid on its
    /// current snapshot. Selection and per-row state for rows that vanished
    /// are pruned.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) -> Result<Vec<GridEvent>> {
        let current = self.store.version();
        if snapshot.version <= current {
            warn!(
                "Ignoring stale snapshot v{} (current v{})",
                snapshot.version, current
            );
            return Ok(Vec::new());
        }
        let store = self.store.replace(snapshot.version, snapshot.rows)?;

        let removed = self.selection.prune(&store);
        let dropped = self.row_state.prune(&store);
        let expanded = self.collapse.prune(&store, &self.group);
        self.store = store;
        debug!(
            "Applied snapshot v{} ({} rows, {} deselected, {} row states dropped, {} collapsed groups gone)",
            self.store.version(),
            self.store.len(),
            removed.len(),
            dropped,
            expanded
        );

        let mut events = self.refresh_quiet()?;
        self.viewport.clamp(self.view.page.len());
        if !removed.is_empty() {
            events.push(GridEvent::SelectionChanged {
                change: SelectionChange {
                    added: Vec::new(),
                    removed,
                },
                summary: self.view.selection.clone(),
            });
        }
        self.emit(&events);
        Ok(events)
    }

    /// Shorthand for [`apply_snapshot`](Self::apply_snapshot).
    pub fn apply_rows(&mut self, version: u64, rows: Vec<Record>) -> Result<Vec<GridEvent>> {
        self.apply_snapshot(Snapshot::new(version, rows))
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    /// Recompute and notify listeners.
    fn refresh(&mut self) -> Result<Vec<GridEvent>> {
        let events = self.refresh_quiet()?;
        self.emit(&events);
        Ok(events)
    }

    /// Recompute the view. Emits nothing but returns a page event when the
    /// page had to be clamped or was changed by the caller.
    fn refresh_quiet(&mut self) -> Result<Vec<GridEvent>> {
        let requested = self.page;
        let previous = self.view.page.page();
        self.view = recompute(
            &self.store,
            &self.filter,
            &self.sort,
            &self.group,
            &PageRequest::new(self.page, self.config.page_size),
            &self.selection,
            &self.collapse,
        )?;
        self.page = self.view.page.page();

        let mut events = Vec::new();
        if self.page != previous || self.page != requested {
            events.push(GridEvent::PageChanged {
                page: self.page,
                total_pages: self.view.page.total_pages(),
            });
        }
        Ok(events)
    }

    fn selection_event(&mut self, change: SelectionChange) -> Option<GridEvent> {
        if change.is_empty() {
            return None;
        }
        self.view.selection = self.selection.summary(&self.view.filtered);
        Some(GridEvent::SelectionChanged {
            change,
            summary: self.view.selection.clone(),
        })
    }

    fn emit(&mut self, events: &[GridEvent]) {
        for event in events {
            for listener in &mut self.listeners {
                listener(event);
            }
        }
    }
}
