//! Row selection state.
//!
//! Selection is tracked by [`RowId`] so it stays stable across re-filtering,
//! re-sorting and snapshot replacement. The tri-state "select all" flag is
//! always derived relative to a reference set, normally the currently
//! filtered row ids.

use std::collections::HashSet;

use serde::Deserialize;
use serde::Serialize;

use crate::model::Record;
use crate::model::RowId;
use crate::store::RowStore;

/// Selection mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Selection changes are ignored.
    None,
    /// At most one row is selected.
    Single,
    /// Any number of rows, with range selection.
    #[default]
    Multiple,
}

/// State of a "select all" checkbox relative to a reference set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TriState {
    None,
    Partial,
    All,
}

/// Ids added to and removed from the selection by one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionChange {
    pub added: Vec<RowId>,
    pub removed: Vec<RowId>,
}

impl SelectionChange {
    fn new(mut added: Vec<RowId>, mut removed: Vec<RowId>) -> Self {
        added.sort();
        removed.sort();
        Self { added, removed }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Selected ids plus the tri-state for the current filtered rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionSummary {
    /// Selected ids, sorted.
    pub selected_ids: Vec<RowId>,
    pub tri_state: TriState,
}

/// ID-based selection state.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    mode: SelectionMode,
    selected: HashSet<RowId>,
    /// Anchor for range selection (Shift+click starting point)
    anchor: Option<RowId>,
}

impl Selection {
    /// Create an empty multi-row selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty selection with the given mode.
    pub fn with_mode(mode: SelectionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Get all selected IDs (sorted for deterministic ordering).
    pub fn selected(&self) -> Vec<RowId> {
        let mut ids: Vec<_> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Get the anchor ID for range selection.
    pub fn anchor(&self) -> Option<&RowId> {
        self.anchor.as_ref()
    }

    /// Clear all selection.
    pub fn clear(&mut self) -> SelectionChange {
        let removed: Vec<_> = self.selected.drain().collect();
        self.anchor = None;
        SelectionChange::new(Vec::new(), removed)
    }

    /// Flip membership of a row (Ctrl+click behavior).
    ///
    /// In single mode selecting a row deselects the previous one.
    pub fn toggle(&mut self, id: &RowId) -> SelectionChange {
        match self.mode {
            SelectionMode::None => SelectionChange::default(),
            _ if self.selected.remove(id) => {
                self.anchor = Some(id.clone());
                SelectionChange::new(Vec::new(), vec![id.clone()])
            }
            SelectionMode::Single => self.select(id),
            SelectionMode::Multiple => {
                self.selected.insert(id.clone());
                self.anchor = Some(id.clone());
                SelectionChange::new(vec![id.clone()], Vec::new())
            }
        }
    }

    /// Select exactly one row.
    pub fn select(&mut self, id: &RowId) -> SelectionChange {
        if self.mode == SelectionMode::None {
            return SelectionChange::default();
        }
        let removed: Vec<_> = self.selected.iter().filter(|&i| i != id).cloned().collect();
        let added = if self.selected.contains(id) {
            Vec::new()
        } else {
            vec![id.clone()]
        };
        self.selected.clear();
        self.selected.insert(id.clone());
        self.anchor = Some(id.clone());
        SelectionChange::new(added, removed)
    }

    /// Range select from the anchor to `target` (Shift+click behavior).
    ///
    /// `ordered` is the list of ids in display order. With `extend` false,
    /// ids outside the range are deselected. A target missing from `ordered`
    /// changes nothing. Falls back to selecting just the target when the
    /// anchor is not in `ordered`, or in single mode.
    pub fn range_select(&mut self, target: &RowId, ordered: &[RowId], extend: bool) -> SelectionChange {
        let Some(target_pos) = ordered.iter().position(|id| id == target) else {
            return SelectionChange::default();
        };
        if self.mode != SelectionMode::Multiple {
            return self.select(target);
        }
        let anchor = self.anchor.clone().unwrap_or_else(|| target.clone());
        let Some(anchor_pos) = ordered.iter().position(|id| *id == anchor) else {
            return self.select(target);
        };
        let (start, end) = (anchor_pos.min(target_pos), anchor_pos.max(target_pos));

        let range: HashSet<&RowId> = ordered[start..=end].iter().collect();
        let mut removed = Vec::new();
        if !extend {
            removed = self
                .selected
                .iter()
                .filter(|id| !range.contains(id))
                .cloned()
                .collect();
            for id in &removed {
                self.selected.remove(id);
            }
        }
        let mut added = Vec::new();
        for id in range {
            if self.selected.insert(id.clone()) {
                added.push(id.clone());
            }
        }
        // Anchor stays put so repeated Shift+clicks pivot around it
        self.anchor = Some(anchor);
        SelectionChange::new(added, removed)
    }

    /// Set the selection to exactly `all`.
    pub fn select_all(&mut self, all: &[RowId]) -> SelectionChange {
        if self.mode != SelectionMode::Multiple {
            return SelectionChange::default();
        }
        let wanted: HashSet<&RowId> = all.iter().collect();
        let removed: Vec<_> = self
            .selected
            .iter()
            .filter(|id| !wanted.contains(id))
            .cloned()
            .collect();
        let added: Vec<_> = wanted
            .into_iter()
            .filter(|id| !self.selected.contains(*id))
            .cloned()
            .collect();
        self.selected = all.iter().cloned().collect();
        SelectionChange::new(added, removed)
    }

    /// Tri-state relative to `reference`.
    ///
    /// An empty reference set is always [`TriState::None`].
    pub fn tri_state(&self, reference: &[RowId]) -> TriState {
        let unique: HashSet<&RowId> = reference.iter().collect();
        let hits = unique.iter().filter(|id| self.selected.contains(**id)).count();
        if hits == 0 {
            TriState::None
        } else if hits == unique.len() {
            TriState::All
        } else {
            TriState::Partial
        }
    }

    /// Summary for a reference set.
    pub fn summary(&self, reference: &[RowId]) -> SelectionSummary {
        SelectionSummary {
            selected_ids: self.selected(),
            tri_state: self.tri_state(reference),
        }
    }

    /// Drop ids that are not in `store`. Returns the dropped ids.
    pub fn prune(&mut self, store: &RowStore) -> Vec<RowId> {
        let mut removed: Vec<RowId> = self
            .selected
            .iter()
            .filter(|id| !store.contains(id.as_str()))
            .cloned()
            .collect();
        for id in &removed {
            self.selected.remove(id);
        }
        if self
            .anchor
            .as_ref()
            .is_some_and(|a| !store.contains(a.as_str()))
        {
            self.anchor = None;
        }
        removed.sort();
        removed
    }

    /// Selected records resolved against `store`, in snapshot order.
    pub fn selected_rows<'a>(&self, store: &'a RowStore) -> Vec<&'a Record> {
        store
            .rows()
            .iter()
            .filter(|r| self.selected.contains(r.id()))
            .collect()
    }
}
