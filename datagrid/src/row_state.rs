//! Transient per-row UI state kept next to, not inside, the records.

use std::collections::HashMap;

use crate::model::RowId;
use crate::model::Value;
use crate::store::RowStore;

/// Expanded detail row and in-progress edits of one row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowUiState {
    pub expanded: bool,
    /// Uncommitted field edits.
    pub draft: HashMap<String, Value>,
}

impl RowUiState {
    pub fn is_editing(&self) -> bool {
        !self.draft.is_empty()
    }
}

/// Side map of per-row state keyed by row id.
///
/// Entries for rows missing from a new snapshot are dropped by
/// [`RowStateMap::prune`].
#[derive(Debug, Clone)]
pub struct RowStateMap<S = RowUiState> {
    entries: HashMap<RowId, S>,
}

impl<S> Default for RowStateMap<S> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<S> RowStateMap<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&S> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut S> {
        self.entries.get_mut(id)
    }

    pub fn insert(&mut self, id: RowId, state: S) -> Option<S> {
        self.entries.insert(id, state)
    }

    pub fn remove(&mut self, id: &str) -> Option<S> {
        self.entries.remove(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RowId, &S)> {
        self.entries.iter()
    }

    /// Drop entries whose row is not in `store`. Returns how many were dropped.
    pub fn prune(&mut self, store: &RowStore) -> usize {
        let before = self.entries.len();
        self.entries.retain(|id, _| store.contains(id.as_str()));
        before - self.entries.len()
    }
}

impl<S: Default> RowStateMap<S> {
    /// State for `id`, created with its default if absent.
    pub fn entry(&mut self, id: &RowId) -> &mut S {
        self.entries.entry(id.clone()).or_default()
    }
}

impl RowStateMap<RowUiState> {
    /// Flip the detail row of `id`. Returns the new expanded flag.
    pub fn toggle_expanded(&mut self, id: &RowId) -> bool {
        let state = self.entry(id);
        state.expanded = !state.expanded;
        state.expanded
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.get(id).is_some_and(|s| s.expanded)
    }
}
