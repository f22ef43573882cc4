//! The flat tab collection the group engine indexes
//!
//! [`TabModel`] is the narrow interface the engine consumes. Positions follow
//! insertion-slot semantics: moving a tab to `slot` inserts it before the tab
//! currently at `slot`, so valid slots are `0..=count`.

use serde::{Deserialize, Serialize};

use super::types::{Partition, TabId, TabMove};
use crate::error::{TabGroupError, TabGroupResult};

/// Flat, ordered collection of tabs of a single partition.
///
/// The group engine reads positions and root ids through this trait and
/// rewrites root ids when tabs are merged into or split out of groups.
pub trait TabModel {
    /// Partition whose tabs this model holds.
    fn partition(&self) -> Partition;

    /// Number of tabs in the model.
    fn count(&self) -> usize;

    /// Tab at a flat position.
    fn tab_at(&self, index: usize) -> Option<TabId>;

    /// Flat position of a tab.
    fn index_of(&self, tab: TabId) -> Option<usize>;

    /// Moves a tab so that it is inserted before the tab at `slot`.
    ///
    /// `slot` is clamped to `0..=count`. Returns `None` when the tab is
    /// unknown or the move would not change the order.
    fn move_tab(&mut self, tab: TabId, slot: usize) -> Option<TabMove>;

    /// Whether the initial population (session restore) has finished.
    fn is_restored(&self) -> bool;

    /// Flat position of the selected tab.
    fn selected_index(&self) -> Option<usize>;

    /// Root id currently stored on a tab.
    fn root_id(&self, tab: TabId) -> Option<TabId>;

    /// Stores a new root id on a tab. Returns false for unknown tabs.
    fn set_root_id(&mut self, tab: TabId, root: TabId) -> bool;

    /// Tab that opened this tab, if any.
    fn parent_id(&self, tab: TabId) -> Option<TabId>;

    /// Partition a tab belongs to.
    fn partition_of(&self, tab: TabId) -> Option<Partition>;

    /// Returns true if the model holds the tab.
    fn contains(&self, tab: TabId) -> bool {
        self.index_of(tab).is_some()
    }

    /// All tabs in flat order.
    fn tab_ids(&self) -> Vec<TabId> {
        (0..self.count()).filter_map(|i| self.tab_at(i)).collect()
    }
}

/// Tab entry stored by [`VecTabModel`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabRecord {
    /// Immutable identity
    pub id: TabId,
    /// Group identity marker
    pub root_id: TabId,
    /// Tab that opened this one
    pub parent_id: Option<TabId>,
    /// Partition the tab lives in
    pub partition: Partition,
}

impl TabRecord {
    /// Creates an ungrouped tab in the normal partition.
    #[must_use]
    pub const fn new(id: TabId) -> Self {
        Self {
            id,
            root_id: id,
            parent_id: None,
            partition: Partition::Normal,
        }
    }

    /// Sets the parent tab.
    #[must_use]
    pub const fn with_parent(mut self, parent: TabId) -> Self {
        self.parent_id = Some(parent);
        self
    }

    /// Sets the root id (restored group membership).
    #[must_use]
    pub const fn with_root(mut self, root: TabId) -> Self {
        self.root_id = root;
        self
    }

    /// Sets the partition.
    #[must_use]
    pub const fn with_partition(mut self, partition: Partition) -> Self {
        self.partition = partition;
        self
    }
}

/// In-memory [`TabModel`] backed by a `Vec`.
///
/// Selection follows the selected tab across moves. A model starts
/// unrestored; call [`VecTabModel::mark_restored`] once the initial
/// population is complete.
#[derive(Debug, Clone, Default)]
pub struct VecTabModel {
    partition: Partition,
    tabs: Vec<TabRecord>,
    selected: Option<TabId>,
    restored: bool,
}

impl VecTabModel {
    /// Creates an empty, unrestored model.
    #[must_use]
    pub fn new(partition: Partition) -> Self {
        Self {
            partition,
            tabs: Vec::new(),
            selected: None,
            restored: false,
        }
    }

    /// Creates a restored model holding the given ungrouped tabs, in order.
    #[must_use]
    pub fn restored_with(partition: Partition, ids: &[u32]) -> Self {
        let tabs = ids
            .iter()
            .map(|&raw| TabRecord::new(TabId(raw)).with_partition(partition))
            .collect();
        Self {
            partition,
            tabs,
            selected: None,
            restored: true,
        }
    }

    /// Marks the initial population as finished.
    pub fn mark_restored(&mut self) {
        self.restored = true;
    }

    /// Inserts a tab at a flat position.
    ///
    /// # Errors
    ///
    /// - `InvalidIndex` if `index` is past the end of the list
    /// - `CrossPartitionOperation` if the tab belongs to another partition
    /// - `InconsistentState` if a tab with the same id already exists
    pub fn insert_tab(&mut self, index: usize, record: TabRecord) -> TabGroupResult<usize> {
        if index > self.tabs.len() {
            return Err(TabGroupError::InvalidIndex {
                index,
                count: self.tabs.len(),
            });
        }
        if record.partition != self.partition {
            return Err(TabGroupError::CrossPartitionOperation {
                tab: record.id,
                expected: self.partition,
                actual: record.partition,
            });
        }
        if self.contains(record.id) {
            return Err(TabGroupError::InconsistentState(format!(
                "{} is already in the model",
                record.id
            )));
        }
        self.tabs.insert(index, record);
        Ok(index)
    }

    /// Appends a tab to the end of the list.
    ///
    /// # Errors
    ///
    /// Same as [`VecTabModel::insert_tab`].
    pub fn append_tab(&mut self, record: TabRecord) -> TabGroupResult<usize> {
        self.insert_tab(self.tabs.len(), record)
    }

    /// Removes a tab and returns its record.
    ///
    /// If the removed tab was selected, the tab that takes its position (or
    /// the new last tab) becomes selected.
    ///
    /// # Errors
    ///
    /// Returns `TabNotFound` if the tab is not in the model.
    pub fn remove_tab(&mut self, tab: TabId) -> TabGroupResult<TabRecord> {
        let index = self.index_of(tab).ok_or(TabGroupError::TabNotFound(tab))?;
        let record = self.tabs.remove(index);
        if self.selected == Some(tab) {
            let next = index.min(self.tabs.len().saturating_sub(1));
            self.selected = self.tabs.get(next).map(|r| r.id);
        }
        Ok(record)
    }

    /// Selects a tab.
    ///
    /// # Errors
    ///
    /// Returns `TabNotFound` if the tab is not in the model.
    pub fn select(&mut self, tab: TabId) -> TabGroupResult<usize> {
        let index = self.index_of(tab).ok_or(TabGroupError::TabNotFound(tab))?;
        self.selected = Some(tab);
        Ok(index)
    }

    /// Currently selected tab.
    #[must_use]
    pub const fn selected(&self) -> Option<TabId> {
        self.selected
    }

    /// Record of a tab.
    #[must_use]
    pub fn record(&self, tab: TabId) -> Option<&TabRecord> {
        self.tabs.iter().find(|r| r.id == tab)
    }

    /// All records in flat order.
    #[must_use]
    pub fn records(&self) -> &[TabRecord] {
        &self.tabs
    }
}

impl TabModel for VecTabModel {
    fn partition(&self) -> Partition {
        self.partition
    }

    fn count(&self) -> usize {
        self.tabs.len()
    }

    fn tab_at(&self, index: usize) -> Option<TabId> {
        self.tabs.get(index).map(|r| r.id)
    }

    fn index_of(&self, tab: TabId) -> Option<usize> {
        self.tabs.iter().position(|r| r.id == tab)
    }

    fn move_tab(&mut self, tab: TabId, slot: usize) -> Option<TabMove> {
        let slot = slot.min(self.tabs.len());
        let old_index = self.index_of(tab)?;
        if old_index == slot || old_index + 1 == slot {
            return None;
        }
        let record = self.tabs.remove(old_index);
        let new_index = if old_index < slot { slot - 1 } else { slot };
        self.tabs.insert(new_index, record);
        Some(TabMove {
            tab,
            old_index,
            new_index,
        })
    }

    fn is_restored(&self) -> bool {
        self.restored
    }

    fn selected_index(&self) -> Option<usize> {
        self.selected.and_then(|tab| self.index_of(tab))
    }

    fn root_id(&self, tab: TabId) -> Option<TabId> {
        self.record(tab).map(|r| r.root_id)
    }

    fn set_root_id(&mut self, tab: TabId, root: TabId) -> bool {
        match self.tabs.iter_mut().find(|r| r.id == tab) {
            Some(record) => {
                record.root_id = root;
                true
            }
            None => false,
        }
    }

    fn parent_id(&self, tab: TabId) -> Option<TabId> {
        self.record(tab).and_then(|r| r.parent_id)
    }

    fn partition_of(&self, tab: TabId) -> Option<Partition> {
        self.record(tab).map(|r| r.partition)
    }
}
