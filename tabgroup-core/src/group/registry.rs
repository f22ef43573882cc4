//! Group registry and index projection
//!
//! The registry maps group ids to [`TabGroup`] records. The projection maps
//! group ids to their dense position in the grouped view, ordered by the first
//! appearance of any member in the flat list.

use std::collections::HashMap;

use super::tab_group::TabGroup;
use crate::error::{TabGroupError, TabGroupResult};
use crate::model::{GroupId, TabId, TabModel};

/// Outcome of adding a tab to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// The tab joined an existing group.
    Joined {
        /// The group went from one member to two.
        became_real: bool,
    },
    /// A new singleton group was created at the end of the projection.
    Created,
}

/// Outcome of removing a tab from the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The group still has members.
    Kept {
        /// The group went from two members to one.
        became_degenerate: bool,
    },
    /// The group became empty and was deleted.
    Deleted {
        /// Dense index the group occupied.
        index: usize,
    },
}

/// Group records plus their dense positions in the grouped view.
#[derive(Debug, Clone, Default)]
pub struct GroupRegistry {
    groups: HashMap<GroupId, TabGroup>,
    indices: HashMap<GroupId, usize>,
    real_group_count: usize,
}

impl GroupRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of groups, singletons included.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of groups with more than one member.
    #[must_use]
    pub const fn real_group_count(&self) -> usize {
        self.real_group_count
    }

    /// Group record by id.
    #[must_use]
    pub fn get(&self, group: GroupId) -> Option<&TabGroup> {
        self.groups.get(&group)
    }

    pub(crate) fn get_mut(&mut self, group: GroupId) -> Option<&mut TabGroup> {
        self.groups.get_mut(&group)
    }

    /// Returns true if the group exists.
    #[must_use]
    pub fn contains_group(&self, group: GroupId) -> bool {
        self.groups.contains_key(&group)
    }

    /// Dense index of a group in the grouped view.
    #[must_use]
    pub fn index_of(&self, group: GroupId) -> Option<usize> {
        self.indices.get(&group).copied()
    }

    /// Group at a dense index.
    #[must_use]
    pub fn group_at(&self, index: usize) -> Option<GroupId> {
        self.indices
            .iter()
            .find(|&(_, &i)| i == index)
            .map(|(&group, _)| group)
    }

    /// Group whose member set contains the tab, regardless of root ids.
    #[must_use]
    pub fn group_containing(&self, tab: TabId) -> Option<GroupId> {
        self.groups
            .values()
            .find(|g| g.contains(tab))
            .map(TabGroup::id)
    }

    /// Group ids ordered by dense index.
    #[must_use]
    pub fn ordered_group_ids(&self) -> Vec<GroupId> {
        let mut ordered: Vec<(usize, GroupId)> =
            self.indices.iter().map(|(&g, &i)| (i, g)).collect();
        ordered.sort_unstable();
        ordered.into_iter().map(|(_, g)| g).collect()
    }

    /// Representative of every group.
    #[must_use]
    pub fn representatives(&self) -> HashMap<GroupId, TabId> {
        self.groups
            .iter()
            .filter_map(|(&id, g)| g.representative().map(|rep| (id, rep)))
            .collect()
    }

    /// Adds a tab to the group `group`, creating a singleton if needed.
    pub fn insert_tab(&mut self, group: GroupId, tab: TabId) -> Insertion {
        if let Some(existing) = self.groups.get_mut(&group) {
            let became_real = existing.len() == 1 && !existing.contains(tab);
            existing.add(tab);
            if became_real {
                self.real_group_count += 1;
            }
            return Insertion::Joined { became_real };
        }

        let mut created = TabGroup::new(group);
        created.add(tab);
        self.groups.insert(group, created);
        self.indices.insert(group, self.indices.len());
        Insertion::Created
    }

    /// Removes a tab from its group, deleting the group when it empties.
    ///
    /// # Errors
    ///
    /// Returns `TabNotFound` if the group does not exist or does not contain
    /// the tab.
    pub fn remove_tab(&mut self, group: GroupId, tab: TabId) -> TabGroupResult<Removal> {
        let record = self
            .groups
            .get_mut(&group)
            .filter(|g| g.contains(tab))
            .ok_or(TabGroupError::TabNotFound(tab))?;

        record.remove(tab);
        match record.len() {
            0 => {
                let index = self.patch_after_close(group);
                self.groups.remove(&group);
                Ok(Removal::Deleted { index })
            }
            1 => {
                self.real_group_count = self.real_group_count.saturating_sub(1);
                Ok(Removal::Kept {
                    became_degenerate: true,
                })
            }
            _ => Ok(Removal::Kept {
                became_degenerate: false,
            }),
        }
    }

    /// Drops a group from the projection and shifts every later group down
    /// by one. Returns the index the group occupied.
    ///
    /// Linear in the number of groups.
    pub fn patch_after_close(&mut self, group: GroupId) -> usize {
        let Some(removed) = self.indices.remove(&group) else {
            return self.indices.len();
        };
        for index in self.indices.values_mut() {
            if *index > removed {
                *index -= 1;
            }
        }
        removed
    }

    /// Moves a group to a new id, keeping members, representative and index.
    ///
    /// # Errors
    ///
    /// Returns `InconsistentState` if `from` does not exist or `to` is taken.
    pub fn rekey(&mut self, from: GroupId, to: GroupId) -> TabGroupResult<()> {
        if from == to {
            return Ok(());
        }
        if self.groups.contains_key(&to) {
            return Err(TabGroupError::InconsistentState(format!(
                "cannot re-anchor {from}: group {to} already exists"
            )));
        }
        let mut group = self
            .groups
            .remove(&from)
            .ok_or_else(|| TabGroupError::InconsistentState(format!("no group {from}")))?;
        group.set_id(to);
        self.groups.insert(to, group);
        if let Some(index) = self.indices.remove(&from) {
            self.indices.insert(to, index);
        }
        Ok(())
    }

    /// Removes every group.
    pub fn clear(&mut self) {
        self.groups.clear();
        self.indices.clear();
        self.real_group_count = 0;
    }

    /// Rebuilds every group from the model in a single pass.
    ///
    /// Groups are indexed by first appearance, members are ordered by flat
    /// position, and each group's first tab becomes its representative.
    ///
    /// # Errors
    ///
    /// Returns `InconsistentState` if a tab in the model has no root id.
    pub fn rebuild<M: TabModel + ?Sized>(&mut self, model: &M) -> TabGroupResult<()> {
        self.clear();
        for index in 0..model.count() {
            let tab = tab_at(model, index)?;
            let root = root_of(model, tab)?;
            self.insert_tab(root, tab);
        }
        Ok(())
    }

    /// Re-derives dense indices and member order from the model without
    /// changing group membership.
    ///
    /// # Errors
    ///
    /// Returns `InconsistentState` if a tab's root is not a known group or a
    /// group has no member left in the model.
    pub fn reorder<M: TabModel + ?Sized>(&mut self, model: &M) -> TabGroupResult<()> {
        self.indices.clear();
        for index in 0..model.count() {
            let tab = tab_at(model, index)?;
            let root = root_of(model, tab)?;
            let group = self.groups.get_mut(&root).ok_or_else(|| {
                TabGroupError::InconsistentState(format!("{tab} points at unknown group {root}"))
            })?;
            group.move_to_end(tab);
            let next = self.indices.len();
            self.indices.entry(root).or_insert(next);
        }
        if self.indices.len() != self.groups.len() {
            return Err(TabGroupError::InconsistentState(format!(
                "{} groups but {} indexed after reorder",
                self.groups.len(),
                self.indices.len()
            )));
        }
        Ok(())
    }

    /// Re-derives the member order of a single group from flat order.
    pub fn reorder_group<M: TabModel + ?Sized>(&mut self, model: &M, group: GroupId) {
        let Some(record) = self.groups.get_mut(&group) else {
            return;
        };
        for tab in model.tab_ids() {
            record.move_to_end(tab);
        }
    }

    /// Re-derives dense indices from first appearance in the model.
    pub fn reindex<M: TabModel + ?Sized>(&mut self, model: &M) {
        self.indices.clear();
        for tab in model.tab_ids() {
            if let Some(group) = model.root_id(tab).filter(|r| self.groups.contains_key(r)) {
                let next = self.indices.len();
                self.indices.entry(group).or_insert(next);
            }
        }
    }

    /// Verifies the registry against the model.
    ///
    /// Checks that every tab resolves to a group containing it, that member
    /// counts add up to the model size, that the projection is a dense
    /// bijection, and that the real group counter matches.
    ///
    /// # Errors
    ///
    /// Returns `InconsistentState` describing the first violation found.
    pub fn check_consistency<M: TabModel + ?Sized>(&self, model: &M) -> TabGroupResult<()> {
        for tab in model.tab_ids() {
            let root = root_of(model, tab)?;
            if !self.groups.get(&root).is_some_and(|g| g.contains(tab)) {
                return Err(TabGroupError::InconsistentState(format!(
                    "{tab} is not a member of its group {root}"
                )));
            }
        }

        let members: usize = self.groups.values().map(TabGroup::len).sum();
        if members != model.count() {
            return Err(TabGroupError::InconsistentState(format!(
                "{members} group members for {} tabs",
                model.count()
            )));
        }

        if self.indices.len() != self.groups.len() {
            return Err(TabGroupError::InconsistentState(format!(
                "{} indexed groups for {} groups",
                self.indices.len(),
                self.groups.len()
            )));
        }
        let mut seen = vec![false; self.indices.len()];
        for &index in self.indices.values() {
            match seen.get_mut(index) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    return Err(TabGroupError::InconsistentState(format!(
                        "group index {index} is out of range or duplicated"
                    )));
                }
            }
        }

        let real = self.groups.values().filter(|g| g.is_real()).count();
        if real != self.real_group_count {
            return Err(TabGroupError::InconsistentState(format!(
                "real group counter is {} but {real} groups have several tabs",
                self.real_group_count
            )));
        }
        Ok(())
    }

    pub(crate) fn groups(&self) -> impl Iterator<Item = &TabGroup> {
        self.groups.values()
    }
}

fn tab_at<M: TabModel + ?Sized>(model: &M, index: usize) -> TabGroupResult<TabId> {
    model.tab_at(index).ok_or(TabGroupError::InvalidIndex {
        index,
        count: model.count(),
    })
}

fn root_of<M: TabModel + ?Sized>(model: &M, tab: TabId) -> TabGroupResult<TabId> {
    model
        .root_id(tab)
        .ok_or_else(|| TabGroupError::InconsistentState(format!("{tab} has no root id")))
}
