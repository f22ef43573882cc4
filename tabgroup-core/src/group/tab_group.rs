//! A single tab group record

use crate::model::{GroupId, TabId};

/// Members of one tab group and the tab shown when the group is collapsed.
///
/// Member order reflects proximity to the front of the flat list and is used
/// to pick the next representative when the current one leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabGroup {
    id: GroupId,
    members: Vec<TabId>,
    representative: Option<TabId>,
}

impl TabGroup {
    /// Creates an empty group. Groups are only kept while non-empty.
    #[must_use]
    pub const fn new(id: GroupId) -> Self {
        Self {
            id,
            members: Vec::new(),
            representative: None,
        }
    }

    /// Group identifier (shared root id).
    #[must_use]
    pub const fn id(&self) -> GroupId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: GroupId) {
        self.id = id;
    }

    /// Adds a member at the end. The first member becomes the representative.
    pub fn add(&mut self, tab: TabId) {
        if !self.members.contains(&tab) {
            self.members.push(tab);
        }
        if self.representative.is_none() {
            self.representative = Some(tab);
        }
    }

    /// Removes a member, moving the representative to a neighbour if needed.
    ///
    /// Returns false if the tab was not a member.
    pub fn remove(&mut self, tab: TabId) -> bool {
        let Some(position) = self.members.iter().position(|&m| m == tab) else {
            return false;
        };
        if self.representative == Some(tab) {
            self.representative = self.neighbour_of(tab);
        }
        self.members.remove(position);
        true
    }

    /// Member next to `tab` in member order: the previous member, or the next
    /// one when `tab` is first. `None` for single-member groups.
    #[must_use]
    pub fn neighbour_of(&self, tab: TabId) -> Option<TabId> {
        if self.members.len() < 2 {
            return None;
        }
        let position = self.members.iter().position(|&m| m == tab)?;
        if position == 0 {
            self.members.get(1).copied()
        } else {
            self.members.get(position - 1).copied()
        }
    }

    /// Moves a member to the end of the member order.
    pub fn move_to_end(&mut self, tab: TabId) {
        if let Some(position) = self.members.iter().position(|&m| m == tab) {
            let tab = self.members.remove(position);
            self.members.push(tab);
        }
    }

    /// Returns true if the tab is a member.
    #[must_use]
    pub fn contains(&self, tab: TabId) -> bool {
        self.members.contains(&tab)
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if the group has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns true if the group has more than one member.
    #[must_use]
    pub fn is_real(&self) -> bool {
        self.members.len() > 1
    }

    /// Members in member order.
    #[must_use]
    pub fn members(&self) -> &[TabId] {
        &self.members
    }

    /// First member in member order.
    #[must_use]
    pub fn first(&self) -> Option<TabId> {
        self.members.first().copied()
    }

    /// Last member in member order.
    #[must_use]
    pub fn last(&self) -> Option<TabId> {
        self.members.last().copied()
    }

    /// Tab shown when the group is collapsed.
    #[must_use]
    pub const fn representative(&self) -> Option<TabId> {
        self.representative
    }

    /// Makes a member the representative. Returns false for non-members.
    pub fn set_representative(&mut self, tab: TabId) -> bool {
        if self.contains(tab) {
            self.representative = Some(tab);
            true
        } else {
            false
        }
    }
}
