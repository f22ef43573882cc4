//! Event classification for raw flat-list moves
//!
//! Classification is a pure function of two [`GroupingSnapshot`]s (taken
//! before and after the registry is re-derived) and the raw [`TabMove`]
//! reported by the tab model. The filter decides how to re-derive the
//! registry from [`Transition::detect`] and asks [`classify`] which semantic
//! event, if any, the move amounts to.

use std::collections::HashMap;

use super::registry::GroupRegistry;
use crate::error::{TabGroupError, TabGroupResult};
use crate::model::{GroupId, TabId, TabModel, TabMove};
use crate::observer::TabGroupEvent;

/// Shape of one group inside a [`GroupingSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupShape {
    /// Members in member order
    pub members: Vec<TabId>,
    /// Tab shown when collapsed
    pub representative: Option<TabId>,
    /// Dense index in the grouped view
    pub index: Option<usize>,
}

/// Registry shape plus the `(tab, root id)` pair at every flat slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingSnapshot {
    slots: Vec<(TabId, TabId)>,
    groups: HashMap<GroupId, GroupShape>,
}

impl GroupingSnapshot {
    /// Captures the registry and the model's current root ids.
    ///
    /// Tabs without a root id are recorded as their own root.
    #[must_use]
    pub fn capture<M: TabModel + ?Sized>(registry: &GroupRegistry, model: &M) -> Self {
        let slots = model
            .tab_ids()
            .into_iter()
            .map(|tab| (tab, model.root_id(tab).unwrap_or(tab)))
            .collect();
        let groups = registry
            .groups()
            .map(|g| {
                (
                    g.id(),
                    GroupShape {
                        members: g.members().to_vec(),
                        representative: g.representative(),
                        index: registry.index_of(g.id()),
                    },
                )
            })
            .collect();
        Self { slots, groups }
    }

    /// Builds a snapshot from explicit parts.
    #[must_use]
    pub fn from_parts(slots: Vec<(TabId, TabId)>, groups: HashMap<GroupId, GroupShape>) -> Self {
        Self { slots, groups }
    }

    /// Root id stored on a tab.
    #[must_use]
    pub fn root_of(&self, tab: TabId) -> Option<TabId> {
        self.slots.iter().find(|(t, _)| *t == tab).map(|&(_, root)| root)
    }

    /// Root id at a flat slot.
    #[must_use]
    pub fn root_at(&self, index: usize) -> Option<TabId> {
        self.slots.get(index).map(|&(_, root)| root)
    }

    /// Shape of a group.
    #[must_use]
    pub fn group(&self, group: GroupId) -> Option<&GroupShape> {
        self.groups.get(&group)
    }

    /// Group whose members include the tab.
    #[must_use]
    pub fn group_containing(&self, tab: TabId) -> Option<GroupId> {
        self.groups
            .iter()
            .find(|(_, shape)| shape.members.contains(&tab))
            .map(|(&id, _)| id)
    }

    /// Returns true if every flat slot in `range` has the given root.
    fn slots_share_root(&self, start: usize, end: usize, root: TabId) -> bool {
        (start..=end).all(|i| self.root_at(i) == Some(root))
    }
}

/// What a raw move does to group membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The moved tab's root names no known group: it left its group.
    Split {
        /// Group the tab belonged to before the move
        former_group: GroupId,
    },
    /// The moved tab's root names a group that does not contain it yet.
    Merge {
        /// Group the tab belonged to before the move
        former_group: GroupId,
    },
    /// Membership is unchanged; only positions moved.
    Reorder {
        /// Group the tab belongs to
        group: GroupId,
    },
}

impl Transition {
    /// Detects the transition from the registry state before re-derivation.
    ///
    /// # Errors
    ///
    /// Returns `TabNotFound` if the tab is not in the snapshot and
    /// `InconsistentState` if no group contains it.
    pub fn detect(before: &GroupingSnapshot, mv: &TabMove) -> TabGroupResult<Self> {
        let root = before
            .root_of(mv.tab)
            .ok_or(TabGroupError::TabNotFound(mv.tab))?;
        let former = || {
            before.group_containing(mv.tab).ok_or_else(|| {
                TabGroupError::InconsistentState(format!("{} is in no group", mv.tab))
            })
        };
        match before.group(root) {
            None => Ok(Self::Split {
                former_group: former()?,
            }),
            Some(shape) if !shape.members.contains(&mv.tab) => Ok(Self::Merge {
                former_group: former()?,
            }),
            Some(_) => Ok(Self::Reorder { group: root }),
        }
    }

    /// Returns true if re-deriving needs a full rebuild rather than a reorder.
    #[must_use]
    pub const fn changes_membership(self) -> bool {
        matches!(self, Self::Split { .. } | Self::Merge { .. })
    }
}

/// Classifies a raw move into the semantic event it amounts to.
///
/// `before` is taken before the registry is re-derived and `after` once it
/// has been. Ambiguous moves yield `None`.
#[must_use]
pub fn classify(
    before: &GroupingSnapshot,
    after: &GroupingSnapshot,
    mv: &TabMove,
) -> Option<TabGroupEvent> {
    let transition = Transition::detect(before, mv).ok()?;
    match transition {
        Transition::Split { former_group } => {
            let prev_filter_index = after
                .group(former_group)
                .and_then(|g| g.index)
                .or_else(|| before.group(former_group).and_then(|g| g.index))?;
            Some(TabGroupEvent::DidMoveTabOutOfGroup {
                moved_tab: mv.tab,
                prev_filter_index,
            })
        }
        Transition::Merge { former_group } => {
            let former_size = before.group(former_group).map_or(0, |g| g.members.len());
            if former_size > 1 {
                return None;
            }
            let root = after.root_of(mv.tab)?;
            let selected_tab_in_group = after.group(root)?.representative?;
            Some(TabGroupEvent::DidMergeTabToGroup {
                moved_tab: mv.tab,
                selected_tab_in_group,
            })
        }
        Transition::Reorder { group } => classify_reorder(after, mv, group),
    }
}

fn classify_reorder(after: &GroupingSnapshot, mv: &TabMove, root: GroupId) -> Option<TabGroupEvent> {
    let start = mv.old_index.min(mv.new_index);
    let end = mv.old_index.max(mv.new_index);
    if after.slots_share_root(start, end, root) {
        return Some(TabGroupEvent::DidMoveWithinGroup {
            moved_tab: mv.tab,
            old_index: mv.old_index,
            new_index: mv.new_index,
        });
    }

    let size = after.group(root)?.members.len();
    let first = (mv.new_index + 1).checked_sub(size)?;
    if after.slots_share_root(first, mv.new_index, root) {
        return Some(TabGroupEvent::DidMoveTabGroup {
            moved_tab: mv.tab,
            old_index: mv.old_index,
            new_index: mv.new_index,
        });
    }
    tracing::debug!(tab = %mv.tab, "group move still in progress, no event");
    None
}
