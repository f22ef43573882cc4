//! Core type definitions for tabs and groups

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a tab.
///
/// The id is immutable for the lifetime of the tab. A tab that anchors a
/// group (or is not grouped at all) has a root id equal to its own id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub u32);

impl TabId {
    /// Creates a tab ID from a raw value.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tab({})", self.0)
    }
}

/// Identifier of a tab group: the root id shared by all of its members.
pub type GroupId = TabId;

/// Top-level partition a tab lives in.
///
/// Each partition has its own flat tab list; groups never span partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
    /// Regular browsing
    #[default]
    Normal,
    /// Private (incognito) browsing
    Private,
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Private => write!(f, "private"),
        }
    }
}

/// Why a tab was created, as declared by the caller that opened it.
///
/// The filter uses the cause to decide whether a new tab joins its parent's
/// group instead of inferring intent on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchCause {
    /// Link opened in the foreground
    FromLink,
    /// "Open in new tab" from a long-press outside of a group
    FromLongpressBackground,
    /// "Open in new tab in group" from a long-press
    FromLongpressBackgroundInGroup,
    /// New tab button inside the tab group UI
    FromTabGroupUi,
    /// Tab opened from the start surface
    FromStartSurface,
    /// Tab recreated while restoring a previous session
    FromRestore,
    /// Anything else (omnibox, external intent, new tab button)
    #[default]
    Other,
}

impl LaunchCause {
    /// Returns true if a tab opened this way joins its parent's group.
    ///
    /// With `group_auto_creation` every cause inherits the parent's group;
    /// otherwise only causes that come from group UI do.
    #[must_use]
    pub const fn inherits_parent_group(self, group_auto_creation: bool) -> bool {
        group_auto_creation
            || matches!(
                self,
                Self::FromTabGroupUi | Self::FromLongpressBackgroundInGroup | Self::FromStartSurface
            )
    }

    /// Returns true if forming a group this way counts as an
    /// "open in new tab" group creation.
    #[must_use]
    pub const fn creates_group_from_new_tab(self, group_auto_creation: bool) -> bool {
        if group_auto_creation {
            matches!(self, Self::FromLongpressBackground)
        } else {
            matches!(self, Self::FromLongpressBackgroundInGroup)
        }
    }
}

/// A completed move in the flat tab list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabMove {
    /// The tab that moved
    pub tab: TabId,
    /// Index before the move
    pub old_index: usize,
    /// Index after the move
    pub new_index: usize,
}
