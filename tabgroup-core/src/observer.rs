//! Semantic group events and observer fan-out
//!
//! Observers receive classified [`TabGroupEvent`]s after the registry has
//! been updated. The list is copy-on-iterate: [`ObserverList::notify`]
//! dispatches to a snapshot, so an observer may add or remove observers
//! (itself included) while an event is being delivered.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::TabId;

/// A classified, intention-revealing group notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TabGroupEvent {
    /// A tab is about to join the group anchored at `new_root_id`.
    WillMergeTabToGroup {
        /// Tab being merged
        moved_tab: TabId,
        /// Root id of the destination group
        new_root_id: TabId,
    },
    /// A tab joined a group.
    DidMergeTabToGroup {
        /// Tab that was merged
        moved_tab: TabId,
        /// Representative of the destination group
        selected_tab_in_group: TabId,
    },
    /// A tab is about to leave its group; the group will be re-anchored at
    /// `new_root_id`.
    WillMoveTabOutOfGroup {
        /// Tab leaving the group
        moved_tab: TabId,
        /// Root id the remaining members will share
        new_root_id: TabId,
    },
    /// A tab left its group.
    DidMoveTabOutOfGroup {
        /// Tab that left
        moved_tab: TabId,
        /// Grouped-view index of the group it left
        prev_filter_index: usize,
    },
    /// The last member of a group landed, completing a whole-group move.
    DidMoveTabGroup {
        /// Last tab of the group to move
        moved_tab: TabId,
        /// Flat index before the move
        old_index: usize,
        /// Flat index after the move
        new_index: usize,
    },
    /// A tab moved without leaving the span of its own group.
    DidMoveWithinGroup {
        /// Tab that moved
        moved_tab: TabId,
        /// Flat index before the move
        old_index: usize,
        /// Flat index after the move
        new_index: usize,
    },
    /// Several tabs were gathered into one group.
    DidCreateGroup {
        /// Tabs in the order they were merged
        tabs: Vec<TabId>,
        /// Flat index of each tab before the merge
        original_indices: Vec<usize>,
        /// Whether the tabs already shared a group
        is_same_group: bool,
    },
}

impl TabGroupEvent {
    /// The tab the event is about. `None` for [`TabGroupEvent::DidCreateGroup`].
    #[must_use]
    pub const fn moved_tab(&self) -> Option<TabId> {
        match self {
            Self::WillMergeTabToGroup { moved_tab, .. }
            | Self::DidMergeTabToGroup { moved_tab, .. }
            | Self::WillMoveTabOutOfGroup { moved_tab, .. }
            | Self::DidMoveTabOutOfGroup { moved_tab, .. }
            | Self::DidMoveTabGroup { moved_tab, .. }
            | Self::DidMoveWithinGroup { moved_tab, .. } => Some(*moved_tab),
            Self::DidCreateGroup { .. } => None,
        }
    }

    /// Short event name used in log records.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::WillMergeTabToGroup { .. } => "will_merge_tab_to_group",
            Self::DidMergeTabToGroup { .. } => "did_merge_tab_to_group",
            Self::WillMoveTabOutOfGroup { .. } => "will_move_tab_out_of_group",
            Self::DidMoveTabOutOfGroup { .. } => "did_move_tab_out_of_group",
            Self::DidMoveTabGroup { .. } => "did_move_tab_group",
            Self::DidMoveWithinGroup { .. } => "did_move_within_group",
            Self::DidCreateGroup { .. } => "did_create_group",
        }
    }

    /// Serializes the event as a JSON object tagged with its name.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for TabGroupEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.moved_tab() {
            Some(tab) => write!(f, "{}({tab})", self.name()),
            None => write!(f, "{}", self.name()),
        }
    }
}

/// Receives semantic group events.
pub trait TabGroupObserver: Send + Sync {
    /// Called once per event, after the registry has been updated.
    fn on_event(&self, event: &TabGroupEvent);
}

impl<F> TabGroupObserver for F
where
    F: Fn(&TabGroupEvent) + Send + Sync,
{
    fn on_event(&self, event: &TabGroupEvent) {
        self(event);
    }
}

/// Handle returned by [`ObserverList::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub Uuid);

impl ObserverId {
    /// Creates a new random observer ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObserverId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Observer({})", self.0)
    }
}

type Entry = (ObserverId, Arc<dyn TabGroupObserver>);

/// Shared, cloneable list of observers.
///
/// Clones share the same underlying list.
#[derive(Clone, Default)]
pub struct ObserverList {
    entries: Arc<Mutex<Vec<Entry>>>,
}

impl fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverList")
            .field("len", &self.len())
            .finish()
    }
}

impl ObserverList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer and returns its handle.
    pub fn add(&self, observer: Arc<dyn TabGroupObserver>) -> ObserverId {
        let id = ObserverId::new();
        self.lock().push((id, observer));
        id
    }

    /// Unregisters an observer. Returns false if the handle is unknown.
    pub fn remove(&self, id: ObserverId) -> bool {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    /// Number of registered observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if no observer is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Delivers an event to every observer registered when the call started.
    pub fn notify(&self, event: &TabGroupEvent) {
        let snapshot: Vec<Arc<dyn TabGroupObserver>> =
            self.lock().iter().map(|(_, o)| Arc::clone(o)).collect();
        tracing::trace!(event = %event, observers = snapshot.len(), "dispatching group event");
        for observer in snapshot {
            observer.on_event(event);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Observer that records every event it receives.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<TabGroupEvent>>>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<TabGroupEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the recorded events and clears the log.
    pub fn take(&self) -> Vec<TabGroupEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Discards the recorded events.
    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl TabGroupObserver for EventLog {
    fn on_event(&self, event: &TabGroupEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}
