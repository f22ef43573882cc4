//! Grouped view over a flat tab model
//!
//! [`TabGroupModelFilter`] keeps the group registry and index projection in
//! step with a [`TabModel`] it borrows for each call. Callers either use the
//! mutation API (merge, split, move group, undo), which edits the model and
//! the registry together, or edit the model themselves and report the raw
//! change through the `did_*` notifications.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::classifier::{GroupingSnapshot, Transition, classify};
use super::registry::{GroupRegistry, Insertion, Removal};
use crate::config::FilterSettings;
use crate::error::{TabGroupError, TabGroupResult};
use crate::model::{GroupId, LaunchCause, Partition, TabId, TabModel, TabMove};
use crate::observer::{ObserverId, ObserverList, TabGroupEvent, TabGroupObserver};
use crate::telemetry::SessionTelemetry;
use crate::tracing::span_names;
use crate::{trace_operation, trace_operation_debug};

/// Group index for the tabs of one partition.
#[derive(Debug)]
pub struct TabGroupModelFilter {
    partition: Partition,
    settings: FilterSettings,
    registry: GroupRegistry,
    current_group_index: Option<usize>,
    pending_selection: Option<TabId>,
    observers: ObserverList,
    telemetry: Option<SessionTelemetry>,
}

impl TabGroupModelFilter {
    /// Creates an empty filter for a partition.
    #[must_use]
    pub fn new(partition: Partition, settings: FilterSettings) -> Self {
        Self {
            partition,
            settings,
            registry: GroupRegistry::new(),
            current_group_index: None,
            pending_selection: None,
            observers: ObserverList::new(),
            telemetry: None,
        }
    }

    /// Creates a filter and builds its registry from an existing model.
    ///
    /// # Errors
    ///
    /// Returns `InconsistentState` if a tab in the model has no root id.
    pub fn from_model<M: TabModel + ?Sized>(
        model: &M,
        settings: FilterSettings,
    ) -> TabGroupResult<Self> {
        let mut filter = Self::new(model.partition(), settings);
        filter.reset(model)?;
        Ok(filter)
    }

    /// Shares an observer list with other filters.
    #[must_use]
    pub fn with_observers(mut self, observers: ObserverList) -> Self {
        self.observers = observers;
        self
    }

    /// Attaches session-count telemetry.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: SessionTelemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Replaces or removes session-count telemetry.
    pub fn set_telemetry(&mut self, telemetry: Option<SessionTelemetry>) {
        self.telemetry = telemetry;
    }

    /// Partition this filter indexes.
    #[must_use]
    pub const fn partition(&self) -> Partition {
        self.partition
    }

    /// Active settings.
    #[must_use]
    pub const fn settings(&self) -> &FilterSettings {
        &self.settings
    }

    /// Observer list events are delivered to.
    #[must_use]
    pub const fn observers(&self) -> &ObserverList {
        &self.observers
    }

    /// Registers an observer.
    pub fn add_observer(&self, observer: Arc<dyn TabGroupObserver>) -> ObserverId {
        self.observers.add(observer)
    }

    /// Unregisters an observer.
    pub fn remove_observer(&self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    /// Underlying registry, for inspection.
    #[must_use]
    pub const fn registry(&self) -> &GroupRegistry {
        &self.registry
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Number of groups, singletons included.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.registry.group_count()
    }

    /// Number of groups with more than one tab.
    #[must_use]
    pub const fn real_group_count(&self) -> usize {
        self.registry.real_group_count()
    }

    /// Grouped-view index of the group holding a tab.
    #[must_use]
    pub fn index_of<M: TabModel + ?Sized>(&self, model: &M, tab: TabId) -> Option<usize> {
        self.registry.index_of(model.root_id(tab)?)
    }

    /// Members of the tab's group in member order. A tab whose group is not
    /// indexed yet is returned alone; an unknown tab yields nothing.
    #[must_use]
    pub fn related_tabs<M: TabModel + ?Sized>(&self, model: &M, tab: TabId) -> Vec<TabId> {
        let Some(root) = model.root_id(tab) else {
            return Vec::new();
        };
        match self.registry.get(root) {
            Some(group) => group.members().to_vec(),
            None => vec![tab],
        }
    }

    /// Members of the group anchored at `root`, empty if there is none.
    #[must_use]
    pub fn related_tabs_for_root(&self, root: GroupId) -> Vec<TabId> {
        self.registry
            .get(root)
            .map(|g| g.members().to_vec())
            .unwrap_or_default()
    }

    /// Size of the group anchored at `root`; 1 when the group is unknown.
    #[must_use]
    pub fn related_tab_count_for_root(&self, root: GroupId) -> usize {
        self.registry.get(root).map_or(1, |g| g.len())
    }

    /// Returns true if the tab shares its group with another tab.
    #[must_use]
    pub fn has_other_related_tabs<M: TabModel + ?Sized>(&self, model: &M, tab: TabId) -> bool {
        model
            .root_id(tab)
            .and_then(|root| self.registry.get(root))
            .is_some_and(|g| g.is_real())
    }

    /// Representative of the group at a grouped-view index.
    #[must_use]
    pub fn representative_at(&self, index: usize) -> Option<TabId> {
        let group = self.registry.group_at(index)?;
        self.representative_of(group)
    }

    /// Representative of a group.
    #[must_use]
    pub fn representative_of(&self, group: GroupId) -> Option<TabId> {
        self.registry.get(group)?.representative()
    }

    /// Grouped-view index of the group holding the selected tab.
    #[must_use]
    pub const fn current_group_index(&self) -> Option<usize> {
        self.current_group_index
    }

    /// Group ids in grouped-view order.
    #[must_use]
    pub fn group_ids_in_order(&self) -> Vec<GroupId> {
        self.registry.ordered_group_ids()
    }

    /// Returns true while a selection waits for its group to be indexed.
    /// Index-change notifications should be held back meanwhile.
    #[must_use]
    pub const fn has_pending_selection(&self) -> bool {
        self.pending_selection.is_some()
    }

    /// Verifies the registry against the model.
    ///
    /// # Errors
    ///
    /// Returns `InconsistentState` describing the first violation found.
    pub fn check_consistency<M: TabModel + ?Sized>(&self, model: &M) -> TabGroupResult<()> {
        self.registry.check_consistency(model)
    }

    // ------------------------------------------------------------------
    // Mutation API
    // ------------------------------------------------------------------

    /// Merges the group of `source` into the group of `destination`.
    ///
    /// The source tabs end up right after the destination group's last tab.
    /// If they already fill that region in member order, only their root ids
    /// change.
    ///
    /// # Errors
    ///
    /// - `NotRestored` before the model has finished loading
    /// - `TabNotFound` if either tab is unknown
    /// - `CrossPartitionOperation` if a tab belongs to another partition
    pub fn merge_tabs<M: TabModel + ?Sized>(
        &mut self,
        model: &mut M,
        source: TabId,
        destination: TabId,
    ) -> TabGroupResult<()> {
        let _span =
            trace_operation!(span_names::MERGE_TABS, tab = %source, destination = %destination)
                .entered();
        self.ensure_restored(model)?;
        self.ensure_tab(model, source)?;
        self.ensure_tab(model, destination)?;

        let destination_root = root_of(model, destination)?;
        if root_of(model, source)? == destination_root {
            debug!(group = %destination_root, "tabs already share a group");
            return Ok(());
        }
        let tabs = self.related_tabs(model, source);
        let slot = self.destination_slot(model, destination_root)?;
        let Some(&last) = tabs.last() else {
            return Err(TabGroupError::TabNotFound(source));
        };

        let in_place = tabs
            .iter()
            .enumerate()
            .all(|(i, &tab)| model.index_of(tab) == Some(slot + i));
        if !in_place {
            return self.merge_tabs_into(model, &tabs, destination, true, false);
        }

        self.notify(&TabGroupEvent::WillMergeTabToGroup {
            moved_tab: last,
            new_root_id: destination_root,
        });
        for &tab in &tabs {
            model.set_root_id(tab, destination_root);
        }
        self.reset(&*model)?;

        let selected_tab_in_group = self.representative_of(destination_root).ok_or_else(|| {
            TabGroupError::InconsistentState(format!("group {destination_root} vanished on merge"))
        })?;
        info!(group = %destination_root, tabs = tabs.len(), "merged group in place");
        self.notify(&TabGroupEvent::DidMergeTabToGroup {
            moved_tab: last,
            selected_tab_in_group,
        });
        Ok(())
    }

    /// Appends a list of tabs to the group of `destination`.
    ///
    /// Afterwards the tabs follow the destination group in list order.
    /// `same_group` limits `WillMergeTabToGroup` to the last tab; `notify`
    /// fires `DidCreateGroup` with each tab's original flat index.
    ///
    /// # Errors
    ///
    /// Same as [`TabGroupModelFilter::merge_tabs`], checked for every tab
    /// before anything changes.
    pub fn merge_list_to_group<M: TabModel + ?Sized>(
        &mut self,
        model: &mut M,
        tabs: &[TabId],
        destination: TabId,
        same_group: bool,
        notify: bool,
    ) -> TabGroupResult<()> {
        let _span = trace_operation!(
            span_names::MERGE_LIST,
            destination = %destination,
            tabs = tabs.len()
        )
        .entered();
        self.ensure_restored(model)?;
        self.ensure_tab(model, destination)?;
        for &tab in tabs {
            self.ensure_tab(model, tab)?;
        }
        self.merge_tabs_into(model, tabs, destination, same_group, notify)
    }

    fn merge_tabs_into<M: TabModel + ?Sized>(
        &mut self,
        model: &mut M,
        tabs: &[TabId],
        destination: TabId,
        same_group: bool,
        notify: bool,
    ) -> TabGroupResult<()> {
        if tabs.is_empty() {
            return Ok(());
        }
        let destination_root = root_of(model, destination)?;
        let mut slot = self.destination_slot(model, destination_root)?;
        let mut original_indices = Vec::with_capacity(tabs.len());

        for (i, &tab) in tabs.iter().enumerate() {
            if !same_group || i == tabs.len() - 1 {
                self.notify(&TabGroupEvent::WillMergeTabToGroup {
                    moved_tab: tab,
                    new_root_id: destination_root,
                });
            }
            let index = model.index_of(tab).ok_or(TabGroupError::TabNotFound(tab))?;
            original_indices.push(index);
            if tab == destination {
                continue;
            }

            model.set_root_id(tab, destination_root);
            let target = slot;
            if index >= slot {
                slot += 1;
            }
            let mv = model.move_tab(tab, target).unwrap_or(TabMove {
                tab,
                old_index: index,
                new_index: index,
            });
            self.did_move_tab(&*model, mv)?;
        }

        if notify {
            self.notify(&TabGroupEvent::DidCreateGroup {
                tabs: tabs.to_vec(),
                original_indices,
                is_same_group: same_group,
            });
        }
        Ok(())
    }

    /// Moves a tab out of its group, placing it after the group when
    /// `trailing` and before it otherwise.
    ///
    /// When the tab anchors the group, the remaining members are re-anchored
    /// at a flat neighbour first (the predecessor if it is a member, else the
    /// successor).
    ///
    /// # Errors
    ///
    /// - `NotRestored` before the model has finished loading
    /// - `TabNotFound` if the tab is unknown
    /// - `CrossPartitionOperation` if the tab belongs to another partition
    pub fn move_tab_out_of_group<M: TabModel + ?Sized>(
        &mut self,
        model: &mut M,
        tab: TabId,
        trailing: bool,
    ) -> TabGroupResult<()> {
        let _span =
            trace_operation!(span_names::MOVE_OUT_OF_GROUP, tab = %tab, trailing).entered();
        self.ensure_restored(model)?;
        let source_index = self.ensure_tab(model, tab)?;
        let root = root_of(model, tab)?;

        let group = self
            .registry
            .get(root)
            .ok_or_else(|| TabGroupError::InconsistentState(format!("no group {root}")))?;
        let edge = if trailing { group.last() } else { group.first() };
        let target_index = edge.and_then(|t| model.index_of(t)).ok_or_else(|| {
            TabGroupError::InconsistentState(format!("group {root} has a member outside the model"))
        })?;
        let prev_filter_index = self
            .registry
            .index_of(root)
            .ok_or_else(|| TabGroupError::InconsistentState(format!("group {root} is not indexed")))?;

        if group.len() == 1 {
            self.notify(&TabGroupEvent::DidMoveTabOutOfGroup {
                moved_tab: tab,
                prev_filter_index,
            });
            return Ok(());
        }

        let members = group.members().to_vec();
        let mut new_root = root;
        if tab == root {
            let in_group = |index: usize| model.tab_at(index).filter(|&t| model.root_id(t) == Some(root));
            new_root = source_index
                .checked_sub(1)
                .and_then(in_group)
                .or_else(|| in_group(source_index + 1))
                .or_else(|| group.neighbour_of(tab))
                .ok_or_else(|| {
                    TabGroupError::InconsistentState(format!("no member left to anchor {root}"))
                })?;
        }

        self.notify(&TabGroupEvent::WillMoveTabOutOfGroup {
            moved_tab: tab,
            new_root_id: new_root,
        });
        if tab == root {
            for &member in &members {
                model.set_root_id(member, new_root);
            }
            self.reset(&*model)?;
        }
        model.set_root_id(tab, tab);

        if source_index != target_index {
            let slot = if trailing { target_index + 1 } else { target_index };
            if let Some(mv) = model.move_tab(tab, slot) {
                return self.did_move_tab(&*model, mv);
            }
        }

        self.reset(&*model)?;
        self.notify(&TabGroupEvent::DidMoveTabOutOfGroup {
            moved_tab: tab,
            prev_filter_index,
        });
        Ok(())
    }

    /// Moves a tab out of its group to the trailing side.
    ///
    /// # Errors
    ///
    /// Same as [`TabGroupModelFilter::move_tab_out_of_group`].
    pub fn move_tab_out_of_group_trailing<M: TabModel + ?Sized>(
        &mut self,
        model: &mut M,
        tab: TabId,
    ) -> TabGroupResult<()> {
        self.move_tab_out_of_group(model, tab, true)
    }

    /// Moves the whole group of `tab` so that it starts at flat position
    /// `new_index`, keeping member order.
    ///
    /// `new_index` is clamped to `0..=count`. Nothing happens, and no event
    /// fires, when the group already starts there.
    ///
    /// # Errors
    ///
    /// - `NotRestored` before the model has finished loading
    /// - `TabNotFound` if the tab is unknown
    /// - `CrossPartitionOperation` if the tab belongs to another partition
    pub fn move_related_tabs<M: TabModel + ?Sized>(
        &mut self,
        model: &mut M,
        tab: TabId,
        new_index: usize,
    ) -> TabGroupResult<()> {
        let _span =
            trace_operation!(span_names::MOVE_RELATED_TABS, tab = %tab, new_index).entered();
        self.ensure_restored(model)?;
        self.ensure_tab(model, tab)?;

        let tabs = self.related_tabs(model, tab);
        let new_index = new_index.min(model.count());
        let Some(current_index) = tabs.first().and_then(|&t| model.index_of(t)) else {
            return Err(TabGroupError::TabNotFound(tab));
        };
        if current_index == new_index {
            debug!(tab = %tab, index = new_index, "group already in place");
            return Ok(());
        }

        let mut offset = 0;
        for &member in &tabs {
            let slot = if new_index >= current_index {
                new_index
            } else {
                offset += 1;
                new_index + offset - 1
            };
            if let Some(mv) = model.move_tab(member, slot) {
                self.did_move_tab(&*model, mv)?;
            }
        }
        Ok(())
    }

    /// Reverts a merge for one tab: restores its root id and flat position.
    ///
    /// # Errors
    ///
    /// - `NotRestored` before the model has finished loading
    /// - `TabNotFound` if the tab is unknown
    /// - `InvalidIndex` if `original_index` is not a position in the model
    pub fn undo_group<M: TabModel + ?Sized>(
        &mut self,
        model: &mut M,
        tab: TabId,
        original_index: usize,
        original_root: TabId,
    ) -> TabGroupResult<()> {
        let _span = trace_operation!(
            span_names::UNDO_GROUP,
            tab = %tab,
            original_index,
            original_root = %original_root
        )
        .entered();
        self.ensure_restored(model)?;
        let current_index = self.ensure_tab(model, tab)?;
        if original_index >= model.count() {
            return Err(TabGroupError::InvalidIndex {
                index: original_index,
                count: model.count(),
            });
        }

        model.set_root_id(tab, original_root);
        let slot = if current_index < original_index {
            original_index + 1
        } else {
            original_index
        };
        let mv = if current_index == original_index {
            None
        } else {
            model.move_tab(tab, slot)
        };
        let mv = mv.unwrap_or(TabMove {
            tab,
            old_index: current_index,
            new_index: current_index,
        });
        self.did_move_tab(&*model, mv)
    }

    /// Bumps the persisted session counter of the tab's group in the
    /// background. Only real groups are counted.
    ///
    /// Returns `None` when counting is disabled or the group is not real.
    pub fn record_sessions_count<M: TabModel + ?Sized>(
        &self,
        model: &M,
        tab: TabId,
    ) -> Option<JoinHandle<Option<u32>>> {
        if !self.settings.record_session_counts {
            return None;
        }
        let telemetry = self.telemetry.as_ref()?;
        let root = model.root_id(tab)?;
        if !self.registry.get(root).is_some_and(|g| g.is_real()) {
            return None;
        }
        Some(telemetry.record(root))
    }

    // ------------------------------------------------------------------
    // Raw model notifications
    // ------------------------------------------------------------------

    /// Indexes a tab the model has just inserted.
    ///
    /// Once the model is restored, the tab adopts its parent's root id when
    /// `cause` (or auto-creation) calls for it.
    ///
    /// # Errors
    ///
    /// - `TabNotFound` if the model does not hold the tab
    /// - `CrossPartitionOperation` if the tab belongs to another partition
    pub fn did_add_tab<M: TabModel + ?Sized>(
        &mut self,
        model: &mut M,
        tab: TabId,
        cause: LaunchCause,
    ) -> TabGroupResult<()> {
        let _span = trace_operation_debug!(span_names::DID_ADD_TAB, tab = %tab, cause = ?cause)
            .entered();
        let index = self.ensure_tab(model, tab)?;
        let auto_creation = self.settings.group_auto_creation;

        if model.is_restored() && cause.inherits_parent_group(auto_creation) {
            let parent_root = model
                .parent_id(tab)
                .filter(|&parent| model.contains(parent))
                .and_then(|parent| model.root_id(parent));
            if let Some(parent_root) = parent_root {
                model.set_root_id(tab, parent_root);
            }
        }

        let root = root_of(model, tab)?;
        match self.registry.insert_tab(root, tab) {
            Insertion::Joined { became_real } => {
                if became_real && cause.creates_group_from_new_tab(auto_creation) {
                    info!(group = %root, tab = %tab, "tab group created from open-in-new-tab");
                }
                self.registry.reorder_group(&*model, root);
            }
            Insertion::Created => {}
        }

        if index + 1 != model.count() {
            self.registry.reindex(&*model);
            self.refresh_current_index(&*model);
        }
        self.retry_pending_selection(&*model);
        Ok(())
    }

    /// Drops a tab the model has just removed.
    ///
    /// If the tab anchored a group that still has members, the group is
    /// re-anchored at the neighbouring member: every member's root id is
    /// rewritten and the group keeps its grouped-view index.
    ///
    /// # Errors
    ///
    /// Returns `TabNotFound` if no group holds the tab.
    pub fn did_close_tab<M: TabModel + ?Sized>(
        &mut self,
        model: &mut M,
        tab: TabId,
    ) -> TabGroupResult<()> {
        let _span = trace_operation_debug!(span_names::DID_CLOSE_TAB, tab = %tab).entered();
        let root = model
            .root_id(tab)
            .filter(|r| self.registry.get(*r).is_some_and(|g| g.contains(tab)))
            .or_else(|| self.registry.group_containing(tab))
            .ok_or(TabGroupError::TabNotFound(tab))?;
        let anchor = self.registry.get(root).and_then(|g| g.neighbour_of(tab));

        match self.registry.remove_tab(root, tab)? {
            Removal::Deleted { index } => {
                debug!(group = %root, index, "group closed");
                self.forget_group(root);
            }
            Removal::Kept { .. } => {
                if tab == root {
                    let free = |t: &TabId| !self.registry.contains_group(*t);
                    let anchor = anchor.filter(free).or_else(|| {
                        self.related_tabs_for_root(root).into_iter().find(|t| free(t))
                    });
                    match anchor {
                        Some(anchor) => self.reanchor(model, root, anchor)?,
                        None => debug!(group = %root, "no free id to re-anchor at"),
                    }
                }
                self.registry.reindex(&*model);
            }
        }

        self.refresh_current_index(&*model);
        Ok(())
    }

    /// Records that the user selected a tab.
    ///
    /// If the tab's group is not indexed yet, the selection is parked and
    /// retried after the next added tab.
    ///
    /// # Errors
    ///
    /// Returns `TabNotFound` if the model does not hold the tab.
    pub fn did_select_tab<M: TabModel + ?Sized>(
        &mut self,
        model: &M,
        tab: TabId,
    ) -> TabGroupResult<()> {
        if !model.contains(tab) {
            return Err(TabGroupError::TabNotFound(tab));
        }
        self.select(model, tab);
        Ok(())
    }

    /// Classifies a move the model has just performed and emits the
    /// resulting event. Moves reported before the model is restored are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns `InconsistentState` if the moved tab is in no group.
    pub fn did_move_tab<M: TabModel + ?Sized>(
        &mut self,
        model: &M,
        mv: TabMove,
    ) -> TabGroupResult<()> {
        let _span = trace_operation_debug!(
            span_names::DID_MOVE_TAB,
            tab = %mv.tab,
            old_index = mv.old_index,
            new_index = mv.new_index
        )
        .entered();
        if !model.is_restored() {
            debug!("ignoring move during restore");
            return Ok(());
        }

        let before = GroupingSnapshot::capture(&self.registry, model);
        let transition = Transition::detect(&before, &mv)?;
        debug!(?transition, "classified move");
        if transition.changes_membership() {
            self.reset(model)?;
        } else {
            self.reorder(model)?;
        }

        let after = GroupingSnapshot::capture(&self.registry, model);
        if let Some(event) = classify(&before, &after, &mv) {
            self.notify(&event);
        }
        Ok(())
    }

    /// Rebuilds the registry from the model.
    ///
    /// Representatives survive when their group still exists and still
    /// contains them; the current group follows the model's selection.
    ///
    /// # Errors
    ///
    /// Returns `InconsistentState` if a tab in the model has no root id.
    pub fn reset<M: TabModel + ?Sized>(&mut self, model: &M) -> TabGroupResult<()> {
        let _span = trace_operation_debug!(span_names::RESET, tabs = model.count()).entered();
        let representatives = self.registry.representatives();
        self.registry.rebuild(model)?;
        for (group, representative) in representatives {
            if let Some(record) = self.registry.get_mut(group) {
                record.set_representative(representative);
            }
        }
        self.retry_pending_selection(model);
        self.select_current(model);
        Ok(())
    }

    /// Re-derives grouped-view indices and member order without changing
    /// membership.
    ///
    /// # Errors
    ///
    /// Returns `InconsistentState` if a root id names an unknown group.
    pub fn reorder<M: TabModel + ?Sized>(&mut self, model: &M) -> TabGroupResult<()> {
        self.registry.reorder(model)?;
        self.select_current(model);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn ensure_restored<M: TabModel + ?Sized>(&self, model: &M) -> TabGroupResult<()> {
        if model.is_restored() {
            Ok(())
        } else {
            Err(TabGroupError::NotRestored)
        }
    }

    fn ensure_tab<M: TabModel + ?Sized>(&self, model: &M, tab: TabId) -> TabGroupResult<usize> {
        let index = model.index_of(tab).ok_or(TabGroupError::TabNotFound(tab))?;
        let actual = model.partition_of(tab).unwrap_or_else(|| model.partition());
        if actual != self.partition {
            return Err(TabGroupError::CrossPartitionOperation {
                tab,
                expected: self.partition,
                actual,
            });
        }
        Ok(index)
    }

    /// Slot one past the flat position of the group's last member.
    fn destination_slot<M: TabModel + ?Sized>(
        &self,
        model: &M,
        group: GroupId,
    ) -> TabGroupResult<usize> {
        self.registry
            .get(group)
            .and_then(|g| g.last())
            .and_then(|last| model.index_of(last))
            .map(|index| index + 1)
            .ok_or_else(|| TabGroupError::InconsistentState(format!("no group {group}")))
    }

    fn reanchor<M: TabModel + ?Sized>(
        &mut self,
        model: &mut M,
        from: GroupId,
        to: TabId,
    ) -> TabGroupResult<()> {
        for member in self.related_tabs_for_root(from) {
            model.set_root_id(member, to);
        }
        self.registry.rekey(from, to)?;
        info!(from = %from, to = %to, "re-anchored group after closing its root");
        self.forget_group(from);
        Ok(())
    }

    fn forget_group(&self, group: GroupId) {
        if let Some(telemetry) = &self.telemetry {
            drop(telemetry.forget(group));
        }
    }

    fn select<M: TabModel + ?Sized>(&mut self, model: &M, tab: TabId) {
        let root = model.root_id(tab).unwrap_or(tab);
        match self.registry.get_mut(root) {
            Some(group) => {
                group.set_representative(tab);
                self.current_group_index = self.registry.index_of(root);
            }
            None => {
                if let Some(previous) = self.pending_selection.replace(tab)
                    && previous != tab
                {
                    warn!(previous = %previous, tab = %tab, "pending selection overwritten");
                }
            }
        }
    }

    fn select_current<M: TabModel + ?Sized>(&mut self, model: &M) {
        match model.selected_index().and_then(|i| model.tab_at(i)) {
            Some(tab) => self.select(model, tab),
            None => self.current_group_index = None,
        }
    }

    fn refresh_current_index<M: TabModel + ?Sized>(&mut self, model: &M) {
        self.current_group_index = model
            .selected_index()
            .and_then(|i| model.tab_at(i))
            .and_then(|tab| self.index_of(model, tab));
    }

    fn retry_pending_selection<M: TabModel + ?Sized>(&mut self, model: &M) {
        let Some(tab) = self.pending_selection.take() else {
            return;
        };
        if model.contains(tab) {
            self.select(model, tab);
        } else {
            debug!(tab = %tab, "dropping pending selection of a closed tab");
        }
    }

    fn notify(&self, event: &TabGroupEvent) {
        debug!(event = %event, partition = %self.partition, "group event");
        self.observers.notify(event);
    }
}

fn root_of<M: TabModel + ?Sized>(model: &M, tab: TabId) -> TabGroupResult<TabId> {
    model.root_id(tab).ok_or(TabGroupError::TabNotFound(tab))
}
