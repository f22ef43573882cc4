//! Browser session owner
//!
//! A [`TabSession`] owns one tab model and one group filter per partition.
//! It is the explicit home of the group registries; nothing in this crate
//! keeps process-wide state besides the tracing subscriber.

use crate::config::FilterSettings;
use crate::error::{TabGroupError, TabGroupResult};
use crate::group::TabGroupModelFilter;
use crate::model::{LaunchCause, Partition, TabId, TabModel, TabRecord, VecTabModel};
use crate::observer::ObserverList;
use crate::telemetry::SessionTelemetry;

/// Tab model of one partition together with its group filter.
#[derive(Debug)]
pub struct TabStrip<M: TabModel> {
    model: M,
    filter: TabGroupModelFilter,
}

impl<M: TabModel> TabStrip<M> {
    /// Builds the filter for an existing model.
    ///
    /// # Errors
    ///
    /// Returns `InconsistentState` if a tab in the model has no root id.
    pub fn new(model: M, settings: FilterSettings, observers: ObserverList) -> TabGroupResult<Self> {
        let filter = TabGroupModelFilter::from_model(&model, settings)?.with_observers(observers);
        Ok(Self { model, filter })
    }

    /// The flat tab model.
    #[must_use]
    pub const fn model(&self) -> &M {
        &self.model
    }

    /// The group filter.
    #[must_use]
    pub const fn filter(&self) -> &TabGroupModelFilter {
        &self.filter
    }

    /// Both halves, for callers that edit the model directly and report the
    /// change through the filter's `did_*` notifications.
    pub fn parts_mut(&mut self) -> (&mut M, &mut TabGroupModelFilter) {
        (&mut self.model, &mut self.filter)
    }

    /// See [`TabGroupModelFilter::merge_tabs`].
    ///
    /// # Errors
    ///
    /// Propagates the filter's errors.
    pub fn merge_tabs(&mut self, source: TabId, destination: TabId) -> TabGroupResult<()> {
        self.filter.merge_tabs(&mut self.model, source, destination)
    }

    /// See [`TabGroupModelFilter::merge_list_to_group`].
    ///
    /// # Errors
    ///
    /// Propagates the filter's errors.
    pub fn merge_list_to_group(
        &mut self,
        tabs: &[TabId],
        destination: TabId,
        same_group: bool,
        notify: bool,
    ) -> TabGroupResult<()> {
        self.filter
            .merge_list_to_group(&mut self.model, tabs, destination, same_group, notify)
    }

    /// See [`TabGroupModelFilter::move_tab_out_of_group`].
    ///
    /// # Errors
    ///
    /// Propagates the filter's errors.
    pub fn move_tab_out_of_group(&mut self, tab: TabId, trailing: bool) -> TabGroupResult<()> {
        self.filter.move_tab_out_of_group(&mut self.model, tab, trailing)
    }

    /// See [`TabGroupModelFilter::move_related_tabs`].
    ///
    /// # Errors
    ///
    /// Propagates the filter's errors.
    pub fn move_related_tabs(&mut self, tab: TabId, new_index: usize) -> TabGroupResult<()> {
        self.filter.move_related_tabs(&mut self.model, tab, new_index)
    }

    /// See [`TabGroupModelFilter::undo_group`].
    ///
    /// # Errors
    ///
    /// Propagates the filter's errors.
    pub fn undo_group(
        &mut self,
        tab: TabId,
        original_index: usize,
        original_root: TabId,
    ) -> TabGroupResult<()> {
        self.filter
            .undo_group(&mut self.model, tab, original_index, original_root)
    }

    /// Moves a single tab in the model and reports the move.
    ///
    /// # Errors
    ///
    /// Returns `TabNotFound` for unknown tabs and propagates classification
    /// errors.
    pub fn move_tab(&mut self, tab: TabId, slot: usize) -> TabGroupResult<()> {
        if !self.model.contains(tab) {
            return Err(TabGroupError::TabNotFound(tab));
        }
        match self.model.move_tab(tab, slot) {
            Some(mv) => self.filter.did_move_tab(&self.model, mv),
            None => Ok(()),
        }
    }

    /// Re-indexes every tab, e.g. after a bulk change to the model.
    ///
    /// # Errors
    ///
    /// Propagates the filter's errors.
    pub fn reset(&mut self) -> TabGroupResult<()> {
        self.filter.reset(&self.model)
    }
}

impl TabStrip<VecTabModel> {
    /// Inserts a tab and indexes it.
    ///
    /// # Errors
    ///
    /// Fails without changes if the model rejects the tab.
    pub fn open_tab(
        &mut self,
        index: usize,
        record: TabRecord,
        cause: LaunchCause,
    ) -> TabGroupResult<()> {
        let id = record.id;
        self.model.insert_tab(index, record)?;
        self.filter.did_add_tab(&mut self.model, id, cause)
    }

    /// Appends a tab and indexes it.
    ///
    /// # Errors
    ///
    /// Fails without changes if the model rejects the tab.
    pub fn append_tab(&mut self, record: TabRecord, cause: LaunchCause) -> TabGroupResult<()> {
        let index = self.model.count();
        self.open_tab(index, record, cause)
    }

    /// Removes a tab from the model and the index.
    ///
    /// # Errors
    ///
    /// Returns `TabNotFound` if the tab is not in the model.
    pub fn close_tab(&mut self, tab: TabId) -> TabGroupResult<()> {
        self.model.remove_tab(tab)?;
        self.filter.did_close_tab(&mut self.model, tab)?;
        if let Some(selected) = self.model.selected() {
            self.filter.did_select_tab(&self.model, selected)?;
        }
        Ok(())
    }

    /// Selects a tab.
    ///
    /// # Errors
    ///
    /// Returns `TabNotFound` if the tab is not in the model.
    pub fn select_tab(&mut self, tab: TabId) -> TabGroupResult<()> {
        self.model.select(tab)?;
        self.filter.did_select_tab(&self.model, tab)
    }

    /// Marks the initial population as finished and rebuilds the index.
    ///
    /// # Errors
    ///
    /// Propagates the filter's errors.
    pub fn finish_restore(&mut self) -> TabGroupResult<()> {
        self.model.mark_restored();
        self.filter.reset(&self.model)
    }
}

/// One browser session: a normal and a private tab strip.
#[derive(Debug)]
pub struct TabSession<M: TabModel> {
    normal: TabStrip<M>,
    private: TabStrip<M>,
    observers: ObserverList,
    settings: FilterSettings,
}

impl TabSession<VecTabModel> {
    /// Creates a session with two empty, unrestored in-memory models.
    #[must_use]
    pub fn new(settings: FilterSettings) -> Self {
        let observers = ObserverList::new();
        let strip = |partition| TabStrip {
            model: VecTabModel::new(partition),
            filter: TabGroupModelFilter::new(partition, settings.clone())
                .with_observers(observers.clone()),
        };
        Self {
            normal: strip(Partition::Normal),
            private: strip(Partition::Private),
            observers,
            settings,
        }
    }
}

impl<M: TabModel> TabSession<M> {
    /// Creates a session around existing models.
    ///
    /// # Errors
    ///
    /// - `InconsistentState` if a model holds the wrong partition
    /// - any error raised while indexing the models
    pub fn from_models(normal: M, private: M, settings: FilterSettings) -> TabGroupResult<Self> {
        for (model, expected) in [(&normal, Partition::Normal), (&private, Partition::Private)] {
            if model.partition() != expected {
                return Err(TabGroupError::InconsistentState(format!(
                    "expected a {expected} model, got a {} one",
                    model.partition()
                )));
            }
        }
        let observers = ObserverList::new();
        Ok(Self {
            normal: TabStrip::new(normal, settings.clone(), observers.clone())?,
            private: TabStrip::new(private, settings.clone(), observers.clone())?,
            observers,
            settings,
        })
    }

    /// Attaches session-count telemetry to both partitions.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: SessionTelemetry) -> Self {
        self.normal.filter.set_telemetry(Some(telemetry.clone()));
        self.private.filter.set_telemetry(Some(telemetry));
        self
    }

    /// Observers shared by both partitions.
    #[must_use]
    pub const fn observers(&self) -> &ObserverList {
        &self.observers
    }

    /// Settings both filters were built with.
    #[must_use]
    pub const fn settings(&self) -> &FilterSettings {
        &self.settings
    }

    /// Tab strip of a partition.
    #[must_use]
    pub const fn partition(&self, partition: Partition) -> &TabStrip<M> {
        match partition {
            Partition::Normal => &self.normal,
            Partition::Private => &self.private,
        }
    }

    /// Mutable tab strip of a partition.
    pub fn partition_mut(&mut self, partition: Partition) -> &mut TabStrip<M> {
        match partition {
            Partition::Normal => &mut self.normal,
            Partition::Private => &mut self.private,
        }
    }

    /// Partition holding a tab.
    #[must_use]
    pub fn locate(&self, tab: TabId) -> Option<Partition> {
        [Partition::Normal, Partition::Private]
            .into_iter()
            .find(|&p| self.partition(p).model().contains(tab))
    }

    /// Merges the group of `source` into the group of `destination`.
    ///
    /// # Errors
    ///
    /// - `TabNotFound` if either tab is in neither partition
    /// - `CrossPartitionOperation` if the tabs live in different partitions
    /// - errors of [`TabGroupModelFilter::merge_tabs`]
    pub fn merge_tabs(&mut self, source: TabId, destination: TabId) -> TabGroupResult<()> {
        let expected = self
            .locate(destination)
            .ok_or(TabGroupError::TabNotFound(destination))?;
        let actual = self
            .locate(source)
            .ok_or(TabGroupError::TabNotFound(source))?;
        if actual != expected {
            return Err(TabGroupError::CrossPartitionOperation {
                tab: source,
                expected,
                actual,
            });
        }
        self.partition_mut(expected).merge_tabs(source, destination)
    }
}
