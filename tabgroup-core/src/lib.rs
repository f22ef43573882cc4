//! Tab group indexing and consistency engine
//!
//! This crate keeps a grouped view over a flat, ordered list of browser tabs.
//! Tabs sharing a root id form a group; the grouped view shows one
//! representative per group, ordered by each group's first appearance in the
//! flat list.
//!
//! # Crate Structure
//!
//! - [`model`] - Tab identities and the [`TabModel`] trait the engine reads
//! - [`group`] - Registry, index projection, move classifier and the
//!   [`TabGroupModelFilter`] mutation API
//! - [`observer`] - Semantic group events and observer fan-out
//! - [`session`] - Per-session owner of one filter per partition
//! - [`telemetry`] - Background per-group session counting
//! - [`config`] - Filter settings persisted as TOML
//! - [`tracing`] - Subscriber setup, span and field names
//!
//! # Example
//!
//! ```
//! use tabgroup_core::{FilterSettings, Partition, TabGroupModelFilter, TabId, TabModel, VecTabModel};
//!
//! let mut model = VecTabModel::restored_with(Partition::Normal, &[1, 2, 3, 4]);
//! let mut filter = TabGroupModelFilter::from_model(&model, FilterSettings::default())?;
//!
//! filter.merge_tabs(&mut model, TabId(3), TabId(1))?;
//!
//! assert_eq!(model.tab_ids(), vec![TabId(1), TabId(3), TabId(2), TabId(4)]);
//! assert_eq!(filter.group_count(), 3);
//! assert_eq!(filter.real_group_count(), 1);
//! # Ok::<(), tabgroup_core::TabGroupError>(())
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod group;
pub mod model;
pub mod observer;
pub mod session;
pub mod telemetry;
pub mod tracing;

pub use config::FilterSettings;
pub use error::{
    ConfigError, ConfigResult, TabGroupError, TabGroupResult, TelemetryError, TelemetryResult,
};
pub use group::{
    GroupRegistry, GroupingSnapshot, TabGroup, TabGroupModelFilter, Transition, classify,
};
pub use model::{
    GroupId, LaunchCause, Partition, TabId, TabModel, TabMove, TabRecord, VecTabModel,
};
pub use observer::{EventLog, ObserverId, ObserverList, TabGroupEvent, TabGroupObserver};
pub use session::{TabSession, TabStrip};
pub use telemetry::{
    FileSessionCountStore, MemorySessionCountStore, SessionCountStore, SessionTelemetry,
    session_count_key,
};
pub use tracing::{
    TracingConfig, TracingError, TracingLevel, TracingOutput, TracingResult, init_tracing,
};
