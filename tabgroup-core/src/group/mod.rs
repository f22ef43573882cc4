//! The tab group engine
//!
//! - [`TabGroup`] - members and representative of one group
//! - [`GroupRegistry`] - group records plus the dense grouped-view index
//! - [`classifier`] - pure classification of raw moves into semantic events
//! - [`TabGroupModelFilter`] - mutation API and raw model notifications

pub mod classifier;
mod filter;
mod registry;
mod tab_group;

pub use classifier::{GroupShape, GroupingSnapshot, Transition, classify};
pub use filter::TabGroupModelFilter;
pub use registry::{GroupRegistry, Insertion, Removal};
pub use tab_group::TabGroup;
