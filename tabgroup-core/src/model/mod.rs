//! Tab identities and the external tab model
//!
//! The group engine never owns tab storage. It reads flat-list positions and
//! reads/writes root ids through the [`TabModel`] trait. [`VecTabModel`] is a
//! plain in-memory implementation used by embedders without their own model
//! and by the test suites.

mod tab_model;
mod types;

pub use tab_model::{TabModel, TabRecord, VecTabModel};
pub use types::{GroupId, LaunchCause, Partition, TabId, TabMove};
