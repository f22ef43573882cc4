//! Error types for tab group operations
//!
//! Every mutation on the group index either completes fully or fails with one
//! of these errors before touching the tab model or the registry.

use thiserror::Error;

use crate::model::{Partition, TabId};

/// Errors returned by the tab group filter and its mutation API.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TabGroupError {
    /// The tab is not present in the tab model or the group registry.
    #[error("tab not found: {0}")]
    TabNotFound(TabId),

    /// The operation mixes tabs from two partitions (normal and private).
    #[error("tab {tab} belongs to the {actual} partition, expected {expected}")]
    CrossPartitionOperation {
        /// Offending tab
        tab: TabId,
        /// Partition the operation runs in
        expected: Partition,
        /// Partition the tab actually belongs to
        actual: Partition,
    },

    /// A flat-list position is outside of the model.
    #[error("invalid index {index} for a tab model with {count} tabs")]
    InvalidIndex {
        /// Requested position
        index: usize,
        /// Number of tabs in the model
        count: usize,
    },

    /// Registry and tab model disagree. This is a programming error.
    #[error("inconsistent group state: {0}")]
    InconsistentState(String),

    /// The tab model has not finished its initial population.
    #[error("tab model has not been restored yet")]
    NotRestored,
}

/// Result type for tab group operations
pub type TabGroupResult<T> = std::result::Result<T, TabGroupError>;

/// Errors loading or saving [`FilterSettings`](crate::config::FilterSettings).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the settings file failed.
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid TOML for the settings schema.
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    /// Settings could not be serialized.
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Errors raised by session-count stores.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Reading or writing the store file failed.
    #[error("session count store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store file is corrupt.
    #[error("failed to parse session count store: {0}")]
    Parse(#[from] toml::de::Error),

    /// The store could not be serialized.
    #[error("failed to serialize session count store: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Result type for telemetry store operations
pub type TelemetryResult<T> = std::result::Result<T, TelemetryError>;
