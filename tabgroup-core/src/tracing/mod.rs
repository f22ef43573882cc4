//! Tracing integration for group operations
//!
//! Mutation API calls open spans named in [`span_names`]; classification and
//! registry decisions are logged as events inside those spans. Embedders call
//! [`init_tracing`] once to install a subscriber, or install their own.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Set once a subscriber has been installed by [`init_tracing`].
static TRACING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Target used by the default filter.
pub const CRATE_TARGET: &str = "tabgroup_core";

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    /// Failed to initialize tracing subscriber
    #[error("Failed to initialize tracing: {0}")]
    InitializationFailed(String),

    /// Tracing already initialized
    #[error("Tracing has already been initialized")]
    AlreadyInitialized,

    /// Failed to create log file
    #[error("Failed to create log file: {0}")]
    FileCreationFailed(String),

    /// Level name that is not a filter directive
    #[error("Unknown tracing level: {0:?}")]
    UnknownLevel(String),
}

/// Result type for tracing operations
pub type TracingResult<T> = Result<T, TracingError>;

/// Tracing log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TracingLevel {
    /// Only errors
    Error,
    /// Recoverable oddities such as overwritten pending selections
    Warn,
    /// Group creation and merge completion (default)
    #[default]
    Info,
    /// Classification decisions
    Debug,
    /// Observer dispatch
    Trace,
}

impl TracingLevel {
    const ALL: [Self; 5] = [Self::Error, Self::Warn, Self::Info, Self::Debug, Self::Trace];

    /// Directive spelling of the level, as used in `EnvFilter` strings
    #[must_use]
    pub const fn directive(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl std::str::FromStr for TracingLevel {
    type Err = TracingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        if wanted == "warning" {
            return Ok(Self::Warn);
        }
        Self::ALL
            .into_iter()
            .find(|level| level.directive() == wanted)
            .ok_or_else(|| TracingError::UnknownLevel(s.to_string()))
    }
}

impl std::fmt::Display for TracingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.directive())
    }
}

/// Output destination for tracing logs
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TracingOutput {
    /// Output to stdout
    Stdout,
    /// Output to stderr
    #[default]
    Stderr,
    /// Output to a file, truncated on init
    File {
        /// Path to the log file
        path: PathBuf,
    },
}

/// Configuration for tracing initialization
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Log level for this crate
    pub level: TracingLevel,
    /// Output destination
    pub output: TracingOutput,
    /// Include thread ids in records
    pub thread_ids: bool,
    /// Include the record target (module path)
    pub targets: bool,
    /// Custom filter string (overrides level if set)
    pub filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: TracingLevel::Info,
            output: TracingOutput::Stderr,
            thread_ids: false,
            targets: true,
            filter: None,
        }
    }
}

impl TracingConfig {
    /// Creates a new tracing configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the log level
    #[must_use]
    pub const fn with_level(mut self, level: TracingLevel) -> Self {
        self.level = level;
        self
    }

    /// Sets the output destination
    #[must_use]
    pub fn with_output(mut self, output: TracingOutput) -> Self {
        self.output = output;
        self
    }

    /// Enables or disables thread ids
    #[must_use]
    pub const fn with_thread_ids(mut self, enabled: bool) -> Self {
        self.thread_ids = enabled;
        self
    }

    /// Enables or disables targets
    #[must_use]
    pub const fn with_targets(mut self, enabled: bool) -> Self {
        self.targets = enabled;
        self
    }

    /// Sets a custom filter string
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Builds the filter directive: the custom filter if set, otherwise
    /// `tabgroup_core=<level>`.
    #[must_use]
    pub fn filter_directive(&self) -> String {
        self.filter
            .clone()
            .unwrap_or_else(|| format!("{CRATE_TARGET}={}", self.level))
    }
}

/// Initializes the tracing subscriber with the given configuration
///
/// Call once at startup. Subsequent calls return an error.
///
/// # Errors
///
/// Returns an error if:
/// - Tracing has already been initialized
/// - The custom filter does not parse
/// - File output is configured but the file cannot be created
/// - Another global subscriber is already installed
pub fn init_tracing(config: &TracingConfig) -> TracingResult<()> {
    if TRACING_INITIALIZED.swap(true, Ordering::SeqCst) {
        return Err(TracingError::AlreadyInitialized);
    }

    if let Err(err) = install_subscriber(config) {
        TRACING_INITIALIZED.store(false, Ordering::SeqCst);
        return Err(err);
    }

    tracing::info!(level = %config.level, output = ?config.output, "Tracing initialized");
    Ok(())
}

fn install_subscriber(config: &TracingConfig) -> TracingResult<()> {
    let filter = match config.filter {
        Some(ref custom) => EnvFilter::try_new(custom)
            .map_err(|e| TracingError::InitializationFailed(e.to_string()))?,
        None => EnvFilter::try_new(config.filter_directive())
            .unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let (writer, ansi) = match &config.output {
        TracingOutput::Stdout => (BoxMakeWriter::new(std::io::stdout), true),
        TracingOutput::Stderr => (BoxMakeWriter::new(std::io::stderr), true),
        TracingOutput::File { path } => {
            let file = std::fs::File::create(path)
                .map_err(|e| TracingError::FileCreationFailed(e.to_string()))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(config.targets)
                .with_level(true)
                .with_thread_ids(config.thread_ids)
                .with_ansi(ansi)
                .with_writer(writer),
        )
        .try_init()
        .map_err(|e| TracingError::InitializationFailed(e.to_string()))
}

/// Macro for creating operation spans with standard fields
///
/// # Examples
///
/// ```ignore
/// use tabgroup_core::trace_operation;
/// use tabgroup_core::tracing::span_names;
///
/// let _span = trace_operation!(span_names::MERGE_TABS,
///     tab = %source,
///     destination = %destination
/// )
/// .entered();
/// ```
#[macro_export]
macro_rules! trace_operation {
    ($name:expr) => {
        tracing::info_span!($name)
    };
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}

/// Debug-level variant of `trace_operation!` for raw model notifications.
#[macro_export]
macro_rules! trace_operation_debug {
    ($name:expr) => {
        tracing::debug_span!($name)
    };
    ($name:expr, $($field:tt)*) => {
        tracing::debug_span!($name, $($field)*)
    };
}

/// Standard span names for group operations
pub mod span_names {
    /// Merge of one group into another
    pub const MERGE_TABS: &str = "group.merge_tabs";
    /// Merge of an explicit tab list into a group
    pub const MERGE_LIST: &str = "group.merge_list";
    /// Tab leaving its group
    pub const MOVE_OUT_OF_GROUP: &str = "group.move_out";
    /// Whole-group move
    pub const MOVE_RELATED_TABS: &str = "group.move_related_tabs";
    /// Undo of a merge for one tab
    pub const UNDO_GROUP: &str = "group.undo";
    /// Full registry rebuild
    pub const RESET: &str = "group.reset";
    /// Raw move notification
    pub const DID_MOVE_TAB: &str = "model.did_move_tab";
    /// Raw add notification
    pub const DID_ADD_TAB: &str = "model.did_add_tab";
    /// Raw close notification
    pub const DID_CLOSE_TAB: &str = "model.did_close_tab";
}
