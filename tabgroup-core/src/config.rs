//! Filter settings
//!
//! Settings are stored as TOML. Every field has a default, so a partial or
//! missing file yields a usable configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigResult;

/// Behaviour switches for [`TabGroupModelFilter`](crate::TabGroupModelFilter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// New tabs join their parent's group regardless of launch cause.
    pub group_auto_creation: bool,
    /// Count sessions per real group through the telemetry store.
    pub record_session_counts: bool,
    /// File backing the session-count store. In-memory when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_count_store: Option<PathBuf>,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            group_auto_creation: true,
            record_session_counts: false,
            session_count_store: None,
        }
    }
}

impl FilterSettings {
    /// Parses settings from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the document is not valid TOML or a
    /// field has the wrong type.
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Serializes the settings as TOML.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Serialize` if serialization fails.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string(self)?)
    }

    /// Loads settings from a file. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file exists but cannot be read and
    /// `ConfigError::Parse` if it is malformed.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Writes settings to a file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` or `ConfigError::Serialize` on failure.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }
}
