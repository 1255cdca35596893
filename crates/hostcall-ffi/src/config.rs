//! Host configuration file
//!
//! ```toml
//! [invoker]
//! thread_policy = "pinned"
//! trace_calls = false
//!
//! [logging]
//! level = "info"
//! console = true
//! file = "hostcall.log"
//!
//! [routines]
//! WAIT = "0x4EDE34FBADD967A6"
//! ```

use std::path::Path;

use hostcall_sdk::{InvokerConfig, RoutineCatalog};
use serde::Deserialize;

use crate::error::FfiError;
use crate::logging::LogConfig;

/// Everything the host configures through `hostcall_install`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    /// Invoker settings
    pub invoker: InvokerConfig,
    /// Logging settings
    pub logging: LogConfig,
    /// Symbolic routine names
    pub routines: toml::Table,
}

impl HostConfig {
    /// Parse from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, FfiError> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FfiError> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| FfiError::Config(format!("{}: {}", path.as_ref().display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Build the routine catalog from the `[routines]` table
    pub fn catalog(&self) -> Result<RoutineCatalog, FfiError> {
        Ok(RoutineCatalog::from_toml_table(self.routines.clone())?)
    }
}
