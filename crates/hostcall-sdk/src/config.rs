//! Invoker configuration
//!
//! ```toml
//! thread_policy = "pinned"   # or "serialized"
//! trace_calls = false
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Which threads may invoke native routines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadPolicy {
    /// Only the thread that installed the primitive may invoke
    #[default]
    Pinned,
    /// Any thread may invoke; invocations are serialized by one lock
    /// held from `begin` through result decoding
    Serialized,
}

/// Configuration of an [`Invoker`](crate::Invoker)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InvokerConfig {
    /// Thread admission policy
    pub thread_policy: ThreadPolicy,
    /// Emit a trace event for every invocation
    pub trace_calls: bool,
}

impl InvokerConfig {
    /// Parse from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Set the thread policy
    pub fn with_thread_policy(mut self, policy: ThreadPolicy) -> Self {
        self.thread_policy = policy;
        self
    }

    /// Enable or disable per-call tracing
    pub fn with_trace_calls(mut self, enabled: bool) -> Self {
        self.trace_calls = enabled;
        self
    }
}
