//! Error types for recoverable hostcall conditions
//!
//! State-machine misuse and unsupported result types are programming errors
//! and panic instead of surfacing here.

/// Result type for fallible hostcall operations
pub type Result<T> = std::result::Result<T, HostcallError>;

/// Recoverable hostcall errors
#[derive(Debug, thiserror::Error)]
pub enum HostcallError {
    /// A routine identifier could not be parsed
    #[error("Invalid routine id: {0:?}")]
    InvalidRoutineId(String),

    /// A routine name was registered twice in one catalog
    #[error("Duplicate routine name: {0}")]
    DuplicateRoutine(String),

    /// A text argument contained a NUL byte before its end
    #[error("Text argument contains an interior NUL at byte {0}")]
    InteriorNul(usize),

    /// Configuration could not be parsed
    #[error("Config error: {0}")]
    Config(String),

    /// Configuration file could not be read
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for HostcallError {
    fn from(e: toml::de::Error) -> Self {
        HostcallError::Config(e.to_string())
    }
}
