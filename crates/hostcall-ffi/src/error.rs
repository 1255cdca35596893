//! Errors reported across the C boundary

use hostcall_sdk::HostcallError;

/// Errors raised while setting up hostcall from C
#[derive(Debug, thiserror::Error)]
pub enum FfiError {
    /// A required pointer argument was null
    #[error("Invalid arguments (null {0})")]
    NullArgument(&'static str),

    /// A string argument was not valid UTF-8
    #[error("Invalid UTF-8 in {0}")]
    InvalidUtf8(&'static str),

    /// The primitive table is missing an entry
    #[error("Missing native call primitive: {0}")]
    MissingPrimitive(&'static str),

    /// Host configuration could not be parsed
    #[error("Config error: {0}")]
    Config(String),

    /// Logging could not be initialized
    #[error("Logging error: {0}")]
    Logging(String),

    /// Error from the SDK layer
    #[error(transparent)]
    Hostcall(#[from] HostcallError),
}

impl From<toml::de::Error> for FfiError {
    fn from(e: toml::de::Error) -> Self {
        FfiError::Config(e.to_string())
    }
}
