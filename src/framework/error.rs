//! # Orchestrator Errors
//!
//! Error types shared by the registry, the initialization driver and the
//! resource producers. Lookups never surface these to callers: a missing or
//! timed-out resource is reported as `None`.

use thiserror::Error;

/// Errors raised when talking to the registry task itself.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrchestratorError {
    #[error("Registry closed")]
    RegistryClosed,
    #[error("Registry dropped response channel")]
    RegistryDropped,
}

/// Errors an initializer can report.
///
/// The driver converts every variant into a failure outcome; none of them
/// abort the batch.
#[derive(Debug, Error)]
pub enum InitError {
    /// The initializer gave up with a message.
    #[error("Initializer failed: {0}")]
    Failed(String),

    /// A resource the initializer needs was absent or timed out.
    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    /// The initializer task panicked.
    #[error("Initializer panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Registry(#[from] OrchestratorError),

    /// Any other error, kept as its source.
    #[error("Initializer error: {0}")]
    Source(Box<dyn std::error::Error + Send + Sync>),
}

impl InitError {
    pub fn boxed(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        InitError::Source(Box::new(err))
    }
}

impl From<String> for InitError {
    fn from(msg: String) -> Self {
        InitError::Failed(msg)
    }
}

impl From<&str> for InitError {
    fn from(msg: &str) -> Self {
        InitError::Failed(msg.to_string())
    }
}
