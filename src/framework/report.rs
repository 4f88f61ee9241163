//! Outcome of one batch initialization run.

use serde::Serialize;
use std::time::Duration;

/// What [`ResourceManager::initialize_all`](crate::framework::ResourceManager::initialize_all) did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InitializationReport {
    /// Resources whose initializer succeeded, in the order they ran.
    pub initialized: Vec<String>,
    /// Resources outside the topological order (cycle members and their dependents).
    pub cyclic: Vec<String>,
    /// Resources in dependency order whose initializer failed or panicked.
    pub failed: Vec<String>,
    /// Members of `cyclic` whose out-of-order initializer failed.
    pub cyclic_failed: Vec<String>,
    /// Resources known to the registry when the run finished.
    pub resources: usize,
    pub elapsed: Duration,
    /// The host asked the driver to stop before every resource ran.
    pub interrupted: bool,
}

impl InitializationReport {
    pub fn is_clean(&self) -> bool {
        self.cyclic.is_empty() && self.failed.is_empty() && !self.interrupted
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }
}
