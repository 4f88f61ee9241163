//! # Host Lifecycle
//!
//! The host process owns exactly one registry. [`ResourceSystem`] spawns it,
//! hands out [`ResourceManager`] handles to collaborators, drives startup once
//! and shuts the registry down.
//!
//! ```rust,ignore
//! let config = ConfigLoader::new().load()?;
//! let system = ResourceSystem::new(&config);
//!
//! // 1. Collaborators queue their registrations (any order)
//! collaborators::register_all(&system.manager, &config);
//!
//! // 2. Commit + initialize, exactly once
//! let report = system.start().await;
//!
//! // 3. Consumers fetch what they need, failing soft
//! if let Some(bot) = system.manager.get_default::<ChatBot>("chat_bot").await { /* ... */ }
//!
//! system.shutdown().await?;
//! ```
//!
//! Startup never aborts the host: failed and cyclic resources are logged and
//! reported, and the process continues with whatever became ready.

pub mod tracing;

pub use self::tracing::*;

use crate::config::OrchestratorConfig;
use crate::framework::{InitializationReport, RegistryActor, ResourceManager};
use ::tracing::{error, info, warn};

pub struct ResourceSystem {
    /// Handle for collaborators and consumers.
    pub manager: ResourceManager,

    /// Registry task handle (used for shutdown).
    handle: tokio::task::JoinHandle<()>,
}

impl ResourceSystem {
    /// Spawns the registry task. Must be called inside a Tokio runtime.
    pub fn new(config: &OrchestratorConfig) -> Self {
        let (actor, manager) = RegistryActor::new(config.buffer_size);
        let manager = manager.with_default_timeout(config.default_timeout());
        let handle = tokio::spawn(actor.run());
        Self { manager, handle }
    }

    /// Commits every queued registration and runs the initializers.
    ///
    /// Returns `None` if startup already ran or the registry is gone.
    pub async fn start(&self) -> Option<InitializationReport> {
        match self.manager.initialize_all().await {
            Ok(Some(report)) => {
                if !report.failed.is_empty() {
                    warn!(failed = ?report.failed, "Some resources failed to initialize");
                }
                if !report.cyclic.is_empty() {
                    warn!(
                        cyclic = ?report.cyclic,
                        cyclic_failed = ?report.cyclic_failed,
                        "Some resources have cyclic dependencies"
                    );
                }
                Some(report)
            }
            Ok(None) => {
                warn!("Startup already ran");
                None
            }
            Err(e) => {
                error!(error = %e, "Startup failed");
                None
            }
        }
    }

    /// Stops the registry and waits for its task.
    ///
    /// # Returns
    ///
    /// - `Ok(())` if the registry shut down cleanly
    /// - `Err(String)` if the registry task failed or panicked
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down registry...");

        // Initializers may hold handles, so closing channels is not enough.
        if let Err(e) = self.manager.shutdown().await {
            warn!(error = %e, "Registry already closed");
        }

        if let Err(e) = self.handle.await {
            error!("Registry task failed: {:?}", e);
            return Err(format!("Registry task failed: {:?}", e));
        }

        info!("Registry shutdown complete.");
        Ok(())
    }
}
