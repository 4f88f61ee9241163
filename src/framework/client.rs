//! # Resource Manager
//!
//! The cloneable handle every producer and consumer holds. It forwards table
//! operations to the [`RegistryActor`](crate::framework::RegistryActor) and
//! runs the batch driver and the initializers on the caller's side, so the
//! registry is never blocked by a slow initializer.

use crate::framework::error::{InitError, OrchestratorError};
use crate::framework::graph::{DependencyGraph, ResolvedOrder};
use crate::framework::message::{Lookup, RegistryRequest, Response};
use crate::framework::readiness::{wait_ready, WaitOutcome};
use crate::framework::report::InitializationReport;
use crate::framework::resource::{resource_value, InitResult, Registration, ResourceValue};
use std::any::Any;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, instrument, warn};

/// Lookup timeout used by [`ResourceManager::get_default`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of running one initializer.
#[derive(Debug)]
pub enum InitOutcome {
    Ready,
    Failed(InitError),
    /// No initializer is registered under that name.
    Skipped,
}

/// Handle to the registry.
///
/// Cheap to clone: it holds two channel senders, a shared stop flag and the
/// default lookup timeout. Collaborators receive a clone at construction time
/// and capture further clones inside their initializers.
#[derive(Clone)]
pub struct ResourceManager {
    sender: mpsc::Sender<RegistryRequest>,
    pending: mpsc::UnboundedSender<Registration>,
    stop: Arc<AtomicBool>,
    default_timeout: Duration,
}

impl ResourceManager {
    pub(crate) fn new(sender: mpsc::Sender<RegistryRequest>, pending: mpsc::UnboundedSender<Registration>) -> Self {
        Self {
            sender,
            pending,
            stop: Arc::new(AtomicBool::new(false)),
            default_timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    async fn request<T>(&self, build: impl FnOnce(Response<T>) -> RegistryRequest) -> Result<T, OrchestratorError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| OrchestratorError::RegistryClosed)?;
        response.await.map_err(|_| OrchestratorError::RegistryDropped)
    }

    // --- Registration intake ---

    /// Appends a registration to the pending queue. Never blocks; the
    /// registration takes effect at the next [`commit_all`](Self::commit_all).
    /// Lookups of a queued name wait for it like any other pending resource.
    pub fn queue_registration(&self, registration: Registration) {
        debug!(resource = %registration.name(), dependencies = ?registration.dependencies(), "Queued");
        if self.pending.send(registration).is_err() {
            warn!("Registry closed, registration discarded");
        }
    }

    /// Shorthand for queueing a registration with dependencies and an async initializer.
    pub fn register<I, S, F, Fut>(&self, name: &str, dependencies: I, initializer: F)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = InitResult> + Send + 'static,
    {
        self.queue_registration(Registration::new(name).depends_on(dependencies).initializer(initializer));
    }

    /// Moves every queued registration into the live tables, in arrival order.
    pub async fn commit_all(&self) -> Result<usize, OrchestratorError> {
        self.request(|respond_to| RegistryRequest::Commit { respond_to }).await
    }

    // --- Dependency resolution ---

    /// Topological order plus cyclic set, computed on a snapshot of the
    /// committed registrations.
    pub async fn resolve_order(&self) -> Result<ResolvedOrder, OrchestratorError> {
        let snapshot = self
            .request(|respond_to| RegistryRequest::Snapshot { respond_to })
            .await?;
        Ok(DependencyGraph::build(&snapshot).resolve())
    }

    // --- Initialization driver ---

    /// Commits pending registrations and runs every initializer once.
    ///
    /// Returns `Ok(None)` when another run is in progress or has completed.
    /// Failures never abort the run; they are collected in the report.
    #[instrument(skip(self))]
    pub async fn initialize_all(&self) -> Result<Option<InitializationReport>, OrchestratorError> {
        let claimed = self
            .request(|respond_to| RegistryRequest::BeginInitialization { respond_to })
            .await?;
        if !claimed {
            debug!("Initialization already running or completed");
            return Ok(None);
        }

        let started = Instant::now();
        info!("Initializing resources");

        self.commit_all().await?;
        let resolved = self.resolve_order().await?;
        let mut report = InitializationReport {
            cyclic: resolved.cyclic.clone(),
            ..Default::default()
        };

        for name in &resolved.order {
            if self.stop_requested() {
                warn!(resource = %name, "Stop requested, initialization interrupted");
                report.interrupted = true;
                break;
            }
            match self.run_one(name).await {
                InitOutcome::Ready => report.initialized.push(name.clone()),
                InitOutcome::Failed(_) => report.failed.push(name.clone()),
                InitOutcome::Skipped => {}
            }
        }

        if !report.interrupted && !resolved.cyclic.is_empty() {
            warn!(cyclic = ?resolved.cyclic, "Dependency cycle detected, initializing outside dependency order");
            for name in &resolved.cyclic {
                if self.stop_requested() {
                    warn!(resource = %name, "Stop requested, initialization interrupted");
                    report.interrupted = true;
                    break;
                }
                debug!(resource = %name, "Initializing cyclic resource");
                match self.run_one(name).await {
                    InitOutcome::Ready => report.initialized.push(name.clone()),
                    InitOutcome::Failed(e) => {
                        error!(resource = %name, error = %e, "Cyclic resource failed outside dependency order");
                        report.cyclic_failed.push(name.clone());
                    }
                    InitOutcome::Skipped => {}
                }
            }
        }

        report.resources = self
            .request(|respond_to| RegistryRequest::FinishInitialization { respond_to })
            .await?;
        report.elapsed = started.elapsed();

        info!(
            resources = report.resources,
            initialized = report.initialized.len(),
            elapsed_ms = report.elapsed_ms(),
            failed = ?report.failed,
            cyclic = ?report.cyclic,
            cyclic_failed = ?report.cyclic_failed,
            "Resource initialization complete"
        );
        Ok(Some(report))
    }

    /// Runs the initializer of `name`. Returns `true` when it succeeded.
    pub async fn init_one(&self, name: &str) -> bool {
        matches!(self.run_one(name).await, InitOutcome::Ready)
    }

    /// Runs the initializer of `name` in its own task and stores the result.
    ///
    /// Panics inside the initializer are reported as [`InitError::Panicked`].
    pub async fn run_one(&self, name: &str) -> InitOutcome {
        let initializer = match self
            .request(|respond_to| RegistryRequest::Initializer {
                name: name.to_string(),
                respond_to,
            })
            .await
        {
            Ok(Some(initializer)) => initializer,
            Ok(None) => {
                debug!(resource = %name, "No initializer registered");
                return InitOutcome::Skipped;
            }
            Err(e) => {
                error!(resource = %name, error = %e, "Initializer lookup failed");
                return InitOutcome::Failed(e.into());
            }
        };

        debug!(resource = %name, "Initializing");
        let result = tokio::spawn(async move { initializer.initialize().await })
            .await
            .unwrap_or_else(|e| Err(InitError::Panicked(e.to_string())));

        let stored = match result {
            Ok(Some(value)) => self.set_value(name, value).await,
            Ok(None) => {
                self.request(|respond_to| RegistryRequest::MarkReady {
                    name: name.to_string(),
                    respond_to,
                })
                .await
            }
            Err(e) => {
                error!(resource = %name, error = %e, "Initializer failed");
                return InitOutcome::Failed(e);
            }
        };

        match stored {
            Ok(()) => {
                info!(resource = %name, "Ready");
                InitOutcome::Ready
            }
            Err(e) => {
                error!(resource = %name, error = %e, "Could not store resource");
                InitOutcome::Failed(e.into())
            }
        }
    }

    /// Asks a running driver to stop after the current resource.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// `true` once the registry task has exited.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    // --- Lookup ---

    /// Returns the value of `name`, waiting up to `timeout` for it to become
    /// ready. Names that were never queued, registered or set return `None`
    /// immediately.
    #[instrument(skip(self))]
    pub async fn get_value(&self, name: &str, timeout: Duration) -> Option<ResourceValue> {
        let lookup = match self
            .request(|respond_to| RegistryRequest::Lookup {
                name: name.to_string(),
                respond_to,
            })
            .await
        {
            Ok(lookup) => lookup,
            Err(e) => {
                warn!(error = %e, "Lookup failed");
                return None;
            }
        };

        match lookup {
            Lookup::Ready(value) => value,
            Lookup::Unknown => {
                debug!("Resource not registered");
                None
            }
            Lookup::Pending(receiver) => match wait_ready(receiver, timeout).await {
                WaitOutcome::Ready(value) => value,
                WaitOutcome::TimedOut => {
                    warn!(timeout_ms = timeout.as_millis() as u64, "Timed out waiting for resource");
                    None
                }
                WaitOutcome::Closed => {
                    warn!("Registry closed while waiting for resource");
                    None
                }
            },
        }
    }

    /// Typed lookup. A value of another type is reported as absent.
    pub async fn get<T: Any + Send + Sync>(&self, name: &str, timeout: Duration) -> Option<Arc<T>> {
        let value = self.get_value(name, timeout).await?;
        match value.downcast::<T>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(resource = %name, expected = std::any::type_name::<T>(), "Resource has a different type");
                None
            }
        }
    }

    /// Typed lookup with the default timeout.
    pub async fn get_default<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.get(name, self.default_timeout).await
    }

    /// Like [`get`](Self::get), but turns absence into
    /// [`InitError::MissingDependency`] for use inside initializers.
    pub async fn require<T: Any + Send + Sync>(&self, name: &str, timeout: Duration) -> Result<Arc<T>, InitError> {
        self.get(name, timeout)
            .await
            .ok_or_else(|| InitError::MissingDependency(name.to_string()))
    }

    pub async fn is_ready(&self, name: &str) -> bool {
        self.request(|respond_to| RegistryRequest::IsReady {
            name: name.to_string(),
            respond_to,
        })
        .await
        .unwrap_or(false)
    }

    // --- Direct set ---

    /// Stores `value` under `name` and fires its readiness.
    pub async fn set<T: Any + Send + Sync>(&self, name: &str, value: T) -> Result<(), OrchestratorError> {
        self.set_value(name, resource_value(value)).await
    }

    /// Same as [`set`](Self::set) for a value that is already type-erased.
    pub async fn set_value(&self, name: &str, value: ResourceValue) -> Result<(), OrchestratorError> {
        self.request(|respond_to| RegistryRequest::Set {
            name: name.to_string(),
            value,
            respond_to,
        })
        .await
    }

    /// Stops the registry task. Waiting lookups resolve to `None`.
    pub async fn shutdown(&self) -> Result<(), OrchestratorError> {
        self.request_stop();
        self.sender
            .send(RegistryRequest::Shutdown)
            .await
            .map_err(|_| OrchestratorError::RegistryClosed)
    }
}
