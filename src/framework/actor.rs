//! # Registry Actor
//!
//! The `RegistryActor` owns every shared table of the orchestrator: the
//! committed registrations, the readiness latches and the driver flags. It
//! processes [`RegistryRequest`]s sequentially in its own Tokio task, which
//! makes the task itself the single critical section. No initializer ever
//! runs inside it; the driver only fetches what it needs and runs the
//! initializer elsewhere.
//!
//! Before handling each request the actor drains the registration queue into
//! a staging list and opens a pending latch for every staged name. Consumers
//! asking for a resource that is queued but not yet committed therefore wait
//! for it instead of seeing an unknown name.

use crate::framework::client::ResourceManager;
use crate::framework::graph::GraphNode;
use crate::framework::message::{Lookup, RegistryRequest};
use crate::framework::readiness::ReadinessLatch;
use crate::framework::resource::{Initializer, Registration};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

struct Declaration {
    dependencies: Vec<String>,
    initializer: Option<Arc<dyn Initializer>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DriverPhase {
    Idle,
    InProgress,
    Completed,
}

pub struct RegistryActor {
    receiver: mpsc::Receiver<RegistryRequest>,
    pending: mpsc::UnboundedReceiver<Registration>,
    /// Queued registrations seen by the actor but not committed yet.
    staged: Vec<Registration>,
    /// Names in first-registration order, then names only ever `set`.
    order: Vec<String>,
    declarations: HashMap<String, Declaration>,
    entries: HashMap<String, ReadinessLatch>,
    phase: DriverPhase,
}

impl RegistryActor {
    /// Creates a new `RegistryActor` and the first [`ResourceManager`] handle.
    ///
    /// # Arguments
    ///
    /// * `buffer_size` - Capacity of the request channel. When it is full,
    ///   handle calls wait until there is space.
    ///
    /// The registration queue is unbounded so that queueing never blocks.
    pub fn new(buffer_size: usize) -> (Self, ResourceManager) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (pending_sender, pending) = mpsc::unbounded_channel();
        let actor = Self {
            receiver,
            pending,
            staged: Vec::new(),
            order: Vec::new(),
            declarations: HashMap::new(),
            entries: HashMap::new(),
            phase: DriverPhase::Idle,
        };
        let manager = ResourceManager::new(sender, pending_sender);
        (actor, manager)
    }

    /// Runs the registry loop until every handle is dropped or a
    /// `Shutdown` request arrives.
    pub async fn run(mut self) {
        info!("Registry started");

        while let Some(msg) = self.receiver.recv().await {
            self.stage();
            match msg {
                RegistryRequest::Commit { respond_to } => {
                    let committed = self.commit();
                    let _ = respond_to.send(committed);
                }
                RegistryRequest::Snapshot { respond_to } => {
                    let _ = respond_to.send(self.snapshot());
                }
                RegistryRequest::Initializer { name, respond_to } => {
                    let initializer = self
                        .declarations
                        .get(&name)
                        .and_then(|declaration| declaration.initializer.clone());
                    let _ = respond_to.send(initializer);
                }
                RegistryRequest::Lookup { name, respond_to } => {
                    let lookup = match self.entries.get(&name) {
                        Some(latch) if latch.is_ready() => Lookup::Ready(latch.state().value()),
                        Some(latch) => Lookup::Pending(latch.subscribe()),
                        None => Lookup::Unknown,
                    };
                    let _ = respond_to.send(lookup);
                }
                RegistryRequest::Set {
                    name,
                    value,
                    respond_to,
                } => {
                    self.latch(&name).set(value);
                    debug!(resource = %name, "Set");
                    let _ = respond_to.send(());
                }
                RegistryRequest::MarkReady { name, respond_to } => {
                    self.latch(&name).mark_ready();
                    debug!(resource = %name, "Ready");
                    let _ = respond_to.send(());
                }
                RegistryRequest::IsReady { name, respond_to } => {
                    let ready = self.entries.get(&name).is_some_and(ReadinessLatch::is_ready);
                    let _ = respond_to.send(ready);
                }
                RegistryRequest::BeginInitialization { respond_to } => {
                    let claimed = self.phase == DriverPhase::Idle;
                    if claimed {
                        self.phase = DriverPhase::InProgress;
                    } else {
                        debug!(phase = ?self.phase, "Initialization already claimed");
                    }
                    let _ = respond_to.send(claimed);
                }
                RegistryRequest::FinishInitialization { respond_to } => {
                    self.phase = DriverPhase::Completed;
                    let _ = respond_to.send(self.entries.len());
                }
                RegistryRequest::Shutdown => break,
            }
        }

        info!(size = self.entries.len(), "Shutdown");
    }

    /// Moves queued registrations into the staging list.
    fn stage(&mut self) {
        while let Ok(registration) = self.pending.try_recv() {
            self.latch(registration.name());
            self.staged.push(registration);
        }
    }

    fn commit(&mut self) -> usize {
        self.stage();
        let mut committed = 0;
        for registration in std::mem::take(&mut self.staged) {
            let Registration {
                name,
                dependencies,
                initializer,
                value,
            } = registration;

            if self.declarations.contains_key(&name) {
                debug!(resource = %name, "Registration replaced");
            }

            let latch = self.latch(&name);
            match value {
                Some(value) => latch.set(value),
                None if initializer.is_none() => latch.mark_ready(),
                None => {}
            }
            self.declarations.insert(
                name,
                Declaration {
                    dependencies,
                    initializer,
                },
            );
            committed += 1;
        }

        if committed > 0 {
            debug!(committed, size = self.entries.len(), "Committed");
        }
        committed
    }

    fn snapshot(&self) -> Vec<GraphNode> {
        self.order
            .iter()
            .filter(|name| self.declarations.contains_key(*name) || !self.is_staged(name))
            .map(|name| match self.declarations.get(name) {
                Some(declaration) => GraphNode {
                    name: name.clone(),
                    dependencies: declaration.dependencies.clone(),
                    has_initializer: declaration.initializer.is_some(),
                },
                None => GraphNode {
                    name: name.clone(),
                    dependencies: Vec::new(),
                    has_initializer: false,
                },
            })
            .collect()
    }

    fn is_staged(&self, name: &str) -> bool {
        self.staged.iter().any(|registration| registration.name() == name)
    }

    /// Latch for `name`, created on first use.
    fn latch(&mut self, name: &str) -> &ReadinessLatch {
        if !self.entries.contains_key(name) && !self.order.iter().any(|n| n == name) {
            self.order.push(name.to_string());
        }
        self.entries
            .entry(name.to_string())
            .or_insert_with(ReadinessLatch::new)
    }
}
