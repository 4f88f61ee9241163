//! # Registry Messages
//!
//! Requests sent by [`ResourceManager`](crate::framework::ResourceManager)
//! handles to the [`RegistryActor`](crate::framework::RegistryActor). Each
//! request carries a oneshot sender for its reply; the actor answers them
//! strictly one at a time.

use crate::framework::graph::GraphNode;
use crate::framework::readiness::ReadyState;
use crate::framework::resource::{Initializer, ResourceValue};
use std::sync::Arc;
use tokio::sync::{oneshot, watch};

/// Type alias for the one-shot reply channel used by the registry.
pub type Response<T> = oneshot::Sender<T>;

/// What the registry knows about a name at lookup time.
pub enum Lookup {
    /// Ready, with the value if one was produced.
    Ready(Option<ResourceValue>),
    /// Registered but not ready yet; wait on the receiver.
    Pending(watch::Receiver<ReadyState>),
    /// Never registered and never set.
    Unknown,
}

pub enum RegistryRequest {
    /// Drain the pending queue into the live tables. Replies with the number
    /// of registrations committed.
    Commit { respond_to: Response<usize> },
    /// Copy of every known resource in registration order.
    Snapshot { respond_to: Response<Vec<GraphNode>> },
    Initializer {
        name: String,
        respond_to: Response<Option<Arc<dyn Initializer>>>,
    },
    Lookup {
        name: String,
        respond_to: Response<Lookup>,
    },
    Set {
        name: String,
        value: ResourceValue,
        respond_to: Response<()>,
    },
    /// Fire readiness without a value.
    MarkReady {
        name: String,
        respond_to: Response<()>,
    },
    IsReady {
        name: String,
        respond_to: Response<bool>,
    },
    /// Claim the batch driver. Replies `false` when a run is in progress or done.
    BeginInitialization { respond_to: Response<bool> },
    /// Release the batch driver. Replies with the number of known resources.
    FinishInitialization { respond_to: Response<usize> },
    Shutdown,
}
