//! # Readiness Latch
//!
//! A one-shot, broadcast, level-triggered latch built on [`tokio::sync::watch`].
//! The latch carries the resource value, so a waiter that wakes up already
//! holds what it was waiting for. Once a latch is ready it never goes back to
//! pending.

use crate::framework::resource::ResourceValue;
use std::time::Duration;
use tokio::sync::watch;

/// The observable state of one resource.
#[derive(Clone)]
pub enum ReadyState {
    Pending,
    /// Ready, with the value if one was produced.
    Ready(Option<ResourceValue>),
}

impl ReadyState {
    pub fn is_ready(&self) -> bool {
        matches!(self, ReadyState::Ready(_))
    }

    pub fn value(&self) -> Option<ResourceValue> {
        match self {
            ReadyState::Ready(value) => value.clone(),
            ReadyState::Pending => None,
        }
    }
}

/// Owner side of a latch. Lives in the registry table.
pub(crate) struct ReadinessLatch {
    state: watch::Sender<ReadyState>,
}

impl ReadinessLatch {
    pub(crate) fn new() -> Self {
        let (state, _) = watch::channel(ReadyState::Pending);
        Self { state }
    }

    pub(crate) fn state(&self) -> ReadyState {
        self.state.borrow().clone()
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.state.borrow().is_ready()
    }

    /// Stores `value` and fires the latch. Firing an already-ready latch only
    /// replaces the value.
    pub(crate) fn set(&self, value: ResourceValue) {
        self.state.send_replace(ReadyState::Ready(Some(value)));
    }

    /// Fires the latch without touching a value stored earlier.
    pub(crate) fn mark_ready(&self) {
        self.state.send_if_modified(|state| match state {
            ReadyState::Pending => {
                *state = ReadyState::Ready(None);
                true
            }
            ReadyState::Ready(_) => false,
        });
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<ReadyState> {
        self.state.subscribe()
    }
}

/// Result of a bounded wait on a latch.
pub(crate) enum WaitOutcome {
    Ready(Option<ResourceValue>),
    TimedOut,
    /// The registry went away before the latch fired.
    Closed,
}

pub(crate) async fn wait_ready(mut receiver: watch::Receiver<ReadyState>, timeout: Duration) -> WaitOutcome {
    let wait = async {
        receiver
            .wait_for(ReadyState::is_ready)
            .await
            .map(|state| state.value())
    };
    match tokio::time::timeout(timeout, wait).await {
        Ok(Ok(value)) => WaitOutcome::Ready(value),
        Ok(Err(_)) => WaitOutcome::Closed,
        Err(_) => WaitOutcome::TimedOut,
    }
}
