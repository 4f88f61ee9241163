//! Resource lifecycle orchestration.
//!
//! This module provides the registry that starts named resources in
//! dependency order, tracks their readiness and lets consumers wait for them.
//!
//! # Main Components
//!
//! - [`Registration`] / [`Initializer`] - What producers declare
//! - [`RegistryActor`] - Owns the shared tables and serializes every mutation
//! - [`ResourceManager`] - Cloneable handle: intake, driver, lookup and set
//! - [`DependencyGraph`] - Kahn's algorithm with cycle isolation
//! - [`InitializationReport`] - Outcome of a batch run
//! - [`OrchestratorError`] / [`InitError`] - Error types
//!
//! # Testing
//!
//! See [`mock`] for scripted initializers.

pub mod actor;
pub mod client;
pub mod error;
pub mod graph;
pub mod message;
pub mod mock;
pub mod readiness;
pub mod report;
pub mod resource;

pub use actor::RegistryActor;
pub use client::{InitOutcome, ResourceManager, DEFAULT_TIMEOUT};
pub use error::{InitError, OrchestratorError};
pub use graph::{DependencyGraph, GraphNode, ResolvedOrder};
pub use readiness::ReadyState;
pub use report::InitializationReport;
pub use resource::{resource_value, InitResult, Initializer, Registration, ResourceValue, SyncInitializer};
