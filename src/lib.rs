//! # Resource Lifecycle
//!
//! > **Start named subsystems in dependency order, and let anyone wait for them.**
//!
//! This crate provides a process-wide resource registry for async services.
//! Subsystems ("resources") declare a name, the names they depend on and an
//! initializer. At startup the registry runs the initializers in topological
//! order, isolates dependency cycles instead of deadlocking on them, and lets
//! any number of concurrent consumers await a resource with a timeout.
//!
//! ## 🏗️ Design
//!
//! ### One owner for all shared state
//! The tables live inside a [`RegistryActor`](framework::RegistryActor) task and
//! are only touched by its message loop. Handles
//! ([`ResourceManager`](framework::ResourceManager)) send requests and await
//! replies. Initializers run on the caller's side, so a slow network client
//! never blocks lookups of other resources.
//!
//! ### Readiness is a latch
//! Each resource owns a `watch` channel that goes from pending to ready exactly
//! once. Every waiter wakes on the same event, and a later `set` only replaces
//! the value.
//!
//! ### Failures are data
//! A failing or panicking initializer is recorded in the
//! [`InitializationReport`](framework::InitializationReport). Lookups never
//! error: a missing or timed-out resource is `None`, and consumers degrade.
//!
//! ## 🗺️ Module Tour
//!
//! - [`framework`]: registry, driver, dependency graph, lookups, mocks.
//! - [`lifecycle`]: the host side. [`ResourceSystem`](lifecycle::ResourceSystem)
//!   and [`setup_tracing`](lifecycle::setup_tracing).
//! - [`config`]: settings from defaults, `orchestrator.toml` and `ORCHESTRATOR_*` variables.
//! - [`collaborators`]: sample producers and consumers wired through the registry.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run
//! cargo test
//! ```

pub mod collaborators;
pub mod config;
pub mod framework;
pub mod lifecycle;
