//! # Observability & Tracing
//!
//! The [`setup_tracing`] function initializes structured logging with the
//! `tracing` crate. Every orchestrator event carries a `resource` field, and
//! lookups run inside a `get_value` span that records the name and timeout.
//!
//! ## What Gets Traced
//!
//! - **Registry lifecycle**: startup, commit, shutdown with final size
//! - **Driver**: each initializer start, success and failure, cycles, and the
//!   final summary (`resources`, `initialized`, `elapsed_ms`, `failed`, `cyclic`,
//!   `cyclic_failed`)
//! - **Lookups**: unregistered names (debug), timeouts and type mismatches (warn)
//!
//! ## Usage Examples
//!
//! ```bash
//! # Startup summary only
//! RUST_LOG=info cargo run
//!
//! # Queue, commit and per-lookup details
//! RUST_LOG=debug cargo run
//!
//! # Filter to the orchestrator
//! RUST_LOG=resource_lifecycle::framework=debug cargo run
//! ```
//!
//! **With `RUST_LOG=info`**:
//!
//! ```text
//! INFO Registry started
//! INFO initialize_all: Initializing resources
//! INFO initialize_all: Ready resource="group_manager"
//! INFO initialize_all: Ready resource="config"
//! INFO initialize_all: Ready resource="ai_client"
//! INFO initialize_all: Ready resource="context_manager"
//! INFO initialize_all: Ready resource="chat_bot"
//! INFO initialize_all: Resource initialization complete resources=5 initialized=5 elapsed_ms=3 failed=[] cyclic=[] cyclic_failed=[]
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // Resource names are carried as fields
        .compact()
        .init();
}
