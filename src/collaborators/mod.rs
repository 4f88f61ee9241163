//! Sample producers and consumers.
//!
//! These are stand-ins for the chat plugin's subsystems. Each one queues its
//! registration against a [`ResourceManager`] handle and later fetches its
//! dependencies through it. Their payloads are deliberately thin; what they
//! exercise is the registration contract and the fail-soft lookups.

pub mod ai_client;
pub mod chat_bot;
pub mod config;
pub mod context_manager;
pub mod group_manager;

use crate::config::OrchestratorConfig;
use crate::framework::ResourceManager;

/// Queues every collaborator. Order does not matter.
pub fn register_all(manager: &ResourceManager, settings: &OrchestratorConfig) {
    chat_bot::register(manager);
    ai_client::register(manager);
    context_manager::register(manager, settings.cleanup_interval());
    group_manager::register(manager);
    config::register(manager, config::BotConfig::default());
}
