//! Bot settings published as the `config` resource.

use crate::framework::{InitError, Registration, ResourceManager};
use std::time::Duration;
use thiserror::Error;

pub const NAME: &str = "config";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BotConfigError {
    #[error("model name is empty")]
    EmptyModel,
    #[error("max_context_size must be greater than zero")]
    ZeroContextSize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BotConfig {
    pub model: String,
    pub max_context_size: usize,
    pub context_ttl: Duration,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            model: "default-chat-model".to_string(),
            max_context_size: 10,
            context_ttl: Duration::from_secs(3600),
        }
    }
}

impl BotConfig {
    pub fn validate(&self) -> Result<(), BotConfigError> {
        if self.model.trim().is_empty() {
            return Err(BotConfigError::EmptyModel);
        }
        if self.max_context_size == 0 {
            return Err(BotConfigError::ZeroContextSize);
        }
        Ok(())
    }
}

/// Publishes the settings through `set` rather than a return value.
/// Invalid settings fail the resource and are never published.
pub fn register(manager: &ResourceManager, config: BotConfig) {
    let handle = manager.clone();
    manager.queue_registration(Registration::new(NAME).initializer(move || {
        let manager = handle.clone();
        let config = config.clone();
        async move {
            config.validate().map_err(InitError::boxed)?;
            manager.set(NAME, config).await?;
            Ok(None)
        }
    }));
}
