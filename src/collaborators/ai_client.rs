//! Chat-completion client stand-in, published as `ai_client`.

use crate::collaborators::config::{self, BotConfig};
use crate::framework::{resource_value, ResourceManager};

pub const NAME: &str = "ai_client";

#[derive(Debug, Clone, PartialEq)]
pub struct AiClient {
    pub model: String,
}

impl AiClient {
    pub fn new(config: &BotConfig) -> Self {
        Self {
            model: config.model.clone(),
        }
    }

    pub fn complete(&self, prompt: &str) -> String {
        format!("[{}] {}", self.model, prompt)
    }
}

/// Cannot start without `config`.
pub fn register(manager: &ResourceManager) {
    let handle = manager.clone();
    manager.register(NAME, [config::NAME], move || {
        let manager = handle.clone();
        async move {
            let config = manager
                .require::<BotConfig>(config::NAME, manager.default_timeout())
                .await?;
            Ok(Some(resource_value(AiClient::new(&config))))
        }
    });
}
