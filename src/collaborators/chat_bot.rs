//! The message handler, published as `chat_bot`.
//!
//! It depends on every other collaborator but keeps working with whatever is
//! missing: absent resources only switch features off.

use crate::collaborators::ai_client::{self, AiClient};
use crate::collaborators::config::{self, BotConfig};
use crate::collaborators::context_manager::{self, ContextManager};
use crate::collaborators::group_manager::{self, GroupManager};
use crate::framework::{resource_value, Registration, ResourceManager};
use std::sync::Arc;
use tracing::{instrument, warn};

pub const NAME: &str = "chat_bot";

pub struct ChatBot {
    pub config: Option<Arc<BotConfig>>,
    pub context_manager: Option<Arc<ContextManager>>,
    pub ai_client: Option<Arc<AiClient>>,
    pub group_manager: Option<Arc<GroupManager>>,
}

impl ChatBot {
    pub async fn connect(manager: &ResourceManager) -> Self {
        let timeout = manager.default_timeout();
        Self {
            config: manager.get(config::NAME, timeout).await,
            context_manager: manager.get(context_manager::NAME, timeout).await,
            ai_client: manager.get(ai_client::NAME, timeout).await,
            group_manager: manager.get(group_manager::NAME, timeout).await,
        }
    }

    /// Returns a reply, or `None` when the group is disabled or no client is available.
    #[instrument(skip(self, text))]
    pub async fn handle_message(&self, group_id: i64, user_id: i64, text: &str) -> Option<String> {
        if let Some(groups) = &self.group_manager {
            if !groups.is_enabled(group_id).await {
                return None;
            }
        }
        let Some(client) = &self.ai_client else {
            warn!("AI client not ready");
            return None;
        };

        let prompt = match &self.context_manager {
            Some(contexts) => {
                contexts.push(group_id, user_id, text).await;
                contexts.history(group_id, user_id).await.join("\n")
            }
            None => text.to_string(),
        };
        Some(client.complete(&prompt))
    }
}

pub fn register(manager: &ResourceManager) {
    let handle = manager.clone();
    manager.queue_registration(
        Registration::new(NAME)
            .depends_on([config::NAME, context_manager::NAME, ai_client::NAME, group_manager::NAME])
            .initializer(move || {
                let manager = handle.clone();
                async move { Ok(Some(resource_value(ChatBot::connect(&manager).await))) }
            }),
    );
}
