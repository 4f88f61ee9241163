//! Conversation history with expiry, published as `context_manager`.
//!
//! The initializer also starts the periodic sweep of expired conversations.
//! The sweep ends once the host requests a stop or the registry shuts down.

use crate::collaborators::config::{self, BotConfig};
use crate::framework::{Registration, ResourceManager};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

pub const NAME: &str = "context_manager";

struct Conversation {
    messages: Vec<String>,
    touched: Instant,
}

pub struct ContextManager {
    max_context_size: usize,
    ttl: Duration,
    conversations: Mutex<HashMap<(i64, i64), Conversation>>,
}

impl ContextManager {
    pub fn new(max_context_size: usize, ttl: Duration) -> Self {
        Self {
            max_context_size,
            ttl,
            conversations: Mutex::new(HashMap::new()),
        }
    }

    /// Appends a message, keeping at most `max_context_size` of the newest.
    pub async fn push(&self, group_id: i64, user_id: i64, message: impl Into<String>) {
        let mut conversations = self.conversations.lock().await;
        let conversation = conversations.entry((group_id, user_id)).or_insert_with(|| Conversation {
            messages: Vec::new(),
            touched: Instant::now(),
        });
        conversation.messages.push(message.into());
        conversation.touched = Instant::now();
        let overflow = conversation.messages.len().saturating_sub(self.max_context_size);
        conversation.messages.drain(..overflow);
    }

    pub async fn history(&self, group_id: i64, user_id: i64) -> Vec<String> {
        let conversations = self.conversations.lock().await;
        match conversations.get(&(group_id, user_id)) {
            Some(conversation) if conversation.touched.elapsed() < self.ttl => conversation.messages.clone(),
            _ => Vec::new(),
        }
    }

    /// Drops expired conversations and returns how many were removed.
    pub async fn clear_expired(&self) -> usize {
        let mut conversations = self.conversations.lock().await;
        let before = conversations.len();
        conversations.retain(|_, conversation| conversation.touched.elapsed() < self.ttl);
        let removed = before - conversations.len();
        if removed > 0 {
            debug!(removed, "Cleared expired contexts");
        }
        removed
    }
}

/// Degrades to default sizes when `config` is unavailable.
pub fn register(manager: &ResourceManager, cleanup_interval: Duration) {
    let handle = manager.clone();
    manager.queue_registration(Registration::new(NAME).depends_on([config::NAME]).initializer(move || {
        let manager = handle.clone();
        async move {
            let config = manager
                .get::<BotConfig>(config::NAME, manager.default_timeout())
                .await
                .map(|config| (*config).clone())
                .unwrap_or_default();

            let context_manager = Arc::new(ContextManager::new(config.max_context_size, config.context_ttl));
            manager.set_value(NAME, context_manager.clone()).await?;

            spawn_sweeper(context_manager, manager.clone(), cleanup_interval);
            Ok(None)
        }
    }));
}

/// Clears expired conversations every `period` until the registry goes away.
pub fn spawn_sweeper(contexts: Arc<ContextManager>, manager: ResourceManager, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await;
        loop {
            interval.tick().await;
            if manager.stop_requested() || manager.is_closed() {
                debug!("Context sweep stopped");
                break;
            }
            contexts.clear_expired().await;
        }
    })
}
