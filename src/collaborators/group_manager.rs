//! Per-group switches, published as `group_manager`.

use crate::framework::{resource_value, Registration, ResourceManager};
use std::collections::HashSet;
use tokio::sync::RwLock;

pub const NAME: &str = "group_manager";

#[derive(Debug, Default)]
pub struct GroupManager {
    disabled: RwLock<HashSet<i64>>,
}

impl GroupManager {
    pub async fn is_enabled(&self, group_id: i64) -> bool {
        !self.disabled.read().await.contains(&group_id)
    }

    pub async fn set_enabled(&self, group_id: i64, enabled: bool) {
        let mut disabled = self.disabled.write().await;
        if enabled {
            disabled.remove(&group_id);
        } else {
            disabled.insert(group_id);
        }
    }
}

pub fn register(manager: &ResourceManager) {
    manager.queue_registration(
        Registration::new(NAME).initializer(|| async { Ok(Some(resource_value(GroupManager::default()))) }),
    );
}
