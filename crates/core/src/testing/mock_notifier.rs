//! Mock notifier for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::monitor::OwnerId;
use crate::notify::Notifier;

/// Notifier that records every message.
#[derive(Debug, Default)]
pub struct MockNotifier {
    sent: Arc<RwLock<Vec<(OwnerId, String)>>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent so far, as `(owner, text)`.
    pub async fn sent(&self) -> Vec<(OwnerId, String)> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(&self, owner_id: OwnerId, text: &str) {
        self.sent.write().await.push((owner_id, text.to_string()));
    }
}
