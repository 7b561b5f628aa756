//! Owner notifications.

use async_trait::async_trait;
use tracing::info;

use crate::monitor::OwnerId;

/// Channel used to tell an owner about a find.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, owner_id: OwnerId, text: &str);
}

/// Notifier that writes to the log.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, owner_id: OwnerId, text: &str) {
        info!(owner_id, text = %text, "Notification");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockNotifier;

    #[test]
    fn test_notifiers_are_interchangeable() {
        let notifiers: Vec<Box<dyn Notifier>> =
            vec![Box::new(LogNotifier), Box::new(MockNotifier::new())];
        for notifier in &notifiers {
            tokio_test::block_on(notifier.notify(7, "Found something"));
        }
    }

    #[test]
    fn test_mock_notifier_records() {
        let notifier = MockNotifier::new();
        tokio_test::block_on(async {
            notifier.notify(7, "one").await;
            notifier.notify(8, "two").await;
            assert_eq!(
                notifier.sent().await,
                vec![(7, "one".to_string()), (8, "two".to_string())]
            );
        });
    }
}
