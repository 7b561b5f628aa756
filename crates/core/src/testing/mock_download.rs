//! Mock download client for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::download::{AddedDownload, DownloadCategory, DownloadClient, DownloadError};

/// A recorded `add_magnet` call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedDownload {
    pub magnet: String,
    pub category: DownloadCategory,
}

/// Mock implementation of the DownloadClient trait.
///
/// Accepted downloads are named after the magnet's `dn` parameter.
#[derive(Debug, Default)]
pub struct MockDownloadClient {
    added: Arc<RwLock<Vec<RecordedDownload>>>,
    /// If set, the next call will fail with this error.
    next_error: Arc<RwLock<Option<DownloadError>>>,
}

impl MockDownloadClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Downloads accepted so far.
    pub async fn added(&self) -> Vec<RecordedDownload> {
        self.added.read().await.clone()
    }

    /// Configure the next call to fail with the given error.
    pub async fn set_next_error(&self, error: DownloadError) {
        *self.next_error.write().await = Some(error);
    }
}

fn display_name(magnet: &str) -> String {
    magnet
        .split(['?', '&'])
        .find_map(|pair| pair.strip_prefix("dn="))
        .and_then(|name| urlencoding::decode(name).ok())
        .map(|name| name.into_owned())
        .unwrap_or_default()
}

#[async_trait]
impl DownloadClient for MockDownloadClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn add_magnet(
        &self,
        magnet: &str,
        category: DownloadCategory,
    ) -> Result<AddedDownload, DownloadError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        self.added.write().await.push(RecordedDownload {
            magnet: magnet.to_string(),
            category,
        });
        Ok(AddedDownload {
            name: display_name(magnet),
        })
    }
}
