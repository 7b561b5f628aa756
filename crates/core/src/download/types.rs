//! Types for handing found torrents to a download backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::monitor::MonitorKind;

/// Errors that can occur while adding a download.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Backend rejected the torrent: {0}")]
    Rejected(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Request timeout")]
    Timeout,
}

/// Where a download lands. Each category may map to its own directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadCategory {
    Movie,
    Show,
    Video,
    Other,
}

impl DownloadCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadCategory::Movie => "movie",
            DownloadCategory::Show => "show",
            DownloadCategory::Video => "video",
            DownloadCategory::Other => "other",
        }
    }
}

impl From<MonitorKind> for DownloadCategory {
    fn from(kind: MonitorKind) -> Self {
        match kind {
            MonitorKind::Movie => DownloadCategory::Movie,
            MonitorKind::Show => DownloadCategory::Show,
        }
    }
}

/// A download the backend accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddedDownload {
    /// Name the backend gave the torrent.
    pub name: String,
}

/// Trait for download backends.
#[async_trait]
pub trait DownloadClient: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Queue a magnet link for download.
    async fn add_magnet(
        &self,
        magnet: &str,
        category: DownloadCategory,
    ) -> Result<AddedDownload, DownloadError>;
}
