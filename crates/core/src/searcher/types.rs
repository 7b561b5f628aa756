//! Types for the torrent search system.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Reputation tag the index attaches to an uploader.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TrustStatus {
    Vip,
    Trusted,
    Other,
}

impl TrustStatus {
    /// Parse the index's status string. Anything unrecognized is `Other`.
    pub fn from_wire(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "vip" => TrustStatus::Vip,
            "trusted" => TrustStatus::Trusted,
            _ => TrustStatus::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrustStatus::Vip => "vip",
            TrustStatus::Trusted => "trusted",
            TrustStatus::Other => "other",
        }
    }
}

impl fmt::Display for TrustStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single search result, as ranked by a [`SearchProvider`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TorrentCandidate {
    /// Torrent title.
    pub name: String,
    /// Details page on the index.
    pub link: String,
    /// Size in gigabytes (bytes / 2^30).
    pub size_gb: f64,
    /// Seeders reported by the index.
    pub seeders: u32,
    /// Uploader reputation.
    pub status: TrustStatus,
    /// Info hash as reported by the index.
    pub info_hash: String,
}

impl TorrentCandidate {
    /// Build a magnet URI announcing to the given trackers.
    pub fn magnet_link<S: AsRef<str>>(&self, trackers: &[S]) -> String {
        let mut link = format!(
            "magnet:?xt=urn:btih:{}&dn={}",
            self.info_hash,
            urlencoding::encode(&self.name)
        );
        for tracker in trackers {
            link.push_str("&tr=");
            link.push_str(&urlencoding::encode(tracker.as_ref()));
        }
        link
    }
}

/// Bytes per gigabyte as used by the index UI.
pub const BYTES_PER_GB: f64 = (1u64 << 30) as f64;

/// Errors that can occur while talking to a search backend.
///
/// These never cross the [`SearchProvider`] boundary: every variant collapses
/// to an empty result there, after being logged and counted.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search backend connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Search backend returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Search backend API error: {0}")]
    ApiError(String),

    #[error("Request timeout")]
    Timeout,
}

impl SearchError {
    /// Short label for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            SearchError::ConnectionFailed(_) => "connection_failed",
            SearchError::HttpStatus(_) => "http_error",
            SearchError::ApiError(_) => "api_error",
            SearchError::Timeout => "timeout",
        }
    }
}

/// Trait for torrent search backends.
///
/// `search` never fails. An empty vector means "nothing found this time",
/// whether the index had no match or could not be reached.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Search the index, returning candidates by descending seeders.
    async fn search(&self, query: &str) -> Vec<TorrentCandidate>;
}

/// Sort candidates by descending seeders, keeping received order for ties.
pub fn rank_by_seeders(candidates: &mut [TorrentCandidate]) {
    candidates.sort_by(|a, b| b.seeders.cmp(&a.seeders));
}
