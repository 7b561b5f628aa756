//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the external service traits,
//! so orchestration and dispatch can be tested without a real index or
//! download daemon.
//!
//! # Example
//!
//! ```rust,ignore
//! use magnetwatch_core::testing::{MockSearchProvider, MockDownloadClient, fixtures};
//!
//! let provider = MockSearchProvider::new();
//! let download = MockDownloadClient::new();
//!
//! // Configure mock responses
//! provider.set_results(vec![fixtures::candidate("Film", TrustStatus::Vip, 1.5, 30)]).await;
//!
//! // Use in MonitorOrchestrator / ResultDispatcher...
//! ```

mod mock_download;
mod mock_notifier;
mod mock_searcher;

pub use mock_download::{MockDownloadClient, RecordedDownload};
pub use mock_notifier::MockNotifier;
pub use mock_searcher::MockSearchProvider;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::searcher::{TorrentCandidate, TrustStatus};

    /// Create a test torrent candidate with reasonable defaults.
    /// The info hash is the hex of the name, padded to 40 characters.
    pub fn candidate(name: &str, status: TrustStatus, size_gb: f64, seeders: u32) -> TorrentCandidate {
        let mut info_hash: String = name.bytes().map(|b| format!("{:02x}", b)).collect();
        info_hash.truncate(40);
        while info_hash.len() < 40 {
            info_hash.push('0');
        }

        TorrentCandidate {
            name: name.to_string(),
            link: format!(
                "https://thepiratebay.org/description.php?id={}",
                name.len()
            ),
            size_gb,
            seeders,
            status,
            info_hash,
        }
    }
}
