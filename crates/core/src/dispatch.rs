//! Hands job results to the download backend and notifies owners.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::download::{DownloadCategory, DownloadClient};
use crate::metrics;
use crate::notify::Notifier;
use crate::orchestrator::JobResult;

/// Outcome counts of one dispatch batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    pub started: usize,
    pub failed: usize,
}

pub struct ResultDispatcher {
    download: Arc<dyn DownloadClient>,
    notifier: Arc<dyn Notifier>,
    trackers: Vec<String>,
}

impl ResultDispatcher {
    pub fn new(
        download: Arc<dyn DownloadClient>,
        notifier: Arc<dyn Notifier>,
        trackers: Vec<String>,
    ) -> Self {
        Self {
            download,
            notifier,
            trackers,
        }
    }

    /// Start a download for every result, in order.
    ///
    /// A failed download is logged and counted; the rest of the batch still runs.
    pub async fn dispatch(&self, results: &[JobResult]) -> DispatchSummary {
        let mut summary = DispatchSummary::default();

        for result in results {
            let magnet = result.candidate.magnet_link(&self.trackers);
            let category = DownloadCategory::from(result.kind());

            match self.download.add_magnet(&magnet, category).await {
                Ok(added) => {
                    summary.started += 1;
                    metrics::DISPATCHES.with_label_values(&["started"]).inc();
                    info!(
                        monitor_id = %result.record.id,
                        torrent = %result.candidate.name,
                        download = %added.name,
                        backend = self.download.name(),
                        "Download started"
                    );

                    if !result.record.silent {
                        let text = format!(
                            "Found {}, download started: {}",
                            result.candidate.name, added.name
                        );
                        self.notifier.notify(result.record.owner_id, &text).await;
                    }
                }
                Err(e) => {
                    summary.failed += 1;
                    metrics::DISPATCHES.with_label_values(&["failed"]).inc();
                    warn!(
                        monitor_id = %result.record.id,
                        torrent = %result.candidate.name,
                        error = %e,
                        "Failed to start download"
                    );
                }
            }
        }

        summary
    }
}
