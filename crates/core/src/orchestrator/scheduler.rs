//! Periodic execution of search jobs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::dispatch::ResultDispatcher;

use super::runner::MonitorOrchestrator;
use super::types::OrchestratorError;

/// Runs the orchestrator on a timer and hands its results to the dispatcher.
///
/// The first tick runs at start. After a tick that found something the
/// next one follows after the short catch-up delay, otherwise after the
/// full poll interval.
pub struct MonitorScheduler {
    orchestrator: Arc<MonitorOrchestrator>,
    dispatcher: Option<Arc<ResultDispatcher>>,
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl MonitorScheduler {
    /// Without a dispatcher, results are only logged.
    pub fn new(
        orchestrator: Arc<MonitorOrchestrator>,
        dispatcher: Option<Arc<ResultDispatcher>>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            orchestrator,
            dispatcher,
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
            handle: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Run the search jobs once and dispatch what they find.
    ///
    /// Returns the number of results.
    pub async fn tick(&self) -> Result<usize, OrchestratorError> {
        Self::run_tick(&self.orchestrator, self.dispatcher.as_deref()).await
    }

    /// Start the loop (spawns a background task).
    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Scheduler already running");
            return;
        }

        let running = Arc::clone(&self.running);
        let orchestrator = Arc::clone(&self.orchestrator);
        let dispatcher = self.dispatcher.clone();
        let poll_interval = Duration::from_secs(orchestrator.config().poll_interval_secs);
        let catch_up_delay = Duration::from_secs(orchestrator.config().catch_up_delay_secs);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        let handle = tokio::spawn(async move {
            info!(
                poll_interval_secs = poll_interval.as_secs(),
                "Monitor loop started"
            );
            loop {
                let delay = match Self::run_tick(&orchestrator, dispatcher.as_deref()).await {
                    Ok(found) if found > 0 => catch_up_delay,
                    Ok(_) => poll_interval,
                    Err(e) => {
                        error!(error = %e, "Search jobs failed");
                        poll_interval
                    }
                };

                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Monitor loop received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(delay) => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                    }
                }
            }
            info!("Monitor loop stopped");
        });

        *self.handle.lock().await = Some(handle);
    }

    /// Stop the loop, waiting for an in-flight tick to finish.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Scheduler not running");
            return;
        }

        let _ = self.shutdown_tx.send(());
        if let Some(handle) = self.handle.lock().await.take() {
            if let Err(e) = handle.await {
                error!(error = %e, "Monitor loop task failed");
            }
        }
    }

    async fn run_tick(
        orchestrator: &MonitorOrchestrator,
        dispatcher: Option<&ResultDispatcher>,
    ) -> Result<usize, OrchestratorError> {
        let results = orchestrator
            .run_search_jobs(orchestrator.config().owner_id)
            .await?;

        match dispatcher {
            Some(dispatcher) if !results.is_empty() => {
                let summary = dispatcher.dispatch(&results).await;
                info!(
                    found = results.len(),
                    started = summary.started,
                    failed = summary.failed,
                    "Dispatched search results"
                );
            }
            Some(_) => {}
            None => {
                for result in &results {
                    info!(
                        monitor_id = %result.record.id,
                        torrent = %result.candidate.name,
                        "Found result (no download backend configured)"
                    );
                }
            }
        }

        Ok(results.len())
    }
}
