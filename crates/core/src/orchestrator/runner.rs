//! Monitor orchestrator implementation.
//!
//! Runs lookups in rounds. The first round covers every eligible monitor;
//! each following round only retries the series monitors that advanced in
//! the previous one, so a backlog of released episodes is consumed in a
//! single invocation. The run ends at the first round that finds nothing.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::metrics;
use crate::monitor::{Monitor, MonitorRecord, OwnerId};
use crate::searcher::SearchProvider;
use crate::store::{MonitorStore, StoreChange, StoreError};

use super::config::OrchestratorConfig;
use super::types::{JobResult, OrchestratorError};

/// Drives monitor lookups and applies their outcome to the store.
///
/// Holds no monitor state between calls; every run starts from the store.
pub struct MonitorOrchestrator {
    config: OrchestratorConfig,
    store: Arc<dyn MonitorStore>,
    searcher: Arc<dyn SearchProvider>,
    lookup_permits: Arc<Semaphore>,
}

impl MonitorOrchestrator {
    /// Create a new orchestrator.
    pub fn new(
        config: OrchestratorConfig,
        store: Arc<dyn MonitorStore>,
        searcher: Arc<dyn SearchProvider>,
    ) -> Self {
        let permits = config.max_concurrent_lookups.max(1);
        Self {
            config,
            store,
            searcher,
            lookup_permits: Arc::new(Semaphore::new(permits)),
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn MonitorStore> {
        &self.store
    }

    /// Run every eligible monitor, then keep retrying the series that advance.
    ///
    /// With `owner_id` set only that owner's monitors are eligible. Results
    /// come back in round order, and within a round in store order. Every
    /// round is persisted before the next one starts.
    pub async fn run_search_jobs(
        &self,
        owner_id: Option<OwnerId>,
    ) -> Result<Vec<JobResult>, OrchestratorError> {
        let mut eligible = self.eligible(owner_id).await?;
        let mut all_results = Vec::new();
        let mut round = 0;

        while !eligible.is_empty() {
            if round == self.config.max_rounds {
                warn!(
                    max_rounds = self.config.max_rounds,
                    pending = eligible.len(),
                    "Round limit reached, leaving remaining catch-up for the next run"
                );
                break;
            }
            round += 1;

            debug!(round, eligible = eligible.len(), "Starting round");
            let results = self.run_round(eligible).await?;
            if results.is_empty() {
                break;
            }

            let advanced: HashSet<String> = results
                .iter()
                .filter(|r| r.record.monitor.is_series())
                .map(|r| r.record.id.clone())
                .collect();

            info!(round, found = results.len(), advanced = advanced.len(), "Round complete");
            all_results.extend(results);

            eligible = if advanced.is_empty() {
                Vec::new()
            } else {
                self.eligible(owner_id)
                    .await?
                    .into_iter()
                    .filter(|r| advanced.contains(&r.id))
                    .collect()
            };
        }

        info!(rounds = round, found = all_results.len(), "Search jobs finished");
        Ok(all_results)
    }

    /// Look up each record once and persist the outcome.
    ///
    /// Series that found something get their advanced cursor written back;
    /// one-shot monitors that found something are deleted.
    pub async fn run_round(
        &self,
        records: Vec<MonitorRecord>,
    ) -> Result<Vec<JobResult>, OrchestratorError> {
        metrics::ROUNDS.inc();
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let outcomes = join_all(records.into_iter().map(|record| self.look_up(record))).await;

        let mut results = Vec::new();
        let mut changes = Vec::new();
        for (result, change) in outcomes.into_iter().flatten() {
            metrics::JOB_RESULTS
                .with_label_values(&[result.kind().as_str()])
                .inc();
            results.push(result);
            changes.push(change);
        }

        if !changes.is_empty() {
            self.with_store(move |store| store.apply(changes)).await?;
        }

        Ok(results)
    }

    /// Records a run may start from, freshly read from the store.
    async fn eligible(
        &self,
        owner_id: Option<OwnerId>,
    ) -> Result<Vec<MonitorRecord>, OrchestratorError> {
        self.with_store(move |store| match owner_id {
            Some(owner_id) => store.find_by_owner(owner_id),
            None => store.all(),
        })
        .await
    }

    /// Run a store call on the blocking pool; store calls do file I/O.
    async fn with_store<T, F>(&self, f: F) -> Result<T, OrchestratorError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn MonitorStore) -> Result<T, StoreError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let result = tokio::task::spawn_blocking(move || f(store.as_ref())).await?;
        Ok(result?)
    }

    /// Run one record's lookup, returning the result and the store change it implies.
    async fn look_up(&self, record: MonitorRecord) -> Option<(JobResult, StoreChange)> {
        // The semaphore is never closed.
        let _permit = self.lookup_permits.acquire().await.ok()?;

        let mut monitor = record.monitor.clone();
        let candidate = monitor.look(self.searcher.as_ref()).await?;

        let change = match monitor {
            Monitor::OneShot(_) => StoreChange::Remove(record.id.clone()),
            Monitor::Series(_) => StoreChange::Update(MonitorRecord {
                monitor,
                ..record.clone()
            }),
        };

        Some((JobResult { candidate, record }, change))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::{OneShotMonitor, SeriesMonitor};
    use crate::searcher::TrustStatus;
    use crate::store::JsonMonitorStore;
    use crate::testing::{fixtures, MockSearchProvider};
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    const OWNER: OwnerId = 1111111;

    struct Harness {
        store: Arc<JsonMonitorStore>,
        provider: Arc<MockSearchProvider>,
        orchestrator: MonitorOrchestrator,
        _dir: TempDir,
    }

    fn harness(config: OrchestratorConfig) -> Harness {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(JsonMonitorStore::open(dir.path().join("monitors.json")).unwrap());
        let provider = Arc::new(MockSearchProvider::new());
        let orchestrator = MonitorOrchestrator::new(
            config,
            Arc::clone(&store) as Arc<dyn MonitorStore>,
            Arc::clone(&provider) as Arc<dyn SearchProvider>,
        );
        Harness {
            store,
            provider,
            orchestrator,
            _dir: dir,
        }
    }

    fn next_episode(store: &JsonMonitorStore, id: &str) -> u32 {
        match store.find_by_id(id).unwrap().monitor {
            Monitor::Series(s) => s.next_episode(),
            Monitor::OneShot(_) => panic!("expected a series monitor"),
        }
    }

    #[tokio::test]
    async fn test_round_with_no_results_changes_nothing() {
        let h = harness(OrchestratorConfig::default());
        let show = MonitorRecord::new(OWNER, SeriesMonitor::new("show", 1, 10));
        let movie = MonitorRecord::new(OWNER, OneShotMonitor::new("film"));
        h.store.add(show.clone()).unwrap();
        h.store.add(movie.clone()).unwrap();

        let records = h.store.find_by_owner(OWNER).unwrap();
        let results = h.orchestrator.run_round(records).await.unwrap();

        assert!(results.is_empty());
        assert_eq!(h.store.find_by_owner(OWNER).unwrap(), vec![show, movie]);
    }

    #[tokio::test]
    async fn test_round_advances_series_and_removes_one_shot() {
        let h = harness(OrchestratorConfig::default());
        h.provider
            .set_results(vec![
                fixtures::candidate("Torrent 1", TrustStatus::Trusted, 0.9, 10),
                fixtures::candidate("Torrent 3", TrustStatus::Vip, 1.2, 50),
            ])
            .await;

        let show = MonitorRecord::new(OWNER, SeriesMonitor::new("show", 1, 10));
        let movie = MonitorRecord::new(OWNER, OneShotMonitor::new("film"));
        h.store.add(show.clone()).unwrap();
        h.store.add(movie.clone()).unwrap();

        let records = h.store.find_by_owner(OWNER).unwrap();
        let results = h.orchestrator.run_round(records).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].record, show);
        assert_eq!(results[1].record, movie);

        let remaining = h.store.find_by_owner(OWNER).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(next_episode(&h.store, &show.id), 11);
    }

    #[tokio::test]
    async fn test_catch_up_consumes_backlog() {
        let h = harness(OrchestratorConfig::default());
        h.provider
            .set_query_handler(|query| {
                let available = ["show s01e10", "show s01e11", "show s01e12"];
                if available.contains(&query) {
                    vec![fixtures::candidate(query, TrustStatus::Vip, 0.7, 20)]
                } else {
                    Vec::new()
                }
            })
            .await;

        let show = MonitorRecord::new(OWNER, SeriesMonitor::new("show", 1, 10));
        h.store.add(show.clone()).unwrap();

        let results = h.orchestrator.run_search_jobs(Some(OWNER)).await.unwrap();
        let names: Vec<_> = results.iter().map(|r| r.candidate.name.as_str()).collect();
        assert_eq!(names, vec!["show s01e10", "show s01e11", "show s01e12"]);
        assert_eq!(next_episode(&h.store, &show.id), 13);

        let queries = h.provider.recorded_queries().await;
        assert_eq!(
            queries,
            vec!["show s01e10", "show s01e11", "show s01e12", "show s01e13"]
        );
    }

    #[tokio::test]
    async fn test_one_shot_not_retried_in_catch_up() {
        let h = harness(OrchestratorConfig::default());
        h.provider
            .set_results(vec![fixtures::candidate(
                "anything",
                TrustStatus::Trusted,
                0.5,
                5,
            )])
            .await;

        h.store
            .add(MonitorRecord::new(OWNER, SeriesMonitor::new("the last of us", 1, 10)))
            .unwrap();
        h.store
            .add(MonitorRecord::new(OWNER, SeriesMonitor::new("chainsaw man", 2, 1)))
            .unwrap();
        let movie = MonitorRecord::new(OWNER, OneShotMonitor::new("the matrix"));
        h.store.add(movie.clone()).unwrap();

        let config = OrchestratorConfig {
            max_rounds: 3,
            max_concurrent_lookups: 1,
            ..Default::default()
        };
        let orchestrator = MonitorOrchestrator::new(
            config,
            Arc::clone(&h.store) as Arc<dyn MonitorStore>,
            Arc::clone(&h.provider) as Arc<dyn SearchProvider>,
        );

        // Series always match here, so the round cap ends the run.
        let results = orchestrator.run_search_jobs(Some(OWNER)).await.unwrap();
        assert_eq!(results.len(), 7);

        let queries = h.provider.recorded_queries().await;
        assert_eq!(
            queries,
            vec![
                "the last of us s01e10",
                "chainsaw man s02e01",
                "the matrix",
                "the last of us s01e11",
                "chainsaw man s02e02",
                "the last of us s01e12",
                "chainsaw man s02e03",
            ]
        );
        assert!(h.store.find_by_id(&movie.id).is_none());
    }

    #[tokio::test]
    async fn test_owner_filter() {
        let h = harness(OrchestratorConfig::default());
        h.provider
            .set_results(vec![fixtures::candidate("hit", TrustStatus::Vip, 1.0, 1)])
            .await;

        let mine = MonitorRecord::new(OWNER, OneShotMonitor::new("mine"));
        let theirs = MonitorRecord::new(2, OneShotMonitor::new("theirs"));
        h.store.add(mine.clone()).unwrap();
        h.store.add(theirs.clone()).unwrap();

        let results = h.orchestrator.run_search_jobs(Some(OWNER)).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].record.id, mine.id);
        assert!(h.store.find_by_id(&theirs.id).is_some());

        let results = h.orchestrator.run_search_jobs(None).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].record.id, theirs.id);
        assert!(h.store.all().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_store() {
        let h = harness(OrchestratorConfig::default());
        let results = h.orchestrator.run_search_jobs(None).await.unwrap();
        assert!(results.is_empty());
        assert_eq!(h.provider.search_count().await, 0);
    }

    #[tokio::test]
    async fn test_fan_out_is_bounded() {
        let h = harness(OrchestratorConfig {
            max_concurrent_lookups: 2,
            ..Default::default()
        });
        h.provider.set_delay(Duration::from_millis(20)).await;
        for i in 0..6 {
            h.store
                .add(MonitorRecord::new(OWNER, OneShotMonitor::new(format!("film {i}"))))
                .unwrap();
        }

        h.orchestrator.run_search_jobs(None).await.unwrap();
        assert_eq!(h.provider.search_count().await, 6);
        assert_eq!(h.provider.max_in_flight(), 2);
    }

    #[tokio::test]
    async fn test_series_at_episode_limit_stays_put() {
        let h = harness(OrchestratorConfig::default());
        h.provider
            .set_results(vec![fixtures::candidate("hit", TrustStatus::Vip, 1.0, 1)])
            .await;
        let show = MonitorRecord::new(OWNER, SeriesMonitor::new("show", 1, u32::MAX));
        h.store.add(show.clone()).unwrap();

        let results = h.orchestrator.run_search_jobs(Some(OWNER)).await.unwrap();
        assert!(results.is_empty());
        assert_eq!(next_episode(&h.store, &show.id), u32::MAX);
    }

    /// Store wrapper whose reads block the calling thread.
    struct SlowStore {
        inner: JsonMonitorStore,
        read_done: std::sync::Mutex<Option<Instant>>,
    }

    impl MonitorStore for SlowStore {
        fn load(&self) -> Result<(), StoreError> {
            self.inner.load()
        }
        fn save(&self) -> Result<(), StoreError> {
            self.inner.save()
        }
        fn add(&self, record: MonitorRecord) -> Result<(), StoreError> {
            self.inner.add(record)
        }
        fn remove(&self, id: &str) -> Result<Option<MonitorRecord>, StoreError> {
            self.inner.remove(id)
        }
        fn apply(&self, changes: Vec<StoreChange>) -> Result<(), StoreError> {
            self.inner.apply(changes)
        }
        fn all(&self) -> Result<Vec<MonitorRecord>, StoreError> {
            std::thread::sleep(Duration::from_millis(100));
            let records = self.inner.all();
            *self.read_done.lock().unwrap() = Some(Instant::now());
            records
        }
        fn find_by_owner(&self, owner_id: OwnerId) -> Result<Vec<MonitorRecord>, StoreError> {
            self.inner.find_by_owner(owner_id)
        }
        fn find_by_id(&self, id: &str) -> Option<MonitorRecord> {
            self.inner.find_by_id(id)
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_store_io_does_not_block_runtime() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(SlowStore {
            inner: JsonMonitorStore::open(dir.path().join("monitors.json")).unwrap(),
            read_done: std::sync::Mutex::new(None),
        });
        let orchestrator = MonitorOrchestrator::new(
            OrchestratorConfig::default(),
            Arc::clone(&store) as Arc<dyn MonitorStore>,
            Arc::new(MockSearchProvider::new()) as Arc<dyn SearchProvider>,
        );

        // On a single-threaded runtime this task only runs once the
        // orchestrator yields, so it must run while the read is in progress.
        let other = tokio::spawn(async { Instant::now() });

        let results = orchestrator.run_search_jobs(None).await.unwrap();
        assert!(results.is_empty());

        let other_ran = other.await.unwrap();
        let read_done = store.read_done.lock().unwrap().unwrap();
        assert!(other_ran < read_done);
    }

    #[tokio::test]
    async fn test_store_failure_aborts_run() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("data");
        let store = Arc::new(JsonMonitorStore::open(sub.join("monitors.json")).unwrap());
        store
            .add(MonitorRecord::new(OWNER, OneShotMonitor::new("film")))
            .unwrap();
        let records = store.find_by_owner(OWNER).unwrap();

        let provider = Arc::new(MockSearchProvider::new());
        provider
            .set_results(vec![fixtures::candidate("film", TrustStatus::Vip, 1.0, 1)])
            .await;
        let orchestrator = MonitorOrchestrator::new(
            OrchestratorConfig::default(),
            Arc::clone(&store) as Arc<dyn MonitorStore>,
            provider as Arc<dyn SearchProvider>,
        );

        std::fs::remove_dir_all(&sub).unwrap();
        let err = orchestrator.run_round(records).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::Store(_)));
    }
}
