//! Mock search provider for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::searcher::{rank_by_seeders, SearchProvider, TorrentCandidate};

/// A query handler that produces results dynamically based on the query.
type QueryHandler = Box<dyn Fn(&str) -> Vec<TorrentCandidate> + Send + Sync>;

/// Mock implementation of the SearchProvider trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable results, or compute them per query
/// - Track search queries for assertions
/// - Simulate latency and observe how many searches overlap
///
/// Results are ranked by seeders before being returned, like a real provider.
///
/// # Example
///
/// ```rust,ignore
/// use magnetwatch_core::testing::{MockSearchProvider, fixtures};
///
/// let provider = MockSearchProvider::new();
/// provider.set_results(vec![
///     fixtures::candidate("Show S01E01", TrustStatus::Vip, 0.7, 20),
/// ]).await;
///
/// let found = provider.search("show s01e01").await;
/// assert_eq!(provider.recorded_queries().await, vec!["show s01e01"]);
/// ```
pub struct MockSearchProvider {
    /// Configured results to return.
    results: Arc<RwLock<Vec<TorrentCandidate>>>,
    /// Recorded search queries.
    queries: Arc<RwLock<Vec<String>>>,
    /// Query handler for dynamic result generation.
    query_handler: Arc<RwLock<Option<QueryHandler>>>,
    /// Simulated latency per search.
    delay: Arc<RwLock<Option<Duration>>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl std::fmt::Debug for MockSearchProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSearchProvider")
            .field("results", &"<results>")
            .field("queries", &"<queries>")
            .field("query_handler", &"<handler>")
            .finish()
    }
}

impl Default for MockSearchProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSearchProvider {
    /// Create a new mock provider that finds nothing.
    pub fn new() -> Self {
        Self {
            results: Arc::new(RwLock::new(Vec::new())),
            queries: Arc::new(RwLock::new(Vec::new())),
            query_handler: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(None)),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Set the results returned for every query.
    pub async fn set_results(&self, results: Vec<TorrentCandidate>) {
        *self.results.write().await = results;
    }

    /// Compute results from the query instead of using the fixed set.
    pub async fn set_query_handler<F>(&self, handler: F)
    where
        F: Fn(&str) -> Vec<TorrentCandidate> + Send + Sync + 'static,
    {
        *self.query_handler.write().await = Some(Box::new(handler));
    }

    /// Make every search take at least `delay`.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Queries seen so far, in call order.
    pub async fn recorded_queries(&self) -> Vec<String> {
        self.queries.read().await.clone()
    }

    /// Get the number of searches performed.
    pub async fn search_count(&self) -> usize {
        self.queries.read().await.len()
    }

    /// Highest number of searches observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, query: &str) -> Vec<TorrentCandidate> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        self.queries.write().await.push(query.to_string());

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut candidates = match self.query_handler.read().await.as_ref() {
            Some(handler) => handler(query),
            None => self.results.read().await.clone(),
        };
        rank_by_seeders(&mut candidates);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        candidates
    }
}
