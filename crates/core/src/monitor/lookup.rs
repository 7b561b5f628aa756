//! Lookup logic for each monitor kind.

use tracing::{debug, info, warn};

use crate::metrics;
use crate::searcher::{SearchProvider, TorrentCandidate};

use super::{Monitor, OneShotMonitor, SeriesMonitor};

impl OneShotMonitor {
    /// Search once and return the top-ranked candidate, if any.
    pub async fn look(&self, provider: &dyn SearchProvider) -> Option<TorrentCandidate> {
        provider.search(&self.query).await.into_iter().next()
    }
}

impl SeriesMonitor {
    /// Whether a candidate passes the trust and size filters.
    pub fn accepts(&self, candidate: &TorrentCandidate) -> bool {
        if !self.accepted_statuses().contains(&candidate.status) {
            return false;
        }
        match self.size_limit_gb() {
            Some(limit) => candidate.size_gb <= limit,
            None => true,
        }
    }

    /// First candidate in rank order that passes the filters.
    ///
    /// Filtering runs before selection, so a rejected high-seed result never
    /// shadows an acceptable one further down.
    pub fn select(&self, candidates: Vec<TorrentCandidate>) -> Option<TorrentCandidate> {
        candidates.into_iter().find(|c| self.accepts(c))
    }

    /// Look for the next episode. On a match the cursor moves to the
    /// following episode; otherwise it stays put.
    ///
    /// A match at the largest representable episode is discarded, since the
    /// cursor could not move past it and the same episode would be found
    /// again on every run.
    pub async fn look(&mut self, provider: &dyn SearchProvider) -> Option<TorrentCandidate> {
        let query = self.episode_query();
        let candidates = provider.search(&query).await;
        let seen = candidates.len();

        match self.select(candidates) {
            Some(found) => {
                if !self.advance() {
                    warn!(query = %query, torrent = %found.name, "Episode cursor at its limit, ignoring match");
                    return None;
                }
                info!(query = %query, torrent = %found.name, "Found new episode");
                Some(found)
            }
            None => {
                debug!(query = %query, seen, "No acceptable candidate");
                None
            }
        }
    }
}

impl Monitor {
    /// Run this monitor's lookup against the provider.
    pub async fn look(&mut self, provider: &dyn SearchProvider) -> Option<TorrentCandidate> {
        debug!(monitor = %self, provider = provider.name(), "Monitor running");

        let found = match self {
            Monitor::OneShot(m) => m.look(provider).await,
            Monitor::Series(m) => m.look(provider).await,
        };

        let result = if found.is_some() { "hit" } else { "miss" };
        metrics::LOOKUPS
            .with_label_values(&[self.kind().as_str(), result])
            .inc();
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::searcher::TrustStatus;
    use crate::testing::{fixtures, MockSearchProvider};

    fn sample_results() -> Vec<TorrentCandidate> {
        vec![
            fixtures::candidate("Torrent 1", TrustStatus::Trusted, 0.9, 10),
            fixtures::candidate("Torrent 2", TrustStatus::Other, 0.3, 5),
            fixtures::candidate("Torrent 3", TrustStatus::Vip, 1.2, 50),
        ]
    }

    #[tokio::test]
    async fn test_one_shot_returns_top_candidate() {
        let provider = MockSearchProvider::new();
        provider.set_results(sample_results()).await;

        let monitor = OneShotMonitor::new("akira");
        let found = monitor.look(&provider).await.unwrap();
        assert_eq!(found.name, "Torrent 3");
        assert_eq!(provider.recorded_queries().await, vec!["akira"]);
    }

    #[tokio::test]
    async fn test_one_shot_is_repeatable() {
        let provider = MockSearchProvider::new();
        provider.set_results(sample_results()).await;

        let monitor = OneShotMonitor::new("akira");
        let first = monitor.look(&provider).await;
        let second = monitor.look(&provider).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_one_shot_no_results() {
        let provider = MockSearchProvider::new();
        let monitor = OneShotMonitor::new("non existing");
        assert!(monitor.look(&provider).await.is_none());
    }

    #[tokio::test]
    async fn test_series_advances_on_match() {
        let provider = MockSearchProvider::new();
        provider.set_results(sample_results()).await;

        let mut monitor = SeriesMonitor::new("attack on titan", 1, 1);
        let found = monitor.look(&provider).await.unwrap();
        assert_eq!(found.name, "Torrent 3");
        assert_eq!(monitor.next_episode(), 2);
        assert_eq!(
            provider.recorded_queries().await,
            vec!["attack on titan s01e01"]
        );
    }

    #[tokio::test]
    async fn test_series_no_results_keeps_cursor() {
        let provider = MockSearchProvider::new();
        let mut monitor = SeriesMonitor::new("attack on titan", 1, 1);
        assert!(monitor.look(&provider).await.is_none());
        assert_eq!(monitor.next_episode(), 1);
        assert_eq!(monitor.season, 1);
    }

    #[tokio::test]
    async fn test_series_size_limit_picks_smaller() {
        let provider = MockSearchProvider::new();
        provider.set_results(sample_results()).await;

        let mut monitor = SeriesMonitor::new("attack on titan", 1, 1).with_size_limit_gb(Some(1.0));
        let found = monitor.look(&provider).await.unwrap();
        assert_eq!(found.name, "Torrent 1");
    }

    #[tokio::test]
    async fn test_series_small_size_limit_finds_nothing() {
        let provider = MockSearchProvider::new();
        provider.set_results(sample_results()).await;

        // Torrent 2 fits but is not trusted.
        let mut monitor = SeriesMonitor::new("attack on titan", 1, 1).with_size_limit_gb(Some(0.5));
        assert!(monitor.look(&provider).await.is_none());
        assert_eq!(monitor.next_episode(), 1);
    }

    #[tokio::test]
    async fn test_series_vip_only() {
        let provider = MockSearchProvider::new();
        provider
            .set_results(vec![
                fixtures::candidate("Trusted", TrustStatus::Trusted, 0.5, 100),
                fixtures::candidate("Vip", TrustStatus::Vip, 0.5, 1),
            ])
            .await;

        let mut monitor = SeriesMonitor::new("show", 1, 1).with_vip_only(true);
        assert_eq!(monitor.look(&provider).await.unwrap().name, "Vip");
    }

    #[tokio::test]
    async fn test_series_filter_before_rank() {
        let provider = MockSearchProvider::new();
        provider
            .set_results(vec![
                fixtures::candidate("trusted-2gb", TrustStatus::Trusted, 2.0, 10),
                fixtures::candidate("vip-half-gb", TrustStatus::Vip, 0.5, 3),
                fixtures::candidate("untrusted-tiny", TrustStatus::Other, 0.1, 50),
            ])
            .await;

        let mut monitor = SeriesMonitor::new("show", 1, 1).with_size_limit_gb(Some(1.0));
        let found = monitor.look(&provider).await.unwrap();
        assert_eq!(found.name, "vip-half-gb");
        assert_eq!(found.seeders, 3);
    }

    #[tokio::test]
    async fn test_series_zero_episode_queries() {
        let provider = MockSearchProvider::new();
        provider.set_results(sample_results()).await;

        let mut monitor = SeriesMonitor::new("attack on titan", 0, 0);
        monitor.look(&provider).await;
        monitor.look(&provider).await;
        assert_eq!(
            provider.recorded_queries().await,
            vec!["attack on titan s00e00", "attack on titan s00e01"]
        );
        assert_eq!(monitor.next_episode(), 2);
    }

    #[tokio::test]
    async fn test_series_cursor_at_limit_does_not_overflow() {
        let provider = MockSearchProvider::new();
        provider.set_results(sample_results()).await;

        let mut monitor = SeriesMonitor::new("show", 1, u32::MAX);
        assert!(monitor.look(&provider).await.is_none());
        assert_eq!(monitor.next_episode(), u32::MAX);
        assert_eq!(provider.search_count().await, 1);
    }

    #[tokio::test]
    async fn test_monitor_dispatches_by_kind() {
        let provider = MockSearchProvider::new();
        provider.set_results(sample_results()).await;

        let mut monitor = Monitor::Series(SeriesMonitor::new("show", 3, 7));
        assert!(monitor.look(&provider).await.is_some());
        match &monitor {
            Monitor::Series(s) => assert_eq!(s.next_episode(), 8),
            Monitor::OneShot(_) => panic!("kind changed"),
        }
        assert_eq!(monitor.query(), "show s03e08");

        let mut monitor = Monitor::OneShot(OneShotMonitor::new("film"));
        assert_eq!(monitor.look(&provider).await.unwrap().name, "Torrent 3");
        assert_eq!(monitor.query(), "film");
    }
}
