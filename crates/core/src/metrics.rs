//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Searches against the torrent index
//! - Monitor lookups and orchestrator rounds
//! - Dispatch of found results to the download backend

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Search
// =============================================================================

/// Searches by outcome.
pub static SEARCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("magnetwatch_searches_total", "Total index searches"),
        &["outcome"], // "hit", "empty", "timeout", "connection_failed", "http_error", "api_error"
    )
    .unwrap()
});

/// Search round-trip time in seconds.
pub static SEARCH_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "magnetwatch_search_duration_seconds",
            "Index search duration in seconds",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
    )
    .unwrap()
});

// =============================================================================
// Monitors
// =============================================================================

/// Monitor lookups by kind and result.
pub static LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("magnetwatch_lookups_total", "Total monitor lookups"),
        &["kind", "result"], // kind: "movie", "show"; result: "hit", "miss"
    )
    .unwrap()
});

/// Orchestrator rounds, catch-up rounds included.
pub static ROUNDS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("magnetwatch_rounds_total", "Total orchestrator rounds").unwrap()
});

/// Results produced by rounds, by monitor kind.
pub static JOB_RESULTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("magnetwatch_job_results_total", "Total job results"),
        &["kind"],
    )
    .unwrap()
});

// =============================================================================
// Dispatch
// =============================================================================

/// Download hand-offs by result.
pub static DISPATCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("magnetwatch_dispatches_total", "Total results handed to the download backend"),
        &["result"], // "started", "failed"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(SEARCHES.clone()),
        Box::new(SEARCH_DURATION.clone()),
        Box::new(LOOKUPS.clone()),
        Box::new(ROUNDS.clone()),
        Box::new(JOB_RESULTS.clone()),
        Box::new(DISPATCHES.clone()),
    ]
}
