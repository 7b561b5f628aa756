//! Orchestrator configuration.

use serde::{Deserialize, Serialize};

use crate::monitor::OwnerId;

/// Configuration for the monitor orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Maximum lookups in flight at once within a round.
    /// Bounds the request rate seen by the search index.
    #[serde(default = "default_max_concurrent_lookups")]
    pub max_concurrent_lookups: usize,

    /// Upper bound on rounds per invocation, catch-up rounds included.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,

    /// How often the scheduler runs all monitors (seconds).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Delay before the next run when the previous one found something (seconds).
    #[serde(default = "default_catch_up_delay")]
    pub catch_up_delay_secs: u64,

    /// Restrict scheduled runs to one owner's monitors.
    #[serde(default)]
    pub owner_id: Option<OwnerId>,
}

fn default_max_concurrent_lookups() -> usize {
    4
}

fn default_max_rounds() -> usize {
    100
}

fn default_poll_interval() -> u64 {
    8 * 60 * 60 // 8 hours
}

fn default_catch_up_delay() -> u64 {
    5
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_lookups: default_max_concurrent_lookups(),
            max_rounds: default_max_rounds(),
            poll_interval_secs: default_poll_interval(),
            catch_up_delay_secs: default_catch_up_delay(),
            owner_id: None,
        }
    }
}
