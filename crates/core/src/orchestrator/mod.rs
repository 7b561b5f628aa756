//! Monitor orchestrator.
//!
//! Runs monitor lookups in rounds and applies their outcome to the store:
//! - **Round**: every eligible monitor looked up once, concurrently (bounded)
//! - **Catch-up**: series that advanced are retried until a round finds nothing
//! - **Completion**: one-shot monitors are deleted after their first result
//!
//! [`MonitorScheduler`] repeats the whole run on a timer.

mod config;
mod runner;
mod scheduler;
mod types;

pub use config::OrchestratorConfig;
pub use runner::MonitorOrchestrator;
pub use scheduler::MonitorScheduler;
pub use types::{JobResult, OrchestratorError};
