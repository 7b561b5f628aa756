//! Watch definitions.
//!
//! A monitor is either a one-shot query (removed after its first result) or a
//! series monitor that walks forward one episode per successful lookup.

mod lookup;
mod types;

pub use types::{Monitor, MonitorKind, MonitorRecord, OneShotMonitor, OwnerId, SeriesMonitor};
