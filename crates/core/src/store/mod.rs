//! Durable storage for monitor records.

mod document;
mod json_store;
mod types;

pub use json_store::JsonMonitorStore;
pub use types::{MonitorStore, StoreChange, StoreError};
