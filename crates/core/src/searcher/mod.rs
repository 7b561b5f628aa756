//! Torrent search abstraction.
//!
//! This module provides a `SearchProvider` trait for querying a torrent index
//! and the apibay implementation used in production.

mod apibay;
mod types;

pub use apibay::ApibaySearcher;
pub use types::*;
