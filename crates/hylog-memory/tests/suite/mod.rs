mod concurrency;
mod target;

use hylog_testing::{SimulatedStore, SimulatedStoreConfig};
use std::sync::Arc;

/// A store whose seed is exactly `2^log_bits` bytes (no index buckets).
pub(crate) fn bare_store(page_size_bytes: u64, capacity_pages: usize) -> Arc<SimulatedStore> {
    SimulatedStore::new(SimulatedStoreConfig {
        page_size_bytes,
        capacity_pages,
        index_size: 0,
    })
}
