use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Relative step applied to the store's eviction-pressure knob.
///
/// The knob has no absolute setter: concurrent adjusters compose because
/// every change is a single ±1 step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PressureAdjustment {
    /// Reserve one more page out of the memory-resident window.
    More,
    /// Give one previously reserved page back to the window.
    Less,
}

/// A record reclaimed from the in-memory log, as seen by eviction observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvictedRecord {
    pub key_size: u32,
    pub value_size: u32,
    pub tombstone: bool,
}

impl EvictedRecord {
    pub fn live(key_size: u32, value_size: u32) -> Self {
        Self {
            key_size,
            value_size,
            tombstone: false,
        }
    }

    pub fn tombstone(key_size: u32, value_size: u32) -> Self {
        Self {
            key_size,
            value_size,
            tombstone: true,
        }
    }

    /// Bytes this record contributed to tracked size.
    ///
    /// Tombstones only ever counted their key.
    pub fn accounted_bytes(&self) -> u64 {
        let key = u64::from(self.key_size);
        if self.tombstone {
            key
        } else {
            key + u64::from(self.value_size)
        }
    }
}

/// Fault reported through the eviction notification channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvictionError {
    #[error("failed to scan evicted page {page}: {reason}")]
    PageScan { page: u64, reason: String },
    #[error("eviction channel closed")]
    Closed,
}

/// Push subscriber for evicted pages.
///
/// The store calls [`EvictionObserver::on_evicted`] exactly once per
/// reclaimed page, before the page memory is reused.
pub trait EvictionObserver: Send + Sync {
    fn on_evicted(&self, records: &mut dyn Iterator<Item = EvictedRecord>);

    fn on_completed(&self) {}

    fn on_error(&self, _error: &EvictionError) {}
}

/// The capabilities a hybrid-log store exposes to the memory controller.
pub trait CacheStore: Send + Sync {
    /// Number of primary hash-index buckets.
    fn index_size(&self) -> u64;

    /// Live count of overflow buckets; changes independently of the log.
    fn overflow_bucket_count(&self) -> u64;

    fn subscribe_evictions(&self, observer: Arc<dyn EvictionObserver>);

    fn adjust_eviction_pressure(&self, adjustment: PressureAdjustment);
}
