use std::sync::atomic::{AtomicI64, Ordering};

/// Per-bucket cost charged for every primary and overflow hash-index bucket.
pub const BUCKET_OVERHEAD_BYTES: i64 = 64;

/// Lock-free running total of bytes resident in the store.
///
/// The value is the construction seed plus the sum of every delta applied
/// since. Deltas commute, so relaxed fetch-and-add is sufficient: the final
/// value depends only on the multiset of deltas, never on their interleaving.
#[derive(Debug)]
pub struct SizeLedger {
    bytes: AtomicI64,
}

impl SizeLedger {
    pub fn new(seed: i64) -> Self {
        Self {
            bytes: AtomicI64::new(seed),
        }
    }

    /// Apply a signed delta. Wraps on overflow rather than panicking; a
    /// wrapped ledger is already a tracking bug and is surfaced by reporting.
    pub fn add(&self, delta: i64) {
        self.bytes.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn bytes(&self) -> i64 {
        self.bytes.load(Ordering::Relaxed)
    }
}

/// Footprint derived from the ledger plus live overflow buckets.
pub fn total_with_overflow(tracked: i64, overflow_buckets: u64) -> i64 {
    let overflow = i64::try_from(overflow_buckets)
        .unwrap_or(i64::MAX)
        .saturating_mul(BUCKET_OVERHEAD_BYTES);
    tracked.saturating_add(overflow)
}
