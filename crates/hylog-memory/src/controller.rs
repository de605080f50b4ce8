use crate::ledger::{total_with_overflow, SizeLedger, BUCKET_OVERHEAD_BYTES};
use crate::pressure::TargetState;
use crate::report::MemoryReport;
use crate::stats::{ControllerStats, ControllerStatsSnapshot};
use crate::store::{
    CacheStore, EvictedRecord, EvictionError, EvictionObserver, PressureAdjustment,
};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Weak};
use thiserror::Error;

/// Target value meaning "no budget".
pub const UNBOUNDED_TARGET: i64 = i64::MAX;

/// Largest log window accepted; `2^62` still leaves room for index overhead.
pub const MAX_LOG_MEMORY_SIZE_BITS: u8 = 62;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("log memory size bits {bits} exceeds the maximum of {max}")]
    LogSizeBitsOutOfRange { bits: u8, max: u8 },
    #[error("initial footprint overflows: {index_size} index buckets plus a 2^{bits} byte log")]
    SeedOverflow { index_size: u64, bits: u8 },
}

/// Construction parameters for [`MemoryController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    /// The in-memory log window is `2^log_memory_size_bits` bytes.
    pub log_memory_size_bits: u8,
    /// `None` leaves the target unbounded.
    pub target_size_bytes: Option<u64>,
}

impl ControllerOptions {
    pub fn new(log_memory_size_bits: u8) -> Self {
        Self {
            log_memory_size_bits,
            target_size_bytes: None,
        }
    }

    pub fn with_target_size_bytes(mut self, bytes: u64) -> Self {
        self.target_size_bytes = Some(bytes);
        self
    }
}

struct Inner {
    store: Weak<dyn CacheStore>,
    ledger: SizeLedger,
    // Relaxed: every eviction tick re-reads the target, so a stale read only
    // delays convergence by one tick.
    target: AtomicI64,
    stats: ControllerStats,
    underflow_reported: AtomicBool,
}

impl Inner {
    fn overflow_buckets(&self) -> u64 {
        self.store
            .upgrade()
            .map(|store| store.overflow_bucket_count())
            .unwrap_or(0)
    }

    fn total_size_bytes(&self) -> i64 {
        total_with_overflow(self.ledger.bytes(), self.overflow_buckets())
    }

    fn target(&self) -> i64 {
        self.target.load(Ordering::Relaxed)
    }

    fn adjust(&self, adjustment: PressureAdjustment) {
        let Some(store) = self.store.upgrade() else {
            tracing::debug!(
                target = "hylog.memory",
                ?adjustment,
                "store dropped; skipping eviction pressure adjustment"
            );
            return;
        };
        store.adjust_eviction_pressure(adjustment);
        self.stats.record_adjustment(adjustment);
    }
}

/// Tracks a hybrid-log store's footprint and steers its eviction pressure
/// toward a target size.
///
/// Writers report size changes through [`MemoryController::add_tracked_size`];
/// the store reports reclaimed pages through the eviction observer
/// registered at [`MemoryController::attach`]. Each reclaimed page nudges the
/// store's eviction-pressure knob by at most one step.
#[derive(Clone)]
pub struct MemoryController {
    inner: Arc<Inner>,
}

impl MemoryController {
    /// Seed the ledger from the store's sizing and subscribe to its evictions.
    ///
    /// The controller only keeps a weak reference to `store`.
    pub fn attach<S>(store: &Arc<S>, options: ControllerOptions) -> Result<Self, ControllerError>
    where
        S: CacheStore + 'static,
    {
        let bits = options.log_memory_size_bits;
        if bits > MAX_LOG_MEMORY_SIZE_BITS {
            return Err(ControllerError::LogSizeBitsOutOfRange {
                bits,
                max: MAX_LOG_MEMORY_SIZE_BITS,
            });
        }

        let index_size = store.index_size();
        let log_bytes = 1i64 << bits;
        let seed = i64::try_from(index_size)
            .ok()
            .and_then(|buckets| buckets.checked_mul(BUCKET_OVERHEAD_BYTES))
            .and_then(|index_bytes| index_bytes.checked_add(log_bytes))
            .ok_or(ControllerError::SeedOverflow { index_size, bits })?;

        let target = options
            .target_size_bytes
            .map(target_from_bytes)
            .unwrap_or(UNBOUNDED_TARGET);

        let weak_store: Weak<S> = Arc::downgrade(store);
        let weak_store: Weak<dyn CacheStore> = weak_store;
        let inner = Arc::new(Inner {
            store: weak_store,
            ledger: SizeLedger::new(seed),
            target: AtomicI64::new(target),
            stats: ControllerStats::default(),
            underflow_reported: AtomicBool::new(false),
        });

        store.subscribe_evictions(Arc::new(FeedbackLoop {
            inner: inner.clone(),
        }));

        tracing::info!(
            target = "hylog.memory",
            index_bytes = index_size.saturating_mul(BUCKET_OVERHEAD_BYTES as u64),
            log_bytes,
            seed_bytes = seed,
            target_bytes = options.target_size_bytes,
            "memory controller attached"
        );

        Ok(Self { inner })
    }

    /// Apply a signed size delta from the write path.
    pub fn add_tracked_size(&self, delta: i64) {
        self.inner.ledger.add(delta);
    }

    /// Update the target footprint.
    ///
    /// Lowering the target immediately requests one extra page of eviction
    /// pressure; raising it is left to the next eviction tick.
    pub fn set_target_size_bytes(&self, bytes: u64) {
        let target = target_from_bytes(bytes);
        let previous = self.inner.target.swap(target, Ordering::Relaxed);
        tracing::debug!(
            target = "hylog.memory",
            previous,
            target,
            "memory target updated"
        );
        if target < previous {
            self.inner.adjust(PressureAdjustment::More);
        }
    }

    /// Current target; [`UNBOUNDED_TARGET`] when no budget is set.
    pub fn target_size_bytes(&self) -> i64 {
        self.inner.target()
    }

    pub fn is_target_bounded(&self) -> bool {
        self.inner.target() != UNBOUNDED_TARGET
    }

    pub fn tracked_size_bytes(&self) -> i64 {
        self.inner.ledger.bytes()
    }

    /// Tracked bytes plus overflow-bucket overhead, recomputed on every call.
    ///
    /// This is the raw control signal and may be negative if the write path
    /// under-reports. Anything surfaced outside the process (metrics, admin
    /// endpoints, logs) must use [`MemoryController::reported_total_bytes`]
    /// or [`MemoryController::report`], which clamp at zero.
    pub fn total_size_bytes(&self) -> i64 {
        self.inner.total_size_bytes()
    }

    /// [`MemoryController::total_size_bytes`] clamped at zero for external
    /// consumers. The first negative observation is logged as a tracking bug.
    pub fn reported_total_bytes(&self) -> u64 {
        let total = self.total_size_bytes();
        self.clamp_reported(total)
    }

    pub fn state(&self) -> TargetState {
        TargetState::classify(self.total_size_bytes(), self.inner.target())
    }

    pub fn stats(&self) -> ControllerStatsSnapshot {
        self.inner.stats.snapshot()
    }

    pub fn report(&self) -> MemoryReport {
        let tracked_bytes = self.inner.ledger.bytes();
        let overflow_buckets = self.inner.overflow_buckets();
        let total = total_with_overflow(tracked_bytes, overflow_buckets);
        let target = self.inner.target();
        MemoryReport {
            tracked_bytes,
            overflow_buckets,
            total_bytes: self.clamp_reported(total),
            target_bytes: (target != UNBOUNDED_TARGET).then_some(target as u64),
            state: TargetState::classify(total, target),
            tracking_underflow: total < 0,
            stats: self.inner.stats.snapshot(),
        }
    }

    fn clamp_reported(&self, total: i64) -> u64 {
        if total >= 0 {
            return total as u64;
        }
        if !self.inner.underflow_reported.swap(true, Ordering::Relaxed) {
            tracing::warn!(
                target = "hylog.memory",
                total_bytes = total,
                tracked_bytes = self.inner.ledger.bytes(),
                "tracked memory footprint went negative; size accounting is out of sync"
            );
        }
        0
    }
}

impl std::fmt::Debug for MemoryController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryController")
            .field("tracked_bytes", &self.inner.ledger.bytes())
            .field("target_bytes", &self.inner.target())
            .finish()
    }
}

fn target_from_bytes(bytes: u64) -> i64 {
    i64::try_from(bytes).unwrap_or(UNBOUNDED_TARGET)
}

/// The eviction observer registered with the store.
struct FeedbackLoop {
    inner: Arc<Inner>,
}

impl EvictionObserver for FeedbackLoop {
    fn on_evicted(&self, records: &mut dyn Iterator<Item = EvictedRecord>) {
        let mut released = 0u64;
        let mut count = 0u64;
        let mut tombstones = 0u64;
        for record in records {
            released = released.saturating_add(record.accounted_bytes());
            count += 1;
            if record.tombstone {
                tombstones += 1;
            }
        }

        self.inner
            .ledger
            .add(-i64::try_from(released).unwrap_or(i64::MAX));
        self.inner.stats.record_tick(count, tombstones, released);

        let total = self.inner.total_size_bytes();
        let target = self.inner.target();
        let state = TargetState::classify(total, target);
        tracing::trace!(
            target = "hylog.memory",
            records = count,
            released,
            total,
            target,
            ?state,
            "eviction tick"
        );

        if let Some(adjustment) = state.adjustment() {
            self.inner.adjust(adjustment);
        }
    }

    fn on_completed(&self) {
        tracing::debug!(target = "hylog.memory", "eviction channel completed");
    }

    fn on_error(&self, error: &EvictionError) {
        self.inner.stats.record_fault();
        tracing::error!(
            target = "hylog.memory",
            error = %error,
            "eviction notification failed; tracked size may be overstated"
        );
    }
}
