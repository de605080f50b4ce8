use crate::store::PressureAdjustment;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Relaxed counters describing what the feedback loop has done so far.
#[derive(Debug, Default)]
pub struct ControllerStats {
    eviction_ticks: AtomicU64,
    records_evicted: AtomicU64,
    tombstones_evicted: AtomicU64,
    bytes_released: AtomicU64,
    more_requests: AtomicU64,
    less_requests: AtomicU64,
    channel_faults: AtomicU64,
}

/// Point-in-time copy of [`ControllerStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerStatsSnapshot {
    pub eviction_ticks: u64,
    pub records_evicted: u64,
    pub tombstones_evicted: u64,
    pub bytes_released: u64,
    pub more_requests: u64,
    pub less_requests: u64,
    pub channel_faults: u64,
}

impl ControllerStats {
    pub(crate) fn record_tick(&self, records: u64, tombstones: u64, bytes: u64) {
        self.eviction_ticks.fetch_add(1, Ordering::Relaxed);
        self.records_evicted.fetch_add(records, Ordering::Relaxed);
        self.tombstones_evicted
            .fetch_add(tombstones, Ordering::Relaxed);
        self.bytes_released.fetch_add(bytes, Ordering::Relaxed);
    }

    pub(crate) fn record_adjustment(&self, adjustment: PressureAdjustment) {
        let counter = match adjustment {
            PressureAdjustment::More => &self.more_requests,
            PressureAdjustment::Less => &self.less_requests,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fault(&self) {
        self.channel_faults.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ControllerStatsSnapshot {
        ControllerStatsSnapshot {
            eviction_ticks: self.eviction_ticks.load(Ordering::Relaxed),
            records_evicted: self.records_evicted.load(Ordering::Relaxed),
            tombstones_evicted: self.tombstones_evicted.load(Ordering::Relaxed),
            bytes_released: self.bytes_released.load(Ordering::Relaxed),
            more_requests: self.more_requests.load(Ordering::Relaxed),
            less_requests: self.less_requests.load(Ordering::Relaxed),
            channel_faults: self.channel_faults.load(Ordering::Relaxed),
        }
    }
}

impl ControllerStatsSnapshot {
    /// Net pages reserved by this controller (`more - less`).
    pub fn net_pressure(&self) -> i64 {
        self.more_requests as i64 - self.less_requests as i64
    }
}
