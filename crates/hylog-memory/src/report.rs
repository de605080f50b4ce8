use crate::pressure::TargetState;
use crate::stats::ControllerStatsSnapshot;
use serde::{Deserialize, Serialize};

/// Snapshot of the controller's view of the store footprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryReport {
    pub tracked_bytes: i64,
    pub overflow_buckets: u64,
    /// Derived footprint, clamped at zero.
    pub total_bytes: u64,
    /// `None` while the target is unbounded.
    pub target_bytes: Option<u64>,
    pub state: TargetState,
    /// Set when the raw derived footprint was negative.
    pub tracking_underflow: bool,
    pub stats: ControllerStatsSnapshot,
}

impl MemoryReport {
    /// Bytes above target, or zero when at or below it.
    pub fn excess_bytes(&self) -> u64 {
        match self.target_bytes {
            Some(target) => self.total_bytes.saturating_sub(target),
            None => 0,
        }
    }
}
