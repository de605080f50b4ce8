//! Memory-budget control for hybrid-log key/value caches.
//!
//! A [`MemoryController`] keeps a lock-free ledger of bytes resident in a
//! [`CacheStore`] and closes a feedback loop over the store's eviction
//! notifications:
//! - Writers report inserts and updates with [`MemoryController::add_tracked_size`].
//! - Each evicted page shrinks the ledger by the bytes its records held.
//! - After every page the controller asks the store for one more or one less
//!   page of eviction pressure, depending on whether the footprint is above or
//!   below target.
//!
//! The controller never decides which records are evicted, only how much
//! pressure to apply.

mod budget;
mod controller;
mod ledger;
mod pressure;
mod report;
mod stats;
mod store;

pub use budget::{parse_byte_size, ByteSizeError, GB, KB, MB, TB};
pub use controller::{
    ControllerError, ControllerOptions, MemoryController, MAX_LOG_MEMORY_SIZE_BITS,
    UNBOUNDED_TARGET,
};
pub use ledger::{SizeLedger, BUCKET_OVERHEAD_BYTES};
pub use pressure::TargetState;
pub use report::MemoryReport;
pub use stats::ControllerStatsSnapshot;
pub use store::{CacheStore, EvictedRecord, EvictionError, EvictionObserver, PressureAdjustment};
