//! Test support for `hylog` crates.
//!
//! [`SimulatedStore`] is a small paged log that implements
//! [`hylog_memory::CacheStore`]. It keeps a fixed window of resident pages,
//! reserves `empty_page_count` of them in response to eviction-pressure
//! requests, and pushes every evicted page to its subscribers.

mod store;

pub use store::{SimulatedStore, SimulatedStoreConfig};
