use hylog_memory::{
    CacheStore, EvictedRecord, EvictionError, EvictionObserver, PressureAdjustment,
};
use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedStoreConfig {
    /// Bytes of accounted record data that fit on one page.
    pub page_size_bytes: u64,
    /// Pages the memory-resident window can hold.
    pub capacity_pages: usize,
    /// Primary hash-index buckets.
    pub index_size: u64,
}

impl Default for SimulatedStoreConfig {
    fn default() -> Self {
        Self {
            page_size_bytes: 4096,
            capacity_pages: 64,
            index_size: 1024,
        }
    }
}

#[derive(Debug)]
struct Page {
    id: u64,
    bytes: u64,
    records: Vec<EvictedRecord>,
}

#[derive(Debug, Default)]
struct Log {
    pages: VecDeque<Page>,
    next_page_id: u64,
}

pub struct SimulatedStore {
    config: SimulatedStoreConfig,
    log: Mutex<Log>,
    observers: RwLock<Vec<Arc<dyn EvictionObserver>>>,
    overflow_buckets: AtomicU64,
    empty_page_count: AtomicUsize,
    more_requests: AtomicU64,
    less_requests: AtomicU64,
    fail_next_scan: AtomicBool,
}

impl SimulatedStore {
    pub fn new(config: SimulatedStoreConfig) -> Arc<Self> {
        assert!(config.capacity_pages >= 1, "store needs at least one page");
        Arc::new(Self {
            config,
            log: Mutex::new(Log::default()),
            observers: RwLock::new(Vec::new()),
            overflow_buckets: AtomicU64::new(0),
            empty_page_count: AtomicUsize::new(0),
            more_requests: AtomicU64::new(0),
            less_requests: AtomicU64::new(0),
            fail_next_scan: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> SimulatedStoreConfig {
        self.config
    }

    pub fn set_overflow_bucket_count(&self, count: u64) {
        self.overflow_buckets.store(count, Ordering::Relaxed);
    }

    /// Pages currently reserved out of the window by pressure requests.
    pub fn empty_page_count(&self) -> usize {
        self.empty_page_count.load(Ordering::Relaxed)
    }

    pub fn more_requests(&self) -> u64 {
        self.more_requests.load(Ordering::Relaxed)
    }

    pub fn less_requests(&self) -> u64 {
        self.less_requests.load(Ordering::Relaxed)
    }

    pub fn subscriber_count(&self) -> usize {
        self.observers.read().len()
    }

    pub fn resident_pages(&self) -> usize {
        self.log.lock().pages.len()
    }

    /// Accounted bytes of all resident records.
    pub fn resident_bytes(&self) -> u64 {
        self.log.lock().pages.iter().map(|page| page.bytes).sum()
    }

    /// Append a record to the tail page, opening a new page when it is full.
    pub fn append(&self, record: EvictedRecord) {
        let bytes = record.accounted_bytes();
        let mut log = self.log.lock();
        let needs_page = match log.pages.back() {
            Some(tail) => {
                !tail.records.is_empty() && tail.bytes + bytes > self.config.page_size_bytes
            }
            None => true,
        };
        if needs_page {
            let id = log.next_page_id;
            log.next_page_id += 1;
            log.pages.push_back(Page {
                id,
                bytes: 0,
                records: Vec::new(),
            });
        }
        if let Some(tail) = log.pages.back_mut() {
            tail.bytes += bytes;
            tail.records.push(record);
        }
    }

    /// Make the next evicted page report a scan failure instead of its records.
    pub fn fail_next_scan(&self) {
        self.fail_next_scan.store(true, Ordering::Relaxed);
    }

    /// Reclaim the oldest page and notify subscribers. Returns the number of
    /// records on the page, or `None` when the log is empty.
    pub fn evict_head_page(&self) -> Option<usize> {
        let page = self.log.lock().pages.pop_front()?;
        let observers = self.observers.read().clone();

        if self.fail_next_scan.swap(false, Ordering::Relaxed) {
            let error = EvictionError::PageScan {
                page: page.id,
                reason: "simulated scan failure".to_owned(),
            };
            for observer in &observers {
                observer.on_error(&error);
            }
            return Some(page.records.len());
        }

        for observer in &observers {
            observer.on_evicted(&mut page.records.iter().copied());
        }
        tracing::trace!(
            target = "hylog.testing",
            page = page.id,
            records = page.records.len(),
            "evicted page"
        );
        Some(page.records.len())
    }

    /// Evict head pages until the resident log fits the window minus the
    /// reserved empty pages. Returns the number of pages evicted.
    pub fn run_eviction(&self) -> usize {
        let mut evicted = 0;
        loop {
            let allowed = self
                .config
                .capacity_pages
                .saturating_sub(self.empty_page_count())
                .max(1);
            if self.resident_pages() <= allowed {
                return evicted;
            }
            if self.evict_head_page().is_none() {
                return evicted;
            }
            evicted += 1;
        }
    }

    /// Signal end of the eviction stream to every subscriber.
    pub fn close(&self) {
        for observer in self.observers.read().iter() {
            observer.on_completed();
        }
    }
}

impl CacheStore for SimulatedStore {
    fn index_size(&self) -> u64 {
        self.config.index_size
    }

    fn overflow_bucket_count(&self) -> u64 {
        self.overflow_buckets.load(Ordering::Relaxed)
    }

    fn subscribe_evictions(&self, observer: Arc<dyn EvictionObserver>) {
        self.observers.write().push(observer);
    }

    fn adjust_eviction_pressure(&self, adjustment: PressureAdjustment) {
        let max = self.config.capacity_pages - 1;
        match adjustment {
            PressureAdjustment::More => {
                self.more_requests.fetch_add(1, Ordering::Relaxed);
                let _ = self.empty_page_count.fetch_update(
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                    |count| (count < max).then_some(count + 1),
                );
            }
            PressureAdjustment::Less => {
                self.less_requests.fetch_add(1, Ordering::Relaxed);
                let _ = self.empty_page_count.fetch_update(
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                    |count| count.checked_sub(1),
                );
            }
        }
    }
}

impl std::fmt::Debug for SimulatedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedStore")
            .field("config", &self.config)
            .field("resident_pages", &self.resident_pages())
            .field("empty_page_count", &self.empty_page_count())
            .finish()
    }
}
