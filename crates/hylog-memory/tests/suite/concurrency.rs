use super::bare_store;
use hylog_memory::{ControllerOptions, EvictedRecord, MemoryController};
use proptest::prelude::*;
use std::thread;

#[test]
fn writers_and_eviction_thread_compose() {
    let store = bare_store(1_000, 1_024);
    let controller = MemoryController::attach(&store, ControllerOptions::new(20)).unwrap();

    // 100 pages of 10 records, 100 bytes each.
    for _ in 0..1_000 {
        store.append(EvictedRecord::live(40, 60));
    }
    let evicted_bytes = store.resident_bytes() as i64;

    let writers: Vec<_> = (0..4)
        .map(|_| {
            let controller = controller.clone();
            thread::spawn(move || {
                for _ in 0..5_000 {
                    controller.add_tracked_size(100);
                    controller.add_tracked_size(-40);
                }
            })
        })
        .collect();
    let evictor = {
        let store = store.clone();
        thread::spawn(move || while store.evict_head_page().is_some() {})
    };

    for writer in writers {
        writer.join().unwrap();
    }
    evictor.join().unwrap();

    assert_eq!(
        controller.tracked_size_bytes(),
        (1 << 20) + 4 * 5_000 * 60 - evicted_bytes
    );
    assert_eq!(controller.stats().eviction_ticks, 100);
}

#[test]
fn concurrent_target_updates_never_lose_pressure_steps() {
    let store = bare_store(1_000, 1 << 16);
    let controller = MemoryController::attach(&store, ControllerOptions::new(20)).unwrap();

    // Each thread walks its own strictly decreasing sequence; every call that
    // lowers the shared target below its previous value must signal once.
    let threads: Vec<_> = (0..4u64)
        .map(|offset| {
            let controller = controller.clone();
            thread::spawn(move || {
                for step in (0..1_000u64).rev() {
                    controller.set_target_size_bytes(step * 4 + offset);
                }
            })
        })
        .collect();
    for thread in threads {
        thread.join().unwrap();
    }

    assert_eq!(controller.stats().more_requests, store.more_requests());
    assert!(store.more_requests() >= 1_000);
}

proptest! {
    // The suite lives under `tests/suite/`, where source-relative failure
    // persistence cannot locate a crate root.
    #![proptest_config(ProptestConfig {
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn total_is_seed_plus_deltas_regardless_of_interleaving(
        deltas in proptest::collection::vec(-10_000i64..10_000, 0..256),
        overflow in 0u64..4_096,
        threads in 1usize..6,
    ) {
        let store = bare_store(1_000, 8);
        store.set_overflow_bucket_count(overflow);
        let controller = MemoryController::attach(&store, ControllerOptions::new(16)).unwrap();

        let chunk = deltas.len().div_ceil(threads).max(1);
        let handles: Vec<_> = deltas
            .chunks(chunk)
            .map(|chunk| {
                let chunk = chunk.to_vec();
                let controller = controller.clone();
                thread::spawn(move || {
                    for delta in chunk.into_iter().rev() {
                        controller.add_tracked_size(delta);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let expected = (1i64 << 16) + deltas.iter().sum::<i64>() + overflow as i64 * 64;
        prop_assert_eq!(controller.total_size_bytes(), expected);
    }
}
