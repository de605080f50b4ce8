use super::bare_store;
use hylog_memory::{ControllerOptions, MemoryController, MB};

#[test]
fn lowering_unbounded_target_requests_one_page_of_pressure() {
    let store = bare_store(4096, 8);
    // 2^23 bytes = 8 MiB initial footprint.
    let controller = MemoryController::attach(&store, ControllerOptions::new(23)).unwrap();
    assert_eq!(controller.total_size_bytes(), (8 * MB) as i64);

    controller.set_target_size_bytes(5 * MB);

    assert_eq!(controller.target_size_bytes(), (5 * MB) as i64);
    assert_eq!(store.more_requests(), 1);
    assert_eq!(store.less_requests(), 0);
    assert_eq!(store.empty_page_count(), 1);
}

#[test]
fn repeating_the_same_target_is_a_no_op() {
    let store = bare_store(4096, 8);
    let controller = MemoryController::attach(&store, ControllerOptions::new(23)).unwrap();

    controller.set_target_size_bytes(5 * MB);
    controller.set_target_size_bytes(5 * MB);

    assert_eq!(store.more_requests(), 1);
    assert_eq!(controller.stats().more_requests, 1);
}

#[test]
fn raising_the_target_waits_for_the_next_eviction_tick() {
    let store = bare_store(4096, 8);
    let controller = MemoryController::attach(&store, ControllerOptions::new(23)).unwrap();

    controller.set_target_size_bytes(5 * MB);
    controller.set_target_size_bytes(6 * MB);
    controller.set_target_size_bytes(u64::MAX);

    assert_eq!(store.more_requests(), 1);
    assert_eq!(store.less_requests(), 0);
    assert!(!controller.is_target_bounded());
}

#[test]
fn every_strict_decrease_requests_pressure_again() {
    let store = bare_store(4096, 8);
    let controller = MemoryController::attach(&store, ControllerOptions::new(23)).unwrap();

    for target in [7 * MB, 6 * MB, 6 * MB, 7 * MB, 4 * MB] {
        controller.set_target_size_bytes(target);
    }

    assert_eq!(store.more_requests(), 3);
    assert_eq!(controller.target_size_bytes(), (4 * MB) as i64);
}

#[test]
fn target_may_sit_above_current_footprint() {
    let store = bare_store(4096, 8);
    let controller = MemoryController::attach(
        &store,
        ControllerOptions::new(12).with_target_size_bytes(1 << 30),
    )
    .unwrap();

    controller.set_target_size_bytes(1 << 20);

    // The new target still exceeds the 4 KiB footprint, but the decrease signals.
    assert_eq!(store.more_requests(), 1);
}

#[test]
fn each_decrease_from_unbounded_signals_even_above_footprint() {
    let store = bare_store(4096, 8);
    let controller = MemoryController::attach(&store, ControllerOptions::new(12)).unwrap();

    controller.set_target_size_bytes(1 << 30);
    controller.set_target_size_bytes(1 << 20);

    assert_eq!(store.more_requests(), 2);
}
