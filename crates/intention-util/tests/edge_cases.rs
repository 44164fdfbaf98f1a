//! Edge case tests for intention-util
//!
//! Public helpers used together the way modules use them.

use intention_util::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// TIMER TESTS
// ============================================================================

#[test]
fn test_keyed_timer_restart_replaces_schedule() {
    let registry = TimerRegistry::new();
    let ticks = Arc::new(AtomicUsize::new(0));

    let timer = registry.timer(Some("poll"));
    let t = ticks.clone();
    timer.set_callback(move || { t.fetch_add(1, Ordering::SeqCst); });
    timer.start(Some(Duration::from_millis(5)));

    // Same timer from the registry; restarting must not double the rate
    registry.timer(Some("poll")).start(None);
    assert_eq!(registry.timer(Some("poll")).interval(), Duration::from_millis(5));

    smol::block_on(smol::Timer::after(Duration::from_millis(60)));
    registry.stop_all();
    assert!(!timer.is_running());

    assert!(ticks.load(Ordering::SeqCst) >= 1);
}

#[test]
fn test_unkeyed_timers_not_tracked() {
    let registry = TimerRegistry::new();
    registry.timer(None);
    registry.timer(None);
    assert!(registry.is_empty());
}

// ============================================================================
// SEARCH TESTS
// ============================================================================

#[test]
fn test_fuzzy_module_names() {
    let modules = vec![
        "intention/utils".to_string(),
        "intention/slave".to_string(),
        "intention/timer".to_string(),
        "vendor/jquery".to_string(),
    ];

    let found = fuzzy("itim", &modules);
    assert_eq!(found, vec![&modules[2]]);

    assert_eq!(fuzzy("INT", &modules).len(), 3);
    assert!(fuzzy("zzz", &modules).is_empty());
}

// ============================================================================
// BOARD TESTS
// ============================================================================

#[test]
fn test_board_between_threads() {
    let board = Board::new();
    let writer = board.clone();

    std::thread::spawn(move || {
        writer.set("score", 42).unwrap();
    })
    .join()
    .unwrap();

    assert_eq!(board.get_as::<i32>("score"), Some(42));
    assert!(is_json(&board.get("score").unwrap().to_string()));
}

#[test]
fn test_capitalized_angle_label() {
    let angle = rad_to_deg(angle_between(Point::new(0.0, 0.0), Point::new(0.0, 2.0)));
    let label = capitalize(&format!("angle {:.0}", angle));
    assert_eq!(label, "Angle 90");
}
