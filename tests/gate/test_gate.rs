//! Tests for `SessionGate`
//!
//! Timing tests run on a paused clock so waits are deterministic.

#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chatbot_session::SessionGate;
use parking_lot::Mutex;
use tokio::time::Instant;
use tokio_test::{assert_pending, assert_ready};

const MIN_INTERVAL: Duration = Duration::from_millis(2000);

#[tokio::test(start_paused = true)]
async fn test_idle_gate_grants_immediately() {
    common::init_logging();
    let gate = SessionGate::new(MIN_INTERVAL);
    let start = Instant::now();

    let permit = gate.acquire().await;
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert!(gate.is_active());
    assert_eq!(gate.last_request_start(), Some(start));

    drop(permit);
    assert!(!gate.is_active());
}

#[tokio::test(start_paused = true)]
async fn test_next_turn_waits_out_interval_from_previous_start() {
    let gate = SessionGate::new(MIN_INTERVAL);
    let t0 = Instant::now();

    // Turn A runs from t=0 to t=300ms.
    let permit = gate.acquire().await;
    tokio::time::sleep(Duration::from_millis(300)).await;
    drop(permit);

    // Turn B arrives at t=500ms and must not start before t=2000ms.
    tokio::time::sleep(Duration::from_millis(200)).await;
    common::assert_near(t0.elapsed(), Duration::from_millis(500));

    let _permit = gate.acquire().await;
    common::assert_near(t0.elapsed(), MIN_INTERVAL);
}

#[tokio::test(start_paused = true)]
async fn test_slow_turn_does_not_extend_interval() {
    let gate = SessionGate::new(MIN_INTERVAL);
    let t0 = Instant::now();

    // Turn A holds the gate for 3s, longer than the interval.
    let permit = gate.acquire().await;
    tokio::time::sleep(Duration::from_millis(3000)).await;
    drop(permit);

    // Spacing is measured from A's start, so B proceeds right away.
    let _permit = gate.acquire().await;
    common::assert_near(t0.elapsed(), Duration::from_millis(3000));
}

#[tokio::test]
async fn test_held_gate_blocks_until_release() {
    let gate = SessionGate::new(MIN_INTERVAL);
    let permit = gate.acquire().await;

    let mut waiter = tokio_test::task::spawn(gate.acquire_exclusive());
    assert_pending!(waiter.poll());
    assert_pending!(waiter.poll());

    drop(permit);
    assert!(waiter.is_woken());
    let second = assert_ready!(waiter.poll());
    assert!(gate.is_active());

    drop(second);
    assert!(!gate.is_active());
}

#[tokio::test(start_paused = true)]
async fn test_burst_is_serialized_and_spaced() {
    let gate = Arc::new(SessionGate::new(MIN_INTERVAL));
    let holders = Arc::new(AtomicUsize::new(0));
    let max_holders = Arc::new(AtomicUsize::new(0));
    let grants = Arc::new(Mutex::new(Vec::new()));

    let tasks: Vec<_> = (0..5)
        .map(|_| {
            let gate = Arc::clone(&gate);
            let holders = Arc::clone(&holders);
            let max_holders = Arc::clone(&max_holders);
            let grants = Arc::clone(&grants);
            tokio::spawn(async move {
                let permit = gate.acquire().await;
                grants.lock().push(Instant::now());
                let now = holders.fetch_add(1, Ordering::SeqCst) + 1;
                max_holders.fetch_max(now, Ordering::SeqCst);

                tokio::time::sleep(Duration::from_millis(100)).await;

                holders.fetch_sub(1, Ordering::SeqCst);
                drop(permit);
            })
        })
        .collect();

    for task in tasks {
        task.await.expect("gate task panicked");
    }

    assert_eq!(max_holders.load(Ordering::SeqCst), 1);

    let grants = grants.lock().clone();
    assert_eq!(grants.len(), 5);
    for pair in grants.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(gap >= MIN_INTERVAL, "grants only {gap:?} apart");
    }
}

#[tokio::test(start_paused = true)]
async fn test_waiters_are_served_in_arrival_order() {
    let gate = Arc::new(SessionGate::new(Duration::from_millis(50)));
    let order = Arc::new(Mutex::new(Vec::new()));

    let permit = gate.acquire().await;

    let mut tasks = Vec::new();
    for i in 0..3 {
        let gate = Arc::clone(&gate);
        let order = Arc::clone(&order);
        tasks.push(tokio::spawn(async move {
            let _permit = gate.acquire().await;
            order.lock().push(i);
        }));
        // Let the task reach the queue before spawning the next one.
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    drop(permit);
    for task in tasks {
        task.await.expect("gate task panicked");
    }

    assert_eq!(*order.lock(), vec![0, 1, 2]);
}

#[tokio::test(start_paused = true)]
async fn test_release_after_failed_turn_body() {
    let gate = SessionGate::new(MIN_INTERVAL);
    let t0 = Instant::now();

    let result: Result<(), &str> = async {
        let _permit = gate.acquire().await;
        Err("agent exploded mid-turn")
    }
    .await;
    assert!(result.is_err());
    assert!(!gate.is_active());

    let _permit = gate.acquire().await;
    common::assert_near(t0.elapsed(), MIN_INTERVAL);
}

#[tokio::test]
async fn test_release_is_idempotent() {
    let gate = SessionGate::new(MIN_INTERVAL);

    gate.release();
    gate.release();
    assert!(!gate.is_active());

    let permit = gate.acquire().await;
    permit.release();
    assert!(!gate.is_active());
    gate.release();
    assert!(!gate.is_active());
}

#[tokio::test]
async fn test_stale_permit_cannot_release_next_holder() {
    let gate = SessionGate::new(MIN_INTERVAL);

    let first = gate.acquire_exclusive().await;
    gate.release();
    let second = gate.acquire_exclusive().await;
    assert!(gate.is_active());

    // The first permit's grant was forced open; dropping it must not
    // touch the second holder's grant.
    drop(first);
    assert!(gate.is_active());

    let mut third = tokio_test::task::spawn(gate.acquire_exclusive());
    assert_pending!(third.poll());

    drop(second);
    assert!(third.is_woken());
    let _third = assert_ready!(third.poll());
    assert!(gate.is_active());
}

#[tokio::test(start_paused = true)]
async fn test_exclusive_acquire_ignores_interval() {
    let gate = SessionGate::new(MIN_INTERVAL);
    let t0 = Instant::now();

    drop(gate.acquire().await);

    // A reset right after a turn does not wait for the interval...
    let permit = gate.acquire_exclusive().await;
    assert_eq!(t0.elapsed(), Duration::ZERO);
    assert!(gate.is_active());
    drop(permit);

    // ...and does not push the next turn further out either.
    assert_eq!(gate.last_request_start(), Some(t0));
    let _permit = gate.acquire().await;
    common::assert_near(t0.elapsed(), MIN_INTERVAL);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_waiter_does_not_hold_gate() {
    let gate = SessionGate::new(MIN_INTERVAL);
    drop(gate.acquire().await);

    let cancelled = tokio::time::timeout(Duration::from_millis(100), gate.acquire()).await;
    assert!(cancelled.is_err());
    assert!(!gate.is_active());

    let t0 = Instant::now();
    let _permit = gate.acquire().await;
    common::assert_near(t0.elapsed(), Duration::from_millis(1900));
}
