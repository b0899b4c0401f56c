//! Integration tests for the countdown primitive.
//!
//! Uses `tokio::test(start_paused = true)` so time is deterministic:
//! `sleep_until` resolves instantly when the runtime auto-advances the
//! clock, and no test ever waits wall-clock seconds.

use std::time::Duration;

use quizcast_timer::{Countdown, CountdownEvent};

// =========================================================================
// Initial state
// =========================================================================

#[test]
fn test_idle_countdown_is_unarmed() {
    let c = Countdown::idle();
    assert!(!c.is_armed());
    assert!(!c.is_paused());
    assert_eq!(c.remaining(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_idle_countdown_pends_forever() {
    let mut c = Countdown::idle();

    let result =
        tokio::time::timeout(Duration::from_secs(60), c.wait()).await;
    assert!(result.is_err(), "idle countdown must never fire");
}

// =========================================================================
// Tick sequence fidelity
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_twenty_second_countdown_ticks_nineteen_down_to_zero() {
    let mut c = Countdown::idle();
    c.start(20);

    // Exactly 20 ticks with strictly decreasing remaining 19 → 0 ...
    for expected in (0..20).rev() {
        let event = c.wait().await;
        assert_eq!(event, CountdownEvent::Tick { remaining: expected });
    }

    // ... followed by exactly one expiry.
    assert_eq!(c.wait().await, CountdownEvent::Expired);
    assert!(!c.is_armed());
}

#[tokio::test(start_paused = true)]
async fn test_one_second_countdown_fires_zero_tick_then_expiry() {
    let mut c = Countdown::idle();
    c.start(1);

    assert_eq!(c.wait().await, CountdownEvent::Tick { remaining: 0 });
    assert_eq!(c.wait().await, CountdownEvent::Expired);
}

#[tokio::test(start_paused = true)]
async fn test_zero_second_countdown_expires_immediately() {
    let mut c = Countdown::idle();
    c.start(0);

    assert_eq!(c.wait().await, CountdownEvent::Expired);
}

#[tokio::test(start_paused = true)]
async fn test_ticks_arrive_one_second_apart() {
    let mut c = Countdown::idle();
    c.start(3);

    let t0 = tokio::time::Instant::now();
    c.wait().await;
    assert_eq!(t0.elapsed(), Duration::from_secs(1));
    c.wait().await;
    assert_eq!(t0.elapsed(), Duration::from_secs(2));
}

// =========================================================================
// Pause / resume
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_paused_countdown_does_not_tick() {
    let mut c = Countdown::idle();
    c.start(10);
    c.wait().await; // remaining = 9
    c.pause();

    let result =
        tokio::time::timeout(Duration::from_secs(300), c.wait()).await;
    assert!(result.is_err(), "paused countdown must not tick");
    assert_eq!(c.remaining(), 9, "remaining preserved across the pause");
}

#[tokio::test(start_paused = true)]
async fn test_resume_continues_at_r_minus_one() {
    let mut c = Countdown::idle();
    c.start(10);
    c.wait().await; // remaining = 9
    c.pause();

    // A long pause must neither skip nor double-count.
    tokio::time::advance(Duration::from_secs(120)).await;
    c.resume();

    assert_eq!(c.wait().await, CountdownEvent::Tick { remaining: 8 });
}

#[tokio::test(start_paused = true)]
async fn test_pause_is_idempotent() {
    let mut c = Countdown::idle();
    c.start(5);
    c.pause();
    c.pause();
    c.resume();

    assert_eq!(c.wait().await, CountdownEvent::Tick { remaining: 4 });
}

#[test]
fn test_pause_on_idle_countdown_is_a_no_op() {
    let mut c = Countdown::idle();
    c.pause();
    assert!(!c.is_paused());
}

// =========================================================================
// Cancel
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_cancel_stops_pending_ticks() {
    let mut c = Countdown::idle();
    c.start(5);
    c.wait().await;
    c.cancel();

    assert!(!c.is_armed());
    let result =
        tokio::time::timeout(Duration::from_secs(60), c.wait()).await;
    assert!(result.is_err(), "cancelled countdown must never fire");
}

#[tokio::test(start_paused = true)]
async fn test_cancel_discards_pending_expiry() {
    let mut c = Countdown::idle();
    c.start(1);
    c.wait().await; // zero tick; expiry now pending
    c.cancel();

    let result =
        tokio::time::timeout(Duration::from_secs(60), c.wait()).await;
    assert!(result.is_err(), "cancel must swallow the pending expiry");
}

// =========================================================================
// Restart
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_start_replaces_previous_run() {
    let mut c = Countdown::idle();
    c.start(30);
    c.wait().await; // remaining = 29

    c.start(5);
    assert_eq!(c.remaining(), 5);
    assert_eq!(c.wait().await, CountdownEvent::Tick { remaining: 4 });
}

#[tokio::test(start_paused = true)]
async fn test_restart_clears_paused_state() {
    let mut c = Countdown::idle();
    c.start(10);
    c.pause();

    c.start(3);
    assert!(!c.is_paused());
    assert_eq!(c.wait().await, CountdownEvent::Tick { remaining: 2 });
}
