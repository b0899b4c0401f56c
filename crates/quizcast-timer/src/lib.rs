//! Per-room countdown primitive for Quizcast.
//!
//! A [`Countdown`] ticks once per second, reports the remaining value on
//! every tick, fires a distinct expiry event when it reaches zero, and
//! supports pause (suspend without losing the remaining value) and cancel
//! (stop permanently). It has no knowledge of quiz semantics — it is purely
//! a scheduling primitive the room state machine drives.
//!
//! # Integration
//!
//! The countdown is designed to sit inside a room actor's `tokio::select!`
//! loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         event = countdown.wait() => match event {
//!             CountdownEvent::Tick { remaining } => { /* broadcast tick */ }
//!             CountdownEvent::Expired => { /* close the question */ }
//!         }
//!     }
//! }
//! ```
//!
//! While idle or paused, [`Countdown::wait`] pends forever — `select!`
//! keeps processing the other branches and no spurious event ever fires.
//! Deadlines are absolute (`sleep_until`), so the future produced by
//! `wait` is safe to drop and recreate on every loop iteration, which is
//! exactly what `select!` does.

use std::time::Duration;

use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace};

/// What a completed [`Countdown::wait`] call observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    /// One second elapsed. `remaining` counts down `N-1 ..= 0` for a
    /// countdown started at `N`.
    Tick { remaining: u32 },

    /// The countdown reached zero. Fires exactly once, immediately after
    /// the `Tick { remaining: 0 }` event, and the countdown returns to
    /// idle.
    Expired,
}

/// A cancellable, pausable one-second-resolution countdown.
///
/// One `Countdown` per room. The room starts it when a question goes live,
/// pauses it when the host drops, and cancels it on phase change or room
/// end.
#[derive(Debug)]
pub struct Countdown {
    /// Seconds left. Only meaningful while running or paused.
    remaining: u32,
    /// Absolute deadline of the next tick. `None` while idle.
    deadline: Option<TokioInstant>,
    paused: bool,
    /// Set after the `Tick { remaining: 0 }` fires; the next `wait`
    /// returns [`CountdownEvent::Expired`] without sleeping.
    expiry_pending: bool,
}

impl Countdown {
    /// Creates an idle countdown. [`wait`](Self::wait) pends until
    /// [`start`](Self::start) is called.
    pub fn idle() -> Self {
        Self {
            remaining: 0,
            deadline: None,
            paused: false,
            expiry_pending: false,
        }
    }

    /// Arms the countdown for `secs` seconds, replacing any previous run.
    ///
    /// The first tick fires one second from now with `remaining = secs - 1`.
    /// Starting at 0 skips straight to the expiry event.
    pub fn start(&mut self, secs: u32) {
        self.remaining = secs;
        self.paused = false;
        if secs == 0 {
            self.deadline = None;
            self.expiry_pending = true;
        } else {
            self.deadline = Some(TokioInstant::now() + Duration::from_secs(1));
            self.expiry_pending = false;
        }
        debug!(secs, "countdown started");
    }

    /// Stops the countdown permanently. Any in-flight tick is discarded.
    pub fn cancel(&mut self) {
        self.deadline = None;
        self.paused = false;
        self.expiry_pending = false;
        self.remaining = 0;
    }

    /// Freezes the countdown, preserving `remaining`. Idempotent.
    pub fn pause(&mut self) {
        if !self.paused && self.deadline.is_some() {
            self.paused = true;
            debug!(remaining = self.remaining, "countdown paused");
        }
    }

    /// Resumes after a pause.
    ///
    /// The next tick fires one full second from now, so pausing at
    /// `remaining = R` and resuming leaves the next tick at `R - 1` —
    /// the paused interval is neither skipped nor double-counted.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.deadline = Some(TokioInstant::now() + Duration::from_secs(1));
            debug!(remaining = self.remaining, "countdown resumed");
        }
    }

    /// Whether the countdown is currently paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether the countdown is armed (running or paused, expiry not yet
    /// delivered).
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some() || self.expiry_pending
    }

    /// Seconds left on the countdown.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Waits for the next countdown event.
    ///
    /// Pends forever while idle or paused. Otherwise resolves once per
    /// second with [`CountdownEvent::Tick`], and with
    /// [`CountdownEvent::Expired`] right after the zero tick.
    pub async fn wait(&mut self) -> CountdownEvent {
        if self.expiry_pending {
            // Expiry outranks pause: the countdown already completed, the
            // room just hasn't consumed the event yet.
            self.expiry_pending = false;
            self.remaining = 0;
            trace!("countdown expired");
            return CountdownEvent::Expired;
        }

        let deadline = match self.deadline {
            Some(d) if !self.paused => d,
            // Idle or paused: this future never completes — select!
            // handles the other branches.
            _ => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        };

        time::sleep_until(deadline).await;

        self.remaining -= 1;
        if self.remaining == 0 {
            self.deadline = None;
            self.expiry_pending = true;
        } else {
            // Keep the original cadence: schedule from the missed
            // deadline, not from now.
            self.deadline = Some(deadline + Duration::from_secs(1));
        }

        trace!(remaining = self.remaining, "countdown tick");
        CountdownEvent::Tick { remaining: self.remaining }
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::idle()
    }
}
