//! Turn gate
//!
//! Serializes access to the shared agent session and spaces turn start
//! times by a minimum interval. Waiters suspend on the runtime (timer or
//! release notification); nothing polls.
//!
//! ```text
//!   acquire()                       release()
//!      │                                │
//!      ▼                                ▼
//!  FIFO queue ──► active? ──yes──► wait for release ──┐
//!                   │no                               │
//!                   ▼                                 │
//!           interval elapsed? ──no──► sleep remaining ┤
//!                   │yes                              │
//!                   ▼                                 │
//!       active = true, stamp start ◄──────────────────┘ (re-check)
//! ```

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, Notify};
use tokio::time::{Duration, Instant};

/// Mutual-exclusion and rate-limit state
#[derive(Debug, Default)]
struct GateState {
    /// A turn (or exclusive operation) currently holds the gate
    active: bool,
    /// When the most recent throttled turn was granted the gate
    last_request_start: Option<Instant>,
    /// Bumped on every grant and forced release; permits only release their own grant
    generation: u64,
}

impl GateState {
    fn remaining(&self, now: Instant, min_interval: Duration) -> Duration {
        self.last_request_start.map_or(Duration::ZERO, |start| {
            min_interval.saturating_sub(now.saturating_duration_since(start))
        })
    }
}

/// Process-wide gate in front of the agent session
///
/// Waiters are granted the gate in arrival order. Throttled acquisitions
/// (turns) additionally wait until `min_interval` has passed since the
/// previous turn started; exclusive acquisitions (reset, shutdown) only wait
/// for the current holder to release.
#[derive(Debug)]
pub struct SessionGate {
    state: Mutex<GateState>,
    queue: AsyncMutex<()>,
    released: Notify,
    min_interval: Duration,
}

impl SessionGate {
    /// Create an idle gate
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            state: Mutex::new(GateState::default()),
            queue: AsyncMutex::new(()),
            released: Notify::new(),
            min_interval,
        }
    }

    /// Wait for the gate as a turn: exclusive and rate limited
    ///
    /// The returned permit releases the gate when dropped.
    pub async fn acquire(&self) -> GatePermit<'_> {
        self.acquire_with(true).await
    }

    /// Wait for the gate without consulting or updating the turn interval
    pub async fn acquire_exclusive(&self) -> GatePermit<'_> {
        self.acquire_with(false).await
    }

    async fn acquire_with(&self, throttled: bool) -> GatePermit<'_> {
        // Held until the grant so later arrivals queue behind us.
        let _queue = self.queue.lock().await;

        loop {
            let released = self.released.notified();
            tokio::pin!(released);
            // Register before inspecting state so a concurrent release is not lost.
            released.as_mut().enable();

            let wait = {
                let mut state = self.state.lock();
                if state.active {
                    None
                } else {
                    let now = Instant::now();
                    let remaining = if throttled {
                        state.remaining(now, self.min_interval)
                    } else {
                        Duration::ZERO
                    };

                    if remaining.is_zero() {
                        state.active = true;
                        state.generation += 1;
                        if throttled {
                            state.last_request_start = Some(now);
                        }
                        return GatePermit {
                            gate: self,
                            generation: state.generation,
                            released: false,
                        };
                    }
                    Some(remaining)
                }
            };

            match wait {
                Some(remaining) => {
                    log::debug!(
                        "Gate free, deferring turn by {} ms to honor minimum interval",
                        remaining.as_millis()
                    );
                    tokio::time::sleep(remaining).await;
                }
                None => {
                    log::debug!("Gate busy, waiting for release");
                    released.await;
                }
            }
        }
    }

    /// Force the gate open and wake the next waiter
    ///
    /// Unconditional and idempotent: calling it on an idle gate is a no-op.
    /// Any permit still alive is invalidated, so dropping it later cannot
    /// release a grant made after this call.
    pub fn release(&self) {
        let was_active = {
            let mut state = self.state.lock();
            state.generation += 1;
            std::mem::replace(&mut state.active, false)
        };
        if was_active {
            log::debug!("Gate force-released");
        }
        self.released.notify_waiters();
    }

    /// Release the grant identified by `generation`, if it is still current
    fn release_grant(&self, generation: u64) {
        let released = {
            let mut state = self.state.lock();
            if state.active && state.generation == generation {
                state.active = false;
                true
            } else {
                false
            }
        };
        if released {
            log::debug!("Gate released");
            self.released.notify_waiters();
        } else {
            log::debug!("Stale gate permit dropped, gate left untouched");
        }
    }

    /// Whether a turn currently holds the gate
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.lock().active
    }

    /// Start time of the most recent throttled grant
    #[must_use]
    pub fn last_request_start(&self) -> Option<Instant> {
        self.state.lock().last_request_start
    }

    /// Configured minimum interval between turn starts
    #[must_use]
    pub const fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

/// Proof of holding the [`SessionGate`]
///
/// Dropping the permit releases the gate, so early returns and `?` cannot
/// leak it.
#[must_use = "the gate is released as soon as the permit is dropped"]
#[derive(Debug)]
pub struct GatePermit<'a> {
    gate: &'a SessionGate,
    generation: u64,
    released: bool,
}

impl GatePermit<'_> {
    /// Release the gate now instead of at drop
    pub fn release(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if !self.released {
            self.released = true;
            self.gate.release_grant(self.generation);
        }
    }
}

impl Drop for GatePermit<'_> {
    fn drop(&mut self) {
        self.release_once();
    }
}
