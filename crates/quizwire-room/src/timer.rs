//! Per-room phase timer: a 1 Hz countdown and a one-shot reveal hold.
//!
//! Designed to sit inside a room actor's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         event = timer.wait() => { /* Tick or RevealElapsed */ }
//!     }
//! }
//! ```
//!
//! When idle, [`PhaseTimer::wait`] pends forever — `select!` keeps
//! serving the command branch. Cancellation is a synchronous state
//! change, so cancelling and then arming the next phase inside one
//! command handler guarantees no stale event from the previous phase can
//! ever fire afterwards.

use std::time::Duration;

use tokio::time::{self, Instant};

/// Cadence of countdown ticks.
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// What fired on a room's phase timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// One second elapsed on the open question's clock.
    Tick,
    /// The reveal hold is over; time to advance or finish.
    RevealElapsed,
}

#[derive(Debug)]
enum TimerState {
    Idle,
    Countdown { next_tick: Instant },
    Reveal { fire_at: Instant },
}

/// One room's timer. Exactly one phase's schedule is armed at a time.
#[derive(Debug)]
pub struct PhaseTimer {
    state: TimerState,
}

impl PhaseTimer {
    /// Creates an idle timer (nothing scheduled).
    pub fn idle() -> Self {
        Self {
            state: TimerState::Idle,
        }
    }

    /// Arms the question countdown; the first tick fires in one second.
    pub fn arm_countdown(&mut self) {
        self.state = TimerState::Countdown {
            next_tick: Instant::now() + TICK_INTERVAL,
        };
    }

    /// Arms the reveal hold; fires once after `hold`, then goes idle.
    pub fn arm_reveal(&mut self, hold: Duration) {
        self.state = TimerState::Reveal {
            fire_at: Instant::now() + hold,
        };
    }

    /// Cancels whatever is scheduled. Synchronous — once this returns,
    /// no event from the cancelled schedule can fire.
    pub fn cancel(&mut self) {
        self.state = TimerState::Idle;
    }

    /// Whether nothing is scheduled.
    pub fn is_idle(&self) -> bool {
        matches!(self.state, TimerState::Idle)
    }

    /// Waits for the next timer event. Pends forever while idle.
    ///
    /// Cancel-safe: dropping the returned future (as `select!` does when
    /// another branch wins) leaves the schedule untouched.
    pub async fn wait(&mut self) -> TimerEvent {
        match self.state {
            TimerState::Idle => {
                // Never resolves; select! handles the other branches.
                std::future::pending::<()>().await;
                unreachable!()
            }
            TimerState::Countdown { next_tick } => {
                time::sleep_until(next_tick).await;
                self.state = TimerState::Countdown {
                    next_tick: next_tick + TICK_INTERVAL,
                };
                TimerEvent::Tick
            }
            TimerState::Reveal { fire_at } => {
                time::sleep_until(fire_at).await;
                self.state = TimerState::Idle;
                TimerEvent::RevealElapsed
            }
        }
    }
}
