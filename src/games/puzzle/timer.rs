//! Per-round countdown.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Emitted once when a running countdown reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expired;

/// How close the countdown is to running out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum Urgency {
    /// More than ten seconds left.
    #[display("calm")]
    Calm,
    /// Ten seconds or fewer.
    #[display("warning")]
    Warning,
    /// Five seconds or fewer.
    #[display("critical")]
    Critical,
}

/// Countdown for a single round, advanced by one second per [`tick`](Self::tick).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundTimer {
    remaining: u32,
    active: bool,
}

impl RoundTimer {
    /// Creates a stopped timer with no time on it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts (or restarts) the countdown from `seconds`.
    ///
    /// A zero-length countdown has nothing to count down and stays inactive.
    #[instrument(skip(self))]
    pub fn start(&mut self, seconds: u32) {
        self.remaining = seconds;
        self.active = seconds > 0;
        debug!(seconds, active = self.active, "Round timer started");
    }

    /// Stops the countdown without expiring it.
    pub fn stop(&mut self) {
        self.active = false;
    }

    /// Advances the countdown by one second.
    ///
    /// Returns [`Expired`] on the tick that takes the timer from one to zero,
    /// and never again until the timer is restarted.
    pub fn tick(&mut self) -> Option<Expired> {
        if !self.active {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.active = false;
            debug!("Round timer expired");
            return Some(Expired);
        }
        None
    }

    /// Seconds left on the clock.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Whether the countdown is running.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Classifies the remaining time for display.
    pub fn urgency(&self) -> Urgency {
        match self.remaining {
            0..=5 => Urgency::Critical,
            6..=10 => Urgency::Warning,
            _ => Urgency::Calm,
        }
    }

    /// Remaining time as `m:ss`.
    pub fn clock(&self) -> String {
        format!("{}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expires_exactly_once_on_last_tick() {
        let mut timer = RoundTimer::new();
        timer.start(25);
        for tick in 1..25 {
            assert_eq!(timer.tick(), None, "tick {tick} fired early");
        }
        assert_eq!(timer.tick(), Some(Expired));
        assert_eq!(timer.remaining(), 0);
        assert!(!timer.is_active());
        for _ in 0..5 {
            assert_eq!(timer.tick(), None);
        }
    }

    #[test]
    fn test_stop_suppresses_expiry() {
        let mut timer = RoundTimer::new();
        timer.start(2);
        assert_eq!(timer.tick(), None);
        timer.stop();
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.remaining(), 1);
    }

    #[test]
    fn test_restart_resets_remaining() {
        let mut timer = RoundTimer::new();
        timer.start(3);
        timer.tick();
        timer.tick();
        timer.start(3);
        assert_eq!(timer.remaining(), 3);
        assert!(timer.is_active());
    }

    #[test]
    fn test_zero_length_timer_never_expires() {
        let mut timer = RoundTimer::new();
        timer.start(0);
        assert!(!timer.is_active());
        assert_eq!(timer.tick(), None);
    }

    #[test]
    fn test_urgency_and_clock() {
        let mut timer = RoundTimer::new();
        timer.start(75);
        assert_eq!(timer.urgency(), Urgency::Calm);
        assert_eq!(timer.clock(), "1:15");
        timer.start(10);
        assert_eq!(timer.urgency(), Urgency::Warning);
        assert_eq!(timer.clock(), "0:10");
        timer.start(5);
        assert_eq!(timer.urgency(), Urgency::Critical);
        assert_eq!(timer.clock(), "0:05");
    }
}
