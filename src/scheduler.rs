//! Deadline bookkeeping for the session's ticker and delayed events.
//!
//! The scheduler never sleeps and never reads the clock. Callers pass the
//! current [`Instant`] in and ask which events are due, which keeps every
//! timing path testable with fabricated instants.

use std::time::{Duration, Instant};

use tracing::{debug, instrument};

use crate::games::puzzle::Event;

/// Interval between [`Event::Tick`]s.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
struct DelayedTask {
    due: Instant,
    event: Event,
}

/// One repeating ticker plus at most one pending delayed event.
///
/// Scheduling a delayed event replaces whatever was pending, so a stale
/// continuation can never outlive the round that asked for it.
#[derive(Debug, Clone)]
pub struct Scheduler {
    tick_interval: Duration,
    next_tick: Option<Instant>,
    pending: Option<DelayedTask>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(TICK_INTERVAL)
    }
}

impl Scheduler {
    /// Creates an idle scheduler ticking at `tick_interval` once started.
    pub fn new(tick_interval: Duration) -> Self {
        Self {
            tick_interval,
            next_tick: None,
            pending: None,
        }
    }

    /// Starts ticking; the first tick is due one interval after `now`.
    #[instrument(skip(self))]
    pub fn start_ticker(&mut self, now: Instant) {
        self.next_tick = Some(now + self.tick_interval);
        debug!("Ticker started");
    }

    /// Stops ticking.
    pub fn stop_ticker(&mut self) {
        if self.next_tick.take().is_some() {
            debug!("Ticker stopped");
        }
    }

    /// Whether the ticker is running.
    pub fn is_ticking(&self) -> bool {
        self.next_tick.is_some()
    }

    /// Delivers `event` once `after` has elapsed from `now`, replacing any
    /// pending delivery.
    #[instrument(skip(self, event))]
    pub fn schedule(&mut self, now: Instant, after: Duration, event: Event) {
        if let Some(previous) = self.pending.replace(DelayedTask {
            due: now + after,
            event,
        }) {
            debug!(?previous.event, "Replaced pending delayed event");
        }
    }

    /// Drops the pending delayed event, if any.
    pub fn cancel(&mut self) {
        if let Some(task) = self.pending.take() {
            debug!(?task.event, "Cancelled pending delayed event");
        }
    }

    /// Whether a delayed event is waiting.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Collects every event due at `now`: missed ticks first, then the
    /// delayed event if its deadline has passed.
    pub fn due(&mut self, now: Instant) -> Vec<Event> {
        let mut events = Vec::new();
        while let Some(next) = self.next_tick {
            if next > now {
                break;
            }
            events.push(Event::Tick);
            self.next_tick = Some(next + self.tick_interval);
        }
        if self.pending.as_ref().is_some_and(|task| task.due <= now) {
            if let Some(task) = self.pending.take() {
                events.push(task.event);
            }
        }
        events
    }

    /// Earliest instant at which [`due`](Self::due) would return something.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.next_tick, self.pending.as_ref().map(|t| t.due)) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}
