// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Single-shot timers and the clocks that drive them.
//
// Timers hold a deadline and nothing else; whoever owns them polls with the
// current time. Starting always stops first, and stopping an idle timer is a
// no-op.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::debug;

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Follows tokio's clock, including paused test time.
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}

/// Clock that only moves when told to.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A timer that fires at most once per start.
#[derive(Debug)]
pub struct SingleShotTimer {
    name: &'static str,
    interval: Duration,
    deadline: Option<Instant>,
}

impl SingleShotTimer {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            interval: Duration::ZERO,
            deadline: None,
        }
    }

    /// Stop, then arm the timer to fire `interval` after `now`.
    pub fn start(&mut self, now: Instant, interval: Duration) {
        self.stop();
        self.interval = interval;
        self.deadline = Some(now + interval);
        debug!(timer = self.name, interval_ms = interval.as_millis() as u64, "timer started");
    }

    pub fn stop(&mut self) {
        if self.deadline.take().is_some() {
            debug!(timer = self.name, "timer stopped");
        }
    }

    pub fn is_active(&self) -> bool {
        self.deadline.is_some()
    }

    /// Interval of the most recent start.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fire if the deadline has passed. Disarms the timer when it fires.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(at) if at <= now => {
                self.deadline = None;
                debug!(timer = self.name, "timer fired");
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_interval() {
        let clock = ManualClock::new();
        let mut timer = SingleShotTimer::new("hide");
        timer.start(clock.now(), Duration::from_millis(100));

        clock.advance(Duration::from_millis(99));
        assert!(!timer.fire_if_due(clock.now()));
        clock.advance(Duration::from_millis(1));
        assert!(timer.fire_if_due(clock.now()));
        assert!(!timer.fire_if_due(clock.now()));
        assert!(!timer.is_active());
        assert_eq!(timer.interval(), Duration::from_millis(100));
    }

    #[test]
    fn restart_pushes_deadline() {
        let clock = ManualClock::new();
        let mut timer = SingleShotTimer::new("hide");
        timer.start(clock.now(), Duration::from_millis(100));
        clock.advance(Duration::from_millis(80));
        timer.start(clock.now(), Duration::from_millis(100));
        clock.advance(Duration::from_millis(80));
        assert!(!timer.fire_if_due(clock.now()));
        clock.advance(Duration::from_millis(20));
        assert!(timer.fire_if_due(clock.now()));
    }

    #[test]
    fn stop_is_idempotent() {
        let clock = ManualClock::new();
        let mut timer = SingleShotTimer::new("highlight");
        timer.stop();
        timer.start(clock.now(), Duration::ZERO);
        timer.stop();
        timer.stop();
        assert!(!timer.fire_if_due(clock.now()));
    }

    #[test]
    fn zero_interval_fires_on_next_poll() {
        let clock = ManualClock::new();
        let mut timer = SingleShotTimer::new("highlight");
        timer.start(clock.now(), Duration::ZERO);
        assert!(timer.fire_if_due(clock.now()));
    }
}
