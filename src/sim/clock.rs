/// Fixed-timestep pacing on the monotonic clock.
///
/// Each tick begins no earlier than one period after the previous one
/// began. Waiting is a sleep until the deadline (or, in the front-end, an
/// input poll bounded by `remaining()`), never a spin.

use std::thread;
use std::time::{Duration, Instant};

/// Default period: 40 ms, 25 ticks per second.
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(40);

#[derive(Debug, Clone)]
pub struct TickClock {
    period: Duration,
    last: Option<Instant>,
}

impl TickClock {
    pub fn new(period: Duration) -> Self {
        TickClock { period, last: None }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Time left until the next tick may begin. Zero before the first tick.
    pub fn remaining(&self) -> Duration {
        match self.last {
            Some(last) => (last + self.period).saturating_duration_since(Instant::now()),
            None => Duration::ZERO,
        }
    }

    pub fn is_due(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Mark the start of a tick.
    pub fn begin(&mut self) {
        self.last = Some(Instant::now());
    }

    /// Sleep until the next tick is due, then mark it begun.
    pub fn wait(&mut self) {
        let left = self.remaining();
        if !left.is_zero() {
            thread::sleep(left);
        }
        self.begin();
    }
}

impl Default for TickClock {
    fn default() -> Self {
        TickClock::new(DEFAULT_PERIOD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_is_due_immediately() {
        let clock = TickClock::new(Duration::from_millis(40));
        assert!(clock.is_due());
        assert_eq!(clock.remaining(), Duration::ZERO);
    }

    #[test]
    fn not_due_right_after_begin() {
        let mut clock = TickClock::new(Duration::from_secs(60));
        clock.begin();
        assert!(!clock.is_due());
        assert!(clock.remaining() <= Duration::from_secs(60));
    }

    #[test]
    fn wait_enforces_minimum_period() {
        let period = Duration::from_millis(15);
        let mut clock = TickClock::new(period);
        let start = Instant::now();
        clock.wait();
        clock.wait();
        clock.wait();
        // two full periods between three tick starts
        assert!(start.elapsed() >= period * 2);
    }

    #[test]
    fn default_is_forty_ms() {
        assert_eq!(TickClock::default().period(), Duration::from_millis(40));
    }
}
