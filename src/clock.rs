use std::cell::Cell;
use std::time::Instant;

/// Source of wall-clock time in seconds.
pub trait Clock {
    fn now(&self) -> f64;
}

/// Monotonic clock measuring seconds since it was created.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Clock whose time only changes when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, seconds: f64) {
        self.now.set(seconds);
    }

    pub fn advance(&self, seconds: f64) {
        self.now.set(self.now.get() + seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

/// Timing information for a single frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTime {
    /// Seconds since the clock started; drives the orbit angle.
    pub total: f64,
    /// Seconds since the previous frame; scales control deltas.
    pub elapsed: f64,
}

/// Remembers the previous frame's timestamp.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameTimer {
    last: Option<f64>,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `now` and returns the time since the previous tick.
    ///
    /// The first tick reports zero elapsed time. A clock that steps
    /// backwards also yields zero rather than a negative delta.
    pub fn tick(&mut self, now: f64) -> FrameTime {
        let elapsed = self.last.map_or(0.0, |last| (now - last).max(0.0));
        self.last = Some(now);
        FrameTime {
            total: now,
            elapsed,
        }
    }

    pub fn last(&self) -> Option<f64> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_has_no_elapsed_time() {
        let mut timer = FrameTimer::new();
        let frame = timer.tick(12.5);
        assert_eq!(frame.total, 12.5);
        assert_eq!(frame.elapsed, 0.0);
        assert_eq!(timer.last(), Some(12.5));
    }

    #[test]
    fn elapsed_is_difference_between_ticks() {
        let mut timer = FrameTimer::new();
        timer.tick(1.0);
        let frame = timer.tick(1.25);
        assert_eq!(frame.total, 1.25);
        assert!((frame.elapsed - 0.25).abs() < 1e-12);
    }

    #[test]
    fn clock_going_backwards_clamps_to_zero() {
        let mut timer = FrameTimer::new();
        timer.tick(5.0);
        assert_eq!(timer.tick(4.0).elapsed, 0.0);
    }

    #[test]
    fn manual_clock_advances_on_request() {
        let clock = ManualClock::new(2.0);
        assert_eq!(clock.now(), 2.0);
        clock.advance(0.5);
        assert_eq!(clock.now(), 2.5);
        clock.set(0.0);
        assert_eq!(clock.now(), 0.0);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
