//=========================================================================
// Clock
//=========================================================================
//
// Monotonic elapsed-time reporting for frame pacing.
//
// Architecture:
//   TimeSource (Instant / scripted) → Clock::elapsed() → FrameLoop
//
// The clock is polled in a busy-wait, so `elapsed()` must stay a plain
// read of the source with no allocation or locking.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::{Duration, Instant};

//=== TimeSource ==========================================================

/// Monotonic time reading relative to an arbitrary fixed origin.
///
/// Implementations must never go backwards and must not follow
/// wall-clock adjustments.
pub trait TimeSource {
    fn now(&self) -> Duration;
}

/// Production time source backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct Monotonic {
    origin: Instant,
}

impl Monotonic {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for Monotonic {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for Monotonic {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

//=== Clock ===============================================================

/// Reports seconds elapsed since the last [`Clock::start`].
#[derive(Debug)]
pub struct Clock<T: TimeSource = Monotonic> {
    source: T,
    reference: Duration,
}

impl Clock<Monotonic> {
    /// Creates a clock on the system monotonic source, started now.
    pub fn new() -> Self {
        Self::with_source(Monotonic::new())
    }
}

impl Default for Clock<Monotonic> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TimeSource> Clock<T> {
    /// Creates a clock on `source`, started at the source's current reading.
    pub fn with_source(source: T) -> Self {
        let reference = source.now();
        Self { source, reference }
    }

    /// Resets the reference point to now.
    pub fn start(&mut self) {
        self.reference = self.source.now();
    }

    /// Seconds since the last reset.
    pub fn elapsed(&self) -> f64 {
        self.source
            .now()
            .saturating_sub(self.reference)
            .as_secs_f64()
    }
}

//=== Scripted Source =====================================================

/// Test source whose reading advances by a fixed step on every query.
///
/// Clones share the same timeline, so a test can keep one handle while
/// the clock under test owns another.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct SteppingSource {
    now: std::rc::Rc<std::cell::Cell<Duration>>,
    queries: std::rc::Rc<std::cell::Cell<u64>>,
    step: Duration,
}

#[cfg(test)]
impl SteppingSource {
    pub(crate) fn new(step: Duration) -> Self {
        Self {
            now: Default::default(),
            queries: Default::default(),
            step,
        }
    }

    /// Jumps the timeline forward without counting as a query.
    pub(crate) fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub(crate) fn current(&self) -> Duration {
        self.now.get()
    }

    pub(crate) fn queries(&self) -> u64 {
        self.queries.get()
    }
}

#[cfg(test)]
impl TimeSource for SteppingSource {
    fn now(&self) -> Duration {
        let reading = self.now.get();
        self.now.set(reading + self.step);
        self.queries.set(self.queries.get() + 1);
        reading
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_starts_near_zero() {
        let source = SteppingSource::new(Duration::ZERO);
        let clock = Clock::with_source(source.clone());
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn elapsed_tracks_source() {
        let source = SteppingSource::new(Duration::ZERO);
        let clock = Clock::with_source(source.clone());

        source.advance(Duration::from_millis(250));

        assert!((clock.elapsed() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn start_resets_reference() {
        let source = SteppingSource::new(Duration::ZERO);
        let mut clock = Clock::with_source(source.clone());

        source.advance(Duration::from_secs(3));
        clock.start();
        source.advance(Duration::from_millis(500));

        assert!((clock.elapsed() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn elapsed_is_non_decreasing() {
        let source = SteppingSource::new(Duration::from_micros(10));
        let clock = Clock::with_source(source);

        let mut previous = clock.elapsed();
        for _ in 0..1_000 {
            let next = clock.elapsed();
            assert!(next >= previous, "Clock went backwards: {} < {}", next, previous);
            previous = next;
        }
    }

    #[test]
    fn monotonic_clock_advances() {
        let clock = Clock::new();
        let first = clock.elapsed();
        std::thread::sleep(Duration::from_millis(2));
        assert!(clock.elapsed() > first);
    }
}
