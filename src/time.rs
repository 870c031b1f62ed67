//! Monotonic clock abstraction used for step timing, the handoff delay and
//! watchdog gap accounting.

/// Trait for abstracting the device's monotonic clock.
pub trait TimeSource<I: TimeInstant> {
    /// Returns the current time instant.
    fn now(&self) -> I;
}

/// Trait abstraction for duration types.
pub trait TimeDuration: Copy + PartialEq {
    /// Converts duration to milliseconds.
    fn as_millis(&self) -> u64;
}

/// Trait abstraction for instant types.
pub trait TimeInstant: Copy {
    /// Duration type for this instant.
    type Duration: TimeDuration;

    /// Calculates duration since an earlier instant.
    fn duration_since(&self, earlier: Self) -> Self::Duration;
}

/// A point in time after which a bounded wait gives up.
///
/// The deadline is stored as a start instant plus a budget rather than as an
/// absolute instant so that it keeps working across counter wrap-around, as
/// long as the clock's `duration_since` handles wrapping.
#[derive(Debug, Clone, Copy)]
pub struct Deadline<I: TimeInstant> {
    start: I,
    budget_ms: u64,
}

impl<I: TimeInstant> Deadline<I> {
    /// Starts a deadline `budget_ms` milliseconds from `start`.
    pub fn after(start: I, budget_ms: u64) -> Self {
        Self { start, budget_ms }
    }

    /// Returns true once at least `budget_ms` have elapsed at `now`.
    pub fn has_passed(&self, now: I) -> bool {
        now.duration_since(self.start).as_millis() >= self.budget_ms
    }
}
