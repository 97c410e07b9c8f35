use chrono::NaiveDateTime;

/// Source of the wall-clock time used by the open-now filter.
pub trait Clock: Send + Sync {
    /// Current local date and time (no timezone attached).
    fn now_local(&self) -> NaiveDateTime;
}

/// Reads the host's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_local(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// A clock pinned to one instant, for tests and reproducible CLI runs.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now_local(&self) -> NaiveDateTime {
        self.0
    }
}
