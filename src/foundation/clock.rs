use std::cell::Cell;

/// Source of wall-clock time for timestamped state records.
pub trait Clock {
    /// Seconds since the Unix epoch.
    fn now_epoch_secs(&self) -> f64;
}

/// Wall clock backed by `chrono::Utc`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_secs(&self) -> f64 {
        let now = chrono::Utc::now();
        now.timestamp() as f64 + f64::from(now.timestamp_subsec_micros()) / 1_000_000.0
    }
}

/// Manually driven clock, used to simulate elapsed days in tests and dry runs.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(start_epoch_secs: f64) -> Self {
        Self {
            now: Cell::new(start_epoch_secs),
        }
    }

    pub fn set(&self, epoch_secs: f64) {
        self.now.set(epoch_secs);
    }

    pub fn advance_secs(&self, secs: f64) {
        self.now.set(self.now.get() + secs);
    }
}

impl Clock for ManualClock {
    fn now_epoch_secs(&self) -> f64 {
        self.now.get()
    }
}
