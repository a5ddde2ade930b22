//! Time source for scheduled assistant replies
//!
//! Replies are due at an [`Instant`] read from a [`Clock`]. The TUI runs on
//! [`SystemClock`]; tests drive a [`ManualClock`] forward explicitly.

use chrono::{DateTime, Local};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub trait Clock: Send + Sync {
    /// Monotonic time used for due dates
    fn now(&self) -> Instant;

    /// Wall-clock time stamped on messages
    fn local_time(&self) -> DateTime<Local>;
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn local_time(&self) -> DateTime<Local> {
        (**self).local_time()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn local_time(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    wall_origin: DateTime<Local>,
    elapsed: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            wall_origin: Local::now(),
            elapsed: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut elapsed = self.elapsed.lock().unwrap_or_else(|e| e.into_inner());
        *elapsed += by;
    }

    fn elapsed(&self) -> Duration {
        *self.elapsed.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn local_time(&self) -> DateTime<Local> {
        // elapsed stays far below chrono's range, fall back to the origin anyway
        chrono::Duration::from_std(self.elapsed())
            .map(|d| self.wall_origin + d)
            .unwrap_or(self.wall_origin)
    }
}
