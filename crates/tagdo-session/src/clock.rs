//! Wall-clock sources.
//!
//! Token expiry is an absolute wall-clock instant, but the timer that
//! enforces it runs on tokio's clock. In production both move together.
//! In tests tokio's clock is paused and auto-advanced, so [`TokioClock`]
//! derives wall time from it to keep the two in step.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::time::Instant;

/// A source of "now" as epoch time.
pub trait Clock: Send + Sync + 'static {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;

    /// Whole seconds since the Unix epoch.
    fn now_secs(&self) -> i64 {
        self.now_millis().div_euclid(1000)
    }
}

impl Clock for Arc<dyn Clock> {
    fn now_millis(&self) -> i64 {
        (**self).now_millis()
    }
}

/// Reads the operating system's clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        system_millis()
    }
}

/// Wall time that advances with tokio's clock, including when it is
/// paused and advanced by `tokio::time::advance` or auto-advance.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    epoch_millis_at_start: i64,
    started: Instant,
}

impl TokioClock {
    /// Starts at the current system time.
    pub fn new() -> Self {
        Self::starting_at(system_millis())
    }

    /// Starts at `epoch_millis`, then advances with tokio time.
    pub fn starting_at(epoch_millis: i64) -> Self {
        Self {
            epoch_millis_at_start: epoch_millis,
            started: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now_millis(&self) -> i64 {
        let elapsed = i64::try_from(self.started.elapsed().as_millis()).unwrap_or(i64::MAX);
        self.epoch_millis_at_start.saturating_add(elapsed)
    }
}

fn system_millis() -> i64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(d) => i64::try_from(d.as_millis()).unwrap_or(i64::MAX),
        Err(e) => -i64::try_from(e.duration().as_millis()).unwrap_or(i64::MAX),
    }
}
