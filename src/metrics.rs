//! Named timers over hdrhistogram, enough registry to give every run a
//! durable latency sample.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use hdrhistogram::Histogram;

/// Registry of named timers. Timers are created on first access and live
/// for the registry's lifetime.
#[derive(Default)]
pub struct Registry {
    timers: Mutex<HashMap<String, Arc<Timer>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the timer registered under `name`.
    pub fn timer(&self, name: &str) -> Arc<Timer> {
        let mut timers = self.timers.lock().expect("registry lock");
        timers
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Timer::new()))
            .clone()
    }

    /// Registered timer names, sorted for stable output.
    pub fn names(&self) -> Vec<String> {
        let timers = self.timers.lock().expect("registry lock");
        let mut names: Vec<_> = timers.keys().cloned().collect();
        names.sort();
        names
    }
}

/// One latency timer. Samples are recorded in microseconds.
pub struct Timer {
    hist: Mutex<Histogram<u64>>,
}

impl Timer {
    fn new() -> Self {
        Self {
            hist: Mutex::new(Histogram::new(3).expect("sigfigs within histogram range")),
        }
    }

    /// Start a sample. The guard records on drop, so the timer is stopped
    /// even when the timed section bails out early.
    pub fn start(self: &Arc<Self>) -> TimerGuard {
        TimerGuard {
            timer: Arc::clone(self),
            started: Instant::now(),
        }
    }

    pub fn record(&self, elapsed: Duration) {
        let micros = elapsed.as_micros().min(u128::from(u64::MAX)) as u64;
        self.hist.lock().expect("timer lock").saturating_record(micros);
    }

    pub fn count(&self) -> u64 {
        self.hist.lock().expect("timer lock").len()
    }

    pub fn mean_ms(&self) -> f64 {
        self.hist.lock().expect("timer lock").mean() / 1_000.0
    }

    pub fn max_ms(&self) -> f64 {
        self.hist.lock().expect("timer lock").max() as f64 / 1_000.0
    }
}

/// In-flight sample; records the elapsed time into its timer on drop.
pub struct TimerGuard {
    timer: Arc<Timer>,
    started: Instant,
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        self.timer.record(self.started.elapsed());
    }
}
