use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::warn;

/// Append-only accumulator of response-time observations.
///
/// Quantiles are exact (nearest-rank over the full sorted set), computed at
/// evaluation time. At harness scale there is no need for a streaming sketch.
#[derive(Debug, Default)]
pub struct Trend {
    samples: Mutex<Vec<Duration>>,
}

impl Trend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, elapsed: Duration) {
        self.samples.lock().unwrap().push(elapsed);
    }

    pub fn count(&self) -> u64 {
        self.samples.lock().unwrap().len() as u64
    }

    /// Nearest-rank quantile, `quantile` in `(0, 1]`.
    pub fn quantile(&self, quantile: f64) -> Duration {
        let mut samples = self.samples.lock().unwrap().clone();
        if samples.is_empty() {
            warn!("Quantile query over an empty trend.");
            return Duration::ZERO;
        }
        samples.sort_unstable();
        let rank = (quantile * samples.len() as f64).ceil() as usize;
        samples[rank.clamp(1, samples.len()) - 1]
    }
}

/// Append-only accumulator of boolean outcomes, exposing fraction-true.
#[derive(Debug, Default)]
pub struct Rate {
    hits: AtomicU64,
    total: AtomicU64,
}

impl Rate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, outcome: bool) {
        self.total.fetch_add(1, Ordering::Relaxed);
        if outcome {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn count(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    pub fn rate(&self) -> f64 {
        let total = self.total.load(Ordering::Relaxed);
        if total == 0 {
            warn!("Rate query with no recorded outcomes.");
            return 0.0;
        }
        self.hits.load(Ordering::Relaxed) as f64 / total as f64
    }
}

/// The shared trend/rate pair written by all iteration loops.
///
/// [`Collectors::record`] appends the duration and the outcome while holding
/// the trend lock, so the two collectors never disagree on how many
/// iterations they have seen.
#[derive(Debug, Default)]
pub struct Collectors {
    trend: Trend,
    rate: Rate,
}

impl Collectors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, elapsed: Duration, success: bool) {
        let mut samples = self.trend.samples.lock().unwrap();
        samples.push(elapsed);
        self.rate.record(success);
    }

    pub fn trend(&self) -> &Trend {
        &self.trend
    }

    pub fn rate(&self) -> &Rate {
        &self.rate
    }
}
