use crate::{ThresholdBreach, ThresholdReport};
use std::fmt;
use std::time::Duration;

/// Final tally for one named check.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CheckOutcome {
    pub name: &'static str,
    pub passes: u64,
    pub fails: u64,
}

impl CheckOutcome {
    pub fn total(&self) -> u64 {
        self.passes + self.fails
    }
}

/// Summary of a completed run.
///
/// `iterations` counts every executed iteration, including ones that failed
/// at the transport layer; the trend and rate collectors are guaranteed to
/// hold exactly this many samples each.
#[derive(Clone, Debug)]
pub struct RunReport {
    pub iterations: u64,
    /// Number of duration samples in the trend. Always equal to
    /// `iterations`; exposed so callers can verify the pairing.
    pub latency_samples: u64,
    pub success_rate: f64,
    pub latency_p50: Duration,
    pub latency_p95: Duration,
    pub latency_p99: Duration,
    pub checks: Vec<CheckOutcome>,
    pub thresholds: ThresholdReport,
}

impl RunReport {
    /// Overall pass/fail, the conjunction of all threshold evaluations.
    pub fn passed(&self) -> bool {
        self.thresholds.passed()
    }

    pub fn as_result(&self) -> Result<(), ThresholdBreach> {
        self.thresholds.as_result()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "iterations={}, success_rate={:.4}, p50={:?}, p95={:?}, p99={:?}",
            self.iterations, self.success_rate, self.latency_p50, self.latency_p95, self.latency_p99,
        )?;
        for check in &self.checks {
            writeln!(
                f,
                "  check '{}': {}/{} passed",
                check.name,
                check.passes,
                check.total()
            )?;
        }
        write!(f, "{}", self.thresholds)
    }
}
