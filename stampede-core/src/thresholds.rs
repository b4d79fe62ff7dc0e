use crate::{Rate, Trend};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// A pass/fail predicate over one aggregate metric, evaluated at run end.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Threshold {
    /// `p(quantile)` of the trend must be strictly below `below`.
    QuantileBelow {
        metric: String,
        quantile: f64,
        below: Duration,
    },
    /// Fraction-true of the rate must be strictly above `above`.
    RateAbove { metric: String, above: f64 },
}

impl Threshold {
    pub fn quantile_below(metric: &str, quantile: f64, below: Duration) -> Self {
        Self::QuantileBelow {
            metric: metric.to_string(),
            quantile,
            below,
        }
    }

    pub fn rate_above(metric: &str, above: f64) -> Self {
        Self::RateAbove {
            metric: metric.to_string(),
            above,
        }
    }

    pub fn metric(&self) -> &str {
        match self {
            Self::QuantileBelow { metric, .. } | Self::RateAbove { metric, .. } => metric,
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QuantileBelow {
                metric,
                quantile,
                below,
            } => write!(
                f,
                "{metric}: p({:.0})<{}",
                quantile * 100.,
                humantime::format_duration(*below)
            ),
            Self::RateAbove { metric, above } => write!(f, "{metric}: rate>{above}"),
        }
    }
}

/// Value a threshold was compared against. A run that produced no samples
/// for the metric yields `NoData`, which never passes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Observed {
    Latency(Duration),
    Rate(f64),
    NoData,
}

impl fmt::Display for Observed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latency(dur) => write!(f, "{}", humantime::format_duration(*dur)),
            Self::Rate(rate) => write!(f, "{rate:.4}"),
            Self::NoData => write!(f, "no data"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ThresholdResult {
    pub threshold: Threshold,
    pub observed: Observed,
    pub passed: bool,
}

/// Raised when the run-end conjunction fails. Per-iteration failures never
/// surface here; only the aggregates do.
#[derive(Clone, Debug, Error)]
#[error("thresholds breached: {failed:?}")]
pub struct ThresholdBreach {
    pub failed: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ThresholdReport {
    pub results: Vec<ThresholdResult>,
}

impl ThresholdReport {
    /// Conjunction of every threshold evaluation.
    pub fn passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    pub fn as_result(&self) -> Result<(), ThresholdBreach> {
        let failed: Vec<String> = self
            .results
            .iter()
            .filter(|r| !r.passed)
            .map(|r| r.threshold.to_string())
            .collect();
        if failed.is_empty() {
            Ok(())
        } else {
            Err(ThresholdBreach { failed })
        }
    }
}

impl fmt::Display for ThresholdReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in &self.results {
            let marker = if result.passed { "ok  " } else { "FAIL" };
            writeln!(
                f,
                "  {marker} {} (observed {})",
                result.threshold, result.observed
            )?;
        }
        Ok(())
    }
}

/// Pure evaluation of a threshold set against the final aggregates. The
/// harness carries a single trend and a single rate, so the metric name on
/// each threshold is reporting surface only.
pub fn evaluate(thresholds: &[Threshold], trend: &Trend, rate: &Rate) -> ThresholdReport {
    let results = thresholds
        .iter()
        .map(|threshold| {
            let (observed, passed) = match threshold {
                Threshold::QuantileBelow {
                    quantile, below, ..
                } => {
                    if trend.count() == 0 {
                        (Observed::NoData, false)
                    } else {
                        let value = trend.quantile(*quantile);
                        (Observed::Latency(value), value < *below)
                    }
                }
                Threshold::RateAbove { above, .. } => {
                    if rate.count() == 0 {
                        (Observed::NoData, false)
                    } else {
                        let value = rate.rate();
                        (Observed::Rate(value), value > *above)
                    }
                }
            };
            debug!("Threshold {threshold}: observed {observed}, passed={passed}");
            ThresholdResult {
                threshold: threshold.clone(),
                observed,
                passed,
            }
        })
        .collect();

    ThresholdReport { results }
}
