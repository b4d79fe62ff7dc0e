//! The `LoadTest` builder/future and the run loop behind it.
use crate::checks::CheckCounters;
use crate::executor::Executor;
use crate::scheduler::StageScheduler;
use crate::Error;
use stampede_core::{evaluate, Collectors, RunConfig, RunReport, Stage, Threshold};
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};
use tokio::sync::watch;
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn};

/// Handle for one harness run. Configure with the builder methods, then
/// `.await` to execute; the output is the run's [`RunReport`].
///
/// # Example
/// ```no_run
/// use stampede::prelude::*;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let report = login_scenario()
///         .grace_period(Duration::from_secs(10))
///         .await
///         .unwrap();
///     assert!(report.passed());
/// }
/// ```
#[pin_project::pin_project]
pub struct LoadTest {
    config: RunConfig,
    stop: Arc<watch::Sender<bool>>,
    runner_fut: Option<Pin<Box<dyn Future<Output = Result<RunReport, Error>> + Send>>>,
}

impl LoadTest {
    pub fn new(config: RunConfig) -> Self {
        let (stop, _) = watch::channel(false);
        Self {
            config,
            stop: Arc::new(stop),
            runner_fut: None,
        }
    }

    /// Replace the stage plan.
    pub fn stages(mut self, stages: Vec<Stage>) -> Self {
        self.config.stages = stages;
        self
    }

    /// Replace the run-end threshold set.
    pub fn thresholds(mut self, thresholds: Vec<Threshold>) -> Self {
        self.config.thresholds = thresholds;
        self
    }

    /// Post-iteration delay for every virtual user.
    pub fn pacing(mut self, pacing: Duration) -> Self {
        self.config.pacing = pacing;
        self
    }

    /// How long to wait for in-flight iterations at shutdown.
    pub fn grace_period(mut self, grace_period: Duration) -> Self {
        self.config.grace_period = grace_period;
        self
    }

    /// Handle for run-level cancellation. Stopping halts new iterations
    /// immediately; in-flight ones drain within the grace period.
    pub fn stopper(&self) -> StopHandle {
        StopHandle {
            stop: self.stop.clone(),
        }
    }
}

/// Builds a [`LoadTest`] against the host named by `BASE_URL` (default
/// `http://localhost:8080`), with the recorded stage plan and thresholds.
pub fn login_scenario() -> LoadTest {
    LoadTest::new(RunConfig::from_env())
}

#[derive(Clone)]
pub struct StopHandle {
    stop: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    pub fn stop(&self) {
        let _ = self.stop.send(true);
    }
}

impl Future for LoadTest {
    type Output = Result<RunReport, Error>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.runner_fut.is_none() {
            let config = self.config.clone();
            let stop_rx = self.stop.subscribe();
            self.runner_fut = Some(Box::pin(async move { run_load_test(config, stop_rx).await }));
        }

        if let Some(runner) = &mut self.runner_fut {
            runner.as_mut().poll(cx)
        } else {
            unreachable!()
        }
    }
}

#[instrument(name = "load_test", skip_all, fields(base_url = %config.base_url))]
async fn run_load_test(
    config: RunConfig,
    stop_rx: watch::Receiver<bool>,
) -> Result<RunReport, Error> {
    info!(
        "Running login load test against {} with {} stages",
        config.base_url,
        config.stages.len()
    );

    let collectors = Arc::new(Collectors::new());
    let checks = Arc::new(CheckCounters::new());
    let executor = Arc::new(Executor::new(&config, collectors.clone(), checks.clone())?);

    let iteration = {
        let executor = executor.clone();
        move || {
            let executor = executor.clone();
            async move { executor.run_iteration().await }
        }
    };

    let scheduler = StageScheduler::new(
        config.stages.clone(),
        iteration,
        stop_rx,
        config.grace_period,
    );
    scheduler.run().await;

    let trend = collectors.trend();
    let rate = collectors.rate();
    let thresholds = evaluate(&config.thresholds, trend, rate);

    let report = RunReport {
        iterations: rate.count(),
        latency_samples: trend.count(),
        success_rate: rate.rate(),
        latency_p50: trend.quantile(0.50),
        latency_p95: trend.quantile(0.95),
        latency_p99: trend.quantile(0.99),
        checks: checks.snapshot(),
        thresholds,
    };

    info!("Run complete:\n{report}");
    Ok(report)
}
