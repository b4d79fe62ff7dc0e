//! Stage scheduler: ramps the live virtual-user count through the stage
//! plan, then drains.
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use stampede_core::{Stage, SCHEDULER_INTERVAL};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum SchedulerState {
    Pending,
    Ramping(usize),
    Done,
}

/// Drives N concurrent iteration loops, where N follows the linear
/// interpolation between stage targets. Ramp-down aborts excess loops;
/// ramp-up spawns fresh ones. Loops observe the drain signal between
/// iterations, and anything still running after the grace period is aborted.
pub(crate) struct StageScheduler<T> {
    plan: Vec<Stage>,
    iteration: T,
    workers: Vec<JoinHandle<()>>,
    aborted: Vec<JoinHandle<()>>,
    live: Arc<AtomicUsize>,
    drain_tx: watch::Sender<bool>,
    drain_rx: watch::Receiver<bool>,
    stop_rx: watch::Receiver<bool>,
    grace: Duration,
    state: SchedulerState,
}

impl<T, F> StageScheduler<T>
where
    T: Fn() -> F + Send + Sync + Clone + 'static,
    F: Future<Output = ()> + Send,
{
    pub fn new(
        plan: Vec<Stage>,
        iteration: T,
        stop_rx: watch::Receiver<bool>,
        grace: Duration,
    ) -> Self {
        let (drain_tx, drain_rx) = watch::channel(false);
        Self {
            plan,
            iteration,
            workers: vec![],
            aborted: vec![],
            live: Arc::new(AtomicUsize::new(0)),
            drain_tx,
            drain_rx,
            stop_rx,
            grace,
            state: SchedulerState::Pending,
        }
    }

    /// Count of iteration loops currently live. Lags worker spawn/abort by a
    /// scheduling hop.
    pub fn live_handle(&self) -> Arc<AtomicUsize> {
        self.live.clone()
    }

    pub async fn run(mut self) {
        let mut prev_target = 0;
        let mut stop_open = true;

        for idx in 0..self.plan.len() {
            let stage = self.plan[idx];
            self.state = SchedulerState::Ramping(idx);
            debug!(
                "Stage {idx}: {prev_target} -> {} over {:?}",
                stage.target, stage.duration
            );

            let start = Instant::now();
            let mut ticker = interval(SCHEDULER_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // NOTE: First tick completes instantly
            loop {
                let stop_requested = tokio::select! {
                    _ = ticker.tick() => false,
                    res = self.stop_rx.changed(), if stop_open => {
                        if res.is_err() {
                            stop_open = false;
                            false
                        } else {
                            *self.stop_rx.borrow()
                        }
                    }
                };

                if stop_requested {
                    info!("Stop requested; winding down");
                    self.shutdown().await;
                    return;
                }

                let frac = if stage.duration.is_zero() {
                    1.0
                } else {
                    (start.elapsed().as_secs_f64() / stage.duration.as_secs_f64()).min(1.0)
                };
                self.set_concurrency(interpolate(prev_target, stage.target, frac));

                if start.elapsed() >= stage.duration {
                    break;
                }
            }
            prev_target = stage.target;
        }

        self.state = SchedulerState::Done;
        debug!("State transition: {:?}", self.state);
        self.shutdown().await;
    }

    fn set_concurrency(&mut self, concurrency: usize) {
        if self.workers.len() == concurrency {
            return;
        }
        trace!("Adjusting concurrency: {} -> {concurrency}", self.workers.len());

        if self.workers.len() > concurrency {
            for handle in self.workers.drain(concurrency..) {
                handle.abort();
                self.aborted.push(handle);
            }
        } else {
            while self.workers.len() < concurrency {
                let iteration = self.iteration.clone();
                let drain = self.drain_rx.clone();
                let live = self.live.clone();
                self.workers.push(tokio::spawn(async move {
                    live.fetch_add(1, Ordering::Relaxed);
                    let _guard = LiveGuard(live);
                    loop {
                        if *drain.borrow() {
                            break;
                        }
                        iteration().await;
                    }
                }));
            }
        }
    }

    async fn shutdown(mut self) {
        debug!("Draining {} iteration loops", self.workers.len());
        let _ = self.drain_tx.send(true);

        let deadline = tokio::time::Instant::now() + self.grace;
        for mut handle in self.workers.drain(..) {
            if tokio::time::timeout_at(deadline, &mut handle).await.is_err() {
                warn!("Iteration loop exceeded the grace period; aborting");
                handle.abort();
                self.aborted.push(handle);
            }
        }

        // Abort completes asynchronously; the failure samples recorded by
        // torn-down in-flight iterations must land before the run is
        // evaluated.
        for handle in self.aborted.drain(..) {
            let _ = handle.await;
        }
    }
}

/// Decrements the live-loop count however the worker ends, abort included.
struct LiveGuard(Arc<AtomicUsize>);

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

fn interpolate(from: usize, to: usize, frac: f64) -> usize {
    let span = to as f64 - from as f64;
    (from as f64 + span * frac.clamp(0.0, 1.0)).round() as usize
}
