//! One virtual-user iteration: credential draw, login request, metric
//! recording, checks, pacing delay.
use crate::checks::{Check, CheckCounters, LoginResponse};
use crate::client::HttpClient;
use crate::Error;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use std::sync::Arc;
use std::time::{Duration, Instant};
use stampede_core::{Collectors, Credential, RunConfig, LOGIN_EMAIL, LOGIN_PASSWORD, LOGIN_PATH};
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

#[derive(Debug)]
pub(crate) struct Executor {
    client: HttpClient,
    url: String,
    headers: HeaderMap,
    payload: serde_json::Value,
    credentials: Vec<Credential>,
    collectors: Arc<Collectors>,
    checks: Arc<CheckCounters>,
    pacing: Duration,
}

impl Executor {
    pub fn new(
        config: &RunConfig,
        collectors: Arc<Collectors>,
        checks: Arc<CheckCounters>,
    ) -> Result<Self, Error> {
        if config.credentials.is_empty() {
            return Err(Error::InvalidConfig("credential set is empty"));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self {
            client: HttpClient::new(config.request_timeout)?,
            url: format!("{}{LOGIN_PATH}", config.base_url.trim_end_matches('/')),
            headers,
            // The recorded script always logs in as the same fixed account;
            // the drawn credential does not feed the payload.
            payload: serde_json::json!({
                "email": LOGIN_EMAIL,
                "password": LOGIN_PASSWORD,
            }),
            credentials: config.credentials.clone(),
            collectors,
            checks,
            pacing: config.pacing,
        })
    }

    /// Runs a single iteration. Exactly one duration sample and one outcome
    /// sample are recorded before the checks run, no matter how the request
    /// fares; the pacing delay comes last. An iteration torn down mid-request
    /// still records its pair (elapsed-at-abort, failure) through the
    /// in-flight guard.
    pub async fn run_iteration(&self) {
        let credential = self.draw_credential(&mut rand::thread_rng());
        trace!("Iterating as '{}'", credential.id);

        let mut guard = InFlightSample {
            executor: self,
            start: Instant::now(),
            armed: true,
        };
        let outcome = self
            .client
            .post_json(&self.url, &self.headers, &self.payload)
            .await;
        guard.armed = false;

        let response = match outcome {
            Ok(timed) => {
                let success = timed.status == 200;
                self.record_outcome(timed.elapsed, success);
                LoginResponse::from_timed(&timed)
            }
            Err(err) => {
                debug!("Transport failure: {}", err.source);
                self.record_outcome(err.elapsed, false);
                LoginResponse::transport_failure()
            }
        };

        for check in Check::ALL {
            let result = check.verify(&response);
            if let Err(err) = &result {
                trace!("{err}");
            }
            self.checks.record(check, result.is_ok());
        }

        tokio::time::sleep(self.pacing).await;
    }

    fn record_outcome(&self, elapsed: Duration, success: bool) {
        self.collectors.record(elapsed, success);
        self.emit_metrics(elapsed, success);
    }

    fn draw_credential<R: Rng>(&self, rng: &mut R) -> &Credential {
        &self.credentials[rng.gen_range(0..self.credentials.len())]
    }

    #[cfg(feature = "metrics")]
    fn emit_metrics(&self, elapsed: Duration, success: bool) {
        metrics::histogram!(stampede_core::HTTP_REQ_DURATION).record(elapsed.as_secs_f64());
        metrics::histogram!(stampede_core::LOGIN_RESPONSE_TIME)
            .record(elapsed.as_secs_f64() * 1e3);
        if success {
            metrics::counter!(stampede_core::LOGIN_SUCCESS).increment(1);
        }
    }

    #[cfg(not(feature = "metrics"))]
    fn emit_metrics(&self, _elapsed: Duration, _success: bool) {}
}

/// Armed for the span of the HTTP await. If the iteration future is dropped
/// while the request is in flight, the guard records the sample pair with
/// failure status and a fail for every check, keeping all collector counts
/// equal to the number of started iterations.
struct InFlightSample<'a> {
    executor: &'a Executor,
    start: Instant,
    armed: bool,
}

impl Drop for InFlightSample<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.executor.record_outcome(self.start.elapsed(), false);
        for check in Check::ALL {
            self.executor.checks.record(check, false);
        }
    }
}
