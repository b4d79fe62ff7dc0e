use crate::{
    Threshold, DEFAULT_BASE_URL, DEFAULT_GRACE_PERIOD, DEFAULT_PACING, DEFAULT_REQUEST_TIMEOUT,
    HTTP_REQ_DURATION, LOGIN_SUCCESS,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One ramp window: over `duration`, the scheduler moves the live virtual
/// user count from the previous stage's target to `target`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub duration: Duration,
    pub target: usize,
}

impl Stage {
    pub fn new(duration: Duration, target: usize) -> Self {
        Self { duration, target }
    }
}

/// A login credential from the fixed pool. Drawn uniformly at random once per
/// iteration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub id: String,
    pub secret: String,
}

impl Credential {
    pub fn new(id: &str, secret: &str) -> Self {
        Self {
            id: id.to_string(),
            secret: secret.to_string(),
        }
    }
}

/// Full harness configuration, populated once at startup. There is no ambient
/// environment access past construction; `BASE_URL` is only consulted by
/// [`RunConfig::from_env`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunConfig {
    pub base_url: String,
    pub credentials: Vec<Credential>,
    pub stages: Vec<Stage>,
    pub thresholds: Vec<Threshold>,
    pub pacing: Duration,
    pub grace_period: Duration,
    pub request_timeout: Duration,
}

impl RunConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            credentials: default_credentials(),
            stages: default_stages(),
            thresholds: default_thresholds(),
            pacing: DEFAULT_PACING,
            grace_period: DEFAULT_GRACE_PERIOD,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Reads `BASE_URL` from the environment, falling back to
    /// `http://localhost:8080`.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Warm-up to 10, ramp to 50, hold, ramp down.
pub fn default_stages() -> Vec<Stage> {
    vec![
        Stage::new(Duration::from_secs(5), 10),
        Stage::new(Duration::from_secs(10), 50),
        Stage::new(Duration::from_secs(30), 50),
        Stage::new(Duration::from_secs(10), 0),
    ]
}

pub fn default_credentials() -> Vec<Credential> {
    vec![
        Credential::new("username1", "password"),
        Credential::new("username2", "password"),
        Credential::new("username3", "password"),
    ]
}

/// `p95(http_req_duration) < 200ms` and `rate(login_success) > 0.95`.
pub fn default_thresholds() -> Vec<Threshold> {
    vec![
        Threshold::quantile_below(HTTP_REQ_DURATION, 0.95, Duration::from_millis(200)),
        Threshold::rate_above(LOGIN_SUCCESS, 0.95),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_plan_matches_recorded_script() {
        let config = RunConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.stages.len(), 4);
        assert_eq!(config.stages[0], Stage::new(Duration::from_secs(5), 10));
        assert_eq!(config.stages[2].target, 50);
        assert_eq!(config.stages[3].target, 0);
        assert_eq!(config.credentials.len(), 3);
        assert_eq!(config.thresholds.len(), 2);
    }

    #[test]
    fn base_url_env_override() {
        std::env::set_var("BASE_URL", "http://10.0.0.7:9999");
        let config = RunConfig::from_env();
        std::env::remove_var("BASE_URL");
        assert_eq!(config.base_url, "http://10.0.0.7:9999");
    }
}
