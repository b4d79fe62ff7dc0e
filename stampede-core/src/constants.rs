use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const LOGIN_PATH: &str = "/api/auth/login";

/// Fixed login identity used for every request body.
///
/// NOTE: The recorded traffic always authenticates as this account regardless
/// of which credential the executor draws. See [`crate::Credential`].
pub const LOGIN_EMAIL: &str = "john.doe@example.com";
pub const LOGIN_PASSWORD: &str = "strongpassword123";

/// Post-iteration delay applied by each virtual user.
pub const DEFAULT_PACING: Duration = Duration::from_secs(1);

/// How long the scheduler waits for in-flight iterations after the final
/// stage before aborting them.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Interval at which the scheduler re-interpolates the target concurrency.
pub const SCHEDULER_INTERVAL: Duration = Duration::from_millis(100);

pub const LOGIN_RESPONSE_TIME: &str = "login_response_time";
pub const LOGIN_SUCCESS: &str = "login_success";
pub const HTTP_REQ_DURATION: &str = "http_req_duration";
