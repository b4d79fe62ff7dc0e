//! Named checks over the typed login response.
//!
//! The checks are a fixed, enumerable set of predicates rather than
//! user-supplied callbacks; each one is recorded per iteration and never
//! aborts the run.
use crate::client::TimedResponse;
use crate::Error;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use stampede_core::CheckOutcome;

/// Typed view of the login endpoint's response envelope. Bodies that fail to
/// parse (or transport failures with no body at all) simply have no token.
#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub status: u16,
    body: Option<LoginBody>,
}

#[derive(Debug, Clone, Deserialize)]
struct LoginBody {
    data: Option<TokenData>,
}

#[derive(Debug, Clone, Deserialize)]
struct TokenData {
    token: Option<String>,
}

impl LoginResponse {
    pub fn from_timed(response: &TimedResponse) -> Self {
        Self {
            status: response.status,
            body: serde_json::from_str(&response.body).ok(),
        }
    }

    /// Stand-in for an iteration that never received a response.
    pub fn transport_failure() -> Self {
        Self {
            status: 0,
            body: None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|body| body.data.as_ref())
            .and_then(|data| data.token.as_deref())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Check {
    StatusIs200,
    HasToken,
}

impl Check {
    pub const ALL: [Check; 2] = [Check::StatusIs200, Check::HasToken];

    pub fn name(self) -> &'static str {
        match self {
            Check::StatusIs200 => "status is 200",
            Check::HasToken => "response has token",
        }
    }

    pub fn verify(self, response: &LoginResponse) -> Result<(), Error> {
        let passed = match self {
            Check::StatusIs200 => response.status == 200,
            Check::HasToken => response.token().is_some(),
        };
        if passed {
            Ok(())
        } else {
            Err(Error::Assertion { check: self.name() })
        }
    }

    fn idx(self) -> usize {
        match self {
            Check::StatusIs200 => 0,
            Check::HasToken => 1,
        }
    }
}

/// Shared per-check pass/fail counters, appended by every iteration loop.
#[derive(Debug, Default)]
pub struct CheckCounters {
    passes: [AtomicU64; 2],
    fails: [AtomicU64; 2],
}

impl CheckCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, check: Check, passed: bool) {
        let idx = check.idx();
        if passed {
            self.passes[idx].fetch_add(1, Ordering::Relaxed);
        } else {
            self.fails[idx].fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> Vec<CheckOutcome> {
        Check::ALL
            .iter()
            .map(|check| CheckOutcome {
                name: check.name(),
                passes: self.passes[check.idx()].load(Ordering::Relaxed),
                fails: self.fails[check.idx()].load(Ordering::Relaxed),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn timed(status: u16, body: &str) -> TimedResponse {
        TimedResponse {
            status,
            body: body.to_string(),
            elapsed: Duration::from_millis(5),
        }
    }

    #[test]
    fn token_extracted_from_envelope() {
        let response = LoginResponse::from_timed(&timed(
            200,
            r#"{"success":true,"message":"Login success","data":{"id":1,"username":"johndoe","token":"abc.def.ghi"}}"#,
        ));
        assert_eq!(response.token(), Some("abc.def.ghi"));
        assert!(Check::StatusIs200.verify(&response).is_ok());
        assert!(Check::HasToken.verify(&response).is_ok());
    }

    #[test]
    fn missing_token_fails_check() {
        let response = LoginResponse::from_timed(&timed(
            200,
            r#"{"success":true,"message":"ok","data":{"id":1}}"#,
        ));
        assert!(Check::StatusIs200.verify(&response).is_ok());
        assert!(Check::HasToken.verify(&response).is_err());
    }

    #[test]
    fn malformed_body_fails_token_check() {
        let response = LoginResponse::from_timed(&timed(200, "not json"));
        assert!(Check::HasToken.verify(&response).is_err());
    }

    #[test]
    fn transport_failure_fails_both() {
        let response = LoginResponse::transport_failure();
        assert!(Check::StatusIs200.verify(&response).is_err());
        assert!(Check::HasToken.verify(&response).is_err());
    }

    #[test]
    fn counters_tally_by_name() {
        let counters = CheckCounters::new();
        counters.record(Check::StatusIs200, true);
        counters.record(Check::StatusIs200, true);
        counters.record(Check::HasToken, false);

        let snapshot = counters.snapshot();
        assert_eq!(snapshot[0].name, "status is 200");
        assert_eq!(snapshot[0].passes, 2);
        assert_eq!(snapshot[1].fails, 1);
    }
}
