//! Thin wrapper over [`reqwest`] that times every request.
use crate::{Error, NetworkError};
use reqwest::header::HeaderMap;
use serde::Serialize;
use std::time::{Duration, Instant};
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

/// Issues JSON POST requests and reports elapsed time alongside the result.
///
/// Transport failures are returned as [`NetworkError`] with the observed
/// elapsed time attached, so callers can record a sample for every attempt.
#[derive(Debug)]
pub struct HttpClient {
    inner: reqwest::Client,
    timeout: Duration,
}

/// Status, raw body, and elapsed time of one completed request. Elapsed time
/// includes reading the response body.
#[derive(Debug, Clone)]
pub struct TimedResponse {
    pub status: u16,
    pub body: String,
    pub elapsed: Duration,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self, Error> {
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::Client)?;
        Ok(Self { inner, timeout })
    }

    pub async fn post_json<P: Serialize>(
        &self,
        url: &str,
        headers: &HeaderMap,
        payload: &P,
    ) -> Result<TimedResponse, NetworkError> {
        let start = Instant::now();
        let response = self
            .inner
            .post(url)
            .headers(headers.clone())
            .json(payload)
            .send()
            .await
            .map_err(|source| self.network_error(source, start))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|source| self.network_error(source, start))?;

        Ok(TimedResponse {
            status,
            body,
            elapsed: start.elapsed(),
        })
    }

    // Timeouts report the configured ceiling; all other failures report the
    // observed elapsed time.
    fn network_error(&self, source: reqwest::Error, start: Instant) -> NetworkError {
        let elapsed = if source.is_timeout() {
            self.timeout
        } else {
            start.elapsed()
        };
        NetworkError { elapsed, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn connection_refused_keeps_elapsed() {
        let client = HttpClient::new(Duration::from_secs(2)).unwrap();
        let err = client
            .post_json(
                "http://127.0.0.1:9/api/auth/login",
                &HeaderMap::new(),
                &json!({"email": "a", "password": "b"}),
            )
            .await
            .unwrap_err();

        assert!(err.elapsed < Duration::from_secs(2));
        assert!(err.source.is_connect() || err.source.is_request());
    }
}
