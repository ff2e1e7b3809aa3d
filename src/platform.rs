//! Seams between the filter and its host.
//!
//! The Compute binary implements these over Fastly backends and the system
//! clock; tests substitute the mocks in `test_support`.

use std::time::{SystemTime, UNIX_EPOCH};

use http::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::UpstreamError;

/// Blocking HTTP client for calls to the identity provider.
pub trait HttpClient {
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, UpstreamError>;

    /// POSTs an `application/x-www-form-urlencoded` body.
    fn post_form(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: String,
    ) -> Result<HttpResponse, UpstreamError>;
}

/// Response from an outbound request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, UpstreamError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Wall clock in Unix seconds.
pub trait Clock {
    fn now_secs(&self) -> u64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }
}
