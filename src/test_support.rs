//! Mock implementations of platform traits for testing

use std::cell::{Cell, RefCell};

use http::StatusCode;

use crate::config::Config;
use crate::error::UpstreamError;
use crate::platform::{Clock, HttpClient, HttpResponse};

/// Mock HTTP client with pre-configured responses, matched by URL substring
/// in registration order. Every call is recorded.
#[derive(Default)]
pub struct MockHttp {
    responses: Vec<(String, Result<HttpResponse, ()>)>,
    calls: RefCell<Vec<String>>,
    bodies: RefCell<Vec<String>>,
}

impl MockHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, pattern: &str, status: u16, body: &str) -> Self {
        let response = HttpResponse {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.as_bytes().to_vec(),
        };
        self.responses.push((pattern.to_string(), Ok(response)));
        self
    }

    /// Simulates a transport failure for matching URLs.
    pub fn failing(mut self, pattern: &str) -> Self {
        self.responses.push((pattern.to_string(), Err(())));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn calls_to(&self, pattern: &str) -> usize {
        self.calls.borrow().iter().filter(|url| url.contains(pattern)).count()
    }

    pub fn posted_bodies(&self) -> Vec<String> {
        self.bodies.borrow().clone()
    }

    fn respond(&self, url: &str) -> Result<HttpResponse, UpstreamError> {
        self.calls.borrow_mut().push(url.to_string());
        for (pattern, response) in &self.responses {
            if url.contains(pattern.as_str()) {
                return response
                    .clone()
                    .map_err(|_| UpstreamError::Transport(format!("connection reset for {}", url)));
            }
        }
        Err(UpstreamError::Transport(format!("no mock response for {}", url)))
    }
}

impl HttpClient for MockHttp {
    fn get(&self, url: &str, _headers: &[(&str, &str)]) -> Result<HttpResponse, UpstreamError> {
        self.respond(url)
    }

    fn post_form(
        &self,
        url: &str,
        _headers: &[(&str, &str)],
        body: String,
    ) -> Result<HttpResponse, UpstreamError> {
        self.bodies.borrow_mut().push(body);
        self.respond(url)
    }
}

/// Mock clock that only moves when told to.
pub struct MockClock(Cell<u64>);

impl MockClock {
    pub fn new(now: u64) -> Self {
        Self(Cell::new(now))
    }

    pub fn advance(&self, secs: u64) {
        self.0.set(self.0.get() + secs);
    }
}

impl Clock for MockClock {
    fn now_secs(&self) -> u64 {
        self.0.get()
    }
}

pub fn test_config(allowed_teams: &[&str]) -> Config {
    Config {
        client_id: "client-123".to_string(),
        client_secret: "secret-456".to_string(),
        org: "acme".to_string(),
        allowed_teams: allowed_teams.iter().map(|t| t.to_string()).collect(),
        cookie_domain: "docs.acme.dev".to_string(),
        canonical_host: "docs.acme.dev".to_string(),
        ..Config::default()
    }
}
