//! The request and response records exchanged with the CDN.
//!
//! Header maps are keyed by lower-cased header name; each name carries a list
//! of `{key, value}` pairs so multi-valued headers survive the round trip.

use std::collections::BTreeMap;

use http::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HeaderEntry {
    pub key: String,
    pub value: String,
}

pub type Headers = BTreeMap<String, Vec<HeaderEntry>>;

/// An inbound viewer request.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewerRequest {
    /// Path only, no host.
    pub uri: String,
    /// Raw, undecoded query string without the leading `?`.
    #[serde(default)]
    pub querystring: String,
    #[serde(default)]
    pub headers: Headers,
}

impl ViewerRequest {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Default::default()
        }
    }

    pub fn with_querystring(mut self, querystring: impl Into<String>) -> Self {
        self.querystring = querystring.into();
        self
    }

    pub fn with_header(mut self, key: &str, value: impl Into<String>) -> Self {
        append_header(&mut self.headers, key, value);
        self
    }

    /// First value of the named header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|entries| entries.first())
            .map(|entry| entry.value.as_str())
    }

    /// Path plus query string, as the viewer asked for it.
    pub fn original_path(&self) -> String {
        if self.querystring.is_empty() {
            self.uri.clone()
        } else {
            format!("{}?{}", self.uri, self.querystring)
        }
    }
}

/// A terminal response generated at the edge.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EdgeResponse {
    pub status: u16,
    pub status_description: String,
    pub headers: Headers,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl EdgeResponse {
    pub fn from_status(status: StatusCode) -> Self {
        Self {
            status: status.as_u16(),
            status_description: status.canonical_reason().unwrap_or_default().to_string(),
            headers: Headers::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, key: &str, value: impl Into<String>) -> Self {
        append_header(&mut self.headers, key, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|entries| entries.first())
            .map(|entry| entry.value.as_str())
    }
}

/// What the CDN should do with the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    /// Forward the original request, unmodified, to origin.
    Continue(ViewerRequest),
    /// Answer the viewer directly; no origin fetch.
    Respond(EdgeResponse),
}

fn append_header(headers: &mut Headers, key: &str, value: impl Into<String>) {
    headers
        .entry(key.to_ascii_lowercase())
        .or_default()
        .push(HeaderEntry {
            key: key.to_string(),
            value: value.into(),
        });
}
