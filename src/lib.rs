//! GitHub organization/team gate for a documentation site, run inline with
//! every CDN request before the origin fetch.
//!
//! [`filter::AuthFilter`] is the entry point. Hosts supply an
//! [`platform::HttpClient`], a [`cache::ValidationCache`] and a
//! [`platform::Clock`]; the Fastly Compute binary in `main.rs` is one such host.

pub mod cache;
pub mod callback;
pub mod config;
pub mod cookies;
pub mod error;
pub mod event;
pub mod filter;
pub mod github;
pub mod idp;
pub mod paths;
pub mod platform;
pub mod responses;
pub mod token;
pub mod validator;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use event::{EdgeResponse, FilterOutcome, ViewerRequest};
pub use filter::{AuthFilter, Decision};
