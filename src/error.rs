use thiserror::Error;

/// Problems with the service configuration. Fatal at cold start.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting `{0}`")]
    Missing(&'static str),

    #[error("invalid value for `{field}`: {value}")]
    Invalid { field: &'static str, value: String },

    #[error("malformed bundled configuration: {0}")]
    Parse(String),
}

/// Failure of a call to the identity provider.
///
/// Never escapes the filter; callers collapse it into "not authorized" or a
/// generic error response.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("undecodable response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unencodable request: {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),

    #[error("response is missing `{0}`")]
    MissingField(&'static str),
}
