use http::StatusCode;

use crate::event::EdgeResponse;

pub const NO_CACHE: &str = "no-cache, no-store, must-revalidate";

pub const DENIED_BODY: &str = "Access denied. You must be an active member of an authorized \
GitHub team in this organization to view this documentation.";

pub const ERROR_BODY: &str = "Authentication failed. Please try again later.";

// Header keys are written in their conventional casing for the edge response.
const CACHE_CONTROL_KEY: &str = "Cache-Control";
const CONTENT_TYPE_KEY: &str = "Content-Type";
const LOCATION_KEY: &str = "Location";
const SET_COOKIE_KEY: &str = "Set-Cookie";

pub fn temporary_redirect(location: &str) -> EdgeResponse {
    EdgeResponse::from_status(StatusCode::FOUND)
        .with_header(LOCATION_KEY, location)
        .with_header(CACHE_CONTROL_KEY, NO_CACHE)
}

pub fn redirect_with_cookie(location: &str, cookie: String) -> EdgeResponse {
    temporary_redirect(location).with_header(SET_COOKIE_KEY, cookie)
}

pub fn forbidden() -> EdgeResponse {
    text(StatusCode::FORBIDDEN, DENIED_BODY)
}

pub fn internal_error() -> EdgeResponse {
    text(StatusCode::INTERNAL_SERVER_ERROR, ERROR_BODY)
}

fn text(status: StatusCode, body: &str) -> EdgeResponse {
    EdgeResponse::from_status(status)
        .with_header(CONTENT_TYPE_KEY, "text/plain; charset=utf-8")
        .with_header(CACHE_CONTROL_KEY, NO_CACHE)
        .with_body(body)
}
