use http::header::{AUTHORIZATION, COOKIE};

use crate::cookies::{self, SESSION_COOKIE};
use crate::event::ViewerRequest;

/// Pulls the bearer credential from the session cookie, or failing that from
/// an `Authorization: Bearer` header. Only the first value of each header is
/// read.
pub fn extract(req: &ViewerRequest) -> Option<String> {
    if let Some(cookie_header) = req.header(COOKIE.as_str()) {
        if let Some(token) = cookies::parse(cookie_header).get(SESSION_COOKIE) {
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    let authorization = req.header(AUTHORIZATION.as_str())?;
    let (scheme, token) = authorization.split_once(' ')?;
    let token = token.trim();
    if scheme != "Bearer" || token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_takes_precedence_over_header() {
        let req = ViewerRequest::new("/")
            .with_header("Cookie", "theme=dark; github_token=from-cookie")
            .with_header("Authorization", "Bearer from-header");
        assert_eq!(extract(&req).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn falls_back_to_bearer_header() {
        let req = ViewerRequest::new("/")
            .with_header("Cookie", "theme=dark")
            .with_header("Authorization", "Bearer from-header");
        assert_eq!(extract(&req).as_deref(), Some("from-header"));
    }

    #[test]
    fn rejects_other_schemes() {
        for value in [
            "Basic dXNlcjpwYXNz",
            "bearer lower",
            "Token abc",
            "Bearer",
            "Bearer   ",
        ] {
            let req = ViewerRequest::new("/").with_header("Authorization", value);
            assert_eq!(extract(&req), None, "{value}");
        }
    }

    #[test]
    fn none_without_credentials() {
        assert_eq!(extract(&ViewerRequest::new("/")), None);
    }

    #[test]
    fn only_first_cookie_header_is_read() {
        let req = ViewerRequest::new("/")
            .with_header("Cookie", "theme=dark")
            .with_header("Cookie", "github_token=second");
        assert_eq!(extract(&req), None);
    }
}
