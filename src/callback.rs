use http::HeaderValue;
use log::{info, warn};

use crate::event::ViewerRequest;
use crate::idp::CallbackQueryParameters;
use crate::validator::Validator;

/// Terminal result of the OAuth callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Member confirmed: set the session cookie and send the viewer back.
    Authorized { location: String, token: String },
    /// Identity resolved but not a member of any allowed team.
    Denied,
    /// Missing code, failed exchange or unresolvable identity.
    Failed,
}

/// Completes the authorization code flow for a request to the callback path.
pub fn handle(req: &ViewerRequest, validator: &Validator) -> CallbackOutcome {
    let qs: CallbackQueryParameters = match serde_urlencoded::from_str(&req.querystring) {
        Ok(qs) => qs,
        Err(e) => {
            warn!("malformed callback query string: {}", e);
            return CallbackOutcome::Failed;
        }
    };
    let Some(code) = qs.code.filter(|c| !c.is_empty()) else {
        warn!("callback without an authorization code");
        return CallbackOutcome::Failed;
    };

    let token = match validator.github().exchange_code(&code) {
        Ok(token) => token,
        Err(e) => {
            warn!("authorization code exchange failed: {}", e);
            return CallbackOutcome::Failed;
        }
    };

    let user = match validator.resolve_user(&token) {
        Ok(user) => user,
        Err(e) => {
            warn!("could not resolve user after code exchange: {}", e);
            return CallbackOutcome::Failed;
        }
    };

    if !validator.is_member(&token, &user) {
        info!("denied {}: not a member of an allowed team", user.login);
        return CallbackOutcome::Denied;
    }

    validator.seed(&token, true);
    info!("authorized {}", user.login);
    CallbackOutcome::Authorized {
        location: redirect_target(qs.state.as_deref()),
        token,
    }
}

/// The decoded `state`, when it names a path on this site; `/` otherwise.
///
/// Browsers drop tabs and newlines while parsing a `Location`, so any control
/// character could turn `/\t/host` into `//host`; such states are refused.
fn redirect_target(state: Option<&str>) -> String {
    match state {
        Some(path) if is_local_path(path) => path.to_string(),
        _ => "/".to_string(),
    }
}

fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.contains('\\')
        && !path.chars().any(char::is_control)
        && HeaderValue::from_str(path).is_ok()
}
