use log::{debug, warn};

use crate::cache::ValidationCache;
use crate::callback::{self, CallbackOutcome};
use crate::config::Config;
use crate::cookies::{self, SESSION_COOKIE};
use crate::event::{FilterOutcome, ViewerRequest};
use crate::paths::{classify, PathClass};
use crate::platform::{Clock, HttpClient};
use crate::responses;
use crate::token;
use crate::validator::Validator;

/// Per-request authorization verdict for a protected path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectToAuth(String),
    Deny,
    Error,
}

/// The edge filter: one instance per invocation, wired to the host's HTTP
/// client, cache and clock.
pub struct AuthFilter<'a> {
    config: &'a Config,
    validator: Validator<'a>,
}

impl<'a> AuthFilter<'a> {
    pub fn new(
        config: &'a Config,
        http: &'a dyn HttpClient,
        cache: &'a dyn ValidationCache,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            config,
            validator: Validator::new(config, http, cache, clock),
        }
    }

    pub fn handle(&self, req: ViewerRequest) -> FilterOutcome {
        match classify(&req.uri, self.config) {
            PathClass::Public => {
                debug!("public path {}", req.uri);
                FilterOutcome::Continue(req)
            }
            PathClass::Callback => self.complete_login(&req),
            PathClass::Logout => FilterOutcome::Respond(responses::redirect_with_cookie(
                "/",
                cookies::expired(SESSION_COOKIE, &self.config.cookie_domain),
            )),
            PathClass::Protected => {
                let decision = self.decide(&req);
                self.render(decision, req)
            }
        }
    }

    /// Authorization verdict for a protected request.
    pub fn decide(&self, req: &ViewerRequest) -> Decision {
        match token::extract(req) {
            Some(token) if self.validator.validate(&token) => Decision::Allow,
            Some(_) => {
                debug!("token rejected for {}", req.uri);
                Decision::RedirectToAuth(req.original_path())
            }
            None => Decision::RedirectToAuth(req.original_path()),
        }
    }

    fn render(&self, decision: Decision, req: ViewerRequest) -> FilterOutcome {
        let response = match decision {
            Decision::Allow => return FilterOutcome::Continue(req),
            Decision::RedirectToAuth(state) => match self.validator.github().authorize_url(&state) {
                Ok(url) => responses::temporary_redirect(&url),
                Err(e) => {
                    warn!("could not build authorize URL: {}", e);
                    responses::internal_error()
                }
            },
            Decision::Deny => responses::forbidden(),
            Decision::Error => responses::internal_error(),
        };
        FilterOutcome::Respond(response)
    }

    fn complete_login(&self, req: &ViewerRequest) -> FilterOutcome {
        match callback::handle(req, &self.validator) {
            CallbackOutcome::Authorized { location, token } => {
                let cookie = cookies::persistent(
                    SESSION_COOKIE,
                    &token,
                    &self.config.cookie_domain,
                    self.config.cookie_max_age,
                );
                FilterOutcome::Respond(responses::redirect_with_cookie(&location, cookie))
            }
            CallbackOutcome::Denied => self.render(Decision::Deny, req.clone()),
            CallbackOutcome::Failed => self.render(Decision::Error, req.clone()),
        }
    }
}
