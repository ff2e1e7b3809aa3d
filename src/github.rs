//! GitHub REST and OAuth endpoints used by the filter.

use http::StatusCode;
use log::debug;

use crate::config::Config;
use crate::error::UpstreamError;
use crate::idp::{AccessTokenResponse, AuthCodePayload, ExchangePayload, GithubUser, TeamMembership};
use crate::platform::HttpClient;

const API_ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

pub struct GithubClient<'a> {
    config: &'a Config,
    http: &'a dyn HttpClient,
}

impl<'a> GithubClient<'a> {
    pub fn new(config: &'a Config, http: &'a dyn HttpClient) -> Self {
        Self { config, http }
    }

    /// Resolves the user behind `token` via `GET /user`.
    pub fn current_user(&self, token: &str) -> Result<GithubUser, UpstreamError> {
        let url = format!("{}/user", self.config.api_base_url);
        let res = self.http.get(&url, &self.api_headers(&bearer(token)))?;
        if !res.status.is_success() {
            return Err(UpstreamError::Status(res.status.as_u16()));
        }
        let user: GithubUser = res.json()?;
        if user.login.is_empty() {
            return Err(UpstreamError::MissingField("login"));
        }
        Ok(user)
    }

    /// Organization membership; only `204 No Content` means member.
    pub fn is_org_member(&self, token: &str, login: &str) -> Result<bool, UpstreamError> {
        let url = format!(
            "{}/orgs/{}/members/{}",
            self.config.api_base_url, self.config.org, login
        );
        let res = self.http.get(&url, &self.api_headers(&bearer(token)))?;
        debug!("org membership for {} in {}: {}", login, self.config.org, res.status);
        Ok(res.status == StatusCode::NO_CONTENT)
    }

    /// Team membership; requires `200 OK` with `state == "active"`.
    pub fn is_active_team_member(
        &self,
        token: &str,
        team: &str,
        login: &str,
    ) -> Result<bool, UpstreamError> {
        let url = format!(
            "{}/orgs/{}/teams/{}/memberships/{}",
            self.config.api_base_url, self.config.org, team, login
        );
        let res = self.http.get(&url, &self.api_headers(&bearer(token)))?;
        if res.status != StatusCode::OK {
            debug!("team {} membership for {}: {}", team, login, res.status);
            return Ok(false);
        }
        let membership: TeamMembership = res.json()?;
        Ok(membership.is_active())
    }

    /// Exchanges an authorization code for an access token.
    pub fn exchange_code(&self, code: &str) -> Result<String, UpstreamError> {
        let url = format!("{}/login/oauth/access_token", self.config.oauth_base_url);
        let body = serde_urlencoded::to_string(&ExchangePayload {
            client_id: &self.config.client_id,
            client_secret: &self.config.client_secret,
            code,
        })?;
        let headers = [
            ("Accept", "application/json"),
            ("User-Agent", self.config.user_agent.as_str()),
        ];
        let res = self.http.post_form(&url, &headers, body)?;
        if !res.status.is_success() {
            return Err(UpstreamError::Status(res.status.as_u16()));
        }
        // GitHub reports a bad code as 200 with an `error` field.
        let token: AccessTokenResponse = res.json()?;
        token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(UpstreamError::MissingField("access_token"))
    }

    /// The authorize URL the viewer is sent to, carrying `state` untouched.
    pub fn authorize_url(&self, state: &str) -> Result<String, UpstreamError> {
        let redirect_uri = self.config.redirect_uri();
        let query = serde_urlencoded::to_string(&AuthCodePayload {
            client_id: &self.config.client_id,
            scope: &self.config.scope,
            redirect_uri: &redirect_uri,
            state,
        })?;
        Ok(format!("{}/login/oauth/authorize?{}", self.config.oauth_base_url, query))
    }

    fn api_headers<'h>(&'h self, authorization: &'h str) -> [(&'h str, &'h str); 4] {
        [
            ("Authorization", authorization),
            ("Accept", API_ACCEPT),
            ("User-Agent", self.config.user_agent.as_str()),
            ("X-GitHub-Api-Version", API_VERSION),
        ]
    }
}

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
