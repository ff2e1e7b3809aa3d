use log::{debug, warn};

use crate::cache::{fingerprint, CacheEntry, ValidationCache};
use crate::config::Config;
use crate::error::UpstreamError;
use crate::github::GithubClient;
use crate::idp::GithubUser;
use crate::platform::{Clock, HttpClient};

/// Resolves a token to a GitHub user and checks org/team membership,
/// remembering the verdict per token for a while.
pub struct Validator<'a> {
    config: &'a Config,
    github: GithubClient<'a>,
    cache: &'a dyn ValidationCache,
    clock: &'a dyn Clock,
}

impl<'a> Validator<'a> {
    pub fn new(
        config: &'a Config,
        http: &'a dyn HttpClient,
        cache: &'a dyn ValidationCache,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            config,
            github: GithubClient::new(config, http),
            cache,
            clock,
        }
    }

    pub fn github(&self) -> &GithubClient<'a> {
        &self.github
    }

    /// Whether `token` belongs to an authorized member. Upstream failures
    /// count as "no" and are cached like any other verdict.
    pub fn validate(&self, token: &str) -> bool {
        let key = fingerprint(token);
        let now = self.clock.now_secs();
        if let Some(entry) = self.cache.get(&key, now) {
            debug!("validation cache hit (valid: {})", entry.valid);
            return entry.valid;
        }
        debug!("validation cache miss");

        let valid = match self.github.current_user(token) {
            Ok(user) => self.is_member(token, &user),
            Err(e) => {
                warn!("could not resolve user from token: {}", e);
                false
            }
        };
        self.remember(&key, valid);
        valid
    }

    /// Resolves the user behind `token`, bypassing the cache.
    pub fn resolve_user(&self, token: &str) -> Result<GithubUser, UpstreamError> {
        self.github.current_user(token)
    }

    /// Team membership when teams are configured, organization membership
    /// otherwise. The first active team wins.
    pub fn is_member(&self, token: &str, user: &GithubUser) -> bool {
        if self.config.allowed_teams.is_empty() {
            return match self.github.is_org_member(token, &user.login) {
                Ok(member) => member,
                Err(e) => {
                    warn!("org membership check for {} failed: {}", user.login, e);
                    false
                }
            };
        }

        for team in &self.config.allowed_teams {
            match self.github.is_active_team_member(token, team, &user.login) {
                Ok(true) => {
                    debug!("{} is an active member of {}", user.login, team);
                    return true;
                }
                Ok(false) => {}
                Err(e) => warn!("team {} membership check for {} failed: {}", team, user.login, e),
            }
        }
        false
    }

    /// Records a verdict for `token`, e.g. right after a successful login.
    pub fn seed(&self, token: &str, valid: bool) {
        self.remember(&fingerprint(token), valid);
    }

    fn remember(&self, key: &str, valid: bool) {
        let ttl = if valid {
            self.config.cache_ttl_secs
        } else {
            self.config.negative_cache_ttl_secs
        };
        let expires_at = self.clock.now_secs().saturating_add(ttl);
        self.cache.put(key, CacheEntry { valid, expires_at });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{InMemoryCache, NoopCache};
    use crate::test_support::{test_config, MockClock, MockHttp};

    const USER: &str = r#"{"login": "octocat"}"#;

    #[test]
    fn second_validation_within_ttl_is_served_from_cache() {
        let config = test_config(&[]);
        let http = MockHttp::new()
            .on("/user", 200, USER)
            .on("/orgs/acme/members/octocat", 204, "");
        let cache = InMemoryCache::new();
        let clock = MockClock::new(1_000);
        let validator = Validator::new(&config, &http, &cache, &clock);

        assert!(validator.validate("gho_token"));
        clock.advance(config.cache_ttl_secs);
        assert!(validator.validate("gho_token"));
        assert_eq!(http.calls_to("/user"), 1);
    }

    #[test]
    fn validation_after_ttl_calls_upstream_again() {
        let config = test_config(&[]);
        let http = MockHttp::new()
            .on("/user", 200, USER)
            .on("/orgs/acme/members/octocat", 204, "");
        let cache = InMemoryCache::new();
        let clock = MockClock::new(1_000);
        let validator = Validator::new(&config, &http, &cache, &clock);

        assert!(validator.validate("gho_token"));
        clock.advance(config.cache_ttl_secs + 1);
        assert!(validator.validate("gho_token"));
        assert_eq!(http.calls_to("/user"), 2);
    }

    #[test]
    fn failures_are_cached_for_the_negative_ttl() {
        let config = test_config(&[]);
        let http = MockHttp::new().on("/user", 401, r#"{"message": "Bad credentials"}"#);
        let cache = InMemoryCache::new();
        let clock = MockClock::new(1_000);
        let validator = Validator::new(&config, &http, &cache, &clock);

        assert!(!validator.validate("revoked"));
        clock.advance(config.negative_cache_ttl_secs);
        assert!(!validator.validate("revoked"));
        assert_eq!(http.calls_to("/user"), 1);

        clock.advance(1);
        assert!(!validator.validate("revoked"));
        assert_eq!(http.calls_to("/user"), 2);
    }

    #[test]
    fn unparsable_user_is_not_authorized() {
        let config = test_config(&[]);
        let http = MockHttp::new().on("/user", 200, "<html>");
        let clock = MockClock::new(0);
        let validator = Validator::new(&config, &http, &NoopCache, &clock);
        assert!(!validator.validate("t"));
    }

    #[test]
    fn transport_errors_fail_closed() {
        let config = test_config(&["docs"]);
        let http = MockHttp::new().on("/user", 200, USER).failing("/teams/");
        let clock = MockClock::new(0);
        let validator = Validator::new(&config, &http, &NoopCache, &clock);
        assert!(!validator.validate("t"));
    }

    #[test]
    fn pending_team_membership_moves_on_to_next_team() {
        let config = test_config(&["platform", "docs"]);
        let http = MockHttp::new()
            .on("/user", 200, USER)
            .on("/teams/platform/memberships/octocat", 200, r#"{"state": "pending"}"#)
            .on("/teams/docs/memberships/octocat", 200, r#"{"state": "active", "role": "member"}"#);
        let clock = MockClock::new(0);
        let validator = Validator::new(&config, &http, &NoopCache, &clock);

        assert!(validator.validate("t"));
        assert_eq!(http.calls_to("/memberships/"), 2);
    }

    #[test]
    fn first_matching_team_short_circuits() {
        let config = test_config(&["platform", "docs"]);
        let http = MockHttp::new()
            .on("/user", 200, USER)
            .on("/teams/platform/memberships/octocat", 200, r#"{"state": "active"}"#);
        let clock = MockClock::new(0);
        let validator = Validator::new(&config, &http, &NoopCache, &clock);

        assert!(validator.validate("t"));
        assert_eq!(http.calls_to("/teams/docs/"), 0);
    }

    #[test]
    fn no_active_team_is_not_authorized() {
        let config = test_config(&["platform", "docs"]);
        let http = MockHttp::new()
            .on("/user", 200, USER)
            .on("/teams/platform/", 404, r#"{"message": "Not Found"}"#)
            .on("/teams/docs/", 200, r#"{"state": "pending"}"#);
        let clock = MockClock::new(0);
        let validator = Validator::new(&config, &http, &NoopCache, &clock);

        assert!(!validator.validate("t"));
        assert_eq!(http.calls_to("/orgs/acme/members/"), 0);
    }

    #[test]
    fn empty_team_list_uses_org_membership() {
        let config = test_config(&[]);
        let http = MockHttp::new()
            .on("/user", 200, USER)
            .on("/orgs/acme/members/octocat", 200, "{}");
        let clock = MockClock::new(0);
        let validator = Validator::new(&config, &http, &NoopCache, &clock);

        assert!(!validator.validate("t"));
        assert_eq!(http.calls_to("/orgs/acme/members/octocat"), 1);
        assert_eq!(http.calls_to("/teams/"), 0);
    }

    #[test]
    fn seeded_verdict_skips_upstream() {
        let config = test_config(&[]);
        let http = MockHttp::new();
        let cache = InMemoryCache::new();
        let clock = MockClock::new(0);
        let validator = Validator::new(&config, &http, &cache, &clock);

        validator.seed("fresh", true);
        assert!(validator.validate("fresh"));
        assert!(http.calls().is_empty());
    }
}
