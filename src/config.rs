use serde::Deserialize;

use crate::error::ConfigError;

/// Settings shared by every part of the filter.
///
/// Built once per invocation from either the bundled TOML document or a key
/// lookup (process environment, Fastly Config Store). Both sources produce the
/// same value, so the choice is made at deploy time.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub org: String,
    pub allowed_teams: Vec<String>,
    pub public_paths: Vec<String>,
    pub callback_path: String,
    pub logout_path: String,
    pub cookie_domain: String,
    pub canonical_host: String,
    pub scope: String,
    pub cache_ttl_secs: u64,
    pub negative_cache_ttl_secs: u64,
    pub cookie_max_age: u32,
    pub api_base_url: String,
    pub oauth_base_url: String,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            org: String::new(),
            allowed_teams: Vec::new(),
            public_paths: Vec::new(),
            callback_path: "/auth/callback".to_string(),
            logout_path: "/auth/logout".to_string(),
            cookie_domain: String::new(),
            canonical_host: String::new(),
            scope: "read:org".to_string(),
            cache_ttl_secs: 300,
            negative_cache_ttl_secs: 60,
            cookie_max_age: 86400,
            api_base_url: "https://api.github.com".to_string(),
            oauth_base_url: "https://github.com".to_string(),
            user_agent: "docs-edge-auth".to_string(),
        }
    }
}

impl Config {
    /// Parses a bundled TOML document, e.g. `include_str!("config.toml")`.
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(document).map_err(|e| ConfigError::Parse(e.message().to_string()))?;
        config.finish()
    }

    /// Reads settings through `lookup`, falling back to defaults for anything
    /// optional. Lists are comma separated.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_sources(&lookup, &lookup)
    }

    /// Like [`Config::from_lookup`], but `GITHUB_CLIENT_SECRET` is only read
    /// through `secrets` (e.g. a Fastly Secret Store).
    pub fn from_sources<F, S>(lookup: F, secrets: S) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
        S: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(v) = lookup("GITHUB_CLIENT_ID") {
            config.client_id = v;
        }
        if let Some(v) = secrets("GITHUB_CLIENT_SECRET") {
            config.client_secret = v;
        }
        if let Some(v) = lookup("GITHUB_ORG") {
            config.org = v;
        }
        if let Some(v) = lookup("ALLOWED_TEAMS") {
            config.allowed_teams = split_list(&v);
        }
        if let Some(v) = lookup("PUBLIC_PATHS") {
            config.public_paths = split_list(&v);
        }
        if let Some(v) = lookup("CALLBACK_PATH") {
            config.callback_path = v;
        }
        if let Some(v) = lookup("LOGOUT_PATH") {
            config.logout_path = v;
        }
        if let Some(v) = lookup("COOKIE_DOMAIN") {
            config.cookie_domain = v;
        }
        if let Some(v) = lookup("CANONICAL_HOST") {
            config.canonical_host = v;
        }
        if let Some(v) = lookup("CACHE_TTL_SECS") {
            config.cache_ttl_secs = parse_number("cache_ttl_secs", &v)?;
        }
        if let Some(v) = lookup("NEGATIVE_CACHE_TTL_SECS") {
            config.negative_cache_ttl_secs = parse_number("negative_cache_ttl_secs", &v)?;
        }
        if let Some(v) = lookup("COOKIE_MAX_AGE") {
            config.cookie_max_age = parse_number("cookie_max_age", &v)?;
        }
        if let Some(v) = lookup("GITHUB_API_URL") {
            config.api_base_url = v;
        }
        if let Some(v) = lookup("GITHUB_OAUTH_URL") {
            config.oauth_base_url = v;
        }

        config.finish()
    }

    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Checks that every required setting is present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("org", &self.org),
            ("cookie_domain", &self.cookie_domain),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing(field));
            }
        }
        if !self.callback_path.starts_with('/') {
            return Err(ConfigError::Invalid {
                field: "callback_path",
                value: self.callback_path.clone(),
            });
        }
        Ok(())
    }

    /// The OAuth redirect URI registered with the GitHub app.
    pub fn redirect_uri(&self) -> String {
        format!("https://{}{}", self.canonical_host, self.callback_path)
    }

    fn finish(mut self) -> Result<Self, ConfigError> {
        if self.canonical_host.is_empty() {
            self.canonical_host = self.cookie_domain.clone();
        }
        self.api_base_url = self.api_base_url.trim_end_matches('/').to_string();
        self.oauth_base_url = self.oauth_base_url.trim_end_matches('/').to_string();
        self.validate()?;
        Ok(self)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

fn parse_number<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        field,
        value: value.to_string(),
    })
}
