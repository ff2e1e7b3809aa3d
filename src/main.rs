use std::time::Duration;

use docs_edge_auth::cache::{CacheEntry, ValidationCache};
use docs_edge_auth::error::UpstreamError;
use docs_edge_auth::platform::{Clock, HttpClient, HttpResponse, SystemClock};
use docs_edge_auth::{AuthFilter, Config, EdgeResponse, FilterOutcome, ViewerRequest};
use fastly::cache::simple;
use fastly::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE};
use fastly::http::StatusCode;
use fastly::secret_store::SecretStore;
use fastly::{ConfigStore, Error, Request, Response};

/// Backend serving the protected documentation.
const ORIGIN_BACKEND: &str = "origin";
/// Backend for `api.github.com`.
const API_BACKEND: &str = "github_api";
/// Backend for `github.com` (OAuth token exchange).
const OAUTH_BACKEND: &str = "github";
/// Config Store that, when linked to the service, overrides the bundled settings.
const CONFIG_STORE: &str = "docs_auth";
/// Secret Store holding `GITHUB_CLIENT_SECRET` alongside the Config Store.
const SECRET_STORE: &str = "docs_auth_secrets";
/// Namespace for validation results in the POP-local cache.
const CACHE_KEY_PREFIX: &str = "docs-edge-auth:validation:";

#[fastly::main]
fn main(req: Request) -> Result<Response, Error> {
    log_fastly::init_simple("logs", log::LevelFilter::Info);

    let settings = load_config()?;
    let client = FastlyHttp {
        api_base_url: &settings.api_base_url,
    };
    let cache = PopCache { clock: &SystemClock };
    let filter = AuthFilter::new(&settings, &client, &cache, &SystemClock);

    match filter.handle(viewer_request(&req)) {
        // Send the untouched request to the origin backend.
        FilterOutcome::Continue(_) => Ok(req.send(ORIGIN_BACKEND)?),
        FilterOutcome::Respond(res) => edge_response(res),
    }
}

// Settings come from the Config and Secret Stores when linked, else from the bundle.
fn load_config() -> Result<Config, Error> {
    let config = match ConfigStore::try_open(CONFIG_STORE) {
        Ok(store) => {
            let secrets = SecretStore::open(SECRET_STORE)?;
            Config::from_sources(
                |key| store.try_get(key).ok().flatten(),
                |key| {
                    let secret = secrets.try_get(key).ok().flatten()?;
                    String::from_utf8(secret.plaintext().to_vec()).ok()
                },
            )?
        }
        Err(_) => Config::from_toml_str(include_str!("config.toml"))?,
    };
    Ok(config)
}

fn viewer_request(req: &Request) -> ViewerRequest {
    let mut viewer = ViewerRequest::new(req.get_path())
        .with_querystring(req.get_query_str().unwrap_or(""));
    for (name, key) in [(COOKIE, "Cookie"), (AUTHORIZATION, "Authorization")] {
        if let Some(value) = req.get_header(name).and_then(|v| v.to_str().ok()) {
            viewer = viewer.with_header(key, value);
        }
    }
    viewer
}

fn edge_response(res: EdgeResponse) -> Result<Response, Error> {
    let mut response = Response::from_status(StatusCode::from_u16(res.status)?);
    for entry in res.headers.values().flatten() {
        response.append_header(entry.key.as_str(), entry.value.as_str());
    }
    if let Some(body) = res.body {
        response.set_body(body);
    }
    Ok(response)
}

struct FastlyHttp<'a> {
    api_base_url: &'a str,
}

impl FastlyHttp<'_> {
    fn send(&self, req: Request) -> Result<HttpResponse, UpstreamError> {
        let backend = if req.get_url_str().starts_with(self.api_base_url) {
            API_BACKEND
        } else {
            OAUTH_BACKEND
        };
        let mut res = req
            .send(backend)
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;
        let status = http::StatusCode::from_u16(res.get_status().as_u16())
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;
        Ok(HttpResponse {
            status,
            body: res.take_body_bytes(),
        })
    }
}

impl HttpClient for FastlyHttp<'_> {
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, UpstreamError> {
        let mut req = Request::get(url);
        for (name, value) in headers {
            req.set_header(*name, *value);
        }
        self.send(req)
    }

    fn post_form(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: String,
    ) -> Result<HttpResponse, UpstreamError> {
        let mut req = Request::post(url)
            .with_header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .with_body(body);
        for (name, value) in headers {
            req.set_header(*name, *value);
        }
        self.send(req)
    }
}

/// Validation results kept in the cache of the serving POP, so they survive
/// across invocations there but are never shared with other POPs.
struct PopCache<'a> {
    clock: &'a dyn Clock,
}

impl ValidationCache for PopCache<'_> {
    fn get(&self, key: &str, now: u64) -> Option<CacheEntry> {
        let body = simple::get(format!("{}{}", CACHE_KEY_PREFIX, key)).ok().flatten()?;
        let entry: CacheEntry = serde_json::from_slice(&body.into_bytes()).ok()?;
        entry.is_fresh(now).then_some(entry)
    }

    // Writes only happen after a miss, so the stored object's TTL has already
    // run out whenever an older entry for the key existed.
    fn put(&self, key: &str, entry: CacheEntry) {
        let Ok(value) = serde_json::to_vec(&entry) else {
            return;
        };
        let ttl = Duration::from_secs(entry.ttl_secs(self.clock.now_secs()));
        if let Err(e) = simple::get_or_set(format!("{}{}", CACHE_KEY_PREFIX, key), value, ttl) {
            log::warn!("could not cache validation result: {:?}", e);
        }
    }
}
