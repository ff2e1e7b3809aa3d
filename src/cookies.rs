use std::collections::HashMap;

pub const SESSION_COOKIE: &str = "github_token";

const COOKIE_ATTRIBUTES: &str = "Path=/; Secure; HttpOnly; SameSite=Lax";

// Splits a `Cookie` header into name/value pairs. Pairs without `=` or with an
// empty name are skipped; the first occurrence of a name wins.
pub fn parse(cookie_string: &str) -> HashMap<&str, &str> {
    let mut cookies = HashMap::new();
    for kv in cookie_string.split(';') {
        if let Some((key, value)) = kv.split_once('=') {
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            cookies.entry(key).or_insert_with(|| value.trim());
        }
    }
    cookies
}

pub fn persistent(name: &str, value: &str, domain: &str, max_age: u32) -> String {
    format!(
        "{}={}; Domain={}; Max-Age={}; {}",
        name, value, domain, max_age, COOKIE_ATTRIBUTES
    )
}

pub fn expired(name: &str, domain: &str) -> String {
    persistent(name, "", domain, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pairs_and_skips_malformed_ones() {
        let cookies = parse("theme=dark;junk; =orphan ;github_token=gho_abc; other=x=y");
        assert_eq!(cookies.get("theme"), Some(&"dark"));
        assert_eq!(cookies.get("github_token"), Some(&"gho_abc"));
        assert_eq!(cookies.get("other"), Some(&"x=y"));
        assert_eq!(cookies.get("junk"), None);
        assert_eq!(cookies.len(), 3);
    }

    #[test]
    fn session_cookie_attributes() {
        let cookie = persistent(SESSION_COOKIE, "gho_abc", "docs.acme.dev", 86400);
        assert_eq!(
            cookie,
            "github_token=gho_abc; Domain=docs.acme.dev; Max-Age=86400; Path=/; Secure; HttpOnly; SameSite=Lax"
        );
    }

    #[test]
    fn expired_cookie_has_zero_max_age() {
        let cookie = expired(SESSION_COOKIE, "docs.acme.dev");
        assert!(cookie.contains("github_token=; Domain=docs.acme.dev; Max-Age=0;"));
    }
}
