use crate::config::Config;

/// How a request path is treated by the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    Public,
    Callback,
    Logout,
    Protected,
}

/// Classifies `path` against the configured callback, logout and public paths.
///
/// Public entries match exactly, or by prefix when they end in `*`. An empty
/// allow-list makes nothing public, and so does any dot segment in the path.
pub fn classify(path: &str, config: &Config) -> PathClass {
    if path == config.callback_path {
        return PathClass::Callback;
    }
    if !config.logout_path.is_empty() && path == config.logout_path {
        return PathClass::Logout;
    }
    if !has_dot_segment(path) && config.public_paths.iter().any(|entry| matches(entry, path)) {
        return PathClass::Public;
    }
    PathClass::Protected
}

// `.` or `..` segments, literal or percent-encoded, resolve somewhere else at origin.
fn has_dot_segment(path: &str) -> bool {
    path.to_ascii_lowercase()
        .replace("%2e", ".")
        .replace("%2f", "/")
        .replace("%5c", "\\")
        .split(['/', '\\'])
        .any(|segment| segment == "." || segment == "..")
}

fn matches(entry: &str, path: &str) -> bool {
    match entry.strip_suffix('*') {
        Some(prefix) => path.starts_with(prefix),
        None => entry == path,
    }
}
