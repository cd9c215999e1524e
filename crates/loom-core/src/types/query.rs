//! Module-id query string helpers.
//!
//! Resolved ids may carry a query (`/src/App.vue?vue&type=style&lang.css`).
//! The native side keeps the path and a parsed query list separately.

/// A parsed query list. Flags without a value keep an empty string.
pub type Query = Vec<(String, String)>;

/// Splits an id into its path and parsed query.
pub fn split_query(id: &str) -> (String, Query) {
    match id.split_once('?') {
        Some((path, query)) => (path.to_string(), parse_query(query)),
        None => (id.to_string(), Vec::new()),
    }
}

/// Returns the id without its query.
pub fn strip_query(id: &str) -> &str {
    id.split_once('?').map(|(path, _)| path).unwrap_or(id)
}

/// Parses `a=1&flag&b=2` into an ordered list.
pub fn parse_query(query: &str) -> Query {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

/// Serializes a query list back to `?a=1&flag`, or an empty string.
pub fn stringify_query(query: &[(String, String)]) -> String {
    if query.is_empty() {
        return String::new();
    }
    let joined = query
        .iter()
        .map(|(key, value)| {
            if value.is_empty() {
                key.clone()
            } else {
                format!("{key}={value}")
            }
        })
        .collect::<Vec<_>>()
        .join("&");
    format!("?{joined}")
}

/// Re-attaches a query to a path.
pub fn with_query(path: &str, query: &[(String, String)]) -> String {
    format!("{path}{}", stringify_query(query))
}
