//! Route parsing and URL composition.
//!
//! Resource verbs describe their target as a verb-prefixed route such as
//! `"GET /42"` or `"POST /"`. This module turns such a route into a method
//! and a normalized path, encodes query strings, and joins the result onto a
//! resource's base URL.
//!
//! # Example
//!
//! ```rust
//! use rest_resource::rest::{compose_url, parse_route, query_string};
//! use rest_resource::Method;
//! use std::collections::BTreeMap;
//!
//! let route = parse_route("PUT users//42/", None);
//! assert_eq!(route.method, Method::Put);
//! assert_eq!(route.path, "/users/42");
//!
//! let mut query = BTreeMap::new();
//! query.insert("q".to_string(), "a b".to_string());
//! let relative = format!("{}{}", route.path, query_string(&query));
//!
//! assert_eq!(
//!     compose_url("https://example.com//api/", &relative),
//!     "https://example.com/api/users/42?q=a%20b"
//! );
//! ```

use std::collections::BTreeMap;

use crate::clients::Method;

/// A parsed verb-prefixed route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// The method, from the override, the route's verb token, or `GET`.
    pub method: Method,
    /// The normalized path: one leading `/`, no trailing `/` unless root.
    pub path: String,
}

/// Parses a verb-prefixed route.
///
/// The first space-separated token is taken as the method when it consists
/// solely of uppercase ASCII letters. It is stripped from the path even when
/// `method_override` is given, and the override wins. Without either, the
/// method is `GET`. A route with no path resolves to `/`.
#[must_use]
pub fn parse_route(route: &str, method_override: Option<Method>) -> Route {
    let (token, rest) = route.split_once(' ').unwrap_or((route, ""));

    let (parsed, raw_path) = if is_method_token(token) {
        let parsed = Method::parse(token);
        if parsed.is_none() {
            tracing::debug!("Route verb '{}' is not a supported method, using GET", token);
        }
        (parsed, rest)
    } else {
        (None, route)
    };

    Route {
        method: method_override.or(parsed).unwrap_or(Method::Get),
        path: normalize_path(raw_path),
    }
}

fn is_method_token(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_uppercase())
}

/// Strips every leading and trailing `/` and prefixes exactly one.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    format!("/{}", path.trim_matches('/'))
}

/// Encodes query parameters as `?k=v&k2=v2`, or an empty string when there are none.
///
/// Keys and values are percent-encoded like `encodeURIComponent`, leaving
/// `!'()*` intact; pairs follow the map's key order.
#[must_use]
pub fn query_string(query: &BTreeMap<String, String>) -> String {
    if query.is_empty() {
        return String::new();
    }

    let pairs: Vec<String> = query
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                encode_component(key),
                encode_component(value)
            )
        })
        .collect();

    format!("?{}", pairs.join("&"))
}

/// Percent-encodes a query component, keeping the sub-delimiters `!'()*`.
fn encode_component(component: &str) -> String {
    urlencoding::encode(component)
        .replace("%21", "!")
        .replace("%27", "'")
        .replace("%28", "(")
        .replace("%29", ")")
        .replace("%2A", "*")
}

/// Normalizes a base URL.
///
/// A leading `scheme://` is kept verbatim. Elsewhere, runs of slashes
/// collapse to one and trailing slashes are removed, so the root URL `/`
/// normalizes to an empty string.
#[must_use]
pub fn normalize_base_url(url: &str) -> String {
    let (scheme, rest) = split_scheme(url);

    let mut normalized = String::with_capacity(url.len());
    normalized.push_str(scheme);

    let mut previous_slash = false;
    for c in rest.chars() {
        if c == '/' && previous_slash {
            continue;
        }
        previous_slash = c == '/';
        normalized.push(c);
    }

    let trimmed_len = scheme.len() + normalized[scheme.len()..].trim_end_matches('/').len();
    normalized.truncate(trimmed_len);
    normalized
}

/// Splits off a leading `scheme://`, if present.
fn split_scheme(url: &str) -> (&str, &str) {
    if let Some(index) = url.find("://") {
        let scheme = &url[..index];
        let valid = scheme
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if valid {
            return url.split_at(index + 3);
        }
    }
    ("", url)
}

/// Joins a relative URL (path plus query string) onto a base URL.
#[must_use]
pub fn compose_url(base_url: &str, relative_url: &str) -> String {
    format!("{}{}", normalize_base_url(base_url), relative_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_route_reads_method_token() {
        let route = parse_route("GET /42", None);
        assert_eq!(route.method, Method::Get);
        assert_eq!(route.path, "/42");

        let route = parse_route("DELETE /users/7", None);
        assert_eq!(route.method, Method::Delete);
        assert_eq!(route.path, "/users/7");
    }

    #[test]
    fn test_parse_route_defaults_to_get() {
        let route = parse_route("/users", None);
        assert_eq!(route.method, Method::Get);
        assert_eq!(route.path, "/users");
    }

    #[test]
    fn test_parse_route_lowercase_token_is_path() {
        let route = parse_route("get /42", None);
        assert_eq!(route.method, Method::Get);
        assert_eq!(route.path, "/get /42");
    }

    #[test]
    fn test_parse_route_override_wins_and_token_is_stripped() {
        let route = parse_route("PUT /7", Some(Method::Patch));
        assert_eq!(route.method, Method::Patch);
        assert_eq!(route.path, "/7");
    }

    #[test]
    fn test_parse_route_unknown_verb_falls_back_to_get() {
        let route = parse_route("HEAD /status", None);
        assert_eq!(route.method, Method::Get);
        assert_eq!(route.path, "/status");
    }

    #[test]
    fn test_parse_route_empty_or_bare_verb_is_root() {
        assert_eq!(parse_route("", None).path, "/");
        assert_eq!(parse_route("POST", None).path, "/");
        assert_eq!(parse_route("POST /", None).path, "/");
        assert_eq!(parse_route("GET ///", None).path, "/");
    }

    #[test]
    fn test_parse_route_keeps_inner_spaces() {
        let route = parse_route("GET /a b/", None);
        assert_eq!(route.path, "/a b");
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("42"), "/42");
        assert_eq!(normalize_path("//42//"), "/42");
        assert_eq!(normalize_path("a/b/"), "/a/b");
        assert_eq!(normalize_path(""), "/");
    }

    #[test]
    fn test_query_string_empty() {
        assert_eq!(query_string(&BTreeMap::new()), "");
    }

    #[test]
    fn test_query_string_encodes_keys_and_values() {
        let mut query = BTreeMap::new();
        query.insert("b key".to_string(), "x&y".to_string());
        query.insert("a".to_string(), "1".to_string());

        assert_eq!(query_string(&query), "?a=1&b%20key=x%26y");
    }

    #[test]
    fn test_query_string_keeps_sub_delimiters() {
        let mut query = BTreeMap::new();
        query.insert("sort".to_string(), "name(asc)!*'".to_string());

        assert_eq!(query_string(&query), "?sort=name(asc)!*'");
    }

    #[test]
    fn test_normalize_base_url_root() {
        assert_eq!(normalize_base_url("/"), "");
        assert_eq!(normalize_base_url("///"), "");
        assert_eq!(normalize_base_url(""), "");
    }

    #[test]
    fn test_normalize_base_url_collapses_slashes() {
        assert_eq!(normalize_base_url("/api//users/"), "/api/users");
        assert_eq!(normalize_base_url("//api///users"), "/api/users");
    }

    #[test]
    fn test_normalize_base_url_preserves_scheme() {
        assert_eq!(
            normalize_base_url("http://a.com//api/users/"),
            "http://a.com/api/users"
        );
        assert_eq!(normalize_base_url("https://a.com/"), "https://a.com");
    }

    #[test]
    fn test_normalize_base_url_only_leading_scheme_is_special() {
        assert_eq!(
            normalize_base_url("/proxy/http://a.com//x"),
            "/proxy/http:/a.com/x"
        );
    }

    #[test]
    fn test_compose_url() {
        assert_eq!(compose_url("/", "/42"), "/42");
        assert_eq!(compose_url("/api/users/", "/"), "/api/users/");
        assert_eq!(
            compose_url("http://a.com/api", "/42?x=1"),
            "http://a.com/api/42?x=1"
        );
    }
}
