//! Adapter over the `cookie` crate.
//!
//! The codec is the only place that knows the `Set-Cookie` / `Cookie` header
//! grammar. Everything else in the crate talks in names, values and
//! [`CookieOptions`].

use cookie::{Cookie, Expiration};

use super::options::{CookieOptions, SameSite};
use super::CookieMap;

/// Serializes one cookie into a `Set-Cookie` compatible string.
///
/// Name and value are percent-encoded by the `cookie` crate. `options` must
/// already be normalized: a day-count `expires` is ignored here.
pub fn serialize(name: &str, value: &str, options: &CookieOptions) -> String {
    let mut cookie = Cookie::new(name.to_string(), value.to_string());

    if let Some(path) = &options.path {
        cookie.set_path(path.clone());
    }
    if let Some(domain) = &options.domain {
        cookie.set_domain(domain.clone());
    }
    if let Some(at) = options.expires_at_time() {
        cookie.set_expires(Expiration::DateTime(at));
    }
    if let Some(seconds) = options.max_age {
        cookie.set_max_age(time::Duration::seconds(seconds));
    }
    if options.secure {
        cookie.set_secure(true);
    }
    if options.http_only {
        cookie.set_http_only(true);
    }
    if let Some(same_site) = options.same_site {
        cookie.set_same_site(match same_site {
            SameSite::Strict => cookie::SameSite::Strict,
            SameSite::Lax => cookie::SameSite::Lax,
            SameSite::None => cookie::SameSite::None,
        });
    }
    if options.partitioned {
        cookie.set_partitioned(true);
    }

    cookie.encoded().to_string()
}

/// Parses a raw `Cookie` request header into ordered, de-duplicated pairs.
///
/// Values are percent-decoded and stripped of surrounding double quotes.
/// When a name repeats, the first occurrence wins. Malformed pieces are skipped.
pub fn parse_pairs(header: &str) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = Vec::new();

    for piece in header.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let Ok(cookie) = Cookie::parse_encoded(piece) else {
            log::debug!("skipping malformed cookie pair {piece:?}");
            continue;
        };
        if pairs.iter().any(|(name, _)| name == cookie.name()) {
            continue;
        }
        pairs.push((cookie.name().to_string(), cookie.value_trimmed().to_string()));
    }

    pairs
}

/// Parses a raw `Cookie` request header into the canonical mapping.
pub fn parse(header: &str) -> CookieMap {
    parse_pairs(header).into_iter().collect()
}

/// Percent-encodes a bare cookie value exactly as [`serialize`] does.
pub fn encode_value(value: &str) -> String {
    let encoded = Cookie::new("v", value).encoded().to_string();
    encoded.split_once('=').map(|(_, v)| v.to_string()).unwrap_or_default()
}

/// Renders pairs back into a request `Cookie` header, percent-encoding values.
pub fn render_header(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(name, value)| Cookie::new(name.as_str(), value.as_str()).encoded().to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn plain_pair_has_default_shape() {
        let s = serialize("test", "value", &CookieOptions::new().path("/"));
        assert!(s.starts_with("test=value;"), "{s}");
        assert!(s.contains("Path=/"));
    }

    #[test]
    fn attributes_are_emitted() {
        let opts = CookieOptions::new()
            .path("/app")
            .domain("example.com")
            .expires_at(datetime!(2030-01-01 00:00 UTC))
            .max_age(60)
            .secure(true)
            .http_only(true)
            .same_site(SameSite::Strict);
        let s = serialize("sid", "abc", &opts);

        assert!(s.starts_with("sid=abc"));
        for attr in ["Path=/app", "Domain=example.com", "Max-Age=60", "Secure", "HttpOnly", "SameSite=Strict", "Expires=Tue, 01 Jan 2030 00:00:00 GMT"] {
            assert!(s.contains(attr), "missing {attr} in {s}");
        }
    }

    #[test]
    fn negative_max_age_is_passed_through() {
        let s = serialize("gone", "", &CookieOptions::new().for_deletion());
        assert!(s.starts_with("gone="));
        assert!(s.contains("Max-Age=-1"), "{s}");
    }

    #[test]
    fn json_values_are_escaped() {
        let s = serialize("k", r#"{"n":1}"#, &CookieOptions::new());
        let value = s.split(';').next().unwrap().trim_start_matches("k=");
        assert!(!value.contains('"'));
        assert!(!value.contains('{'));
    }

    #[test]
    fn bare_value_matches_serialized_value() {
        for value in ["plain", "a&b(c)", "x y", "café", r#"{"n":1}"#] {
            let s = serialize("k", value, &CookieOptions::new());
            assert_eq!(format!("k={}", encode_value(value)), s, "{value}");
        }
    }

    #[test]
    fn parse_decodes_and_keeps_first_duplicate() {
        let map = parse("a=1; b=hello%20world; a=2");
        assert_eq!(map.len(), 2);
        assert_eq!(map["a"], "1");
        assert_eq!(map["b"], "hello world");
    }

    #[test]
    fn parse_tolerates_trailing_separators_and_quotes() {
        let pairs = parse_pairs("other=cookie;q=\"quoted\";;");
        assert_eq!(
            pairs,
            vec![("other".to_string(), "cookie".to_string()), ("q".to_string(), "quoted".to_string())]
        );
    }

    #[test]
    fn parse_of_empty_header_is_empty() {
        assert!(parse("").is_empty());
        assert!(parse(" ; ").is_empty());
    }

    #[test]
    fn render_header_joins_and_encodes() {
        let pairs = vec![("a".to_string(), "1".to_string()), ("b".to_string(), "x y".to_string())];
        assert_eq!(render_header(&pairs), "a=1; b=x%20y");
    }
}
