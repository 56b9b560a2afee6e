//! Small helpers shared by the auth handlers.

use axum::http::HeaderMap;
use regex::Regex;
use std::sync::OnceLock;

/// Pragmatic email shape check: one `@`, a dot in the domain, no spaces.
/// Deliverability is not verified anywhere, so anything stricter would just
/// reject real addresses.
pub(crate) fn valid_email(email: &str) -> bool {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    // The pattern is a literal; failure here is a programming error.
    let re = EMAIL_RE
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static email pattern"));
    re.is_match(email)
}

/// Best-effort client IP for rate limiting, taken from proxy headers.
pub(crate) fn extract_client_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(value) = forwarded.to_str() {
            let first = value.split(',').next().map(str::trim);
            if let Some(ip) = first {
                if !ip.is_empty() {
                    return Some(ip.to_string());
                }
            }
        }
    }
    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn email_shapes() {
        assert!(valid_email("alice@example.com"));
        assert!(valid_email("a.b+c@sub.example.co.uk"));
        assert!(!valid_email("alice"));
        assert!(!valid_email("alice@example"));
        assert!(!valid_email("alice @example.com"));
        assert!(!valid_email("@example.com"));
        assert!(!valid_email(""));
    }

    #[test]
    fn client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(extract_client_ip(&headers).as_deref(), Some("203.0.113.7"));

        headers.remove("x-forwarded-for");
        assert_eq!(extract_client_ip(&headers).as_deref(), Some("10.0.0.2"));

        headers.remove("x-real-ip");
        assert!(extract_client_ip(&headers).is_none());
    }
}
