//! Session cookie parsing and formatting.

use axum::http::header;

/// Cookie name for the sealed session blob.
pub const SESSION_COOKIE_NAME: &str = "wos-session";

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a axum::http::HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                return Some(value.trim());
            }
        }
    }
    None
}

/// Set-Cookie value storing a sealed session.
/// HttpOnly keeps it away from scripts, SameSite=Lax still allows the
/// top-level redirect back from the identity provider.
pub fn session_cookie(sealed: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; Secure; SameSite=Lax",
        SESSION_COOKIE_NAME, sealed
    )
}

/// Set-Cookie value deleting the session cookie.
pub fn clear_session_cookie() -> String {
    format!(
        "{}=; Path=/; HttpOnly; Secure; SameSite=Lax; Max-Age=0",
        SESSION_COOKIE_NAME
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_get_cookie_simple() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("wos-session=abc123"));

        assert_eq!(get_cookie(&headers, "wos-session"), Some("abc123"));
    }

    #[test]
    fn test_get_cookie_multiple() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("foo=bar; wos-session=abc123; theme=dark"),
        );

        assert_eq!(get_cookie(&headers, "wos-session"), Some("abc123"));
        assert_eq!(get_cookie(&headers, "theme"), Some("dark"));
        assert_eq!(get_cookie(&headers, "foo"), Some("bar"));
    }

    #[test]
    fn test_get_cookie_not_found() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("foo=bar"));

        assert_eq!(get_cookie(&headers, "wos-session"), None);
    }

    #[test]
    fn test_get_cookie_no_header() {
        let headers = axum::http::HeaderMap::new();
        assert_eq!(get_cookie(&headers, "wos-session"), None);
    }

    #[test]
    fn test_get_cookie_with_spaces() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("  wos-session = abc123  ; foo=bar"),
        );

        assert_eq!(get_cookie(&headers, "wos-session"), Some("abc123"));
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("sealed-blob");
        assert!(cookie.starts_with("wos-session=sealed-blob;"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(!cookie.contains("Max-Age"));
    }

    #[test]
    fn test_clear_session_cookie_expires_immediately() {
        let cookie = clear_session_cookie();
        assert!(cookie.starts_with("wos-session=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
