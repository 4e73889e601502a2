//! The token travels in a single HttpOnly cookie. Parsing and formatting
//! work against the raw Cookie/Set-Cookie headers.

use axum::http::{header, HeaderMap};

pub const TOKEN_COOKIE: &str = "token";

/// Pull the token value out of the Cookie header, if present.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in raw.split(';') {
        let mut iter = part.trim().splitn(2, '=');
        if let (Some(name), Some(value)) = (iter.next(), iter.next()) {
            if name == TOKEN_COOKIE {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Set-Cookie value carrying a freshly signed token.
pub fn session_cookie(token: &str, max_age_secs: u64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        TOKEN_COOKIE, token, max_age_secs
    )
}

/// Set-Cookie value that removes the token on sign-out.
pub fn clear_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", TOKEN_COOKIE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn finds_token_among_other_cookies() {
        let headers = headers_with_cookie("theme=dark; token=abc.def.ghi; lang=en");
        assert_eq!(token_from_headers(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn tolerates_whitespace_around_pairs() {
        let headers = headers_with_cookie(" token=t1;theme=dark");
        assert_eq!(token_from_headers(&headers).as_deref(), Some("t1"));
    }

    #[test]
    fn missing_cookie_header_yields_none() {
        assert_eq!(token_from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn other_cookies_do_not_match() {
        let headers = headers_with_cookie("tokenish=abc; session=xyz");
        assert_eq!(token_from_headers(&headers), None);
    }

    #[test]
    fn session_cookie_carries_attributes() {
        let c = session_cookie("abc", 3600);
        assert!(c.starts_with("token=abc;"));
        assert!(c.contains("HttpOnly"));
        assert!(c.contains("Path=/"));
        assert!(c.contains("SameSite=Lax"));
        assert!(c.contains("Max-Age=3600"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let c = clear_cookie();
        assert!(c.starts_with("token=;"));
        assert!(c.contains("Max-Age=0"));
    }
}
