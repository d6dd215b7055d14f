//! Extractor for the authenticated account behind a request.

use axum::http::{HeaderMap, header, request::Parts};
use axum::extract::FromRequestParts;
use tracing::trace;

use crate::{
    AppState,
    api::models::auth::CurrentAccount,
    auth::session,
    errors::{Error, Result},
};

/// Pull a single cookie value out of a `Cookie` header, if present.
pub(crate) fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE)?;
    let cookie_str = cookie_header.to_str().ok()?;

    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some((cookie_name, value)) = cookie.split_once('=')
            && cookie_name == name
        {
            return Some(value.to_string());
        }
    }
    None
}

impl FromRequestParts<AppState> for CurrentAccount {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let cookie_name = &state.config.auth.session.cookie_name;
        let Some(token) = cookie_value(&parts.headers, cookie_name) else {
            trace!("No session cookie found in request");
            return Err(Error::Unauthenticated { message: None });
        };

        // Expired and malformed tokens both end up as a plain 401
        session::verify_session_token(&token, &state.config)
    }
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
    fn test_cookie_value_parses_multiple_cookies() {
        let headers = headers_with_cookie("a=1; snapbin_session=abc.def.ghi; device_token=xyz");

        assert_eq!(cookie_value(&headers, "snapbin_session").as_deref(), Some("abc.def.ghi"));
        assert_eq!(cookie_value(&headers, "device_token").as_deref(), Some("xyz"));
        assert_eq!(cookie_value(&headers, "a").as_deref(), Some("1"));
        assert!(cookie_value(&headers, "missing").is_none());
    }

    #[test]
    fn test_cookie_value_no_header() {
        let headers = HeaderMap::new();
        assert!(cookie_value(&headers, "snapbin_session").is_none());
    }
}
