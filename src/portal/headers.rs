//! Request header construction for the facility portal
//!
//! The portal rejects requests without a browser-like signature, so every
//! request carries a fixed browser header profile plus the session cookies
//! rendered into a single `Cookie` header.

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, COOKIE, USER_AGENT,
};

use crate::models::SessionToken;

/// Build the browser-profile headers sent on every portal request
///
/// # Arguments
///
/// * `user_agent` - User agent string (a common browser UA)
/// * `session` - Session cookies to replay; pass an empty token before login
pub fn browser_headers(user_agent: &str, session: &SessionToken) -> HeaderMap {
    let mut headers = HeaderMap::new();

    if let Ok(value) = HeaderValue::from_str(user_agent) {
        headers.insert(USER_AGENT, value);
    }
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-us"));
    headers.insert(
        HeaderName::from_static("upgrade-insecure-requests"),
        HeaderValue::from_static("1"),
    );

    if !session.is_empty() {
        if let Ok(value) = HeaderValue::from_str(&session.cookie_header()) {
            headers.insert(COOKIE, value);
        }
    }

    headers
}
