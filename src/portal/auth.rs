//! Session authentication against the portal's SSO endpoint
//!
//! One login form POST exchanges the credentials for a cookie set. The
//! portal signals success only through a literal marker in the response
//! body; the status code alone proves nothing.

use reqwest::header::SET_COOKIE;

use super::{headers, PortalClient};
use crate::error::BookingError;
use crate::models::SessionToken;

/// Literal marker the SSO endpoint embeds on successful token generation
const LOGIN_SUCCESS_MARKER: &str = "Generation completed";

impl PortalClient {
    /// Authenticate and return the session cookie set
    ///
    /// Called once per booking attempt; each call independently
    /// re-establishes a (possibly different) token.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::AuthenticationFailed` when the exchange
    /// cannot be completed or the response lacks the success marker.
    pub async fn authenticate(&self) -> Result<SessionToken, BookingError> {
        let redirect = format!("{}/pls/webexe88/srce_smain_s.Notice_O", self.config().base_url);
        let form = [
            ("Domain", self.config().login_domain.as_str()),
            ("PIN", self.credentials().pin()),
            ("UserName", self.credentials().username()),
            ("bOption", "OK"),
            ("extra", ""),
            ("map", ""),
            ("p2", redirect.as_str()),
            ("pg", ""),
            ("t", "1"),
            ("title", ""),
        ];

        let url = format!("{}/webexe88/owa/sso.asp", self.config().sso_url);
        let response = self
            .http()
            .post(&url)
            .headers(headers::browser_headers(
                &self.config().user_agent,
                &SessionToken::new(),
            ))
            .form(&form)
            .send()
            .await
            .map_err(|e| BookingError::auth_failed(e.to_string()))?;

        tracing::debug!(status = response.status().as_u16(), "login response received");

        let session = session_from_response(&response);
        let body = response
            .text()
            .await
            .map_err(|e| BookingError::auth_failed(e.to_string()))?;

        if !body.contains(LOGIN_SUCCESS_MARKER) {
            return Err(BookingError::auth_failed(
                "token generation not completed",
            ));
        }

        tracing::debug!(cookies = session.len(), "session established");
        Ok(session)
    }
}

/// Capture the `name=value` part of every `Set-Cookie` response header
fn session_from_response(response: &reqwest::Response) -> SessionToken {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .filter_map(|raw| raw.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect()
}
