//! HTTP client for the facility booking portal
//!
//! [`PortalClient`] owns the reqwest client, the portal endpoints and the
//! login credentials, and exposes the three operations of a booking
//! attempt: [`authenticate`](PortalClient::authenticate),
//! [`fetch_schedule`](PortalClient::fetch_schedule) and
//! [`book`](PortalClient::book). All endpoints come from [`PortalConfig`],
//! so integration tests run the full client against a mock server.
//!
//! Every operation is independent per attempt: the session token is
//! established fresh each time and dropped afterwards, which sidesteps the
//! portal's unspecified server-side session timeout.

pub mod auth;
pub mod booking;
pub mod headers;

use reqwest::Client;

use crate::config::PortalConfig;
use crate::error::BookingError;
use crate::models::{Credentials, SessionToken};

/// Client for the facility booking portal
pub struct PortalClient {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Portal endpoints and request settings
    config: PortalConfig,

    /// Login credentials; owned by the client for the process lifetime
    credentials: Credentials,
}

impl PortalClient {
    /// Create a new portal client
    ///
    /// Cookies are managed explicitly through [`SessionToken`] rather than
    /// a client-level cookie store, so the builder stays store-free.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::AuthenticationFailed` if the HTTP client
    /// cannot be created.
    pub fn new(config: PortalConfig, credentials: Credentials) -> Result<Self, BookingError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .gzip(true)
            .build()
            .map_err(|e| BookingError::auth_failed(format!("client construction: {e}")))?;

        Ok(Self {
            client,
            config,
            credentials,
        })
    }

    /// Fetch the weekly schedule page for the configured facility
    ///
    /// # Errors
    ///
    /// Returns `BookingError::ScheduleUnavailable` on transport failure or
    /// any non-success status.
    pub async fn fetch_schedule(&self, session: &SessionToken) -> Result<String, BookingError> {
        let url = format!(
            "{}/pls/webexe88/srce_smain_s.srce$sel31_o?p1={}&p2=&p_info={}",
            self.config.base_url,
            self.credentials.matric(),
            self.config.facility_code
        );

        let response = self
            .client
            .get(&url)
            .headers(headers::browser_headers(&self.config.user_agent, session))
            .send()
            .await
            .map_err(|e| BookingError::schedule_unavailable(e.to_string()))?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), "schedule page fetched");
        if !status.is_success() {
            return Err(BookingError::schedule_unavailable(format!(
                "status {}",
                status.as_u16()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| BookingError::schedule_unavailable(e.to_string()))
    }

    pub(crate) fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub(crate) fn config(&self) -> &PortalConfig {
        &self.config
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }
}
