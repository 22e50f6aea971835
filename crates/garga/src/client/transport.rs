//! HTTP transport for the tracker's script endpoints.
//!
//! The tracker has no API; everything is a GET against one of a handful of
//! PHP scripts, authenticated by the session cookie obtained from a login
//! POST. The transport is deliberately dumb: bytes in, bytes out, so parse
//! failures stay distinguishable from transport failures.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::config::TrackerConfig;

pub const LOGIN_SCRIPT: &str = "takelogin.php";
pub const BROWSE_SCRIPT: &str = "browse.php";
pub const DETAILS_SCRIPT: &str = "details.php";
pub const HISTORY_SCRIPT: &str = "history.php";

/// Errors that can occur talking to the tracker.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout")]
    Timeout,

    #[error("HTTP {status} from {path}")]
    Status { status: u16, path: String },

    #[error("Login rejected: no session cookie in response")]
    LoginRejected,

    #[error("HTTP client error: {0}")]
    Http(String),
}

/// Trait for fetching raw bytes from the tracker's endpoints.
///
/// One request at a time: callers never overlap calls, keeping the client
/// within the origin site's expected request cadence.
#[async_trait]
pub trait TrackerTransport: Send + Sync {
    /// The logged-in user's id, when the transport carries a session.
    fn user_id(&self) -> Option<u32>;

    /// GET a script endpoint with query parameters, returning response bytes.
    async fn get(&self, path: &str, params: &[(&str, String)])
        -> Result<Vec<u8>, TransportError>;
}

/// Authenticated reqwest-backed transport.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    user_id: u32,
}

impl HttpTransport {
    /// Log in and return a transport holding the session.
    ///
    /// The tracker answers the login POST with a `uid` cookie; its absence
    /// means the credentials were rejected.
    pub async fn login(config: &TrackerConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;

        let url = format!("{}{}", config.base_url, LOGIN_SCRIPT);
        debug!(username = %config.username, "Logging in to tracker");
        let response = client
            .post(&url)
            .form(&[
                ("username", config.username.as_str()),
                ("password", config.password.as_str()),
            ])
            .send()
            .await
            .map_err(map_reqwest_error)?;

        if !response.status().is_success() {
            return Err(TransportError::Status {
                status: response.status().as_u16(),
                path: LOGIN_SCRIPT.to_string(),
            });
        }

        let user_id = response
            .cookies()
            .find(|cookie| cookie.name() == "uid")
            .and_then(|cookie| cookie.value().parse().ok())
            .ok_or(TransportError::LoginRejected)?;

        debug!(user_id, "Login successful");
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            user_id,
        })
    }
}

#[async_trait]
impl TrackerTransport for HttpTransport {
    fn user_id(&self) -> Option<u32> {
        Some(self.user_id)
    }

    async fn get(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<u8>, TransportError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(path, "Fetching tracker page");

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        if !response.status().is_success() {
            return Err(TransportError::Status {
                status: response.status().as_u16(),
                path: path.to_string(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::ConnectionFailed(e.to_string())
    } else {
        TransportError::Http(e.to_string())
    }
}
