use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::client::{TrackerTransport, TransportError};

/// In-memory [`TrackerTransport`] for tests.
///
/// Pages are registered under the exact path-and-params key they will be
/// requested with; an unregistered key answers with an HTTP 404. Every
/// request is recorded in arrival order, so tests can assert both what was
/// fetched and in which sequence.
pub struct MockTransport {
    user_id: Option<u32>,
    pages: Mutex<HashMap<String, Vec<u8>>>,
    requests: Mutex<Vec<String>>,
}

fn request_key(path: &str, params: &[(&str, String)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }
    let query: Vec<String> = params
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect();
    format!("{path}?{}", query.join("&"))
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            user_id: None,
            pages: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A transport that carries a logged-in session for the given user.
    pub fn with_user_id(user_id: u32) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::new()
        }
    }

    /// Register the response bytes for one exact request.
    pub async fn set_page(&self, path: &str, params: &[(&str, String)], bytes: Vec<u8>) {
        self.pages
            .lock()
            .await
            .insert(request_key(path, params), bytes);
    }

    /// Every request seen so far, as `path?name=value&...` keys, in order.
    pub async fn recorded_requests(&self) -> Vec<String> {
        self.requests.lock().await.clone()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TrackerTransport for MockTransport {
    fn user_id(&self) -> Option<u32> {
        self.user_id
    }

    async fn get(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<u8>, TransportError> {
        let key = request_key(path, params);
        self.requests.lock().await.push(key.clone());
        self.pages
            .lock()
            .await
            .get(&key)
            .cloned()
            .ok_or_else(|| TransportError::Status {
                status: 404,
                path: key,
            })
    }
}
