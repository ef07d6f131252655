//! Shared HTTP client for the hosted backend.
//!
//! Every request carries the anon key; once a user signs in, the bearer
//! token is attached as well. The token slot is shared by all live adapters
//! built from the same client.

use std::sync::{Arc, RwLock};

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;

use crate::config::BackendConfig;
use crate::error::PortError;

/// Cheaply cloneable handle to the backend.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<Inner>,
}

struct Inner {
    client: Client,
    config: BackendConfig,
    access_token: RwLock<Option<String>>,
}

/// Error body shapes returned by the auth, table and storage services.
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl BackendClient {
    /// Creates a client for the given backend.
    #[must_use]
    pub fn new(config: BackendConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                client: Client::new(),
                config,
                access_token: RwLock::new(None),
            }),
        }
    }

    /// Backend settings this client talks to.
    #[must_use]
    pub fn config(&self) -> &BackendConfig {
        &self.inner.config
    }

    /// Replaces the bearer token used for subsequent requests.
    pub fn set_access_token(&self, token: Option<&str>) {
        if let Ok(mut slot) = self.inner.access_token.write() {
            *slot = token.map(str::to_string);
        }
    }

    /// Absolute URL for a backend path such as `/rest/v1/links`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.config.url)
    }

    /// Starts a request with the key and (if signed in) bearer headers set.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let bearer = self
            .inner
            .access_token
            .read()
            .ok()
            .and_then(|t| (*t).clone())
            .unwrap_or_else(|| self.inner.config.anon_key.clone());
        self.request_as(method, path, &bearer)
    }

    /// Starts a request authorized by an explicit token.
    pub fn request_as(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        self.inner
            .client
            .request(method, self.url(path))
            .header("apikey", &self.inner.config.anon_key)
            .bearer_auth(token)
    }
}

/// Sends a request and returns the body of a successful response.
///
/// # Errors
///
/// Returns an error on transport failure or a non-2xx status, using the
/// backend's error message when it sent one.
pub async fn send(request: RequestBuilder, what: &str) -> Result<String, PortError> {
    let response = request
        .send()
        .await
        .map_err(|e| -> PortError { format!("{what}: request failed: {e}").into() })?;
    read_body(response, what).await
}

async fn read_body(response: Response, what: &str) -> Result<String, PortError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| -> PortError { format!("{what}: failed to read response: {e}").into() })?;

    if status.is_success() {
        return Ok(text);
    }

    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|b| b.message.or(b.msg).or(b.error_description).or(b.error))
        .unwrap_or(text);
    Err(format!("{what} ({}): {message}", status.as_u16()).into())
}
