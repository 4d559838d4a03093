//! ==============================================================================
//! client.rs - request client for the device json api
//! ==============================================================================
//!
//! purpose:
//!     one place that talks to the device. every call sends
//!     `Content-Type: application/json`, serializes the payload when there
//!     is one, and either hands back the decoded body or reports the failure.
//!
//! failure contract (fetch_data):
//!     non-2xx status, network error or an undecodable body are logged,
//!     shown to the user as `Error: <reason>` and returned as `None`.
//!     callers never see an error value.
//!
//! relationships:
//!     - used by: views/* (every page load and mutation)
//!     - uses: notify.rs (failure notification)
//!     - uses: reqwest (HttpTransport), or any other Transport in tests
//!
//! ==============================================================================

use crate::notify::{Notification, Notifier};

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Transport(String),
    #[error("HTTP error! status: {status}, message: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e.to_string())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        })
    }
}

/// one outbound call, already serialized
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
}

/// raw response before status handling
#[derive(Clone, Debug, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// the wire underneath the request client
#[async_trait]
pub trait Transport: Send + Sync {
    /// only network-level problems are errors here; any http status is a response
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse, ApiError>;
}

// ==============================================================================
// reqwest transport
// ==============================================================================

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// `timeout` of `None` waits forever, matching a browser fetch
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse, ApiError> {
        let url = format!("{}{}", self.base_url, request.path);
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, &url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = &request.body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }
}

// ==============================================================================
// request client
// ==============================================================================

#[derive(Clone)]
pub struct RequestClient {
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
}

impl RequestClient {
    pub fn new(transport: Arc<dyn Transport>, notifier: Arc<dyn Notifier>) -> Self {
        Self { transport, notifier }
    }

    /// perform a call and decode the body, surfacing every failure as an error
    pub async fn request<R: DeserializeOwned>(
        &self,
        path: &str,
        method: Method,
        body: Option<serde_json::Value>,
    ) -> Result<R, ApiError> {
        tracing::debug!(%method, path, "device request");
        let response = self
            .transport
            .execute(ApiRequest { method, path: path.to_string(), body })
            .await?;

        if !response.is_success() {
            return Err(ApiError::Status { status: response.status, body: response.body });
        }
        Ok(serde_json::from_str(&response.body)?)
    }

    /// perform a call; failures are logged and notified, then reported as `None`
    pub async fn fetch_data<R: DeserializeOwned>(
        &self,
        path: &str,
        method: Method,
        body: Option<serde_json::Value>,
    ) -> Option<R> {
        match self.request(path, method, body).await {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(%method, path, error = %e, "fetch error");
                self.notifier.notify(Notification::error(format!("Error: {}", e)));
                None
            }
        }
    }

    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Option<R> {
        self.fetch_data(path, Method::Get, None).await
    }

    /// send a payload; a payload that cannot be serialized takes the failure path
    pub async fn send<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        method: Method,
        payload: &B,
    ) -> Option<R> {
        match serde_json::to_value(payload) {
            Ok(body) => self.fetch_data(path, method, Some(body)).await,
            Err(e) => {
                let e = ApiError::from(e);
                tracing::error!(%method, path, error = %e, "fetch error");
                self.notifier.notify(Notification::error(format!("Error: {}", e)));
                None
            }
        }
    }
}
