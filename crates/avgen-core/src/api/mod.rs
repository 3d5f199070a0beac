//! Signed requests to the vendor API.
//!
//! Every call resolves a service key through the [`ServiceTable`], signs the
//! request with fresh credentials headers and unwraps the `{code, data, msg}`
//! envelope into an explicit [`ApiResponse`].
//!
//! [`ServiceTable`]: crate::endpoints::ServiceTable

mod client;
mod envelope;

pub use client::ApiClient;
pub use envelope::{decode_envelope, join_path, query_pairs};

use serde_json::Value;

/// HTTP method used for a service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Payload fields are sent as query parameters.
    Get,
    /// Payload is sent as a JSON body.
    Post,
}

/// One call to a named service.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub service: String,
    pub method: Method,
    pub payload: Value,
    /// Appended to the resolved service URL (e.g. a task id).
    pub path: Option<String>,
}

impl ApiRequest {
    pub fn post(service: impl Into<String>, payload: Value) -> Self {
        Self {
            service: service.into(),
            method: Method::Post,
            payload,
            path: None,
        }
    }

    pub fn get(service: impl Into<String>, payload: Value) -> Self {
        Self {
            service: service.into(),
            method: Method::Get,
            payload,
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Outcome of a call that reached the API and returned a decodable envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// `code == 200`; carries the envelope's `data` (may be `null`).
    Data(Value),
    /// Any other `code`; the API answered but refused the request.
    Rejected { code: i64, message: Option<String> },
}

/// Errors raised before or while talking to the API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("service '{service}' not found in region '{region}', check your region and service name")]
    ServiceNotFound { service: String, region: String },

    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: curl::Error,
    },

    #[error("undecodable response from {url} (HTTP {status}): {source}")]
    Decode {
        url: String,
        status: u32,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Transport and decode failures may succeed on a later attempt;
    /// configuration errors never will.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Transport { .. } | ApiError::Decode { .. })
    }
}

/// Sends signed requests. Implemented by [`ApiClient`]; tests substitute scripted senders.
pub trait RequestSender {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}

impl<S: RequestSender + ?Sized> RequestSender for &S {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        (**self).send(request)
    }
}

impl<S: RequestSender + ?Sized> RequestSender for std::sync::Arc<S> {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        (**self).send(request)
    }
}
