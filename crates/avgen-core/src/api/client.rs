//! curl-backed [`RequestSender`].

use std::sync::Arc;
use std::time::Duration;

use crate::endpoints::ServiceTable;
use crate::signing::Credentials;

use super::envelope::{decode_envelope, join_path, query_pairs};
use super::{ApiError, ApiRequest, ApiResponse, Method, RequestSender};

/// Default connect and total timeout for API calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Signed API client for one region. Cheap to clone; credentials and table are shared.
#[derive(Debug, Clone)]
pub struct ApiClient {
    credentials: Arc<Credentials>,
    services: Arc<ServiceTable>,
    region: String,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(
        credentials: Arc<Credentials>,
        services: Arc<ServiceTable>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            services,
            region: region.into(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL for a request: resolved service, optional path suffix, GET query.
    pub fn request_url(&self, request: &ApiRequest) -> Result<String, ApiError> {
        let base = self.services.resolve(&self.region, &request.service)?;
        let joined = match request.path.as_deref() {
            Some(path) => join_path(base, path),
            None => base.to_string(),
        };
        if request.method == Method::Post {
            return Ok(joined);
        }
        let pairs = query_pairs(&request.payload);
        if pairs.is_empty() {
            return Ok(joined);
        }
        let mut url = url::Url::parse(&joined).map_err(|e| ApiError::InvalidUrl {
            url: joined.clone(),
            reason: e.to_string(),
        })?;
        url.query_pairs_mut().extend_pairs(pairs);
        Ok(url.into())
    }

    /// Performs the HTTP exchange; returns status code and body.
    fn perform(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
    ) -> Result<(u32, Vec<u8>), ApiError> {
        let transport = |source: curl::Error| ApiError::Transport {
            url: url.to_string(),
            source,
        };

        let mut easy = curl::easy::Easy::new();
        easy.url(url).map_err(transport)?;
        easy.connect_timeout(self.timeout).map_err(transport)?;
        easy.timeout(self.timeout).map_err(transport)?;

        let mut list = curl::easy::List::new();
        for line in self.credentials.sign_now().header_lines() {
            list.append(&line).map_err(transport)?;
        }
        list.append("Accept: application/json").map_err(transport)?;
        if method == Method::Post {
            list.append("Content-Type: application/json").map_err(transport)?;
            easy.post(true).map_err(transport)?;
            easy.post_fields_copy(body.as_deref().unwrap_or(&b"{}"[..]))
                .map_err(transport)?;
        } else {
            easy.get(true).map_err(transport)?;
        }
        easy.http_headers(list).map_err(transport)?;

        let mut response = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| {
                    response.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(transport)?;
            transfer.perform().map_err(transport)?;
        }

        let code = easy.response_code().map_err(transport)?;
        Ok((code, response))
    }
}

impl RequestSender for ApiClient {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.request_url(request)?;
        let body = match request.method {
            Method::Post => Some(request.payload.to_string().into_bytes()),
            Method::Get => None,
        };

        tracing::debug!(service = %request.service, method = ?request.method, %url, "api call");
        let (status, bytes) = self.perform(request.method, &url, body)?;
        let response = decode_envelope(&url, status, &bytes)?;
        if let ApiResponse::Rejected { code, message } = &response {
            tracing::warn!(
                service = %request.service,
                http_status = status,
                code,
                message = message.as_deref().unwrap_or(""),
                "api call rejected"
            );
        }
        Ok(response)
    }
}
