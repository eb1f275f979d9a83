//! Executing `HttpRequest`s.
//!
//! The client never performs I/O itself; a `Transport` turns a request into a
//! response. Non-2xx statuses are returned as data so the client can pick the
//! error message; only a missing response is an error here, along with a
//! body that cannot be read as text. One attempt per call, no retries.

use tracing::{debug, warn};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by `ureq`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (key, value) in headers {
        builder = builder.header(key.as_str(), value.as_str());
    }
    builder
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = request.url();
        debug!(method = %request.method, %url, "sending request");

        let result = match (request.method, request.body) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(&url), &request.headers).call(),
            (HttpMethod::Delete, _) => {
                with_headers(self.agent.delete(&url), &request.headers).call()
            }
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.agent.post(&url), &request.headers).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => {
                with_headers(self.agent.post(&url), &request.headers).send_empty()
            }
            (HttpMethod::Put, Some(body)) => {
                with_headers(self.agent.put(&url), &request.headers).send(body.as_bytes())
            }
            (HttpMethod::Put, None) => {
                with_headers(self.agent.put(&url), &request.headers).send_empty()
            }
        };

        let mut response = result.map_err(|e| {
            warn!(error = %e, %url, "no response received");
            ApiError::Transport(e.to_string())
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let body = response.body_mut().read_to_string().map_err(|e| {
            warn!(error = %e, %url, status, "response body unreadable");
            ApiError::Deserialization(e.to_string())
        })?;

        debug!(status, %url, "response received");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
