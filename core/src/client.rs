//! Stateless HTTP request builder and response parser for the Holidaze API.
//!
//! # Design
//! `HolidazeClient` holds only the base URL and the static API key and carries
//! no mutable state between calls. Every operation is split into a `build_*`
//! method that produces an `HttpRequest` and a `parse_*` method that consumes
//! an `HttpResponse`; the resource-specific pairs live in `venues`,
//! `bookings` and `profiles`. All of them go through [`HolidazeClient::request`],
//! so the three standard headers are attached in exactly one place, and the
//! caller's [`Session`] is passed in explicitly instead of being looked up.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::normalize;
use crate::session::Session;

pub const API_KEY_HEADER: &str = "X-Noroff-API-Key";

/// Synchronous, stateless client for the Holidaze API.
#[derive(Debug, Clone)]
pub struct HolidazeClient {
    base_url: String,
    api_key: String,
}

impl HolidazeClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.base_url, &config.api_key)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a request for `path` (relative to the base URL).
    ///
    /// Attaches `Content-Type: application/json`, the API key, and
    /// `Authorization: Bearer <token>` when `session` holds a token.
    pub fn request(
        &self,
        session: &Session,
        method: HttpMethod,
        path: &str,
        query: &[(&str, String)],
        body: Option<String>,
    ) -> HttpRequest {
        let mut headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            (API_KEY_HEADER.to_string(), self.api_key.clone()),
        ];
        if let Some(token) = session.token() {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }

        debug!(%method, path, authenticated = session.is_authenticated(), "building request");

        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            query: query
                .iter()
                .map(|(key, value)| (key.to_string(), value.clone()))
                .collect(),
            headers,
            body,
        }
    }

    /// Like [`HolidazeClient::request`] with `input` serialized as the body.
    pub fn request_with_body<B: Serialize>(
        &self,
        session: &Session,
        method: HttpMethod,
        path: &str,
        input: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self.request(session, method, path, &[], Some(body)))
    }
}

/// Map non-2xx responses to `ApiError::Server`, using `fallback` as the last
/// resort message.
pub(crate) fn check_status(response: &HttpResponse, fallback: &str) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::from_response(response, fallback))
}

/// Parse a fetched item; an unrecognized body means the item does not exist.
pub(crate) fn parse_item<T: DeserializeOwned>(
    response: &HttpResponse,
    fallback: &str,
) -> Result<T, ApiError> {
    check_status(response, fallback)?;
    normalize::single(&response.body).ok_or(ApiError::NotFound)
}

/// Parse the item echoed back by a create or update call.
pub(crate) fn parse_written<T: DeserializeOwned>(
    response: &HttpResponse,
    fallback: &str,
) -> Result<T, ApiError> {
    check_status(response, fallback)?;
    normalize::single(&response.body)
        .ok_or_else(|| ApiError::Deserialization("unexpected response structure".to_string()))
}

/// Parse a list endpoint; unrecognized bodies are an empty list.
pub(crate) fn parse_list<T: DeserializeOwned>(
    response: &HttpResponse,
    fallback: &str,
) -> Result<Vec<T>, ApiError> {
    check_status(response, fallback)?;
    Ok(normalize::list(&response.body))
}

/// Percent-encode a single path segment such as a profile name.
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
