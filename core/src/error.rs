//! Error types for the Holidaze API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because single-item fetches that come
//! back without a recognizable venue, booking or profile are reported as "does
//! not exist" rather than as a malformed response. Every other non-2xx status
//! lands in `Server` with the message picked by [`ApiError::from_response`].
//! `Validation` is raised before a request is ever built.

use serde::Deserialize;
use thiserror::Error;

use crate::http::HttpResponse;

/// Errors returned by the client, the transport and the form controllers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Input rejected locally; no request was sent.
    #[error("invalid input: {message}")]
    Validation { message: String },

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    /// The request was sent but no response came back.
    #[error("transport failed: {0}")]
    Transport(String),

    /// A single-item fetch returned nothing usable.
    #[error("resource not found")]
    NotFound,

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Client configuration is missing or out of range.
    #[error("configuration error: {message}")]
    Config { message: String },
}

/// One entry of the server's `errors` array.
#[derive(Debug, Deserialize)]
struct FieldError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    path: Option<serde_json::Value>,
}

/// The error body shape the Holidaze API answers with.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<FieldError>,
    #[serde(default)]
    message: Option<String>,
}

impl ApiError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Build a `Server` error from a rejected response.
    ///
    /// The message is chosen in priority order: the joined field-level
    /// `errors` (`"<message> (<path>)"`, comma separated), the top-level
    /// `message`, the HTTP status text, and finally `fallback`.
    pub fn from_response(response: &HttpResponse, fallback: &str) -> Self {
        let body: ErrorBody = serde_json::from_str(&response.body).unwrap_or_default();

        let joined = body
            .errors
            .iter()
            .filter_map(render_field_error)
            .collect::<Vec<_>>()
            .join(", ");

        let message = if !joined.is_empty() {
            joined
        } else if let Some(message) = body.message.filter(|m| !m.trim().is_empty()) {
            message
        } else if let Some(reason) = status_text(response.status) {
            reason.to_string()
        } else {
            fallback.to_string()
        };

        Self::Server {
            status: response.status,
            message,
        }
    }

    /// True for a 404 from the server or a missing single item.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound | Self::Server { status: 404, .. })
    }

    /// The text a form or banner shows for this error.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message } | Self::Server { message, .. } => message.clone(),
            Self::Transport(_) => "No response received from server".to_string(),
            Self::NotFound => "Not found".to_string(),
            Self::Deserialization(_) => "Invalid response format from server".to_string(),
            Self::Serialization(_) => "Could not prepare the request".to_string(),
            Self::Config { message } => format!("Configuration error: {message}"),
        }
    }
}

fn render_field_error(error: &FieldError) -> Option<String> {
    let message = error.message.as_deref()?.trim();
    if message.is_empty() {
        return None;
    }
    let path = match &error.path {
        Some(serde_json::Value::String(path)) if !path.is_empty() => Some(path.clone()),
        Some(serde_json::Value::Array(segments)) if !segments.is_empty() => Some(
            segments
                .iter()
                .map(|segment| match segment {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("."),
        ),
        _ => None,
    };
    Some(match path {
        Some(path) => format!("{message} ({path})"),
        None => message.to_string(),
    })
}

fn status_text(status: u16) -> Option<&'static str> {
    http::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
}
