use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// One entry of the `errors` array in an error body.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldIssue {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
}

impl FieldIssue {
    pub fn new(message: &str, path: &str) -> Self {
        Self {
            message: message.to_string(),
            path: vec![path.to_string()],
        }
    }
}

#[derive(Debug, Error)]
pub enum MockError {
    #[error("No API key header was found")]
    MissingApiKey,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Missing or invalid authorization token")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(&'static str),
    #[error("validation failed")]
    Validation(Vec<FieldIssue>),
}

pub type MockResult<T> = Result<T, MockError>;

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        let status = match &self {
            MockError::MissingApiKey | MockError::InvalidCredentials | MockError::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            MockError::Forbidden(_) => StatusCode::FORBIDDEN,
            MockError::NotFound(_) => StatusCode::NOT_FOUND,
            MockError::Conflict(_) => StatusCode::CONFLICT,
            MockError::Validation(_) => StatusCode::BAD_REQUEST,
        };
        let errors = match self {
            MockError::Validation(issues) => issues,
            other => vec![FieldIssue {
                message: other.to_string(),
                path: Vec::new(),
            }],
        };
        tracing::debug!(status = status.as_u16(), ?errors, "request rejected");
        let body = json!({
            "errors": errors,
            "status": status.canonical_reason().unwrap_or_default(),
            "statusCode": status.as_u16(),
        });
        (status, Json(body)).into_response()
    }
}
