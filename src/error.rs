use axum::{extract::rejection::JsonRejection, http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;
use thiserror::Error;

use crate::gemini::GeminiError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable '{0}' is not set")]
    MissingVar(&'static str),
    #[error("environment variable '{key}' has invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Everything that can end a single generation attempt. Configuration
/// problems are `ConfigError`s and stop the process before serving.
#[derive(Debug, Error)]
pub enum StylistError {
    #[error("invalid preferences: {message}")]
    InvalidRequest { status: StatusCode, message: String },

    #[error("model backend error: {0}")]
    Transport(#[from] GeminiError),

    #[error("could not find a JSON array in the model reply")]
    NoStructuredPayload { raw: String },

    #[error("model reply contained a malformed JSON array: {reason}")]
    MalformedPayload { reason: String, raw: String },
}

impl StylistError {
    pub fn code(&self) -> &'static str {
        match self {
            StylistError::InvalidRequest { .. } => "INVALID_REQUEST",
            StylistError::Transport(_) => "TRANSPORT_ERROR",
            StylistError::NoStructuredPayload { .. } => "NO_STRUCTURED_PAYLOAD",
            StylistError::MalformedPayload { .. } => "MALFORMED_PAYLOAD",
        }
    }

    /// Raw model text kept for manual inspection, when the failure happened after the call.
    pub fn raw_reply(&self) -> Option<&str> {
        match self {
            StylistError::NoStructuredPayload { raw } | StylistError::MalformedPayload { raw, .. } => Some(raw),
            _ => None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            StylistError::InvalidRequest { status, .. } => *status,
            StylistError::Transport(_) => StatusCode::BAD_GATEWAY,
            StylistError::NoStructuredPayload { .. } | StylistError::MalformedPayload { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for StylistError {
    fn into_response(self) -> Response {
        tracing::error!(code = self.code(), "❌ Generation failed: {}", self);
        let mut error = json!({
            "code": self.code(),
            "message": self.to_string(),
        });
        if let Some(raw) = self.raw_reply() {
            error["raw_reply"] = json!(raw);
        }
        (self.status(), Json(json!({ "error": error }))).into_response()
    }
}

impl From<JsonRejection> for StylistError {
    fn from(rejection: JsonRejection) -> Self {
        StylistError::InvalidRequest { status: rejection.status(), message: rejection.body_text() }
    }
}
