//! Error types for the pairing proxy.
//!
//! The display text of each variant is what the client sees. Any internal
//! detail rides in the variant payload and only reaches the logs.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

/// Proxy error types.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("Missing 'number' in body")]
    MissingNumber,

    #[error("Invalid phone number. Please enter full international number.")]
    InvalidPhoneNumber,

    #[error("Failed to generate pairing code. Try again.")]
    PairingCode(String),

    #[error("Internal server error")]
    MalformedBody(String),

    #[error("Internal server error")]
    Session(String),

    #[error("Internal server error")]
    Link(String),

    #[error("Internal server error")]
    Internal(String),
}

impl ProxyError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ProxyError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, "METHOD_NOT_ALLOWED"),
            ProxyError::MissingNumber => (StatusCode::BAD_REQUEST, "MISSING_NUMBER"),
            ProxyError::InvalidPhoneNumber => (StatusCode::BAD_REQUEST, "INVALID_PHONE_NUMBER"),
            ProxyError::PairingCode(_) => (StatusCode::SERVICE_UNAVAILABLE, "PAIRING_CODE_FAILED"),
            ProxyError::MalformedBody(_)
            | ProxyError::Session(_)
            | ProxyError::Link(_)
            | ProxyError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    /// Internal detail, never sent to the client.
    fn detail(&self) -> Option<&str> {
        match self {
            ProxyError::PairingCode(d)
            | ProxyError::MalformedBody(d)
            | ProxyError::Session(d)
            | ProxyError::Link(d)
            | ProxyError::Internal(d) => Some(d),
            _ => None,
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        match self.detail() {
            Some(detail) => error!(%status, code, detail, "Request failed"),
            None => debug!(%status, code, "Request rejected"),
        }

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        if let ProxyError::MethodNotAllowed = self {
            return (status, [(header::ALLOW, "POST")], Json(body)).into_response();
        }

        (status, Json(body)).into_response()
    }
}

impl From<std::io::Error> for ProxyError {
    fn from(e: std::io::Error) -> Self {
        ProxyError::Session(e.to_string())
    }
}

impl From<serde_json::Error> for ProxyError {
    fn from(e: serde_json::Error) -> Self {
        ProxyError::MalformedBody(format!("JSON parse error: {}", e))
    }
}

impl From<link_client::LinkError> for ProxyError {
    fn from(e: link_client::LinkError) -> Self {
        ProxyError::Link(e.to_string())
    }
}
