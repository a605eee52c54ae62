//! HTTP error mapping.
//!
//! # Invariants
//! - Client mistakes are 400, unknown ids 404, expired request contexts 504,
//!   everything else 500.
//! - Failures are logged here, once, with a stable `error_code`.

use aiaction_core::ServiceError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use handlebars::RenderError;
use log::{error, warn};
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    /// The request context expired or was cancelled before the work finished.
    Timeout,
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::NotFound(_) => "not_found",
            Self::Timeout => "deadline_exceeded",
            Self::Internal(_) => "internal",
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest(message) | Self::NotFound(message) | Self::Internal(message) => {
                write!(f, "{message}")
            }
            Self::Timeout => write!(f, "request timed out"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<ServiceError> for AppError {
    fn from(value: ServiceError) -> Self {
        match value {
            err if err.is_client_error() => Self::BadRequest(err.to_string()),
            ServiceError::Repo(err) if err.is_context() => Self::Timeout,
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<RenderError> for AppError {
    fn from(value: RenderError) -> Self {
        Self::Internal(format!("template render failed: {value}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(
                "event=http_error module=server status=error code={} error_code={} error={}",
                status.as_u16(),
                self.error_code(),
                self
            );
        } else {
            warn!(
                "event=http_error module=server status=error code={} error_code={} error={}",
                status.as_u16(),
                self.error_code(),
                self
            );
        }
        (status, self.to_string()).into_response()
    }
}
