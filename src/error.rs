use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Who caused a failure, so clients can decide whether retrying makes sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Fault {
    Client,
    Server,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    MissingField(String),
    #[error("{0}")]
    NegativeValue(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    Unauthenticated(String),
    /// Covers both "does not exist" and "belongs to someone else".
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error("upstream service failure: {0}")]
    UpstreamServiceFailure(String),
    #[error("persistence failure: {0:#}")]
    PersistenceFailure(#[from] anyhow::Error),
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    fault: Fault,
}

impl AppError {
    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::UpstreamServiceFailure(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::NegativeValue(_) => "NEGATIVE_VALUE",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Unauthenticated(_) => "UNAUTHENTICATED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            Self::UpstreamServiceFailure(_) => "UPSTREAM_SERVICE_FAILURE",
            Self::PersistenceFailure(_) => "PERSISTENCE_FAILURE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingField(_) | Self::NegativeValue(_) | Self::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UpstreamServiceFailure(_) => StatusCode::BAD_GATEWAY,
            Self::PersistenceFailure(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn fault(&self) -> Fault {
        if self.status().is_server_error() {
            Fault::Server
        } else {
            Fault::Client
        }
    }

    fn public_message(&self) -> String {
        match self {
            // Store and internal details stay in the logs.
            Self::PersistenceFailure(_) => "Storage is temporarily unavailable".into(),
            Self::Internal(_) => "Internal server error".into(),
            other => other.to_string(),
        }
    }
}

/// Unreadable bodies are the caller's fault; oversized ones keep their 413.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let reason = rejection.body_text();
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(reason)
        } else {
            Self::InvalidInput(reason)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.fault() == Fault::Server {
            error!(error = %self, code = self.code(), "request failed");
        }
        let body = ErrorBody {
            error: self.code(),
            message: self.public_message(),
            fault: self.fault(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_4xx() {
        let err = AppError::NegativeValue("Calories cannot be negative".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.fault(), Fault::Client);
        assert_eq!(err.code(), "NEGATIVE_VALUE");
        assert_eq!(err.to_string(), "Calories cannot be negative");

        assert_eq!(AppError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::unauthenticated("x").status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn server_errors_hide_details() {
        let err = AppError::from(anyhow::anyhow!("connection refused to 10.0.0.3"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.fault(), Fault::Server);
        assert!(!err.public_message().contains("10.0.0.3"));

        let upstream = AppError::upstream("model returned no choices");
        assert_eq!(upstream.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(upstream.fault(), Fault::Server);
        assert!(upstream.public_message().contains("no choices"));
    }
}
