//! API Error Mapping
//!
//! Translates adapter/usecase errors into HTTP responses with a JSON
//! error body. Domain-level degradation (coercion, fallback
//! categories) never reaches this layer; what does arrive is either a
//! caller mistake (4xx) or something genuinely broken (5xx).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::adapters::csv::IngestError;
use crate::usecases::registry::RegistryError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad upload: unreadable CSV, missing columns, empty file.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// Fee table edit changed the category id set.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Unrecognized path or query parameter value.
    #[error("unknown {what}: {value}")]
    BadParam { what: &'static str, value: String },

    /// Malformed request payload.
    #[error("{0}")]
    BadRequest(String),

    /// No product with this SKU in the merged collection.
    #[error("unknown sku: {0}")]
    NotFound(String),

    /// The chat assistant is not configured (no API key).
    #[error("chat assistant is not configured")]
    ChatUnavailable,

    /// The external text service failed.
    #[error("text service request failed")]
    Upstream(#[source] anyhow::Error),

    /// Anything unexpected.
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Ingest(_) | Self::Registry(_) | Self::BadParam { .. } | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ChatUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = ?self, "API request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::BadRequest("nope".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::ChatUnavailable.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::Upstream(anyhow::anyhow!("boom")).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
