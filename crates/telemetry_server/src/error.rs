//! API error types

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::StoreError;

/// Errors returned by request handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request body: {0}")]
    Payload(#[from] JsonRejection),

    #[error("Invalid query parameters: {0}")]
    Query(#[from] QueryRejection),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ApiError {
    /// HTTP status and machine-readable code for this error
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            // Keep the extractor's own status (400, 415, 422)
            ApiError::Payload(rejection) => (rejection.status(), "invalid_payload"),
            ApiError::Query(_) => (StatusCode::BAD_REQUEST, "invalid_query"),
            ApiError::Store(StoreError::InvalidAssetId(_)) => {
                (StatusCode::BAD_REQUEST, "invalid_asset_id")
            }
            ApiError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        tracing::error!(status = status.as_u16(), code, error = %self, "Request failed");

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
