//! Error responses for the JSON action endpoints

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use hw_common::curation::CurationError;
use hw_common::GatewayError;

/// Action endpoint errors; the body is `{"error": message}`
#[derive(Debug)]
pub enum ApiError {
    /// Rejected by the curation tool; the message is user-facing
    Curation(CurationError),
    NotFound(String),
    BadRequest(String),
    Gateway(GatewayError),
    Internal(String),
}

impl From<CurationError> for ApiError {
    fn from(e: CurationError) -> Self {
        ApiError::Curation(e)
    }
}

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        ApiError::Gateway(e)
    }
}

impl From<hw_common::Error> for ApiError {
    fn from(e: hw_common::Error) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Curation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Gateway(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
