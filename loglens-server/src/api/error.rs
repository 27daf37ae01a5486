//! API Error Handling
//!
//! Unified error types and conversion for API responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::repository::StoreError;
use crate::service::dashboard_service::DashboardError;
use crate::service::search_service::SearchError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    StoreError(StoreError),
    Cancelled,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::StoreError(StoreError::Timeout(after)) => {
                tracing::error!("Log store query timed out after {:?}", after);
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "Log store query timed out".to_string(),
                )
            }
            ApiError::StoreError(err) => {
                tracing::error!("Log store error: {:?}", err);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Log store unavailable".to_string(),
                )
            }
            ApiError::Cancelled => {
                tracing::debug!("Request cancelled before completion");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Request cancelled".to_string(),
                )
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::StoreError(err)
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Store(err) => ApiError::StoreError(err),
        }
    }
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::Store(err) => ApiError::StoreError(err),
            DashboardError::Cancelled => ApiError::Cancelled,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
