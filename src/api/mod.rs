//! REST API module.
//!
//! Handlers for the founder and member dashboards. Every response uses the
//! `{success, data}` envelope; errors render through [`AppError`].

mod ask;
mod dashboard;
mod leave;
mod members;
mod notifications;
mod performance;
mod session;
mod tasks;

pub use ask::*;
pub use dashboard::*;
pub use leave::*;
pub use members::*;
pub use notifications::*;
pub use performance::*;
pub use session::*;
pub use tasks::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// Create an error API response.
pub fn error<T: Serialize>(err: AppError) -> ApiResult<T> {
    Err(err)
}

/// Parse a positive `limit` query value.
fn parse_limit(limit: Option<usize>) -> Result<Option<usize>, AppError> {
    match limit {
        Some(0) => Err(AppError::Validation("limit must be positive".to_string())),
        other => Ok(other),
    }
}
