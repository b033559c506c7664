use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::domain::VisitError;

/// 接口层错误，具体原因只写入日志，不返回给客户端
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to record visit: {0}")]
    RecordVisit(#[source] VisitError),
    #[error("failed to get visit count: {0}")]
    GetVisitCount(#[source] VisitError),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl AppError {
    fn message(&self) -> &'static str {
        match self {
            AppError::RecordVisit(_) => "Failed to record visit",
            AppError::GetVisitCount(_) => "Failed to get visit count",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::INTERNAL_SERVER_ERROR;

        let body = Json(ErrorResponse {
            error: status.canonical_reason().unwrap_or_default().to_string(),
            message: self.message().to_string(),
        });

        (status, body).into_response()
    }
}
