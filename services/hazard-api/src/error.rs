//! JSON error bodies for the HTTP layer.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{error, warn};

use hazard_common::HazardError;

/// Problem-style exception body: `{"type", "title", "status", "detail"}`.
#[derive(Debug, Clone, Serialize)]
pub struct ExceptionResponse {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
}

impl ExceptionResponse {
    pub fn new(type_: impl Into<String>, status: u16, detail: impl Into<String>) -> Self {
        let type_ = type_.into();
        Self {
            title: type_.clone(),
            type_,
            status,
            detail: detail.into(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

impl From<&HazardError> for ExceptionResponse {
    fn from(err: &HazardError) -> Self {
        let title = StatusCode::from_u16(err.http_status_code())
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Error");
        ExceptionResponse::new(err.kind(), err.http_status_code(), err.to_string()).with_title(title)
    }
}

/// Wrapper turning a `HazardError` into an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub HazardError);

impl From<HazardError> for ApiError {
    fn from(err: HazardError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(kind = self.0.kind(), error = %self.0, "Request failed");
        } else {
            warn!(kind = self.0.kind(), error = %self.0, "Request rejected");
        }

        error_response(status, ExceptionResponse::from(&self.0))
    }
}

/// Serialize an exception body with the given status.
pub fn error_response(status: StatusCode, exc: ExceptionResponse) -> Response {
    let json = serde_json::to_string(&exc).unwrap_or_default();

    (status, [(header::CONTENT_TYPE, "application/json")], json).into_response()
}
