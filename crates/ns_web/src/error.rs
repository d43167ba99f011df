use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ns_core::Error;
use serde_json::json;

/// Failure body shared by every endpoint: `{"error": message}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::UpstreamFormat(_) | Error::UpstreamApi { .. } | Error::Http(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
