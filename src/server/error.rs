//! Rendering of prediction failures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::ErrorPolicy;
use crate::inference::PredictError;

/// A failed request together with the policy that decides its status code
#[derive(Debug)]
pub struct ServerError {
    pub error: PredictError,
    pub policy: ErrorPolicy,
}

impl ServerError {
    pub fn new(error: PredictError, policy: ErrorPolicy) -> Self {
        Self { error, policy }
    }

    pub fn status(&self) -> StatusCode {
        match self.policy {
            ErrorPolicy::Graceful => StatusCode::OK,
            ErrorPolicy::HttpStatus if self.error.is_client_error() => StatusCode::BAD_REQUEST,
            ErrorPolicy::HttpStatus => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.error.to_string(),
            "code": self.error.code(),
        }));

        (self.status(), body).into_response()
    }
}
