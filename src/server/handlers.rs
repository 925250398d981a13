//! HTTP request handlers

use std::sync::Arc;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;
use tracing::warn;

use crate::inference::{PredictError, Prediction};

use super::error::ServerError;
use super::state::AppState;

/// Predict the obesity category of one patient record
pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Prediction>, ServerError> {
    let policy = state.config.error_policy;

    let Json(payload) = payload.map_err(|rejection| {
        warn!(reason = %rejection.body_text(), "Rejected request body");
        ServerError::new(PredictError::MalformedRequest, policy)
    })?;

    state.service.predict_value(&payload).map(Json).map_err(|e| {
        if e.is_client_error() {
            warn!(code = e.code(), error = %e, "Prediction request rejected");
        }
        ServerError::new(e, policy)
    })
}
