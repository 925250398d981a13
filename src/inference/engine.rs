//! Prediction service over a loaded classifier
//!
//! Holds one read-only model behind an `Arc`, shared by every request
//! without locking. Each call validates the raw payload, runs the model and
//! ranks the class probabilities.

use crate::error::{ObesityError, Result};
use crate::preprocessing::{ObesityClass, PatientRecord, RecordError, N_CLASSES, N_FEATURES};
use crate::training::{argmax, Classifier, ObesityPipeline};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Number of ranked classes returned with every prediction
pub const TOP_K: usize = 3;

/// Per-request failures. Messages are fixed and safe to return to callers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictError {
    #[error("missing features: {}", .0.join(", "))]
    MissingFeatures(Vec<&'static str>),

    #[error("feature '{feature}' must be numeric or a known category label")]
    TypeCoercion { feature: &'static str },

    #[error("request body must be a JSON object")]
    MalformedRequest,

    #[error("internal prediction error")]
    Internal,
}

impl PredictError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            PredictError::MissingFeatures(_) => "missing_features",
            PredictError::TypeCoercion { .. } => "type_coercion",
            PredictError::MalformedRequest => "malformed_request",
            PredictError::Internal => "internal_error",
        }
    }

    /// Whether the caller, not the service, is at fault
    pub fn is_client_error(&self) -> bool {
        !matches!(self, PredictError::Internal)
    }
}

impl From<RecordError> for PredictError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::MissingFeatures(names) => PredictError::MissingFeatures(names),
            RecordError::NotNumeric(feature) => PredictError::TypeCoercion { feature },
        }
    }
}

/// One entry of the top-k ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedClass {
    pub label: String,
    pub probability: f64,
}

/// Successful prediction for one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Class index, the argmax of `probabilities`
    pub predicted_class: usize,
    pub predicted_label: String,
    /// One probability per class, in class-index order
    pub probabilities: Vec<f64>,
    /// Three most probable classes, highest first
    pub top3: Vec<RankedClass>,
}

/// Request counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceStats {
    pub total_predictions: u64,
    pub error_count: u64,
}

/// Loaded model plus request handling
pub struct InferenceService {
    model: Arc<dyn Classifier>,
    predictions: AtomicU64,
    errors: AtomicU64,
}

impl std::fmt::Debug for InferenceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceService")
            .field("n_classes", &self.model.n_classes())
            .field("stats", &self.stats())
            .finish()
    }
}

impl InferenceService {
    /// Load the persisted pipeline. Missing, corrupt or mis-shaped artifacts
    /// are all reported as [`ObesityError::ArtifactLoad`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let pipeline = ObesityPipeline::load(path)?;

        if pipeline.n_classes() != N_CLASSES {
            return Err(ObesityError::ArtifactLoad {
                path: path.display().to_string(),
                reason: format!("expected {} classes, found {}", N_CLASSES, pipeline.n_classes()),
            });
        }

        tracing::info!(
            path = %path.display(),
            c = pipeline.params().c,
            penalty = %pipeline.params().penalty,
            "model loaded"
        );
        Ok(Self::from_model(Arc::new(pipeline)))
    }

    /// Serve an already constructed classifier
    pub fn from_model(model: Arc<dyn Classifier>) -> Self {
        Self {
            model,
            predictions: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }

    pub fn stats(&self) -> InferenceStats {
        InferenceStats {
            total_predictions: self.predictions.load(Ordering::Relaxed),
            error_count: self.errors.load(Ordering::Relaxed),
        }
    }

    /// Predict from an untyped JSON payload
    pub fn predict_value(&self, payload: &Value) -> std::result::Result<Prediction, PredictError> {
        let result = match payload {
            Value::Object(map) => PatientRecord::from_payload(map)
                .map_err(PredictError::from)
                .and_then(|record| self.run(&record)),
            _ => Err(PredictError::MalformedRequest),
        };
        self.record(&result);
        result
    }

    /// Predict from a typed record
    pub fn predict(&self, record: &PatientRecord) -> std::result::Result<Prediction, PredictError> {
        let result = self.run(record);
        self.record(&result);
        result
    }

    fn record(&self, result: &std::result::Result<Prediction, PredictError>) {
        self.predictions.fetch_add(1, Ordering::Relaxed);
        if result.is_err() {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn run(&self, record: &PatientRecord) -> std::result::Result<Prediction, PredictError> {
        let x = Array2::from_shape_vec((1, N_FEATURES), record.to_array().to_vec()).map_err(|e| {
            tracing::error!(error = %e, "cannot shape feature row");
            PredictError::Internal
        })?;

        let proba = self.model.predict_proba(&x).map_err(|e| {
            tracing::error!(error = %e, "model failed to produce probabilities");
            PredictError::Internal
        })?;

        if proba.dim() != (1, N_CLASSES) {
            tracing::error!(shape = ?proba.dim(), "unexpected probability shape");
            return Err(PredictError::Internal);
        }
        let row = proba.row(0);
        if row.iter().any(|p| !p.is_finite() || *p < 0.0) {
            tracing::error!(probabilities = ?row.to_vec(), "invalid probabilities");
            return Err(PredictError::Internal);
        }

        let predicted_class = argmax(row);
        let predicted_label = label(predicted_class)?;
        let probabilities = row.to_vec();

        Ok(Prediction {
            predicted_class,
            predicted_label: predicted_label.to_string(),
            top3: rank(&probabilities, TOP_K)?,
            probabilities,
        })
    }
}

fn label(class: usize) -> std::result::Result<&'static str, PredictError> {
    ObesityClass::from_index(class)
        .map(ObesityClass::label)
        .ok_or(PredictError::Internal)
}

/// The `k` most probable classes; a stable sort keeps lower indices first on ties
fn rank(probabilities: &[f64], k: usize) -> std::result::Result<Vec<RankedClass>, PredictError> {
    let mut order: Vec<usize> = (0..probabilities.len()).collect();
    order.sort_by(|&a, &b| probabilities[b].total_cmp(&probabilities[a]));

    order
        .into_iter()
        .take(k)
        .map(|class| {
            Ok(RankedClass {
                label: label(class)?.to_string(),
                probability: probabilities[class],
            })
        })
        .collect()
}
