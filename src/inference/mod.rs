//! Inference module
//!
//! Turns one loosely-typed patient record into a ranked prediction:
//! - Payload validation with every missing attribute reported at once
//! - Closed set of caller-safe request errors
//! - Class probabilities, arg-max label and top-3 ranking

mod engine;

pub use engine::{InferenceService, InferenceStats, PredictError, Prediction, RankedClass, TOP_K};
