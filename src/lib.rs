//! Obesity classifier - offline trainer and prediction service
//!
//! Classifies a person into one of seven obesity categories from sixteen
//! demographic, dietary and lifestyle attributes.
//!
//! # Modules
//!
//! ## Core ML Modules
//! - [`preprocessing`] - Feature schema, categorical encoding, request records, scaling
//! - [`training`] - Logistic regression, cross-validation, grid search, training engine
//! - [`inference`] - Prediction service with ranked class probabilities
//!
//! ## Services
//! - [`server`] - HTTP server exposing `POST /predict`
//! - [`cli`] - Command-line interface
//!
//! ## Utilities
//! - [`utils`] - CSV loading

// Core error handling
pub mod error;

// Core ML modules
pub mod preprocessing;
pub mod training;
pub mod inference;

// Utilities
pub mod utils;

// Services
pub mod server;
pub mod cli;

pub use error::{ObesityError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{ObesityError, Result};

    // Preprocessing
    pub use crate::preprocessing::{CategoricalEncoder, Feature, ObesityClass, PatientRecord, StandardScaler};

    // Training
    pub use crate::training::{
        Classifier, HyperParams, ObesityPipeline, ParamGrid, Penalty, TrainEngine, TrainingConfig,
        TrainingReport,
    };

    // Inference
    pub use crate::inference::{InferenceService, PredictError, Prediction};

    // Server
    pub use crate::server::{ErrorPolicy, ServerConfig};
}
