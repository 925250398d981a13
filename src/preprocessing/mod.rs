//! Data preprocessing module
//!
//! Provides the pieces shared by the trainer and the prediction service:
//! - Feature order, categorical code tables and the class label table
//! - Table-driven categorical encoding of the training CSV
//! - Typed per-request records parsed from JSON
//! - Standard (z-score) feature scaling

pub mod schema;
mod encoder;
mod record;
mod scaler;

pub use encoder::CategoricalEncoder;
pub use record::{PatientRecord, RecordError};
pub use scaler::StandardScaler;
pub use schema::{feature_names, Feature, ObesityClass, N_CLASSES, N_FEATURES, TARGET_COLUMN};
