//! Model training module
//!
//! Provides the offline training procedure:
//! - Penalized binary logistic regression (L1 / L2) and its one-vs-rest
//!   multi-class reduction
//! - Standardization plus classifier as one persisted pipeline
//! - Stratified hold-out split and stratified k-fold cross-validation
//! - Grid search scored by macro one-vs-rest ROC AUC
//! - A training engine tying dataset, search, refit and evaluation together

mod config;
mod engine;
mod models;
mod one_vs_rest;
mod pipeline;
pub mod cross_validation;
pub mod grid_search;
pub mod linear_models;

pub use config::{HyperParams, ParamGrid, Penalty, TrainingConfig};
pub use cross_validation::{stratified_train_test_split, CVResults, CVSplit, StratifiedKFold, TrainTestSplit};
pub use engine::{train, TrainEngine, TrainingReport};
pub use grid_search::{CandidateResult, GridSearch, GridSearchResult};
pub use linear_models::LogisticRegression;
pub use models::{argmax, argmax_rows, roc_auc_binary, roc_auc_ovr, Classifier, ModelMetrics};
pub use one_vs_rest::OneVsRestClassifier;
pub use pipeline::ObesityPipeline;
