//! Training engine: dataset to persisted pipeline

use super::config::{HyperParams, TrainingConfig};
use super::cross_validation::stratified_train_test_split;
use super::grid_search::{CandidateResult, GridSearch};
use super::models::{Classifier, ModelMetrics};
use super::pipeline::ObesityPipeline;
use crate::error::{ObesityError, Result};
use crate::preprocessing::{CategoricalEncoder, ObesityClass, N_CLASSES};
use crate::utils::DataLoader;
use ndarray::{Array1, Axis};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;

/// Summary of a completed training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub best_params: HyperParams,
    /// Mean cross-validated ROC AUC of the winning candidate
    pub cv_score: f64,
    pub cv_std: f64,
    /// ROC AUC on the held-out partition
    pub test_auc: f64,
    pub test_accuracy: f64,
    pub n_rows: usize,
    pub n_train: usize,
    pub n_test: usize,
    /// Every grid point in grid order
    pub candidates: Vec<CandidateResult>,
    pub training_time_secs: f64,
}

/// Runs the offline training procedure
pub struct TrainEngine {
    config: TrainingConfig,
    encoder: CategoricalEncoder,
    pipeline: Option<ObesityPipeline>,
    report: Option<TrainingReport>,
}

impl TrainEngine {
    /// Create a new training engine
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            encoder: CategoricalEncoder::new(),
            pipeline: None,
            report: None,
        }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Load a CSV and fit on it
    pub fn fit_csv(&mut self, path: impl AsRef<Path>) -> Result<&TrainingReport> {
        let path = path.as_ref();
        let df = DataLoader::new().load_csv(path)?;
        tracing::info!(
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            "dataset loaded"
        );
        self.fit(&df)
    }

    /// Encode, split, search the grid, refit the winner and evaluate it
    pub fn fit(&mut self, df: &DataFrame) -> Result<&TrainingReport> {
        let start = Instant::now();
        self.config.validate()?;

        let x = self.encoder.encode_features(df)?;
        let y = self.encoder.encode_target(df, &self.config.target_column)?;
        Self::check_classes(&y)?;

        let split = stratified_train_test_split(&y, self.config.test_size, self.config.random_state)?;
        let x_train = x.select(Axis(0), &split.train_indices);
        let y_train = y.select(Axis(0), &split.train_indices);
        let x_test = x.select(Axis(0), &split.test_indices);
        let y_test = y.select(Axis(0), &split.test_indices);

        tracing::info!(
            train = y_train.len(),
            test = y_test.len(),
            seed = self.config.random_state,
            "stratified split"
        );

        let search = GridSearch::new(self.config.param_grid.clone(), self.config.cv_folds, N_CLASSES)
            .with_solver(self.config.max_iter, self.config.tol);
        let result = search.fit(&x_train, &y_train)?;
        let best_params = result.best_params();
        let cv_score = result.best_score();
        let cv_std = result.best().cv.std_score;

        tracing::info!(
            c = best_params.c,
            penalty = %best_params.penalty,
            cv_auc = cv_score,
            candidates = result.candidates.len(),
            "best hyperparameters selected"
        );

        let mut pipeline =
            ObesityPipeline::new(best_params).with_solver(self.config.max_iter, self.config.tol);
        pipeline.fit(&x_train, &y_train, N_CLASSES)?;

        let proba = pipeline.predict_proba(&x_test)?;
        let metrics = ModelMetrics::compute(&y_test, &proba)?;

        tracing::info!(
            test_auc = metrics.roc_auc,
            test_accuracy = metrics.accuracy,
            "held-out evaluation"
        );

        let report = TrainingReport {
            best_params,
            cv_score,
            cv_std,
            test_auc: metrics.roc_auc,
            test_accuracy: metrics.accuracy,
            n_rows: y.len(),
            n_train: y_train.len(),
            n_test: y_test.len(),
            candidates: result.candidates,
            training_time_secs: start.elapsed().as_secs_f64(),
        };

        self.pipeline = Some(pipeline);
        Ok(self.report.insert(report))
    }

    pub fn pipeline(&self) -> Option<&ObesityPipeline> {
        self.pipeline.as_ref()
    }

    pub fn report(&self) -> Option<&TrainingReport> {
        self.report.as_ref()
    }

    /// Persist the fitted pipeline, overwriting `path`
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let pipeline = self.pipeline.as_ref().ok_or(ObesityError::ModelNotFitted)?;
        pipeline.save(path)?;
        tracing::info!(path = %path.display(), "model artifact written");
        Ok(())
    }

    /// Every class must appear in the data so that one-vs-rest ROC AUC is defined
    fn check_classes(y: &Array1<usize>) -> Result<()> {
        if y.is_empty() {
            return Err(ObesityError::TrainingData("dataset has no rows".to_string()));
        }

        let mut counts = [0usize; N_CLASSES];
        for &class in y.iter() {
            counts[class] += 1;
        }
        let absent: Vec<&str> = ObesityClass::ALL
            .iter()
            .filter(|c| counts[c.index()] == 0)
            .map(|c| c.label())
            .collect();
        if !absent.is_empty() {
            return Err(ObesityError::TrainingData(format!(
                "no rows for class(es): {}",
                absent.join(", ")
            )));
        }
        Ok(())
    }
}

/// Train on `data` and write the artifact to `output`
pub fn train(
    data: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: TrainingConfig,
) -> Result<TrainingReport> {
    let mut engine = TrainEngine::new(config);
    let report = engine.fit_csv(data)?.clone();
    engine.save(output)?;
    Ok(report)
}
