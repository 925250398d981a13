//! One-vs-rest reduction of multi-class to binary logistic regressions

use super::config::HyperParams;
use super::linear_models::LogisticRegression;
use super::models::Classifier;
use crate::error::{ObesityError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// One binary logistic regression per class.
///
/// Class `k`'s estimator separates `k` from every other class. Probabilities
/// are the per-class sigmoids normalized to sum to 1 per row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneVsRestClassifier {
    params: HyperParams,
    max_iter: usize,
    tol: f64,
    estimators: Vec<LogisticRegression>,
}

impl OneVsRestClassifier {
    pub fn new(params: HyperParams) -> Self {
        Self {
            params,
            max_iter: 1000,
            tol: 1e-4,
            estimators: Vec::new(),
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn params(&self) -> HyperParams {
        self.params
    }

    pub fn estimators(&self) -> &[LogisticRegression] {
        &self.estimators
    }

    pub fn is_fitted(&self) -> bool {
        !self.estimators.is_empty()
    }

    /// Fit one estimator per class in `0..n_classes`
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>, n_classes: usize) -> Result<&mut Self> {
        if n_classes < 2 {
            return Err(ObesityError::Training(format!(
                "need at least 2 classes, got {}",
                n_classes
            )));
        }

        let estimators = (0..n_classes)
            .map(|class| {
                let target = y.mapv(|c| if c == class { 1.0 } else { 0.0 });
                let mut model = LogisticRegression::new()
                    .with_c(self.params.c)
                    .with_penalty(self.params.penalty)
                    .with_max_iter(self.max_iter)
                    .with_tol(self.tol);
                model.fit(x, &target)?;
                Ok(model)
            })
            .collect::<Result<Vec<_>>>()?;

        self.estimators = estimators;
        Ok(self)
    }
}

impl Classifier for OneVsRestClassifier {
    fn n_classes(&self) -> usize {
        self.estimators.len()
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if !self.is_fitted() {
            return Err(ObesityError::ModelNotFitted);
        }

        let mut proba = Array2::zeros((x.nrows(), self.estimators.len()));
        for (class, estimator) in self.estimators.iter().enumerate() {
            proba.column_mut(class).assign(&estimator.predict_proba(x)?);
        }

        let n_classes = proba.ncols() as f64;
        for mut row in proba.axis_iter_mut(Axis(0)) {
            let total = row.sum();
            if total > 0.0 && total.is_finite() {
                row /= total;
            } else {
                row.fill(1.0 / n_classes);
            }
        }

        Ok(proba)
    }
}
