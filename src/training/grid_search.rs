//! Exhaustive hyperparameter search scored by cross-validated ROC AUC

use super::config::{HyperParams, ParamGrid};
use super::cross_validation::{CVResults, CVSplit, StratifiedKFold};
use super::models::{roc_auc_ovr, Classifier};
use super::pipeline::ObesityPipeline;
use crate::error::{ObesityError, Result};
use ndarray::{Array1, Array2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Cross-validation outcome of one grid point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateResult {
    pub params: HyperParams,
    pub cv: CVResults,
    /// Wall time of all folds in seconds
    pub duration_secs: f64,
}

/// Every evaluated candidate, in grid order, and the winner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSearchResult {
    pub candidates: Vec<CandidateResult>,
    pub best_idx: usize,
}

impl GridSearchResult {
    pub fn best(&self) -> &CandidateResult {
        &self.candidates[self.best_idx]
    }

    pub fn best_params(&self) -> HyperParams {
        self.best().params
    }

    /// Mean cross-validated ROC AUC of the winner
    pub fn best_score(&self) -> f64 {
        self.best().cv.mean_score
    }
}

/// Index of the highest mean score. Earlier candidates win ties and NaN
/// never wins.
fn select_best(candidates: &[CandidateResult]) -> usize {
    let score = |c: &CandidateResult| {
        if c.cv.mean_score.is_nan() {
            f64::NEG_INFINITY
        } else {
            c.cv.mean_score
        }
    };

    let mut best = 0;
    for (i, candidate) in candidates.iter().enumerate() {
        if score(candidate) > score(&candidates[best]) {
            best = i;
        }
    }
    best
}

/// Grid search over [`ParamGrid`] with stratified k-fold cross-validation
#[derive(Debug, Clone)]
pub struct GridSearch {
    grid: ParamGrid,
    cv: StratifiedKFold,
    n_classes: usize,
    max_iter: usize,
    tol: f64,
}

impl GridSearch {
    pub fn new(grid: ParamGrid, cv_folds: usize, n_classes: usize) -> Self {
        Self {
            grid,
            cv: StratifiedKFold::new(cv_folds),
            n_classes,
            max_iter: 1000,
            tol: 1e-4,
        }
    }

    pub fn with_solver(mut self, max_iter: usize, tol: f64) -> Self {
        self.max_iter = max_iter;
        self.tol = tol;
        self
    }

    /// Score every candidate on the same folds. Candidates and folds run in
    /// parallel; each fit is deterministic and results keep grid order.
    pub fn fit(&self, x: &Array2<f64>, y: &Array1<usize>) -> Result<GridSearchResult> {
        let candidates = self.grid.candidates();
        if candidates.is_empty() {
            return Err(ObesityError::InvalidParameter {
                name: "param_grid".to_string(),
                value: "[]".to_string(),
                reason: "needs at least one C and one penalty".to_string(),
            });
        }

        let folds = self.cv.split(y)?;

        let results = candidates
            .par_iter()
            .map(|&params| {
                let start = Instant::now();
                let scores = folds
                    .par_iter()
                    .map(|fold| self.score_fold(params, x, y, fold))
                    .collect::<Result<Vec<_>>>()?;
                let cv = CVResults::from_scores(scores);

                tracing::debug!(
                    c = params.c,
                    penalty = %params.penalty,
                    mean_auc = cv.mean_score,
                    std_auc = cv.std_score,
                    "candidate evaluated"
                );

                Ok(CandidateResult {
                    params,
                    cv,
                    duration_secs: start.elapsed().as_secs_f64(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let best_idx = select_best(&results);
        Ok(GridSearchResult {
            candidates: results,
            best_idx,
        })
    }

    fn score_fold(
        &self,
        params: HyperParams,
        x: &Array2<f64>,
        y: &Array1<usize>,
        fold: &CVSplit,
    ) -> Result<f64> {
        let x_train = x.select(Axis(0), &fold.train_indices);
        let y_train = y.select(Axis(0), &fold.train_indices);
        let x_val = x.select(Axis(0), &fold.test_indices);
        let y_val = y.select(Axis(0), &fold.test_indices);

        let mut pipeline = ObesityPipeline::new(params).with_solver(self.max_iter, self.tol);
        pipeline.fit(&x_train, &y_train, self.n_classes)?;
        let proba = pipeline.predict_proba(&x_val)?;
        roc_auc_ovr(&y_val, &proba)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::config::Penalty;

    fn candidate(c: f64, score: f64) -> CandidateResult {
        CandidateResult {
            params: HyperParams { c, penalty: Penalty::L2 },
            cv: CVResults::from_scores(vec![score]),
            duration_secs: 0.0,
        }
    }

    #[test]
    fn test_select_best_first_wins_ties() {
        let candidates = vec![candidate(0.1, 0.8), candidate(1.0, 0.9), candidate(10.0, 0.9)];
        assert_eq!(select_best(&candidates), 1);
    }

    #[test]
    fn test_select_best_ignores_nan() {
        let candidates = vec![candidate(0.1, f64::NAN), candidate(1.0, 0.6)];
        assert_eq!(select_best(&candidates), 1);
    }
}
