//! Training configuration

use crate::error::{ObesityError, Result};
use crate::preprocessing::TARGET_COLUMN;
use serde::{Deserialize, Serialize};

/// Regularization penalty of the logistic regression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Penalty {
    /// Lasso penalty, ‖w‖₁
    L1,
    /// Ridge penalty, ½‖w‖²
    L2,
}

impl std::fmt::Display for Penalty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Penalty::L1 => f.write_str("l1"),
            Penalty::L2 => f.write_str("l2"),
        }
    }
}

/// One point of the hyperparameter grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HyperParams {
    /// Inverse regularization strength
    pub c: f64,
    pub penalty: Penalty,
}

impl std::fmt::Display for HyperParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "C={}, penalty={}", self.c, self.penalty)
    }
}

/// Cartesian hyperparameter grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamGrid {
    pub c_values: Vec<f64>,
    pub penalties: Vec<Penalty>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self {
            c_values: vec![0.01, 0.1, 1.0, 10.0],
            penalties: vec![Penalty::L1, Penalty::L2],
        }
    }
}

impl ParamGrid {
    /// Candidates with C as the outer loop and penalty as the inner loop
    pub fn candidates(&self) -> Vec<HyperParams> {
        self.c_values
            .iter()
            .flat_map(|&c| self.penalties.iter().map(move |&penalty| HyperParams { c, penalty }))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.c_values.len() * self.penalties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Configuration for an offline training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Target column name
    pub target_column: String,

    /// Fraction of rows held out for the final evaluation
    pub test_size: f64,

    /// Seed of the stratified train/test split
    pub random_state: u64,

    /// Number of stratified cross-validation folds
    pub cv_folds: usize,

    /// Hyperparameter grid
    pub param_grid: ParamGrid,

    /// Maximum solver iterations per binary problem
    pub max_iter: usize,

    /// Solver stopping tolerance on the largest parameter change
    pub tol: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            target_column: TARGET_COLUMN.to_string(),
            test_size: 0.2,
            random_state: 4,
            cv_folds: 5,
            param_grid: ParamGrid::default(),
            max_iter: 1000,
            tol: 1e-4,
        }
    }
}

impl TrainingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target_column = target.into();
        self
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn with_cv_folds(mut self, folds: usize) -> Self {
        self.cv_folds = folds;
        self
    }

    pub fn with_param_grid(mut self, grid: ParamGrid) -> Self {
        self.param_grid = grid;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Reject settings the trainer cannot honour
    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(ObesityError::InvalidParameter {
                name: "test_size".to_string(),
                value: self.test_size.to_string(),
                reason: "must be in (0, 1)".to_string(),
            });
        }
        if self.cv_folds < 2 {
            return Err(ObesityError::InvalidParameter {
                name: "cv_folds".to_string(),
                value: self.cv_folds.to_string(),
                reason: "must be at least 2".to_string(),
            });
        }
        if self.param_grid.is_empty() {
            return Err(ObesityError::InvalidParameter {
                name: "param_grid".to_string(),
                value: "[]".to_string(),
                reason: "needs at least one C and one penalty".to_string(),
            });
        }
        if let Some(c) = self.param_grid.c_values.iter().find(|c| !(**c > 0.0 && c.is_finite())) {
            return Err(ObesityError::InvalidParameter {
                name: "C".to_string(),
                value: c.to_string(),
                reason: "must be a positive finite number".to_string(),
            });
        }
        if self.max_iter == 0 {
            return Err(ObesityError::InvalidParameter {
                name: "max_iter".to_string(),
                value: "0".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}
