//! Penalized binary logistic regression

use super::config::Penalty;
use crate::error::{ObesityError, Result};
use ndarray::{Array1, Array2, Zip};
use serde::{Deserialize, Serialize};

/// Numerically stable logistic function
fn sigmoid(v: f64) -> f64 {
    if v >= 0.0 {
        1.0 / (1.0 + (-v).exp())
    } else {
        let e = v.exp();
        e / (1.0 + e)
    }
}

/// Soft-threshold operator for the L1 proximal step
fn soft_threshold(val: f64, threshold: f64) -> f64 {
    if val > threshold {
        val - threshold
    } else if val < -threshold {
        val + threshold
    } else {
        0.0
    }
}

/// Logistic regression for binary classification.
///
/// Minimizes `mean log-loss + R(w) / (C * n)` where `R` is `‖w‖₁` or `½‖w‖²`
/// with accelerated proximal gradient descent (FISTA). The intercept is not
/// penalized. Training is deterministic: zero initialization, full batches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Fitted coefficients
    pub coefficients: Option<Array1<f64>>,
    /// Fitted intercept
    pub intercept: Option<f64>,
    /// Inverse regularization strength
    pub c: f64,
    /// Regularization penalty
    pub penalty: Penalty,
    /// Maximum iterations
    pub max_iter: usize,
    /// Convergence tolerance on the largest parameter update
    pub tol: f64,
    /// Iterations used by the last fit
    pub n_iter: usize,
    /// Whether model is fitted
    pub is_fitted: bool,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    /// Create a new logistic regression model
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
            c: 1.0,
            penalty: Penalty::L2,
            max_iter: 1000,
            tol: 1e-4,
            n_iter: 0,
            is_fitted: false,
        }
    }

    /// Set inverse regularization strength
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    pub fn with_penalty(mut self, penalty: Penalty) -> Self {
        self.penalty = penalty;
        self
    }

    /// Set maximum iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Fit on labels in {0, 1}
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(ObesityError::Shape {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(ObesityError::Training("no training samples".to_string()));
        }
        if !(self.c > 0.0 && self.c.is_finite()) {
            return Err(ObesityError::InvalidParameter {
                name: "C".to_string(),
                value: self.c.to_string(),
                reason: "must be a positive finite number".to_string(),
            });
        }

        let n = n_samples as f64;
        let lambda = 1.0 / (self.c * n);

        // Lipschitz bound of the loss gradient: trace(XᵀX)/4n plus the intercept column
        let trace = x.iter().map(|v| v * v).sum::<f64>() / n;
        let mut lipschitz = 0.25 * (trace + 1.0);
        if self.penalty == Penalty::L2 {
            lipschitz += lambda;
        }
        let step = 1.0 / lipschitz;

        let mut weights: Array1<f64> = Array1::zeros(n_features);
        let mut bias = 0.0;
        let mut prev_weights = weights.clone();
        let mut prev_bias = bias;
        let mut t = 1.0_f64;
        let mut iterations = self.max_iter;

        for iter in 0..self.max_iter {
            let t_next = (1.0 + (1.0 + 4.0 * t * t).sqrt()) / 2.0;
            let momentum = (t - 1.0) / t_next;

            // Extrapolated point
            let mut v = weights.clone();
            v.scaled_add(momentum, &(&weights - &prev_weights));
            let vb = bias + momentum * (bias - prev_bias);

            let mut errors = x.dot(&v) + vb;
            Zip::from(&mut errors).and(y).for_each(|e, &yi| *e = sigmoid(*e) - yi);

            let mut grad = x.t().dot(&errors) / n;
            if self.penalty == Penalty::L2 {
                grad.scaled_add(lambda, &v);
            }
            let grad_b = errors.sum() / n;

            let mut next = v;
            next.scaled_add(-step, &grad);
            if self.penalty == Penalty::L1 {
                let threshold = step * lambda;
                next.mapv_inplace(|w| soft_threshold(w, threshold));
            }
            let next_b = vb - step * grad_b;

            let delta = next
                .iter()
                .zip(weights.iter())
                .map(|(a, b)| (a - b).abs())
                .fold((next_b - bias).abs(), f64::max);

            prev_weights = std::mem::replace(&mut weights, next);
            prev_bias = bias;
            bias = next_b;
            t = t_next;

            if delta < self.tol {
                iterations = iter + 1;
                break;
            }
        }

        if iterations == self.max_iter {
            tracing::debug!(
                c = self.c,
                penalty = %self.penalty,
                max_iter = self.max_iter,
                "logistic regression reached max_iter before converging"
            );
        }

        self.coefficients = Some(weights);
        self.intercept = Some(bias);
        self.n_iter = iterations;
        self.is_fitted = true;

        Ok(self)
    }

    /// Signed distance to the decision boundary, `Xw + b`
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let coefficients = match (&self.coefficients, self.is_fitted) {
            (Some(c), true) => c,
            _ => return Err(ObesityError::ModelNotFitted),
        };
        if x.ncols() != coefficients.len() {
            return Err(ObesityError::Shape {
                expected: format!("{} features", coefficients.len()),
                actual: format!("{} features", x.ncols()),
            });
        }

        Ok(x.dot(coefficients) + self.intercept.unwrap_or(0.0))
    }

    /// Probability of the positive class
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(self.decision_function(x)?.mapv(sigmoid))
    }
}
