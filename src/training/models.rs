//! Classifier trait and evaluation metrics

use crate::error::{ObesityError, Result};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

/// A fitted multi-class probabilistic classifier
pub trait Classifier: Send + Sync {
    /// Number of output classes
    fn n_classes(&self) -> usize;

    /// Class probabilities, one row per sample and one column per class.
    /// Each row sums to 1.
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>>;

    /// Most probable class per sample
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        Ok(argmax_rows(&self.predict_proba(x)?))
    }
}

/// Index of the largest value; the lowest index wins ties
pub fn argmax(row: ArrayView1<f64>) -> usize {
    let mut best = 0;
    for (i, &v) in row.iter().enumerate() {
        if v > row[best] {
            best = i;
        }
    }
    best
}

/// Row-wise [`argmax`]
pub fn argmax_rows(proba: &Array2<f64>) -> Array1<usize> {
    proba.axis_iter(Axis(0)).map(argmax).collect()
}

/// Area under the ROC curve of a binary problem.
///
/// Computed from the Mann-Whitney statistic with average ranks for tied
/// scores. Fails when either class is absent.
pub fn roc_auc_binary(positive: &[bool], scores: &[f64]) -> Result<f64> {
    if positive.len() != scores.len() {
        return Err(ObesityError::Shape {
            expected: format!("{} scores", positive.len()),
            actual: format!("{} scores", scores.len()),
        });
    }

    let n_pos = positive.iter().filter(|&&p| p).count();
    let n_neg = positive.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(ObesityError::Validation(
            "ROC AUC is undefined when only one class is present".to_string(),
        ));
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut rank_sum = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && scores[order[end]] == scores[order[start]] {
            end += 1;
        }
        // 1-based ranks start+1 ..= end share their mean
        let avg_rank = (start + 1 + end) as f64 / 2.0;
        let tied_pos = order[start..end].iter().filter(|&&i| positive[i]).count();
        rank_sum += avg_rank * tied_pos as f64;
        start = end;
    }

    let n_pos = n_pos as f64;
    let n_neg = n_neg as f64;
    Ok((rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg))
}

/// Macro-averaged one-vs-rest ROC AUC over every probability column
pub fn roc_auc_ovr(y_true: &Array1<usize>, proba: &Array2<f64>) -> Result<f64> {
    if y_true.len() != proba.nrows() {
        return Err(ObesityError::Shape {
            expected: format!("{} rows", y_true.len()),
            actual: format!("{} rows", proba.nrows()),
        });
    }
    let n_classes = proba.ncols();
    if let Some(bad) = y_true.iter().find(|&&c| c >= n_classes) {
        return Err(ObesityError::Validation(format!(
            "label {} outside the {} probability columns",
            bad, n_classes
        )));
    }

    let mut total = 0.0;
    for class in 0..n_classes {
        let positive: Vec<bool> = y_true.iter().map(|&c| c == class).collect();
        let scores: Vec<f64> = proba.column(class).to_vec();
        total += roc_auc_binary(&positive, &scores).map_err(|e| {
            ObesityError::Validation(format!("class {}: {}", class, e))
        })?;
    }

    Ok(total / n_classes as f64)
}

/// Held-out evaluation of a multi-class classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetrics {
    /// Macro one-vs-rest ROC AUC
    pub roc_auc: f64,
    pub accuracy: f64,
    pub n_samples: usize,
}

impl ModelMetrics {
    pub fn compute(y_true: &Array1<usize>, proba: &Array2<f64>) -> Result<Self> {
        let roc_auc = roc_auc_ovr(y_true, proba)?;
        let y_pred = argmax_rows(proba);
        let correct = y_true.iter().zip(y_pred.iter()).filter(|(t, p)| t == p).count();

        Ok(Self {
            roc_auc,
            accuracy: correct as f64 / y_true.len() as f64,
            n_samples: y_true.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_argmax_prefers_lowest_index_on_ties() {
        assert_eq!(argmax(array![0.2, 0.4, 0.4].view()), 1);
        assert_eq!(argmax(array![0.5, 0.5].view()), 0);
        assert_eq!(argmax_rows(&array![[0.1, 0.9], [0.7, 0.3]]), array![1, 0]);
    }

    #[test]
    fn test_binary_auc_perfect_and_inverted() {
        let positive = [false, false, true, true];
        assert_eq!(roc_auc_binary(&positive, &[0.1, 0.2, 0.8, 0.9]).unwrap(), 1.0);
        assert_eq!(roc_auc_binary(&positive, &[0.9, 0.8, 0.2, 0.1]).unwrap(), 0.0);
    }

    #[test]
    fn test_binary_auc_with_ties() {
        // Pairs (pos, neg): 0.35>0.1, 0.35<0.4, 0.8>0.1, 0.8>0.4 => 3/4
        let positive = [false, false, true, true];
        let auc = roc_auc_binary(&positive, &[0.1, 0.4, 0.35, 0.8]).unwrap();
        assert!((auc - 0.75).abs() < 1e-12);

        // Every score tied
        let auc = roc_auc_binary(&positive, &[0.5; 4]).unwrap();
        assert!((auc - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_binary_auc_needs_both_classes() {
        assert!(roc_auc_binary(&[true, true], &[0.1, 0.2]).is_err());
    }

    #[test]
    fn test_ovr_auc() {
        let y = array![0, 1, 2, 0, 1, 2];
        let proba = array![
            [0.8, 0.1, 0.1],
            [0.1, 0.8, 0.1],
            [0.1, 0.1, 0.8],
            [0.6, 0.3, 0.1],
            [0.2, 0.7, 0.1],
            [0.2, 0.2, 0.6],
        ];
        assert_eq!(roc_auc_ovr(&y, &proba).unwrap(), 1.0);

        let metrics = ModelMetrics::compute(&y, &proba).unwrap();
        assert_eq!(metrics.accuracy, 1.0);
        assert_eq!(metrics.n_samples, 6);
    }

    #[test]
    fn test_ovr_auc_missing_class_errors() {
        let y = array![0, 0, 1, 1];
        let proba = Array2::from_elem((4, 3), 1.0 / 3.0);
        assert!(roc_auc_ovr(&y, &proba).is_err());
    }
}
