//! Stratified hold-out split and stratified k-fold cross-validation

use crate::error::{ObesityError, Result};
use ndarray::Array1;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Row indices grouped by class, classes in ascending order
fn class_indices(y: &Array1<usize>) -> BTreeMap<usize, Vec<usize>> {
    let mut by_class: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (idx, &class) in y.iter().enumerate() {
        by_class.entry(class).or_default().push(idx);
    }
    by_class
}

/// Train and hold-out row indices
#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Split rows into train and test partitions preserving class proportions.
///
/// The test partition has `ceil(n * test_size)` rows. Each class gets the
/// floor of its proportional share; leftover rows go to the classes with the
/// largest fractional remainders (lower class index first on ties). The same
/// `seed` always yields the same partition.
pub fn stratified_train_test_split(
    y: &Array1<usize>,
    test_size: f64,
    seed: u64,
) -> Result<TrainTestSplit> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(ObesityError::InvalidParameter {
            name: "test_size".to_string(),
            value: test_size.to_string(),
            reason: "must be in (0, 1)".to_string(),
        });
    }

    let n_samples = y.len();
    let by_class = class_indices(y);

    if let Some((class, rows)) = by_class.iter().find(|(_, rows)| rows.len() < 2) {
        return Err(ObesityError::TrainingData(format!(
            "class {} has {} row(s); a stratified split needs at least 2 per class",
            class,
            rows.len()
        )));
    }

    let n_classes = by_class.len();
    let n_test = (n_samples as f64 * test_size).ceil() as usize;
    let n_train = n_samples - n_test;
    if n_test < n_classes || n_train < n_classes {
        return Err(ObesityError::TrainingData(format!(
            "{} rows cannot be split into train ({}) and test ({}) partitions covering all {} classes",
            n_samples, n_train, n_test, n_classes
        )));
    }

    // Largest-remainder allocation of the test rows across classes
    let exact: Vec<f64> = by_class
        .values()
        .map(|rows| n_test as f64 * rows.len() as f64 / n_samples as f64)
        .collect();
    let mut allocation: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();
    let assigned: usize = allocation.iter().sum();

    let mut order: Vec<usize> = (0..n_classes).collect();
    order.sort_by(|&a, &b| {
        let fa = exact[a] - exact[a].floor();
        let fb = exact[b] - exact[b].floor();
        fb.total_cmp(&fa).then(a.cmp(&b))
    });
    for &slot in order.iter().take(n_test.saturating_sub(assigned)) {
        allocation[slot] += 1;
    }

    for ((class, rows), &take) in by_class.iter().zip(allocation.iter()) {
        if take == 0 || take == rows.len() {
            return Err(ObesityError::TrainingData(format!(
                "class {} ({} rows) gets {} test rows at test size {}; both partitions need at least one",
                class,
                rows.len(),
                take,
                test_size
            )));
        }
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train_indices = Vec::with_capacity(n_train);
    let mut test_indices = Vec::with_capacity(n_test);

    for (rows, &take) in by_class.values().zip(allocation.iter()) {
        let mut rows = rows.clone();
        rows.shuffle(&mut rng);
        test_indices.extend_from_slice(&rows[..take]);
        train_indices.extend_from_slice(&rows[take..]);
    }

    train_indices.shuffle(&mut rng);
    test_indices.shuffle(&mut rng);

    Ok(TrainTestSplit {
        train_indices,
        test_indices,
    })
}

/// A single train/validation fold
#[derive(Debug, Clone)]
pub struct CVSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub fold_idx: usize,
}

/// Stratified k-fold splitter without shuffling.
///
/// Rows of each class are dealt round-robin across the folds, continuing
/// where the previous class stopped so that fold sizes stay balanced.
#[derive(Debug, Clone, Copy)]
pub struct StratifiedKFold {
    n_splits: usize,
}

impl StratifiedKFold {
    pub fn new(n_splits: usize) -> Self {
        Self { n_splits }
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Generate the folds. Every class must have at least `n_splits` rows so
    /// that each validation fold contains every class.
    pub fn split(&self, y: &Array1<usize>) -> Result<Vec<CVSplit>> {
        let n_splits = self.n_splits;
        if n_splits < 2 {
            return Err(ObesityError::InvalidParameter {
                name: "cv_folds".to_string(),
                value: n_splits.to_string(),
                reason: "must be at least 2".to_string(),
            });
        }

        let by_class = class_indices(y);
        if let Some((class, rows)) = by_class.iter().find(|(_, rows)| rows.len() < n_splits) {
            return Err(ObesityError::TrainingData(format!(
                "class {} has {} training row(s), fewer than the {} cross-validation folds",
                class,
                rows.len(),
                n_splits
            )));
        }

        let mut folds: Vec<Vec<usize>> = vec![Vec::new(); n_splits];
        let mut offset = 0;
        for rows in by_class.values() {
            for (i, &idx) in rows.iter().enumerate() {
                folds[(offset + i) % n_splits].push(idx);
            }
            offset += rows.len();
        }

        let splits = (0..n_splits)
            .map(|fold_idx| {
                let train_indices: Vec<usize> = folds
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != fold_idx)
                    .flat_map(|(_, f)| f.iter().copied())
                    .collect();

                CVSplit {
                    train_indices,
                    test_indices: folds[fold_idx].clone(),
                    fold_idx,
                }
            })
            .collect();

        Ok(splits)
    }
}

/// Cross-validation results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CVResults {
    /// Scores for each fold
    pub scores: Vec<f64>,
    /// Mean score across folds
    pub mean_score: f64,
    /// Standard deviation of scores
    pub std_score: f64,
    /// Number of folds
    pub n_folds: usize,
}

impl CVResults {
    /// Create CV results from fold scores
    pub fn from_scores(scores: Vec<f64>) -> Self {
        let n_folds = scores.len();
        let mean_score = scores.iter().sum::<f64>() / n_folds as f64;
        let variance = scores.iter().map(|s| (s - mean_score).powi(2)).sum::<f64>() / n_folds as f64;
        let std_score = variance.sqrt();

        Self {
            scores,
            mean_score,
            std_score,
            n_folds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(counts: &[usize]) -> Array1<usize> {
        counts
            .iter()
            .enumerate()
            .flat_map(|(class, &n)| std::iter::repeat(class).take(n))
            .collect()
    }

    fn count(y: &Array1<usize>, rows: &[usize], class: usize) -> usize {
        rows.iter().filter(|&&r| y[r] == class).count()
    }

    #[test]
    fn test_split_size_and_proportions() {
        let y = labels(&[50, 30, 20]);
        let split = stratified_train_test_split(&y, 0.2, 4).unwrap();

        assert_eq!(split.test_indices.len(), 20);
        assert_eq!(split.train_indices.len(), 80);
        assert_eq!(count(&y, &split.test_indices, 0), 10);
        assert_eq!(count(&y, &split.test_indices, 1), 6);
        assert_eq!(count(&y, &split.test_indices, 2), 4);
    }

    #[test]
    fn test_split_rounds_up_and_distributes_remainder() {
        // ceil(23 * 0.2) = 5; exact shares 2.17, 1.74, 1.09
        let y = labels(&[10, 8, 5]);
        let split = stratified_train_test_split(&y, 0.2, 0).unwrap();

        assert_eq!(split.test_indices.len(), 5);
        assert_eq!(count(&y, &split.test_indices, 0), 2);
        assert_eq!(count(&y, &split.test_indices, 1), 2);
        assert_eq!(count(&y, &split.test_indices, 2), 1);
    }

    #[test]
    fn test_split_is_a_partition() {
        let y = labels(&[13, 7, 9]);
        let split = stratified_train_test_split(&y, 0.2, 11).unwrap();

        let mut all: Vec<usize> = split
            .train_indices
            .iter()
            .chain(split.test_indices.iter())
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..y.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_is_reproducible() {
        let y = labels(&[20, 20, 20]);
        let a = stratified_train_test_split(&y, 0.2, 4).unwrap();
        let b = stratified_train_test_split(&y, 0.2, 4).unwrap();
        let c = stratified_train_test_split(&y, 0.2, 5).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_split_rejects_class_with_no_training_rows() {
        // ceil(22 * 0.9) = 20; class 0 would send both of its rows to test
        let y = labels(&[2, 20]);
        let err = stratified_train_test_split(&y, 0.9, 4).unwrap_err();
        assert!(matches!(err, ObesityError::TrainingData(ref msg) if msg.contains("class 0")));
    }

    #[test]
    fn test_split_rejects_singleton_class() {
        let y = labels(&[10, 1]);
        assert!(matches!(
            stratified_train_test_split(&y, 0.2, 4),
            Err(ObesityError::TrainingData(_))
        ));
    }

    #[test]
    fn test_stratified_k_fold() {
        let y = labels(&[5, 5]);
        let splits = StratifiedKFold::new(5).split(&y).unwrap();

        assert_eq!(splits.len(), 5);
        for split in &splits {
            assert_eq!(split.test_indices.len(), 2);
            assert_eq!(count(&y, &split.test_indices, 0), 1);
            assert_eq!(count(&y, &split.test_indices, 1), 1);
            assert_eq!(split.train_indices.len(), 8);
        }
    }

    #[test]
    fn test_folds_cover_every_row_once() {
        let y = labels(&[7, 6, 9]);
        let splits = StratifiedKFold::new(3).split(&y).unwrap();

        let mut all_test: Vec<usize> = splits.iter().flat_map(|s| s.test_indices.clone()).collect();
        all_test.sort_unstable();
        assert_eq!(all_test, (0..y.len()).collect::<Vec<_>>());

        let sizes: Vec<usize> = splits.iter().map(|s| s.test_indices.len()).collect();
        assert!(sizes.iter().max().unwrap() - sizes.iter().min().unwrap() <= 1);
    }

    #[test]
    fn test_k_fold_needs_enough_rows_per_class() {
        let y = labels(&[10, 3]);
        assert!(matches!(
            StratifiedKFold::new(5).split(&y),
            Err(ObesityError::TrainingData(_))
        ));
        assert!(StratifiedKFold::new(1).split(&y).is_err());
    }

    #[test]
    fn test_cv_results() {
        let results = CVResults::from_scores(vec![0.8, 0.9, 1.0]);
        assert_eq!(results.n_folds, 3);
        assert!((results.mean_score - 0.9).abs() < 1e-12);
        assert!(results.std_score > 0.0);
    }
}
