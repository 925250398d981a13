//! Scaler plus classifier, the unit that is trained, persisted and served

use super::config::HyperParams;
use super::models::Classifier;
use super::one_vs_rest::OneVsRestClassifier;
use crate::error::{ObesityError, Result};
use crate::preprocessing::{StandardScaler, N_FEATURES};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Standardization followed by one-vs-rest logistic regression.
///
/// Consumes raw encoded feature rows; scaling is part of the artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObesityPipeline {
    scaler: StandardScaler,
    classifier: OneVsRestClassifier,
}

impl ObesityPipeline {
    pub fn new(params: HyperParams) -> Self {
        Self {
            scaler: StandardScaler::new(),
            classifier: OneVsRestClassifier::new(params),
        }
    }

    pub fn with_solver(mut self, max_iter: usize, tol: f64) -> Self {
        self.classifier = self.classifier.with_max_iter(max_iter).with_tol(tol);
        self
    }

    pub fn params(&self) -> HyperParams {
        self.classifier.params()
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn classifier(&self) -> &OneVsRestClassifier {
        &self.classifier
    }

    /// Fit the scaler, then the classifier on the scaled rows
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>, n_classes: usize) -> Result<&mut Self> {
        if x.ncols() != N_FEATURES {
            return Err(ObesityError::Shape {
                expected: format!("{} features", N_FEATURES),
                actual: format!("{} features", x.ncols()),
            });
        }
        let scaled = self.scaler.fit_transform(x)?;
        self.classifier.fit(&scaled, y, n_classes)?;
        Ok(self)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let pipeline: Self = bincode::deserialize(bytes)?;
        pipeline.check_artifact()?;
        Ok(pipeline)
    }

    /// Write the artifact, replacing any existing file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        bincode::serialize_into(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Read an artifact written by [`ObesityPipeline::save`]. Unreadable,
    /// unfitted or wrongly shaped artifacts are all [`ObesityError::ArtifactLoad`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let load_error = |reason: String| ObesityError::ArtifactLoad {
            path: path.display().to_string(),
            reason,
        };

        let file = File::open(path).map_err(|e| load_error(e.to_string()))?;
        let pipeline: Self =
            bincode::deserialize_from(BufReader::new(file)).map_err(|e| load_error(e.to_string()))?;
        pipeline.check_artifact().map_err(|e| load_error(e.to_string()))?;
        Ok(pipeline)
    }

    /// Fitted, and every learned vector spans exactly the model's features
    fn check_artifact(&self) -> Result<()> {
        if !self.scaler.is_fitted() || !self.classifier.is_fitted() {
            return Err(ObesityError::ModelNotFitted);
        }

        let widths = [
            ("scaler mean", self.scaler.mean().map(|m| m.len())),
            ("scaler scale", self.scaler.scale().map(|s| s.len())),
        ]
        .into_iter()
        .chain(self.classifier.estimators().iter().map(|e| {
            ("estimator coefficients", e.coefficients.as_ref().map(|c| c.len()))
        }));

        for (part, width) in widths {
            if width != Some(N_FEATURES) {
                return Err(ObesityError::Shape {
                    expected: format!("{} {} features", part, N_FEATURES),
                    actual: match width {
                        Some(n) => format!("{} features", n),
                        None => "nothing".to_string(),
                    },
                });
            }
        }
        Ok(())
    }
}

impl Classifier for ObesityPipeline {
    fn n_classes(&self) -> usize {
        self.classifier.n_classes()
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let scaled = self.scaler.transform(x)?;
        self.classifier.predict_proba(&scaled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::config::Penalty;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn synthetic(n_per_class: usize) -> (Array2<f64>, Array1<usize>) {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let n = n_per_class * 3;
        let y: Array1<usize> = (0..n).map(|i| i % 3).collect();
        let x = Array2::from_shape_fn((n, N_FEATURES), |(r, c)| {
            let shift = if c == y[r] { 4.0 } else { 0.0 };
            shift + rng.gen_range(-1.0..1.0)
        });
        (x, y)
    }

    fn fitted() -> ObesityPipeline {
        let (x, y) = synthetic(20);
        let mut pipeline = ObesityPipeline::new(HyperParams { c: 1.0, penalty: Penalty::L2 });
        pipeline.fit(&x, &y, 3).unwrap();
        pipeline
    }

    #[test]
    fn test_fit_and_predict() {
        let (x, y) = synthetic(20);
        let pipeline = fitted();
        let predicted = pipeline.predict(&x).unwrap();
        let correct = predicted.iter().zip(y.iter()).filter(|(p, t)| p == t).count();
        assert!(correct as f64 / y.len() as f64 > 0.9);
    }

    #[test]
    fn test_bytes_round_trip_preserves_predictions() {
        let (x, _) = synthetic(5);
        let pipeline = fitted();
        let restored = ObesityPipeline::from_bytes(&pipeline.to_bytes().unwrap()).unwrap();
        assert_eq!(pipeline.predict_proba(&x).unwrap(), restored.predict_proba(&x).unwrap());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        let pipeline = fitted();
        pipeline.save(&path).unwrap();

        let loaded = ObesityPipeline::load(&path).unwrap();
        assert_eq!(loaded.params(), pipeline.params());
        assert_eq!(loaded.n_classes(), 3);
    }

    #[test]
    fn test_load_failures() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.bin");
        assert!(matches!(
            ObesityPipeline::load(&missing),
            Err(ObesityError::ArtifactLoad { .. })
        ));

        let garbage = dir.path().join("garbage.bin");
        std::fs::write(&garbage, b"not a model").unwrap();
        assert!(matches!(
            ObesityPipeline::load(&garbage),
            Err(ObesityError::ArtifactLoad { .. })
        ));
    }

    #[test]
    fn test_load_rejects_wrong_feature_width() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let y: Array1<usize> = (0..70).map(|i| i % 7).collect();
        let x = Array2::from_shape_fn((70, 3), |(r, c)| {
            y[r] as f64 * (c + 1) as f64 + rng.gen_range(-0.5..0.5)
        });

        let mut narrow = ObesityPipeline::new(HyperParams { c: 1.0, penalty: Penalty::L2 });
        let scaled = narrow.scaler.fit_transform(&x).unwrap();
        narrow.classifier.fit(&scaled, &y, 7).unwrap();
        assert_eq!(narrow.n_classes(), 7);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("narrow.bin");
        narrow.save(&path).unwrap();

        assert!(matches!(
            ObesityPipeline::load(&path),
            Err(ObesityError::ArtifactLoad { ref reason, .. }) if reason.contains("16")
        ));
        assert!(matches!(
            crate::inference::InferenceService::load(&path),
            Err(ObesityError::ArtifactLoad { .. })
        ));
        assert!(matches!(
            ObesityPipeline::from_bytes(&narrow.to_bytes().unwrap()),
            Err(ObesityError::Shape { .. })
        ));
    }

    #[test]
    fn test_wrong_feature_count() {
        let mut pipeline = ObesityPipeline::new(HyperParams { c: 1.0, penalty: Penalty::L2 });
        let x = Array2::zeros((4, 3));
        let y = Array1::from_vec(vec![0, 1, 0, 1]);
        assert!(matches!(pipeline.fit(&x, &y, 2), Err(ObesityError::Shape { .. })));
    }
}
