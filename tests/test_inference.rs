//! Integration test: prediction properties against a trained model

mod common;

use obesity_classifier::inference::{InferenceService, PredictError};
use obesity_classifier::preprocessing::{ObesityClass, PatientRecord};
use obesity_classifier::training::{ParamGrid, Penalty, TrainEngine, TrainingConfig};
use serde_json::json;
use std::sync::Arc;

fn trained_service() -> InferenceService {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("obesity.csv");
    common::write_dataset(&data, 15, 42);

    let grid = ParamGrid {
        c_values: vec![1.0],
        penalties: vec![Penalty::L1, Penalty::L2],
    };
    let config = TrainingConfig::default()
        .with_param_grid(grid)
        .with_cv_folds(3)
        .with_max_iter(300);
    let mut engine = TrainEngine::new(config);
    engine.fit_csv(&data).unwrap();

    InferenceService::from_model(Arc::new(engine.pipeline().unwrap().clone()))
}

fn records() -> Vec<serde_json::Value> {
    let mut out = vec![common::sample_payload()];
    for (height, weight) in [(1.55, 45.0), (1.70, 80.0), (1.80, 130.0), (1.62, 95.5)] {
        let mut payload = common::sample_payload();
        payload["Height"] = json!(height);
        payload["Weight"] = json!(weight);
        out.push(payload);
    }
    out
}

#[test]
fn test_prediction_properties() {
    let service = trained_service();

    for payload in records() {
        let prediction = service.predict_value(&payload).unwrap();
        let p = &prediction.probabilities;

        assert_eq!(p.len(), 7);
        assert!(p.iter().all(|v| *v >= 0.0));
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-6);

        // Predicted class is the arg-max, lowest index on ties
        let max = p.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let first_max = p.iter().position(|v| *v == max).unwrap();
        assert_eq!(prediction.predicted_class, first_max);
        assert_eq!(
            prediction.predicted_label,
            ObesityClass::from_index(first_max).unwrap().label()
        );

        // Top three sorted descending and drawn from the probability vector
        assert_eq!(prediction.top3.len(), 3);
        assert!(prediction.top3.windows(2).all(|w| w[0].probability >= w[1].probability));
        for ranked in &prediction.top3 {
            let class = ObesityClass::from_label(&ranked.label).unwrap();
            assert_eq!(p[class.index()], ranked.probability);
        }
        assert_eq!(prediction.top3[0].label, prediction.predicted_label);
    }
}

#[test]
fn test_prediction_is_idempotent() {
    let service = trained_service();
    let payload = common::sample_payload();

    let first = service.predict_value(&payload).unwrap();
    let second = service.predict_value(&payload).unwrap();
    assert_eq!(first, second);

    let bits = |v: &[f64]| v.iter().map(|p| p.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&first.probabilities), bits(&second.probabilities));
}

#[test]
fn test_typed_and_untyped_paths_agree() {
    let service = trained_service();
    let payload = common::sample_payload();
    let record = PatientRecord::from_payload(payload.as_object().unwrap()).unwrap();

    assert_eq!(
        service.predict(&record).unwrap(),
        service.predict_value(&payload).unwrap()
    );
}

#[test]
fn test_missing_features_never_panic() {
    let service = trained_service();

    for key in common::sample_payload().as_object().unwrap().keys() {
        let mut payload = common::sample_payload();
        payload.as_object_mut().unwrap().remove(key);

        match service.predict_value(&payload) {
            Err(PredictError::MissingFeatures(names)) => assert_eq!(names, vec![key.as_str()]),
            other => panic!("expected missing feature {}, got {:?}", key, other),
        }
    }
    assert_eq!(service.stats().error_count, 16);
}
