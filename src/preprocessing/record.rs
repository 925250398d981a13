//! Typed inference record parsed from a loosely-typed JSON object

use super::encoder::CategoricalEncoder;
use super::schema::{Feature, N_FEATURES};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Why a raw payload could not become a [`PatientRecord`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    /// Required attributes absent from the payload, in canonical order
    #[error("missing features: {}", .0.join(", "))]
    MissingFeatures(Vec<&'static str>),

    /// A value that cannot be coerced to a floating-point number
    #[error("feature '{0}' must be numeric or a known category label")]
    NotNumeric(&'static str),
}

/// One patient's sixteen attributes, all numerically encoded.
///
/// Field order matches the model's feature order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PatientRecord {
    #[serde(rename = "Gender")]
    pub gender: f64,
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "Height")]
    pub height: f64,
    #[serde(rename = "Weight")]
    pub weight: f64,
    pub family_history_with_overweight: f64,
    #[serde(rename = "FAVC")]
    pub favc: f64,
    #[serde(rename = "FCVC")]
    pub fcvc: f64,
    #[serde(rename = "NCP")]
    pub ncp: f64,
    #[serde(rename = "CAEC")]
    pub caec: f64,
    #[serde(rename = "SMOKE")]
    pub smoke: f64,
    #[serde(rename = "CH2O")]
    pub ch2o: f64,
    #[serde(rename = "SCC")]
    pub scc: f64,
    #[serde(rename = "FAF")]
    pub faf: f64,
    #[serde(rename = "TUE")]
    pub tue: f64,
    #[serde(rename = "CALC")]
    pub calc: f64,
    #[serde(rename = "MTRANS")]
    pub mtrans: f64,
}

impl PatientRecord {
    /// Build from a vector already in canonical feature order
    pub fn from_array(v: [f64; N_FEATURES]) -> Self {
        Self {
            gender: v[0],
            age: v[1],
            height: v[2],
            weight: v[3],
            family_history_with_overweight: v[4],
            favc: v[5],
            fcvc: v[6],
            ncp: v[7],
            caec: v[8],
            smoke: v[9],
            ch2o: v[10],
            scc: v[11],
            faf: v[12],
            tue: v[13],
            calc: v[14],
            mtrans: v[15],
        }
    }

    /// Feature vector in canonical model order
    pub fn to_array(&self) -> [f64; N_FEATURES] {
        [
            self.gender,
            self.age,
            self.height,
            self.weight,
            self.family_history_with_overweight,
            self.favc,
            self.fcvc,
            self.ncp,
            self.caec,
            self.smoke,
            self.ch2o,
            self.scc,
            self.faf,
            self.tue,
            self.calc,
            self.mtrans,
        ]
    }

    /// Parse a JSON object keyed by feature name.
    ///
    /// Numbers are taken as-is. Strings are accepted when they parse as a
    /// number or, for categorical attributes, when they are one of the
    /// training-time category labels. Keys outside the schema are ignored.
    /// Missing keys are all reported together before any coercion happens.
    pub fn from_payload(payload: &Map<String, Value>) -> Result<Self, RecordError> {
        let missing: Vec<&'static str> = Feature::ALL
            .iter()
            .map(|f| f.name())
            .filter(|name| !payload.contains_key(*name))
            .collect();
        if !missing.is_empty() {
            return Err(RecordError::MissingFeatures(missing));
        }

        let encoder = CategoricalEncoder::new();
        let mut values = [0.0; N_FEATURES];
        for feature in Feature::ALL {
            let value = &payload[feature.name()];
            values[feature.index()] = coerce(&encoder, feature, value)?;
        }

        Ok(Self::from_array(values))
    }
}

fn coerce(encoder: &CategoricalEncoder, feature: Feature, value: &Value) -> Result<f64, RecordError> {
    let v = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => encoder.encode_value(feature, s),
        _ => None,
    };
    v.filter(|v| v.is_finite())
        .ok_or(RecordError::NotNumeric(feature.name()))
}
