//! Table-driven categorical encoding of the training table
//!
//! Every categorical column is mapped through the fixed code tables of
//! [`Feature::codes`]; there is nothing to fit. Values that are already
//! numeric pass through unchanged as `f64`.

use super::schema::{Feature, ObesityClass, N_FEATURES};
use crate::error::{ObesityError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;

/// Categorical-to-numeric encoder for the obesity dataset
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoricalEncoder;

impl CategoricalEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encode a single raw string value: a known category label, or a number
    pub fn encode_value(&self, feature: Feature, raw: &str) -> Option<f64> {
        feature
            .encode_label(raw)
            .or_else(|| raw.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
    }

    /// Encode the 16 feature columns into a row-major matrix in canonical order.
    /// Extra columns (including the target) are ignored.
    pub fn encode_features(&self, df: &DataFrame) -> Result<Array2<f64>> {
        let columns: Vec<Vec<f64>> = Feature::ALL
            .iter()
            .map(|&feature| {
                let series = Self::series(df, feature.name())?;
                self.encode_column(series, feature)
            })
            .collect::<Result<Vec<_>>>()?;

        let n_rows = df.height();
        Ok(Array2::from_shape_fn((n_rows, N_FEATURES), |(r, c)| columns[c][r]))
    }

    /// Encode the label column into class indices
    pub fn encode_target(&self, df: &DataFrame, target: &str) -> Result<Array1<usize>> {
        let series = Self::series(df, target)?;

        let classes: Vec<usize> = match series.dtype() {
            DataType::String => series
                .str()?
                .into_iter()
                .enumerate()
                .map(|(row, value)| {
                    let raw = value.ok_or_else(|| Self::missing_value(target, row))?;
                    ObesityClass::from_label(raw)
                        .map(ObesityClass::index)
                        .ok_or_else(|| {
                            ObesityError::TrainingData(format!(
                                "row {}: unknown class label '{}' in column '{}'",
                                row + 1,
                                raw,
                                target
                            ))
                        })
                })
                .collect::<Result<Vec<_>>>()?,
            _ => {
                let as_f64 = series.cast(&DataType::Float64)?;
                as_f64
                    .f64()?
                    .into_iter()
                    .enumerate()
                    .map(|(row, value)| {
                        let v = value.ok_or_else(|| Self::missing_value(target, row))?;
                        if v.fract() == 0.0 && v >= 0.0 {
                            if let Some(class) = ObesityClass::from_index(v as usize) {
                                return Ok(class.index());
                            }
                        }
                        Err(ObesityError::TrainingData(format!(
                            "row {}: class code {} in column '{}' is out of range",
                            row + 1,
                            v,
                            target
                        )))
                    })
                    .collect::<Result<Vec<_>>>()?
            }
        };

        Ok(Array1::from_vec(classes))
    }

    fn encode_column(&self, series: &Series, feature: Feature) -> Result<Vec<f64>> {
        match series.dtype() {
            DataType::String => series
                .str()?
                .into_iter()
                .enumerate()
                .map(|(row, value)| {
                    let raw = value.ok_or_else(|| Self::missing_value(feature.name(), row))?;
                    self.encode_value(feature, raw).ok_or_else(|| {
                        ObesityError::TrainingData(format!(
                            "row {}: value '{}' in column '{}' is neither a known category nor a number",
                            row + 1,
                            raw,
                            feature.name()
                        ))
                    })
                })
                .collect(),
            _ => {
                let as_f64 = series.cast(&DataType::Float64)?;
                as_f64
                    .f64()?
                    .into_iter()
                    .enumerate()
                    .map(|(row, value)| value.ok_or_else(|| Self::missing_value(feature.name(), row)))
                    .collect()
            }
        }
    }

    fn series<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
        let column = df
            .column(name)
            .map_err(|_| ObesityError::TrainingData(format!("missing column '{}'", name)))?;
        Ok(column.as_materialized_series())
    }

    fn missing_value(column: &str, row: usize) -> ObesityError {
        ObesityError::TrainingData(format!("row {}: missing value in column '{}'", row + 1, column))
    }
}
