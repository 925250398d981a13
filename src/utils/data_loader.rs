//! CSV loading for the training dataset

use crate::error::{ObesityError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use std::time::Instant;

/// Loads tabular training data with polars
#[derive(Debug, Clone, Default)]
pub struct DataLoader;

impl DataLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a headered, comma-separated file
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        let start = Instant::now();

        let file = File::open(path).map_err(|e| {
            ObesityError::TrainingData(format!("cannot open {}: {}", path.display(), e))
        })?;

        let df = CsvReadOptions::default()
            .with_has_header(true)
            // Scan every row so mixed integer/float columns infer as f64
            .with_infer_schema_length(None)
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| {
                ObesityError::TrainingData(format!("cannot parse {}: {}", path.display(), e))
            })?;

        tracing::debug!(
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "loaded csv"
        );

        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Gender,Age,NObeyesdad").unwrap();
        writeln!(file, "Male,21,Normal_Weight").unwrap();
        writeln!(file, "Female,23.5,Obesity_Type_I").unwrap();
        file.flush().unwrap();

        let df = DataLoader::new().load_csv(file.path()).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 3);
        assert_eq!(df.column("Age").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_missing_file() {
        let err = DataLoader::new().load_csv("/nonexistent/obesity.csv").unwrap_err();
        assert!(matches!(err, ObesityError::TrainingData(_)));
    }
}
