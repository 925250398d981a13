//! Shared fixtures for integration tests

#![allow(dead_code)]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::{json, Value};
use std::f64::consts::PI;
use std::io::Write;
use std::path::Path;

pub const LABELS: [&str; 7] = [
    "Normal_Weight",
    "Overweight_Level_I",
    "Overweight_Level_II",
    "Obesity_Type_I",
    "Insufficient_Weight",
    "Obesity_Type_II",
    "Obesity_Type_III",
];

const HEADER: &str = "Gender,Age,Height,Weight,family_history_with_overweight,FAVC,FCVC,NCP,\
CAEC,SMOKE,CH2O,SCC,FAF,TUE,CALC,MTRANS,NObeyesdad";

fn pick<'a>(rng: &mut ChaCha8Rng, options: &[&'a str]) -> &'a str {
    options[rng.gen_range(0..options.len())]
}

/// Write a raw-label CSV in the dataset's layout. Classes sit at distinct
/// angles on a Height/Weight circle so each one is separable from the rest;
/// every other attribute is noise.
pub fn write_dataset(path: &Path, rows_per_class: usize, seed: u64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(file, "{}", HEADER).unwrap();

    let yes_no = ["no", "yes"];
    let frequency = ["no", "Sometimes", "Frequently", "Always"];
    let transport = ["Automobile", "Motorbike", "Bike", "Public_Transportation", "Walking"];

    for i in 0..rows_per_class * LABELS.len() {
        let class = i % LABELS.len();
        let angle = 2.0 * PI * class as f64 / LABELS.len() as f64;
        let height = 1.70 + 0.15 * angle.cos() + rng.gen_range(-0.02..0.02);
        let weight = 80.0 + 25.0 * angle.sin() + rng.gen_range(-2.0..2.0);

        writeln!(
            file,
            "{},{:.1},{:.3},{:.2},{},{},{:.2},{:.2},{},{},{:.2},{},{:.2},{:.2},{},{},{}",
            pick(&mut rng, &["Female", "Male"]),
            rng.gen_range(16.0..60.0),
            height,
            weight,
            pick(&mut rng, &yes_no),
            pick(&mut rng, &yes_no),
            rng.gen_range(1.0..3.0),
            rng.gen_range(1.0..4.0),
            pick(&mut rng, &frequency),
            pick(&mut rng, &yes_no),
            rng.gen_range(1.0..3.0),
            pick(&mut rng, &yes_no),
            rng.gen_range(0.0..3.0),
            rng.gen_range(0.0..2.0),
            pick(&mut rng, &frequency),
            pick(&mut rng, &transport),
            LABELS[class],
        )
        .unwrap();
    }
}

/// The sample patient, pre-encoded
pub fn sample_payload() -> Value {
    json!({
        "Gender": 1, "Age": 28, "Height": 172, "Weight": 75,
        "family_history_with_overweight": 1, "FAVC": 0, "FCVC": 2, "NCP": 3,
        "CAEC": 1, "SMOKE": 0, "CH2O": 2, "SCC": 1, "FAF": 1, "TUE": 2,
        "CALC": 0, "MTRANS": 3
    })
}
