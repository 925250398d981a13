//! Obesity classifier CLI module
//!
//! Command-line interface for training, serving and one-off prediction.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::inference::{InferenceService, Prediction};
use crate::preprocessing::PatientRecord;
use crate::server::{ErrorPolicy, DEFAULT_MODEL_PATH};
use crate::training::{TrainEngine, TrainingConfig};

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // banner inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

/// Horizontal banner edge between two corner glyphs
fn banner_edge(left: char, right: char) {
    println!("  {}", dim(&format!("{}{}{}", left, "─".repeat(W + 1), right)));
}

/// One padded banner row; width ignores color escapes
fn banner_row(content: &str) {
    let pad = W.saturating_sub(strip_ansi(content).chars().count());
    println!("  {}  {}{}{}", dim("│"), content, " ".repeat(pad.saturating_sub(1)), dim("│"));
}

/// Drop SGR escape sequences (`ESC [ ... m`)
fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            chars.by_ref().find(|&e| e == 'm');
        } else {
            out.push(c);
        }
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "obesity")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Obesity category classifier: offline trainer and prediction server")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train the classifier and write the model artifact
    Train {
        /// Training CSV with the 16 attributes and the NObeyesdad label
        #[arg(short, long)]
        data: PathBuf,

        /// Output model file (overwritten if it exists)
        #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
        output: PathBuf,
    },

    /// Start the prediction server
    Serve {
        /// Server host [env: API_HOST, default 0.0.0.0]
        #[arg(long)]
        host: Option<String>,

        /// Server port [env: API_PORT, default 9696]
        #[arg(short, long)]
        port: Option<u16>,

        /// Model artifact [env: MODEL_PATH]
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// How request errors are reported [env: ERROR_POLICY]
        #[arg(long, value_enum)]
        error_policy: Option<ErrorPolicy>,
    },

    /// Predict one record with a saved model and print the JSON response
    Predict {
        /// Trained model file
        #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,

        /// JSON file holding one record; the built-in sample patient if omitted
        #[arg(short, long)]
        record: Option<PathBuf>,
    },
}

/// The sample patient used for manual checks of a trained model
pub fn sample_patient() -> PatientRecord {
    PatientRecord::from_array([
        1.0, 28.0, 172.0, 75.0, 1.0, 0.0, 2.0, 3.0, 1.0, 0.0, 2.0, 1.0, 1.0, 2.0, 0.0, 3.0,
    ])
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(data_path: &Path, output: &Path) -> anyhow::Result<()> {
    section("Train");

    let config = TrainingConfig::default();
    let mut engine = TrainEngine::new(config);

    step_run(&format!(
        "Grid search over {} candidates, {}-fold CV",
        engine.config().param_grid.len(),
        engine.config().cv_folds
    ));
    let start = Instant::now();
    let report = engine.fit_csv(data_path)?.clone();
    step_done(&format!("{:?}", start.elapsed()));

    step_run("Writing model");
    engine.save(output)?;
    step_done(&output.display().to_string());

    println!();
    println!("  {:<16} {}", muted("Rows"), format!("{} train / {} test", report.n_train, report.n_test).white());
    println!("  {:<16} {}", muted("Best params"), report.best_params.to_string().cyan());
    println!("  {:<16} {}", muted("CV ROC AUC"), format!("{:.4} ± {:.4}", report.cv_score, report.cv_std).white().bold());
    println!("  {:<16} {}", muted("Test ROC AUC"), format!("{:.4}", report.test_auc).white().bold());
    println!("  {:<16} {}", muted("Test accuracy"), format!("{:.4}", report.test_accuracy).white());
    println!("  {:<16} {}", muted("Time"), format!("{:.3}s", report.training_time_secs).white());
    println!();

    Ok(())
}

pub fn cmd_predict(model_path: &Path, record: Option<&Path>) -> anyhow::Result<()> {
    let service = InferenceService::load(model_path)?;

    let prediction: Prediction = match record {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            let payload: serde_json::Value = serde_json::from_str(&raw)?;
            service.predict_value(&payload)?
        }
        None => service.predict(&sample_patient())?,
    };

    println!("{}", serde_json::to_string_pretty(&prediction)?);
    Ok(())
}

pub async fn cmd_serve(
    host: Option<String>,
    port: Option<u16>,
    model: Option<PathBuf>,
    error_policy: Option<ErrorPolicy>,
) -> anyhow::Result<()> {
    use crate::server::{run_server, ServerConfig};

    let mut config = ServerConfig::default();
    if let Some(host) = host {
        config = config.with_host(host);
    }
    if let Some(port) = port {
        config = config.with_port(port);
    }
    if let Some(model) = model {
        config = config.with_model_path(model);
    }
    if let Some(policy) = error_policy {
        config = config.with_error_policy(policy);
    }

    println!();
    banner_edge('┌', '┐');
    banner_row(&format!(
        "{} {}",
        "Obesity Classifier".white().bold(),
        dim(&format!("v{}", env!("CARGO_PKG_VERSION")))
    ));
    banner_edge('├', '┤');
    banner_row(&kv("Predict", &format!("POST http://{}:{}/predict", config.host, config.port)));
    banner_row(&kv("Model  ", &config.model_path.display().to_string()));
    banner_row(&kv("Errors ", &config.error_policy.to_string()));
    banner_row(&dim("ctrl+c to stop").to_string());
    banner_edge('└', '┘');
    println!();

    run_server(config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_train() {
        let cli = Cli::try_parse_from(["obesity", "train", "--data", "obesity.csv"]).unwrap();
        match cli.command {
            Commands::Train { data, output } => {
                assert_eq!(data, PathBuf::from("obesity.csv"));
                assert_eq!(output, PathBuf::from(DEFAULT_MODEL_PATH));
            }
            _ => panic!("expected train"),
        }
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from([
            "obesity", "serve", "--port", "8000", "--error-policy", "status",
        ])
        .unwrap();
        match cli.command {
            Commands::Serve { port, error_policy, host, model } => {
                assert_eq!(port, Some(8000));
                assert_eq!(error_policy, Some(ErrorPolicy::HttpStatus));
                assert!(host.is_none() && model.is_none());
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi(&format!("{}", "hi".green())), "hi");
    }
}
