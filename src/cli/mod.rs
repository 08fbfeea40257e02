//! maintenance-ml CLI Module
//!
//! Batch commands: run the pipeline and train a classifier, evaluate a saved
//! model, and inspect a dataset.

use clap::{Parser, Subcommand};
use colored::*;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::export::{load_model, save_model, DEFAULT_ARTIFACT_DIR};
use crate::pipeline::{run_pipeline, PipelineConfig, PipelineOutput};
use crate::training::{evaluate, get_model, train, Classifier, Evaluation};
use crate::utils::load_csv;
use crate::visualization::write_confusion_matrix_html;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
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

/// Indent a multi-line block under the current section
fn block(text: &str) {
    for line in text.lines() {
        println!("  {}", line);
    }
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "maintenance-ml")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Predictive-maintenance failure classification pipeline")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the pipeline, train a model and report test-set metrics
    Train {
        /// Input CSV file
        #[arg(short, long)]
        data: PathBuf,

        /// Model type (logistic, decision_tree, svm)
        #[arg(short, long, default_value = "logistic")]
        model: String,

        /// Pipeline configuration (JSON); defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory for saved artifacts
        #[arg(short, long, default_value = DEFAULT_ARTIFACT_DIR)]
        output_dir: PathBuf,

        /// Save the trained model to <output-dir>/<model>.bin
        #[arg(long)]
        save: bool,

        /// Write the confusion matrix heatmap to this HTML file
        #[arg(long)]
        plot: Option<PathBuf>,
    },

    /// Evaluate a saved model on the test split of a dataset
    Evaluate {
        /// Saved model artifact
        #[arg(short, long)]
        model: PathBuf,

        /// Input CSV file
        #[arg(short, long)]
        data: PathBuf,

        /// Pipeline configuration (JSON); must match the one used for training
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show data information
    Info {
        /// Input CSV file
        #[arg(short, long)]
        data: PathBuf,

        /// Pipeline configuration (JSON), used for the target column
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

// ─── Shared steps ──────────────────────────────────────────────────────────────

fn load_config(path: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    match path {
        Some(path) => Ok(PipelineConfig::from_file(path)?),
        None => Ok(PipelineConfig::default()),
    }
}

fn prepare(data_path: &Path, config: &PipelineConfig) -> anyhow::Result<PipelineOutput> {
    step_run("Loading data");
    let start = Instant::now();
    let df = load_csv(data_path)?;
    step_done(&format!("{} rows × {} cols in {:.2?}", df.height(), df.width(), start.elapsed()));

    step_run("Preprocessing");
    let start = Instant::now();
    let output = run_pipeline(&df, config)?;
    step_done(&format!(
        "{} train / {} test rows, {} features in {:.2?}",
        output.x_train.height(),
        output.x_test.height(),
        output.x_train.width(),
        start.elapsed()
    ));

    Ok(output)
}

fn print_evaluation(evaluation: &Evaluation) {
    section("Classification report");
    block(&evaluation.report.to_string());

    section("Confusion matrix");
    block(&evaluation.confusion_matrix.to_string());

    let positive = evaluation.report.positive();
    println!();
    println!("  {:<16} {}", muted("Accuracy"), format!("{:.4}", evaluation.report.accuracy).white().bold());
    println!("  {:<16} {}", muted("Failure recall"), format!("{:.4}", positive.recall).white());
    println!("  {:<16} {}", muted("Failure F1"), format!("{:.4}", positive.f1_score).white());
    println!();
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(
    data_path: &Path,
    model_name: &str,
    config_path: Option<&Path>,
    output_dir: &Path,
    save: bool,
    plot: Option<&Path>,
) -> anyhow::Result<()> {
    section("Train");

    // Reject unknown names before any data work
    let mut model = get_model(model_name)?;
    let config = load_config(config_path)?;
    let output = prepare(data_path, &config)?;

    let x_train = output.train_matrix()?;
    let x_test = output.test_matrix()?;

    step_run(&format!("Training {}", model_name.cyan()));
    let start = Instant::now();
    train(&mut model, &x_train, &output.y_train)?;
    step_done(&format!("{:.2?}", start.elapsed()));

    let evaluation = evaluate(&model, &x_test, &output.y_test)?;
    print_evaluation(&evaluation);

    if save {
        let path = save_model(&model, model_name, output_dir)?;
        step_ok(&format!("Saved model → {}", path.display()));
    }

    if let Some(plot_path) = plot {
        let title = format!("Confusion Matrix ({})", model_name);
        write_confusion_matrix_html(&evaluation.confusion_matrix, &title, plot_path)?;
        step_ok(&format!("Wrote heatmap → {}", plot_path.display()));
    }

    println!();
    Ok(())
}

pub fn cmd_evaluate(
    model_path: &Path,
    data_path: &Path,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    section("Evaluate");

    step_run(&format!("Loading model {}", model_path.display()));
    let model: Classifier = load_model(model_path)?;
    step_done(model.model_type().as_str());

    let config = load_config(config_path)?;
    let output = prepare(data_path, &config)?;

    let evaluation = evaluate(&model, &output.test_matrix()?, &output.y_test)?;
    print_evaluation(&evaluation);

    Ok(())
}

pub fn cmd_info(data_path: &Path, config_path: Option<&Path>) -> anyhow::Result<()> {
    section("Data Info");

    let config = load_config(config_path)?;
    let df = load_csv(data_path)?;

    println!("  {:<12} {}", muted("File"), data_path.display());
    println!("  {:<12} {}", muted("Rows"), df.height());
    println!("  {:<12} {}", muted("Columns"), df.width());
    println!("  {:<12} {:.2} MB", muted("Memory"), df.estimated_size() as f64 / 1024.0 / 1024.0);
    println!();

    println!("  {:<28} {:<12} {:>6} {:>8}", muted("Column"), muted("Type"), muted("Nulls"), muted("Unique"));
    println!("  {}", dim(&"─".repeat(58)));

    for col in df.get_columns() {
        println!(
            "  {:<28} {:<12} {:>6} {:>8}",
            col.name(),
            format!("{:?}", col.dtype()).truecolor(140, 140, 140),
            col.null_count(),
            col.n_unique().unwrap_or(0)
        );
    }

    if let Ok(target) = df.column(&config.target_col) {
        section(&format!("Target: {}", config.target_col));

        let values = target.as_materialized_series().cast(&DataType::String)?;
        let mut counts: std::collections::BTreeMap<String, usize> = Default::default();
        for value in values.str()?.into_iter() {
            *counts.entry(value.unwrap_or("<null>").to_string()).or_insert(0) += 1;
        }

        let negatives = counts.get(&config.negative_label).copied().unwrap_or(0);
        for (label, count) in &counts {
            println!("  {:<28} {:>8}", label, count);
        }
        println!("  {}", dim(&"─".repeat(38)));
        println!(
            "  {:<28} {:>8}",
            muted("failures (label 1)"),
            (df.height() - negatives).to_string().white().bold()
        );
    }

    println!();
    Ok(())
}
