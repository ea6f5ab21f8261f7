//! Willeval CLI - Command-line interface
//!
//! Usage:
//!   willeval evaluate <gold_dir> <pred_dir> <output_dir> <gold_prefix> <pred_prefix>
//!   willeval score <gold_file> <pred_file>

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use willeval_core::{EvalConfig, LoggingConfig, ScoringMode};
use willeval_scorer::{CorpusEvaluator, DocumentCounts, DocumentStatus, Metrics};

#[derive(Parser)]
#[command(name = "willeval")]
#[command(about = "Score predicted will annotations against a gold standard")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Similarity threshold for accepting a matched pair
    #[arg(long, global = true)]
    threshold: Option<f64>,

    /// Event accounting mode for types with several records
    #[arg(long, global = true, value_parser = parse_mode)]
    mode: Option<ScoringMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a corpus of gold/prediction document pairs
    Evaluate {
        /// Directory holding gold annotation files
        gold_dir: PathBuf,
        /// Directory holding prediction files
        pred_dir: PathBuf,
        /// Directory the report is written to
        output_dir: PathBuf,
        /// File name prefix of gold documents
        gold_prefix: String,
        /// File name prefix of prediction documents
        pred_prefix: String,
        /// Also write evaluation_result.json
        #[arg(long)]
        json: bool,
    },
    /// Score a single gold/prediction pair and print the result as JSON
    Score {
        /// Gold annotation file
        gold_file: PathBuf,
        /// Prediction file
        pred_file: PathBuf,
    },
}

#[derive(Serialize)]
struct PairOutput {
    status: DocumentStatus,
    counts: DocumentCounts,
    entity_metrics: Metrics,
    event_metrics: Metrics,
}

fn parse_mode(value: &str) -> Result<ScoringMode, String> {
    value.parse().map_err(|e: willeval_core::ConfigError| e.to_string())
}

/// Defaults, then the config file, then environment, then flags
fn load_config(cli: &Cli) -> anyhow::Result<EvalConfig> {
    let config = match &cli.config {
        Some(path) => EvalConfig::from_file(path)?,
        None => EvalConfig::default(),
    };
    let mut config = config.with_env_override()?;

    if let Some(threshold) = cli.threshold {
        config.scoring = config.scoring.with_threshold(threshold);
    }
    if let Some(mode) = cli.mode {
        config.scoring = config.scoring.with_mode(mode);
    }

    config.validate()?;
    Ok(config)
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.level.as_str().into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn evaluate(
    evaluator: &CorpusEvaluator,
    gold_dir: PathBuf,
    pred_dir: PathBuf,
    output_dir: &Path,
    gold_prefix: String,
    pred_prefix: String,
    json: bool,
) -> anyhow::Result<()> {
    let layout = willeval_scorer::CorpusLayout::new(gold_dir, pred_dir, gold_prefix, pred_prefix);
    let report = evaluator.evaluate(&layout).context("corpus evaluation failed")?;

    let csv_path = report.write_csv(output_dir)?;
    info!(path = %csv_path.display(), "wrote CSV report");
    if json {
        let json_path = report.write_json(output_dir)?;
        info!(path = %json_path.display(), "wrote JSON report");
    }

    for line in report.summary().lines() {
        info!("{line}");
    }
    Ok(())
}

fn score(evaluator: &CorpusEvaluator, gold_file: &Path, pred_file: &Path) -> anyhow::Result<()> {
    let result = evaluator.evaluate_pair(gold_file, pred_file);
    let output = PairOutput {
        status: result.status,
        counts: result.counts,
        entity_metrics: result.entity_metrics(),
        event_metrics: result.event_metrics(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    init_tracing(&config.logging);
    info!(
        threshold = config.scoring.similarity_threshold,
        mode = %config.scoring.mode,
        "scoring configuration"
    );

    let evaluator = CorpusEvaluator::new(config.scoring);

    match cli.command {
        Commands::Evaluate {
            gold_dir,
            pred_dir,
            output_dir,
            gold_prefix,
            pred_prefix,
            json,
        } => evaluate(
            &evaluator,
            gold_dir,
            pred_dir,
            &output_dir,
            gold_prefix,
            pred_prefix,
            json,
        ),
        Commands::Score { gold_file, pred_file } => score(&evaluator, &gold_file, &pred_file),
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            for cause in e.chain().skip(1) {
                eprintln!("  caused by: {cause}");
            }
            ExitCode::FAILURE
        }
    }
}
