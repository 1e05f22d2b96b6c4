//! Command-line parsing.
//!
//! Argument parsing and command dispatch stay separate from the experiment
//! logic; `app` turns these structs into a configuration and a backend.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "checklist-eval",
    version,
    about = "Does an ethics checklist in the prompt reduce bias keywords in model output?"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the baseline vs checklist experiment and print the report (default).
    Run(RunArgs),
    /// Print the checklist criteria, scenarios and bias keywords.
    Checklist(ChecklistArgs),
    /// List the models pulled on the model service.
    Models(ServiceArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ServiceArgs {
    /// Model service URL (defaults to $OLLAMA_HOST, then http://localhost:11434).
    #[arg(long)]
    pub host: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct ChecklistArgs {
    /// TOML file replacing the built-in experiment tables.
    #[arg(short, long, value_name = "TOML")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// TOML file replacing the built-in experiment tables.
    #[arg(short, long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub service: ServiceArgs,

    /// Model to evaluate (repeatable); replaces the configured model list.
    #[arg(short, long = "model", value_name = "NAME")]
    pub models: Vec<String>,

    /// Sampling temperature sent with each request.
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Use the offline simulated backend instead of the model service.
    #[arg(long)]
    pub simulate: bool,

    /// Seed for the simulated backend.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Characters of each response shown in the report (0 hides previews).
    #[arg(long, default_value_t = 120)]
    pub preview: usize,

    /// Export per-pair results to CSV.
    #[arg(long = "export-csv", value_name = "CSV")]
    pub export_csv: Option<PathBuf>,

    /// Export the full run (records, statistics, verdict) to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}
