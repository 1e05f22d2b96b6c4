//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - loads the experiment configuration
//! - picks the backend (model service or simulator)
//! - runs the experiment pipeline
//! - prints the report and writes optional exports

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{ChecklistArgs, Cli, Command, RunArgs, ServiceArgs};
use crate::client::{OllamaClient, SimulatedGenerator, TextGenerator};
use crate::config::ExperimentConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `checklist-eval` binary.
pub fn run() -> Result<(), AppError> {
    let argv = rewrite_args(std::env::args().collect());
    let cli = Cli::parse_from(argv);
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Checklist(args) => handle_checklist(args),
        Command::Models(args) => handle_models(args),
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let explicit = match (quiet, verbose) {
        (true, _) => Some("error"),
        (false, 0) => None,
        (false, 1) => Some("info"),
        (false, 2) => Some("debug"),
        (false, _) => Some("trace"),
    };
    let filter = match explicit {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    // Report text goes to stdout; logs stay on stderr.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Apply CLI overrides on top of the loaded tables.
pub fn experiment_config_from_args(args: &RunArgs) -> Result<ExperimentConfig, AppError> {
    let mut config = ExperimentConfig::load(args.config.as_deref())?;
    if !args.models.is_empty() {
        config.models = args.models.clone();
    }
    if args.temperature.is_some() {
        config.temperature = args.temperature;
    }
    config.validate()?;
    Ok(config)
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = experiment_config_from_args(&args)?;

    let (mut generator, backend_label): (Box<dyn TextGenerator>, String) = if args.simulate {
        let generator = SimulatedGenerator::new(args.seed, &config.models, &config.all_keywords());
        (Box::new(generator), format!("simulated (seed {})", args.seed))
    } else {
        let client = OllamaClient::from_env(args.service.host.as_deref(), config.temperature)?;
        let label = format!("ollama at {}", client.host());
        (Box::new(client), label)
    };

    println!("{}", crate::report::format_header(&config, &backend_label));

    let run = pipeline::run_experiment(generator.as_mut(), &config, args.preview)?;

    println!("{}", crate::report::format_run(&run));

    // Optional exports.
    if let Some(path) = &args.export_csv {
        crate::io::export::write_results_csv(path, &run.records)?;
        tracing::info!(path = %path.display(), "wrote CSV export");
    }
    if let Some(path) = &args.export_json {
        crate::io::export::write_run_json(path, &run)?;
        tracing::info!(path = %path.display(), "wrote JSON export");
    }

    Ok(())
}

fn handle_checklist(args: ChecklistArgs) -> Result<(), AppError> {
    let config = ExperimentConfig::load(args.config.as_deref())?;
    println!("{}", crate::report::format_checklist(&config));
    Ok(())
}

fn handle_models(args: ServiceArgs) -> Result<(), AppError> {
    let client = OllamaClient::from_env(args.host.as_deref(), None)?;
    let models = client.available_models()?;
    if models.is_empty() {
        println!("No models pulled on {}.", client.host());
    }
    for model in models {
        println!("{model}");
    }
    Ok(())
}

/// Rewrite argv so `checklist-eval` defaults to `checklist-eval run`.
///
/// Rules:
/// - `checklist-eval`                   -> `checklist-eval run`
/// - `checklist-eval --simulate ...`    -> `checklist-eval run --simulate ...`
/// - `checklist-eval -m models`         -> `checklist-eval run -m models`
/// - `checklist-eval --help/--version`  -> unchanged (top-level help/version)
///
/// Only the global `-v`/`-q` flags may precede a subcommand, so the first
/// token that is not one of them decides.
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let first = argv.iter().skip(1).find(|a| !is_global_flag(a)).cloned();
    let keep = match first.as_deref() {
        None => false,
        Some(a) => matches!(
            a,
            "-h" | "--help" | "-V" | "--version" | "help" | "run" | "checklist" | "models"
        ),
    };
    if !keep {
        argv.insert(1.min(argv.len()), "run".to_string());
    }
    argv
}

fn is_global_flag(arg: &str) -> bool {
    match arg {
        "--verbose" | "--quiet" => true,
        _ => {
            arg.len() > 1
                && arg.starts_with('-')
                && !arg.starts_with("--")
                && arg[1..].chars().all(|c| c == 'v' || c == 'q')
        }
    }
}
