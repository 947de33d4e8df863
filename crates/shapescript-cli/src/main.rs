//! ShapeScript command-line runner

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use shapescript_lang::{ParameterStore, RunOptions, RunOutcome, Runner, ShapeFactory, ShapeStore};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shapescript")]
#[command(about = "Evaluate a ShapeScript file and report the shapes and parameters it creates", long_about = None)]
struct Cli {
    /// Script file, or `-` for stdin
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Clear the shape store before running
    #[arg(long)]
    clear_shapes: bool,

    /// Clear the parameter store before running
    #[arg(long)]
    clear_parameters: bool,

    /// Print the outcome and store contents as JSON
    #[arg(long)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long, requires = "json")]
    pretty: bool,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let source = read_source(&cli.input)?;
    tracing::debug!(input = %cli.input.display(), bytes = source.len(), "script loaded");
    let mut runner = Runner::default();
    let outcome = runner.run(&source, RunOptions {
        clear_shapes: cli.clear_shapes,
        clear_parameters: cli.clear_parameters,
    });

    if cli.json {
        let report = json!({
            "outcome": outcome,
            "shapes": runner.shapes(),
            "parameters": runner.parameters(),
        });
        let text = if cli.pretty { serde_json::to_string_pretty(&report)? } else { serde_json::to_string(&report)? };
        println!("{text}");
    } else {
        print_summary(&runner, &outcome);
    }

    if !outcome.is_success() {
        tracing::debug!("run failed, exiting with status 1");
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_source(input: &Path) -> Result<String> {
    if input.as_os_str() == "-" {
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source).context("reading script from stdin")?;
        return Ok(source);
    }
    std::fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))
}

fn print_summary<F: ShapeFactory, S: ShapeStore, P: ParameterStore>(runner: &Runner<F, S, P>, outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Success { shapes_created, parameters_created } => {
            println!("ok: {shapes_created} shapes, {parameters_created} parameters");
            for name in runner.parameters().names() {
                if let Some(value) = runner.parameters().get(&name) {
                    println!("  param {name} = {value}");
                }
            }
            for name in runner.shapes().names() {
                if let Some(shape) = runner.shapes().get(&name) {
                    println!("  shape {name} ({})", shape.kind);
                }
            }
        }
        RunOutcome::Failure { error, line: Some(line), column: Some(column) } => {
            eprintln!("error at {line}:{column}: {error}");
        }
        RunOutcome::Failure { error, .. } => {
            eprintln!("error: {error}");
        }
    }
}
