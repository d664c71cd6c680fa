//! Evaluate command implementation.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use tracing::info;

use qpolicy_core::{
    EngineConfig, Evaluator, PolicyError, PolicyResult, ScoredDevice, SelectionResult,
};

use crate::commands::common::{EvaluationRequest, OutputFormat, load_request};

/// Execute the evaluate command.
pub async fn execute(request_path: &Path, config: &EngineConfig, format: OutputFormat) -> Result<()> {
    let (request, base) = load_request(request_path)?;

    let spinner = (format == OutputFormat::Table).then(|| {
        let spinner = ProgressBar::new_spinner();
        if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            spinner.set_style(template);
        }
        spinner.set_message("Gathering device metrics...");
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    });

    let outcome = run(&request, &base, config).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    match (format, outcome) {
        (OutputFormat::Json, Ok(outcome)) => {
            println!("{}", serde_json::to_string_pretty(&json!({ "result": outcome }))?);
            Ok(())
        }
        (OutputFormat::Json, Err(err)) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "failure": err.to_failure() }))?
            );
            Err(err.into())
        }
        (OutputFormat::Table, Ok(outcome)) => {
            print_outcome(&outcome);
            Ok(())
        }
        (OutputFormat::Table, Err(err)) => Err(err.into()),
    }
}

/// Resolve policies, gather candidates and evaluate.
pub async fn run(
    request: &EvaluationRequest,
    base: &Path,
    config: &EngineConfig,
) -> PolicyResult<SelectionResult> {
    let policies = request.policy_set()?;
    let workload = request.program_workload(base)?;

    let filter = policies.device_filter(request.at(), request.simulators_allowed);
    let signals = policies.signal_request(filter, workload);
    info!(
        "Requesting signals: availability {}, cost {}, privacy {}",
        signals.availability,
        signals.workload.is_some(),
        signals.privacy.is_some()
    );

    // Excluded runtimes are never queried.
    let candidates = request
        .registry(config)
        .collect_where(&signals, |runtime| policies.is_eligible(runtime))
        .await
        .map_err(PolicyError::from)?;

    Evaluator::new(config.clone()).evaluate(&policies, &candidates)
}

fn print_outcome(outcome: &SelectionResult) {
    match outcome {
        SelectionResult::Winner(device) => {
            println!("\n{} Selected runtime:\n", style("✓").green().bold());
            print_device(device);
        }
        SelectionResult::Finalists(pair) => {
            println!(
                "\n{} Best device per runtime (no winner declared):\n",
                style("✓").green().bold()
            );
            for device in pair.iter() {
                print_device(device);
                println!();
            }
        }
        SelectionResult::Tie => {
            println!("\n{} {}", style("=").yellow().bold(), style("Tie").yellow());
        }
        SelectionResult::Runtime(runtime) => {
            println!(
                "\n{} Selected runtime: {}",
                style("✓").green().bold(),
                style(runtime).cyan().bold()
            );
        }
    }
}

fn print_device(device: &ScoredDevice) {
    let [cost, availability, retention, third_party] = device.metrics.0;
    println!(
        "  {} {}",
        style(&device.runtime).cyan().bold(),
        style(&device.device.name).bold()
    );
    println!("    Device:       {}", device.device.id.as_str());
    println!("    Score:        {}", style(device.score).yellow());
    println!("    Cost:         {cost:.4}");
    println!("    Availability: {availability:.1}");
    println!("    Privacy:      retention {retention}, third party {third_party}");
}
