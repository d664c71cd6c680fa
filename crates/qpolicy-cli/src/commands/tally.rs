//! Tally command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;

use qpolicy_analysis::{ShotTally, tally_bundle, tally_program};

use crate::commands::common::OutputFormat;

/// Execute the tally command for a single program or a bundle.
pub fn execute(program: Option<&Path>, bundle: Option<&Path>, format: OutputFormat) -> Result<()> {
    match (program, bundle) {
        (Some(path), None) => {
            let tally = tally_program(path)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tally)?),
                OutputFormat::Table => {
                    println!("\n{} {}\n", style("Program").cyan().bold(), path.display());
                    print_tally(&tally);
                }
            }
        }
        (None, Some(root)) => {
            let bundle = tally_bundle(root)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&bundle)?),
                OutputFormat::Table => {
                    println!(
                        "\n{} {} ({} programs)\n",
                        style("Bundle").cyan().bold(),
                        root.display(),
                        bundle.programs.len()
                    );
                    for program in &bundle.programs {
                        println!(
                            "  {} {}",
                            style(&program.task_id).bold(),
                            style(program.path.display()).dim()
                        );
                        print_tally(&program.tally);
                        println!();
                    }
                    println!("  {}", style("Total").bold());
                    print_tally(&bundle.total()?);
                }
            }
        }
        _ => anyhow::bail!("Pass exactly one of --program or --bundle"),
    }
    Ok(())
}

fn print_tally(tally: &ShotTally) {
    println!(
        "    Quantum tasks: {:>4} calls, {:>8} shots",
        tally.quantum_tasks, tally.quantum_task_shots
    );
    println!(
        "    Batches:       {:>4} calls, {:>8} shots",
        tally.batches, tally.batch_shots
    );
    println!(
        "    Executes:      {:>4} calls, {:>8} shots",
        tally.executes, tally.execute_shots
    );
}
