//! qpolicy Command-Line Interface
//!
//! Evaluates weighted policies (money, availability, privacy, custom
//! environment) against device snapshots of two hybrid quantum runtimes and
//! reports the runtime and device that fit best.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

use qpolicy_core::LoggingConfig;

mod commands;

use commands::common::{OutputFormat, load_config};
use commands::{devices, evaluate, tally, version};

/// qpolicy - policy-weighted selection of hybrid quantum runtimes
#[derive(Parser)]
#[command(name = "qpolicy")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Engine configuration file (YAML)
    #[arg(short, long, global = true, env = "QPOLICY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the policies of a request and select a runtime
    Evaluate {
        /// Request file (JSON)
        #[arg(short, long)]
        request: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Count quantum task submissions and shots in programs
    #[command(group(ArgGroup::new("source").required(true).args(["program", "bundle"])))]
    Tally {
        /// A single program file
        #[arg(short, long)]
        program: Option<PathBuf>,

        /// An extracted bundle with one directory per task
        #[arg(short, long)]
        bundle: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// List the eligible devices of every runtime
    Devices {
        /// Request file (JSON)
        #[arg(short, long)]
        request: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show version information
    Version,
}

fn init_logging(verbose: u8, logging: &LoggingConfig) {
    let level = match verbose {
        0 => logging.level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("QPOLICY_LOG").unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    init_logging(cli.verbose, &config.logging);

    // Execute command
    let result = match cli.command {
        Commands::Evaluate { request, format } => {
            evaluate::execute(&request, &config, format).await
        }

        Commands::Tally {
            program,
            bundle,
            format,
        } => tally::execute(program.as_deref(), bundle.as_deref(), format),

        Commands::Devices { request, format } => {
            devices::execute(&request, &config, format).await
        }

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
