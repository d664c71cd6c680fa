//! Devices command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;
use serde_json::json;

use qpolicy_core::EngineConfig;
use qpolicy_hal::{DeviceFilter, SignalRequest};

use crate::commands::common::{OutputFormat, load_request};

/// List the eligible devices of every runtime with their availability.
pub async fn execute(request_path: &Path, config: &EngineConfig, format: OutputFormat) -> Result<()> {
    let (request, _) = load_request(request_path)?;

    let filter = DeviceFilter::new(request.at()).with_simulators(request.simulators_allowed);
    let signals = SignalRequest {
        availability: true,
        ..SignalRequest::discovery(filter)
    };
    let candidates = request.registry(config).collect_all(&signals).await?;

    if format == OutputFormat::Json {
        let listing: Vec<_> = candidates
            .iter()
            .map(|c| json!({ "runtime": c.runtime, "devices": c.devices }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    println!(
        "{} Eligible devices at {}:\n",
        style("qpolicy").cyan().bold(),
        filter.at.format("%Y-%m-%d %H:%M UTC")
    );
    for runtime in &candidates {
        println!(
            "  {} ({})",
            style(runtime.runtime).bold(),
            runtime.runtime.availability_kind()
        );
        if runtime.is_empty() {
            println!("    {}", style("no eligible devices").dim());
        }
        for device in &runtime.devices {
            let availability = device.metrics.availability.unwrap_or_default();
            println!(
                "    {} {:<24} {:>8.1}{}",
                style("●").green(),
                device.device.name,
                availability,
                if device.device.is_simulator {
                    " (simulator)"
                } else {
                    ""
                }
            );
        }
        println!();
    }

    Ok(())
}
