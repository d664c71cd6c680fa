//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - policy-weighted selection of hybrid quantum runtimes",
        style("qpolicy").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qpolicy-hal       Device and metric model, provider trait");
    println!("  qpolicy-analysis  Static shot-count analysis of programs");
    println!("  qpolicy-core      Decision engine");
    println!("  qpolicy-cli       Command-line interface");
    println!();
    println!("Runtimes:");
    println!("  AWS Runtime       qpolicy-adapter-braket");
    println!("  Qiskit Runtime    qpolicy-adapter-ibm");
    println!();
    println!("License:    {}", style("Apache-2.0").dim());
}
