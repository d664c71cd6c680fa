//! Static shot-count analysis of hybrid quantum programs.
//!
//! Uploaded programs are scanned for the calls that submit work to a quantum
//! runtime. Each recognized call contributes to a [`ShotTally`]; a shot count
//! that is not an integer literal rejects the whole estimate.
//!
//! # Example
//!
//! ```
//! use qpolicy_analysis::tally_source;
//!
//! let tally = tally_source("device.run(bell, shots=100)\n").unwrap();
//! assert_eq!(tally.quantum_tasks, 1);
//! assert_eq!(tally.quantum_task_shots, 100);
//! ```

pub mod bundle;
pub mod calls;
pub mod error;
pub mod lexer;
pub mod tally;

pub use bundle::{
    BundleTally, ProgramEntry, ProgramTally, discover_programs, tally_bundle, tally_program,
};
pub use calls::{CallPattern, CallSite, ShotArg, find_call_sites};
pub use error::{AnalysisError, AnalysisResult};
pub use tally::{ShotTally, tally_calls, tally_source};
