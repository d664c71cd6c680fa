//! qpolicy adapter for Qiskit Runtime
//!
//! Metric provider for the queue-based runtime. Availability is the number
//! of pending jobs on a backend (lower is better). Cost depends on the
//! service plan: open-plan backends are free, premium backends are billed
//! per second of classical plus quantum execution time.
//!
//! Qiskit Runtime cannot host custom execution environments; when one is
//! required this provider contributes no candidates.

mod backend;
mod error;
mod provider;

pub use backend::{BackendSnapshot, BackendStatus, Plan};
pub use error::{IbmError, IbmResult};
pub use provider::IbmProvider;
