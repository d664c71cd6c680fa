//! qpolicy provider abstraction layer
//!
//! Shared vocabulary between the decision engine and the runtime adapters:
//! runtimes, devices, their metric records, and the [`MetricProvider`] trait
//! every adapter implements.
//!
//! # Supported Runtimes
//!
//! | Runtime | Crate | Availability metric |
//! |---------|-------|---------------------|
//! | Amazon Braket Hybrid Jobs | `qpolicy-adapter-braket` | open window hours |
//! | Qiskit Runtime | `qpolicy-adapter-ibm` | pending jobs |
//!
//! # Example: Gathering Candidates
//!
//! ```ignore
//! use qpolicy_hal::{DeviceFilter, ProviderRegistry, SignalRequest};
//!
//! let mut registry = ProviderRegistry::new();
//! registry.register(braket_provider);
//! registry.register(ibm_provider);
//!
//! let request = SignalRequest {
//!     filter: DeviceFilter::new(chrono::Utc::now()),
//!     availability: true,
//!     workload: None,
//!     privacy: None,
//! };
//! let candidates = registry.collect_all(&request).await?;
//! ```

pub mod device;
pub mod error;
pub mod provider;
pub mod registry;
pub mod request;
pub mod window;

pub use device::{
    AvailabilityKind, DeviceId, DeviceInfo, DeviceMetrics, DeviceSignals, Flag, Runtime,
    RuntimeCandidates,
};
pub use error::{HalError, HalResult};
pub use provider::MetricProvider;
pub use registry::ProviderRegistry;
pub use request::{DeviceFilter, PrivacyRequirements, SignalRequest, Workload, WorkloadProfile};
pub use window::{ExecutionDay, ExecutionWindow};
