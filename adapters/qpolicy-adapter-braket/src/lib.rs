//! qpolicy adapter for Amazon Braket
//!
//! Metric provider for the time-windowed runtime. Devices are read from
//! Braket device documents; availability is the length of the execution
//! window open at evaluation time.
//!
//! # Priced Devices
//!
//! | Device | Kind | Price rule |
//! |--------|------|------------|
//! | OQC Lucy | QPU | per task + per shot |
//! | IonQ | QPU | per task + per shot |
//! | Rigetti Aspen-M-2 | QPU | per task + per shot |
//! | Rigetti Aspen-M-3 | QPU | per task + per shot |
//! | Amazon SV1 | simulator | per second |
//! | Amazon TN1 | simulator | per second |
//! | Amazon DM1 | simulator | per second |
//!
//! Any other device is charged the flat task fee only.
//!
//! # Example
//!
//! ```ignore
//! use qpolicy_adapter_braket::BraketProvider;
//! use qpolicy_core::MetricNormalizer;
//! use qpolicy_hal::{DeviceFilter, MetricProvider};
//!
//! let provider = BraketProvider::from_json(&documents_json, MetricNormalizer::default())?;
//! let devices = provider.fetch_devices(&DeviceFilter::new(chrono::Utc::now())).await?;
//! ```

pub mod device;
mod error;
mod provider;

pub use device::{DeviceCost, DeviceDocument, DeviceStatus, DeviceType};
pub use error::{BraketError, BraketResult};
pub use provider::BraketProvider;

// Re-export common types
pub use qpolicy_hal::MetricProvider;
