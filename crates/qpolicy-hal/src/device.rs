//! Runtimes, devices and their metric records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two competing hybrid execution runtimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Runtime {
    /// Amazon Braket Hybrid Jobs. Devices accept work in execution windows.
    #[serde(rename = "AWS Runtime", alias = "braket")]
    Braket,
    /// Qiskit Runtime. Devices accept work through a job queue.
    #[serde(rename = "Qiskit Runtime", alias = "qiskit")]
    Qiskit,
}

impl Runtime {
    /// All runtimes in comparison order.
    pub const ALL: [Runtime; 2] = [Runtime::Braket, Runtime::Qiskit];

    /// The tag reported to callers.
    pub fn tag(self) -> &'static str {
        match self {
            Runtime::Braket => "AWS Runtime",
            Runtime::Qiskit => "Qiskit Runtime",
        }
    }

    /// Whether programs may bring their own container environment.
    pub fn supports_custom_environment(self) -> bool {
        matches!(self, Runtime::Braket)
    }

    /// How device availability is expressed by this runtime.
    pub fn availability_kind(self) -> AvailabilityKind {
        match self {
            Runtime::Braket => AvailabilityKind::WindowHours,
            Runtime::Qiskit => AvailabilityKind::QueueLength,
        }
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Meaning of a runtime's availability metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityKind {
    /// Pending jobs ahead of a new submission.
    QueueLength,
    /// Length in hours of the currently open execution window.
    WindowHours,
}

impl fmt::Display for AvailabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvailabilityKind::QueueLength => write!(f, "pending jobs"),
            AvailabilityKind::WindowHours => write!(f, "open window hours"),
        }
    }
}

/// Provider-scoped device identifier (an ARN or a backend name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A device offered by a runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub id: DeviceId,
    /// Display name, e.g. `Lucy` or `ibmq_lima`.
    pub name: String,
    pub is_simulator: bool,
}

impl DeviceInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>, is_simulator: bool) -> Self {
        Self {
            id: DeviceId::new(id),
            name: name.into(),
            is_simulator,
        }
    }
}

/// A binary privacy exposure indicator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Flag {
    #[default]
    Clear,
    Raised,
}

impl Flag {
    /// Numeric metric value, 0 or 1.
    pub fn value(self) -> i64 {
        match self {
            Flag::Clear => 0,
            Flag::Raised => 1,
        }
    }
}

impl From<bool> for Flag {
    fn from(raised: bool) -> Self {
        if raised { Flag::Raised } else { Flag::Clear }
    }
}

impl From<Flag> for u8 {
    fn from(flag: Flag) -> Self {
        flag.value() as u8
    }
}

impl TryFrom<u8> for Flag {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Flag::Clear),
            1 => Ok(Flag::Raised),
            other => Err(format!("flag must be 0 or 1, got {other}")),
        }
    }
}

/// Normalized metrics of one device.
///
/// A `None` slot means the provider did not produce that signal. This is only
/// an error when the policy owning the slot is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceMetrics {
    pub availability: Option<f64>,
    pub cost: Option<f64>,
    pub data_retention: Option<Flag>,
    pub third_party_hosting: Option<Flag>,
}

/// A device together with its metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSignals {
    pub device: DeviceInfo,
    pub metrics: DeviceMetrics,
}

/// All eligible devices of one runtime for one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeCandidates {
    pub runtime: Runtime,
    pub devices: Vec<DeviceSignals>,
}

impl RuntimeCandidates {
    pub fn new(runtime: Runtime, devices: Vec<DeviceSignals>) -> Self {
        Self { runtime, devices }
    }

    /// Candidates of a runtime that offers no eligible device.
    pub fn empty(runtime: Runtime) -> Self {
        Self::new(runtime, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
