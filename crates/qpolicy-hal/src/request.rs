//! What an evaluation asks of the metric providers.

use chrono::{DateTime, Utc};
use qpolicy_analysis::ShotTally;
use serde::{Deserialize, Serialize};

/// Privacy demands of the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacyRequirements {
    /// Task data may be retained by the provider.
    pub data_retention: bool,
    /// Devices hosted by third parties are acceptable.
    #[serde(rename = "thirdPartyQPU", alias = "thirdPartyQpu")]
    pub third_party_qpu: bool,
}

/// Measured or estimated resource use of a hybrid job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadProfile {
    #[serde(alias = "sumExecutionTimeClassical")]
    pub classical_seconds: f64,
    #[serde(alias = "sumExecutionTimeQuantum")]
    pub quantum_seconds: f64,
    #[serde(alias = "sumNumberOfQuantumShots")]
    pub shots: u64,
    #[serde(alias = "sumNumberOfQuantumTasks", alias = "sumNumberOfQuantumTaks")]
    pub tasks: u64,
}

/// Workload a cost estimate is based on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Workload {
    /// Statically counted submissions of uploaded programs.
    Program(ShotTally),
    /// Resource use reported for a running job.
    Profile(WorkloadProfile),
}

/// Device discovery constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceFilter {
    pub simulators_allowed: bool,
    /// Programs need their own container environment.
    pub custom_environment_required: bool,
    /// Evaluation instant, used for execution window matching.
    pub at: DateTime<Utc>,
}

impl DeviceFilter {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            simulators_allowed: true,
            custom_environment_required: false,
            at,
        }
    }

    pub fn with_simulators(mut self, allowed: bool) -> Self {
        self.simulators_allowed = allowed;
        self
    }

    pub fn with_custom_environment(mut self, required: bool) -> Self {
        self.custom_environment_required = required;
        self
    }
}

/// Which signals to gather. Only signals of active policies are requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalRequest {
    pub filter: DeviceFilter,
    pub availability: bool,
    pub workload: Option<Workload>,
    pub privacy: Option<PrivacyRequirements>,
}

impl SignalRequest {
    /// Request for device discovery only, with no signals.
    pub fn discovery(filter: DeviceFilter) -> Self {
        Self {
            filter,
            availability: false,
            workload: None,
            privacy: None,
        }
    }
}
