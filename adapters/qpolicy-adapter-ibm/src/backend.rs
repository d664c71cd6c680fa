//! Backend snapshots.

use qpolicy_hal::DeviceInfo;
use serde::{Deserialize, Serialize};

/// Service plan a backend is reached through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    /// Free access.
    #[default]
    Open,
    /// Billed per second of execution.
    Premium,
}

/// Backend status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendStatus {
    /// Whether the backend is operational.
    pub operational: bool,
    /// Status message.
    #[serde(default)]
    pub status_msg: Option<String>,
    /// Number of pending jobs.
    #[serde(default)]
    pub pending_jobs: u32,
}

/// Snapshot of one Qiskit Runtime backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSnapshot {
    /// Backend name.
    pub name: String,
    /// Whether this is a simulator.
    #[serde(default)]
    pub simulator: bool,
    pub status: BackendStatus,
    #[serde(default)]
    pub plan: Plan,
}

impl BackendSnapshot {
    pub fn is_premium(&self) -> bool {
        self.plan == Plan::Premium
    }

    /// Backend names double as device ids.
    pub fn to_device_info(&self) -> DeviceInfo {
        DeviceInfo::new(self.name.clone(), self.name.clone(), self.simulator)
    }
}
