//! Braket device documents.
//!
//! A document mirrors what the Braket service reports for a device: its
//! status and type, the documentation summary, the execution windows and
//! the unit price. Price rules are keyed by device name.

use qpolicy_core::PriceRule;
use qpolicy_hal::{DeviceInfo, ExecutionWindow};
use serde::{Deserialize, Serialize};

// ──────────────────────────────────────────────────────────────────────
// Known device names
// ──────────────────────────────────────────────────────────────────────

/// Rigetti Aspen-M-2.
pub const ASPEN_M_2: &str = "Aspen-M-2";

/// Rigetti Aspen-M-3.
pub const ASPEN_M_3: &str = "Aspen-M-3";

/// IonQ Harmony.
pub const IONQ: &str = "IonQ";

/// OQC Lucy.
pub const LUCY: &str = "Lucy";

/// SV1 state vector simulator.
pub const SV1: &str = "SV1";

/// TN1 tensor network simulator.
pub const TN1: &str = "TN1";

/// DM1 density matrix simulator.
pub const DM1: &str = "dm1";

/// Device status as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceStatus {
    Online,
    Offline,
    Retired,
}

/// Device type as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceType {
    #[serde(rename = "QPU")]
    Qpu,
    #[serde(rename = "SIMULATOR")]
    Simulator,
}

/// Unit price of a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceCost {
    pub price: f64,
    /// Billing unit, e.g. `shot` or `minute`.
    #[serde(default)]
    pub unit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceDocumentation {
    #[serde(default)]
    pub summary: String,
}

/// A Braket device document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDocument {
    #[serde(alias = "deviceArn")]
    pub arn: String,
    #[serde(alias = "deviceName")]
    pub name: String,
    #[serde(default)]
    pub provider_name: String,
    pub status: DeviceStatus,
    #[serde(rename = "type", alias = "deviceType")]
    pub device_type: DeviceType,
    #[serde(default)]
    pub device_documentation: DeviceDocumentation,
    #[serde(default)]
    pub execution_windows: Vec<ExecutionWindow>,
    #[serde(default)]
    pub device_cost: Option<DeviceCost>,
}

impl DeviceDocument {
    pub fn is_online(&self) -> bool {
        self.status == DeviceStatus::Online
    }

    pub fn is_simulator(&self) -> bool {
        self.device_type == DeviceType::Simulator
    }

    /// Gate-model QPUs and simulators; annealers and analog devices are not.
    pub fn is_gate_model_or_simulator(&self) -> bool {
        let summary = &self.device_documentation.summary;
        summary.contains("gate-model") || summary.contains("simulator")
    }

    /// Price rule of this device. `None` when the device is priced but its
    /// document has no unit price.
    pub fn price_rule(&self) -> Option<PriceRule> {
        let price = self.device_cost.as_ref().map(|c| c.price);
        match self.name.as_str() {
            LUCY | IONQ | ASPEN_M_2 | ASPEN_M_3 => price.map(|price| PriceRule::PerShot { price }),
            SV1 | TN1 | DM1 => price.map(|price| PriceRule::PerSecond { price }),
            _ => Some(PriceRule::Unpriced),
        }
    }

    pub fn to_device_info(&self) -> DeviceInfo {
        DeviceInfo::new(self.arn.clone(), self.name.clone(), self.is_simulator())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qpolicy_hal::ExecutionDay;

    const LUCY_DOCUMENT: &str = r#"{
        "arn": "arn:aws:braket:eu-west-2::device/qpu/oqc/Lucy",
        "name": "Lucy",
        "providerName": "Oxford",
        "status": "ONLINE",
        "type": "QPU",
        "deviceDocumentation": { "summary": "8-qubit superconducting gate-model QPU" },
        "executionWindows": [
            { "executionDay": "Weekdays", "windowStartHour": "05:00:00", "windowEndHour": "23:59:59" }
        ],
        "deviceCost": { "price": 0.00035, "unit": "shot" }
    }"#;

    #[test]
    fn test_parse_document() {
        let doc: DeviceDocument = serde_json::from_str(LUCY_DOCUMENT).unwrap();
        assert!(doc.is_online());
        assert!(!doc.is_simulator());
        assert!(doc.is_gate_model_or_simulator());
        assert_eq!(doc.execution_windows.len(), 1);
        assert_eq!(doc.execution_windows[0].day, ExecutionDay::Weekday);
        assert_eq!(doc.execution_windows[0].start_hour, 5);
        assert_eq!(doc.execution_windows[0].end_hour, 23);
        assert_eq!(doc.price_rule(), Some(PriceRule::PerShot { price: 0.00035 }));
    }

    #[test]
    fn test_simulator_document_defaults() {
        let doc: DeviceDocument = serde_json::from_str(
            r#"{
                "deviceArn": "arn:aws:braket:::device/quantum-simulator/amazon/sv1",
                "deviceName": "SV1",
                "status": "ONLINE",
                "deviceType": "SIMULATOR",
                "deviceCost": { "price": 0.075, "unit": "minute" }
            }"#,
        )
        .unwrap();
        assert!(doc.is_simulator());
        assert!(doc.execution_windows.is_empty());
        assert!(!doc.is_gate_model_or_simulator());
        assert_eq!(doc.price_rule(), Some(PriceRule::PerSecond { price: 0.075 }));
        assert!(doc.to_device_info().is_simulator);
    }

    #[test]
    fn test_price_rules() {
        let mut doc: DeviceDocument = serde_json::from_str(LUCY_DOCUMENT).unwrap();
        doc.name = "Aria 1".into();
        assert_eq!(doc.price_rule(), Some(PriceRule::Unpriced));

        doc.name = ASPEN_M_3.into();
        doc.device_cost = None;
        assert_eq!(doc.price_rule(), None);
    }

    #[test]
    fn test_unknown_status_rejected() {
        let err = serde_json::from_str::<DeviceDocument>(
            &LUCY_DOCUMENT.replace("ONLINE", "MAINTENANCE"),
        );
        assert!(err.is_err());
    }
}
