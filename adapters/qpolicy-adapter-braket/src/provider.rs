//! Time-windowed metric provider over Braket device documents.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use qpolicy_core::{MetricNormalizer, PrivacyPolarity};
use qpolicy_hal::{
    DeviceFilter, DeviceInfo, Flag, HalResult, MetricProvider, PrivacyRequirements, Runtime,
    Workload,
};

use crate::device::DeviceDocument;
use crate::error::{BraketError, BraketResult};

/// Braket flags exposure when the caller asks for the property.
const POLARITY: PrivacyPolarity = PrivacyPolarity::FlagWhenRequired;

/// Metric provider for the Braket Hybrid Jobs runtime.
///
/// Works on a snapshot of device documents; discovery applies the status,
/// device-class, simulator and execution-window filters.
#[derive(Debug, Clone)]
pub struct BraketProvider {
    documents: Vec<DeviceDocument>,
    normalizer: MetricNormalizer,
}

impl BraketProvider {
    pub fn new(documents: Vec<DeviceDocument>, normalizer: MetricNormalizer) -> Self {
        Self {
            documents,
            normalizer,
        }
    }

    /// Parse a JSON array of device documents.
    pub fn from_json(json: &str, normalizer: MetricNormalizer) -> BraketResult<Self> {
        let documents = serde_json::from_str(json)?;
        Ok(Self::new(documents, normalizer))
    }

    pub fn documents(&self) -> &[DeviceDocument] {
        &self.documents
    }

    /// Documents that pass discovery under `filter`, in snapshot order.
    pub fn eligible(&self, filter: &DeviceFilter) -> Vec<&DeviceDocument> {
        self.documents
            .iter()
            .filter(|doc| doc.is_online() && doc.is_gate_model_or_simulator())
            .filter(|doc| filter.simulators_allowed || !doc.is_simulator())
            .filter(|doc| {
                let open = doc.is_simulator()
                    || self
                        .normalizer
                        .has_open_window(&doc.execution_windows, filter.at);
                if !open {
                    debug!("{} has no open execution window at {}", doc.name, filter.at);
                }
                open
            })
            .collect()
    }

    fn document(&self, device: &DeviceInfo) -> BraketResult<&DeviceDocument> {
        self.documents
            .iter()
            .find(|doc| doc.arn == device.id.as_str())
            .ok_or_else(|| BraketError::UnknownDevice(device.id.as_str().to_string()))
    }
}

#[async_trait]
impl MetricProvider for BraketProvider {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "braket"
    }

    fn runtime(&self) -> Runtime {
        Runtime::Braket
    }

    async fn fetch_devices(&self, filter: &DeviceFilter) -> HalResult<Vec<DeviceInfo>> {
        Ok(self
            .eligible(filter)
            .into_iter()
            .map(DeviceDocument::to_device_info)
            .collect())
    }

    async fn fetch_availability(&self, device: &DeviceInfo, at: DateTime<Utc>) -> HalResult<f64> {
        let doc = self.document(device)?;
        Ok(self
            .normalizer
            .window_availability(&doc.name, &doc.execution_windows, at))
    }

    async fn fetch_cost(&self, device: &DeviceInfo, workload: &Workload) -> HalResult<f64> {
        let doc = self.document(device)?;
        let rule = doc.price_rule().ok_or_else(|| {
            warn!("{} is priced but reports no unit price", doc.name);
            BraketError::MissingPrice(doc.name.clone())
        })?;

        let cost = match workload {
            Workload::Program(tally) => self.normalizer.program_cost(tally, rule),
            Workload::Profile(profile) => self.normalizer.profile_cost(profile, rule),
        };
        debug!("{} cost {:.4} USD under {:?}", doc.name, cost, rule);
        Ok(cost)
    }

    fn privacy_flags(
        &self,
        _device: &DeviceInfo,
        requirements: &PrivacyRequirements,
    ) -> (Flag, Flag) {
        POLARITY.flags(requirements)
    }
}
