//! Queue-based metric provider over Qiskit Runtime backend snapshots.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use qpolicy_core::{MetricNormalizer, PrivacyPolarity};
use qpolicy_hal::{
    DeviceFilter, DeviceInfo, Flag, HalResult, MetricProvider, PrivacyRequirements, Runtime,
    Workload,
};

use crate::backend::BackendSnapshot;
use crate::error::{IbmError, IbmResult};

/// Qiskit Runtime flags exposure when the caller does not ask for the
/// property.
const POLARITY: PrivacyPolarity = PrivacyPolarity::FlagWhenNotRequired;

/// Metric provider for the Qiskit Runtime.
#[derive(Debug, Clone)]
pub struct IbmProvider {
    backends: Vec<BackendSnapshot>,
    normalizer: MetricNormalizer,
}

impl IbmProvider {
    pub fn new(backends: Vec<BackendSnapshot>, normalizer: MetricNormalizer) -> Self {
        Self {
            backends,
            normalizer,
        }
    }

    /// Parse a JSON array of backend snapshots.
    pub fn from_json(json: &str, normalizer: MetricNormalizer) -> IbmResult<Self> {
        let backends = serde_json::from_str(json)?;
        Ok(Self::new(backends, normalizer))
    }

    pub fn backends(&self) -> &[BackendSnapshot] {
        &self.backends
    }

    /// Operational backends allowed by `filter`, in snapshot order.
    pub fn eligible(&self, filter: &DeviceFilter) -> Vec<&BackendSnapshot> {
        self.backends
            .iter()
            .filter(|b| filter.simulators_allowed || !b.simulator)
            .filter(|b| {
                if !b.status.operational {
                    debug!(
                        "{} is not operational: {}",
                        b.name,
                        b.status.status_msg.as_deref().unwrap_or("no status message")
                    );
                }
                b.status.operational
            })
            .collect()
    }

    fn backend(&self, device: &DeviceInfo) -> IbmResult<&BackendSnapshot> {
        self.backends
            .iter()
            .find(|b| b.name == device.id.as_str())
            .ok_or_else(|| IbmError::UnknownBackend(device.id.as_str().to_string()))
    }
}

#[async_trait]
impl MetricProvider for IbmProvider {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "ibm"
    }

    fn runtime(&self) -> Runtime {
        Runtime::Qiskit
    }

    async fn fetch_devices(&self, filter: &DeviceFilter) -> HalResult<Vec<DeviceInfo>> {
        Ok(self
            .eligible(filter)
            .into_iter()
            .map(BackendSnapshot::to_device_info)
            .collect())
    }

    async fn fetch_availability(&self, device: &DeviceInfo, _at: DateTime<Utc>) -> HalResult<f64> {
        let backend = self.backend(device)?;
        Ok(self.normalizer.queue_availability(backend.status.pending_jobs))
    }

    async fn fetch_cost(&self, device: &DeviceInfo, workload: &Workload) -> HalResult<f64> {
        let backend = self.backend(device)?;
        match workload {
            Workload::Profile(profile) => {
                Ok(self.normalizer.qiskit_cost(profile, backend.is_premium()))
            }
            Workload::Program(_) if !backend.is_premium() => Ok(0.0),
            Workload::Program(_) => Err(IbmError::UnpricedWorkload {
                backend: backend.name.clone(),
                workload: "program",
            }
            .into()),
        }
    }

    fn privacy_flags(
        &self,
        _device: &DeviceInfo,
        requirements: &PrivacyRequirements,
    ) -> (Flag, Flag) {
        POLARITY.flags(requirements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qpolicy_analysis::ShotTally;
    use qpolicy_hal::{SignalRequest, WorkloadProfile};

    const BACKENDS: &str = r#"[
        { "name": "ibm_lagos", "status": { "operational": true, "pending_jobs": 40 } },
        { "name": "ibm_perth", "status": { "operational": true, "pending_jobs": 7 }, "plan": "premium" },
        { "name": "ibm_nairobi", "status": { "operational": false, "status_msg": "maintenance" } },
        { "name": "simulator_statevector", "simulator": true, "status": { "operational": true } }
    ]"#;

    fn provider() -> IbmProvider {
        IbmProvider::from_json(BACKENDS, MetricNormalizer::default()).unwrap()
    }

    fn names(devices: &[DeviceInfo]) -> Vec<&str> {
        devices.iter().map(|d| d.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_discovery_filters() {
        let p = provider();
        let now = Utc::now();
        let devices = p.fetch_devices(&DeviceFilter::new(now)).await.unwrap();
        assert_eq!(names(&devices), vec!["ibm_lagos", "ibm_perth", "simulator_statevector"]);

        let devices = p
            .fetch_devices(&DeviceFilter::new(now).with_simulators(false))
            .await
            .unwrap();
        assert_eq!(names(&devices), vec!["ibm_lagos", "ibm_perth"]);
    }

    #[tokio::test]
    async fn test_queue_availability() {
        let p = provider();
        let perth = DeviceInfo::new("ibm_perth", "ibm_perth", false);
        assert_eq!(p.fetch_availability(&perth, Utc::now()).await.unwrap(), 7.0);
    }

    #[tokio::test]
    async fn test_plan_costs() {
        let p = provider();
        let lagos = DeviceInfo::new("ibm_lagos", "ibm_lagos", false);
        let perth = DeviceInfo::new("ibm_perth", "ibm_perth", false);
        let profile = Workload::Profile(WorkloadProfile {
            classical_seconds: 3.0,
            quantum_seconds: 2.0,
            ..WorkloadProfile::default()
        });

        assert_eq!(p.fetch_cost(&lagos, &profile).await.unwrap(), 0.0);
        let premium = p.fetch_cost(&perth, &profile).await.unwrap();
        assert!((premium - 8.0).abs() < 1e-9);

        let program = Workload::Program(ShotTally::default());
        assert_eq!(p.fetch_cost(&lagos, &program).await.unwrap(), 0.0);
        let err = p.fetch_cost(&perth, &program).await.unwrap_err();
        assert!(matches!(err, qpolicy_hal::HalError::Provider(_)));
    }

    #[tokio::test]
    async fn test_custom_environment_yields_no_candidates() {
        let p = provider();
        let request = SignalRequest::discovery(
            DeviceFilter::new(Utc::now()).with_custom_environment(true),
        );
        let candidates = p.collect(&request).await.unwrap();
        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn test_privacy_polarity() {
        let p = provider();
        let request = SignalRequest {
            privacy: Some(PrivacyRequirements {
                data_retention: true,
                third_party_qpu: false,
            }),
            ..SignalRequest::discovery(DeviceFilter::new(Utc::now()))
        };
        let candidates = p.collect(&request).await.unwrap();
        let metrics = &candidates.devices[0].metrics;
        assert_eq!(metrics.data_retention, Some(Flag::Clear));
        assert_eq!(metrics.third_party_hosting, Some(Flag::Raised));
        assert_eq!(metrics.availability, None);
    }
}
