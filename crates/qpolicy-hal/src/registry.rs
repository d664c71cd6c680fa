//! Provider registry.
//!
//! The [`ProviderRegistry`] holds at most one [`MetricProvider`] per runtime
//! and gathers candidates from all of them concurrently.

use std::sync::Arc;

use futures::future::try_join_all;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::device::{Runtime, RuntimeCandidates};
use crate::error::{HalError, HalResult};
use crate::provider::MetricProvider;
use crate::request::SignalRequest;

/// Registered metric providers keyed by runtime.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: FxHashMap<Runtime, Arc<dyn MetricProvider>>,
}

impl ProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider, replacing any earlier one for the same runtime.
    pub fn register(&mut self, provider: impl MetricProvider + 'static) {
        let runtime = provider.runtime();
        debug!("Registering provider {} for {}", provider.name(), runtime);
        self.providers.insert(runtime, Arc::new(provider));
    }

    /// Provider of a runtime.
    pub fn get(&self, runtime: Runtime) -> HalResult<Arc<dyn MetricProvider>> {
        self.providers
            .get(&runtime)
            .cloned()
            .ok_or_else(|| HalError::UnknownRuntime(runtime.to_string()))
    }

    /// Registered runtimes in comparison order.
    pub fn runtimes(&self) -> Vec<Runtime> {
        Runtime::ALL
            .into_iter()
            .filter(|r| self.providers.contains_key(r))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Collect candidates from every registered provider, in comparison order.
    pub async fn collect_all(&self, request: &SignalRequest) -> HalResult<Vec<RuntimeCandidates>> {
        self.collect_where(request, |_| true).await
    }

    /// Collect candidates from the providers of runtimes accepted by
    /// `include`. Other providers are never queried.
    pub async fn collect_where(
        &self,
        request: &SignalRequest,
        include: impl Fn(Runtime) -> bool,
    ) -> HalResult<Vec<RuntimeCandidates>> {
        let providers = self
            .runtimes()
            .into_iter()
            .filter(|&r| {
                let keep = include(r);
                if !keep {
                    debug!("Skipping provider of {}", r);
                }
                keep
            })
            .filter_map(|r| self.providers.get(&r).cloned())
            .collect::<Vec<_>>();

        try_join_all(providers.iter().map(|p| p.collect(request))).await
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("runtimes", &self.runtimes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceInfo, Flag};
    use crate::request::{DeviceFilter, PrivacyRequirements, Workload};
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};

    struct FixedProvider {
        runtime: Runtime,
        devices: Vec<DeviceInfo>,
    }

    #[async_trait]
    impl MetricProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        fn runtime(&self) -> Runtime {
            self.runtime
        }

        async fn fetch_devices(&self, filter: &DeviceFilter) -> HalResult<Vec<DeviceInfo>> {
            Ok(self
                .devices
                .iter()
                .filter(|d| filter.simulators_allowed || !d.is_simulator)
                .cloned()
                .collect())
        }

        async fn fetch_availability(&self, _: &DeviceInfo, _: DateTime<Utc>) -> HalResult<f64> {
            Ok(3.0)
        }

        async fn fetch_cost(&self, _: &DeviceInfo, _: &Workload) -> HalResult<f64> {
            Ok(0.5)
        }

        fn privacy_flags(&self, _: &DeviceInfo, req: &PrivacyRequirements) -> (Flag, Flag) {
            (req.data_retention.into(), req.third_party_qpu.into())
        }
    }

    fn registry() -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();
        registry.register(FixedProvider {
            runtime: Runtime::Qiskit,
            devices: vec![
                DeviceInfo::new("ibm_a", "ibm_a", false),
                DeviceInfo::new("sim", "sim", true),
            ],
        });
        registry.register(FixedProvider {
            runtime: Runtime::Braket,
            devices: vec![DeviceInfo::new("arn:lucy", "Lucy", false)],
        });
        registry
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_collect_all_in_runtime_order() {
        let registry = registry();
        assert_eq!(registry.runtimes(), vec![Runtime::Braket, Runtime::Qiskit]);

        let request = SignalRequest {
            filter: DeviceFilter::new(at()).with_simulators(false),
            availability: true,
            workload: None,
            privacy: Some(PrivacyRequirements {
                data_retention: true,
                third_party_qpu: false,
            }),
        };
        let all = registry.collect_all(&request).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].runtime, Runtime::Braket);
        assert_eq!(all[1].devices.len(), 1);

        let metrics = all[1].devices[0].metrics;
        assert_eq!(metrics.availability, Some(3.0));
        assert_eq!(metrics.cost, None);
        assert_eq!(metrics.data_retention, Some(Flag::Raised));
        assert_eq!(metrics.third_party_hosting, Some(Flag::Clear));
    }

    #[tokio::test]
    async fn test_custom_environment_excludes_qiskit() {
        let registry = registry();
        let request =
            SignalRequest::discovery(DeviceFilter::new(at()).with_custom_environment(true));
        let all = registry.collect_all(&request).await.unwrap();
        assert_eq!(all[0].devices.len(), 1);
        assert!(all[1].is_empty());
    }

    struct FailingProvider;

    #[async_trait]
    impl MetricProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        fn runtime(&self) -> Runtime {
            Runtime::Qiskit
        }

        async fn fetch_devices(&self, _: &DeviceFilter) -> HalResult<Vec<DeviceInfo>> {
            Err(HalError::Provider("backend listing failed".into()))
        }

        async fn fetch_availability(&self, _: &DeviceInfo, _: DateTime<Utc>) -> HalResult<f64> {
            Ok(0.0)
        }

        async fn fetch_cost(&self, _: &DeviceInfo, _: &Workload) -> HalResult<f64> {
            Ok(0.0)
        }

        fn privacy_flags(&self, _: &DeviceInfo, _: &PrivacyRequirements) -> (Flag, Flag) {
            (Flag::Clear, Flag::Clear)
        }
    }

    #[tokio::test]
    async fn test_collect_where_skips_excluded_providers() {
        let mut registry = registry();
        registry.register(FailingProvider);
        let request = SignalRequest::discovery(DeviceFilter::new(at()));

        assert!(registry.collect_all(&request).await.is_err());

        let braket_only = registry
            .collect_where(&request, |r| r == Runtime::Braket)
            .await
            .unwrap();
        assert_eq!(braket_only.len(), 1);
        assert_eq!(braket_only[0].runtime, Runtime::Braket);
    }

    #[test]
    fn test_unknown_runtime() {
        let registry = ProviderRegistry::new();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.get(Runtime::Qiskit),
            Err(HalError::UnknownRuntime(_))
        ));
    }
}
