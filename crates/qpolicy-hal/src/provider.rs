//! Metric provider trait.
//!
//! A [`MetricProvider`] stands for one runtime. It discovers the runtime's
//! eligible devices and annotates each with the metrics the decision engine
//! needs:
//!
//! ```text
//!   fetch_devices() ──→ fetch_availability() ─┐
//!                   ──→ fetch_cost()         ─┼──→ RuntimeCandidates
//!                   ──→ privacy_flags()      ─┘
//! ```
//!
//! | Method | Kind | Required | Returns |
//! |--------|------|----------|---------|
//! | `name()` | sync | yes | `&str` |
//! | `runtime()` | sync | yes | `Runtime` |
//! | `fetch_devices()` | async | yes | `HalResult<Vec<DeviceInfo>>` |
//! | `fetch_availability()` | async | yes | `HalResult<f64>` |
//! | `fetch_cost()` | async | yes | `HalResult<f64>` |
//! | `privacy_flags()` | sync | yes | `(Flag, Flag)` |
//! | `collect()` | async | provided | `HalResult<RuntimeCandidates>` |

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::device::{DeviceInfo, DeviceMetrics, DeviceSignals, Flag, Runtime, RuntimeCandidates};
use crate::error::HalResult;
use crate::request::{DeviceFilter, PrivacyRequirements, SignalRequest, Workload};

/// Source of devices and metrics for one runtime.
///
/// Availability and cost are returned already normalized: lower means better
/// for queue lengths and costs, higher means better for window hours.
#[async_trait]
pub trait MetricProvider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// The runtime this provider stands for.
    fn runtime(&self) -> Runtime;

    /// Devices eligible under `filter`, in provider order.
    async fn fetch_devices(&self, filter: &DeviceFilter) -> HalResult<Vec<DeviceInfo>>;

    /// Availability of a device at `at`.
    async fn fetch_availability(&self, device: &DeviceInfo, at: DateTime<Utc>) -> HalResult<f64>;

    /// Estimated cost in USD of running `workload` on a device.
    async fn fetch_cost(&self, device: &DeviceInfo, workload: &Workload) -> HalResult<f64>;

    /// Data retention and third-party hosting exposure of a device.
    fn privacy_flags(&self, device: &DeviceInfo, requirements: &PrivacyRequirements)
    -> (Flag, Flag);

    /// Discover devices and gather the requested signals for each.
    ///
    /// A runtime that cannot host custom environments yields no candidates
    /// when one is required.
    async fn collect(&self, request: &SignalRequest) -> HalResult<RuntimeCandidates> {
        let runtime = self.runtime();
        if request.filter.custom_environment_required && !runtime.supports_custom_environment() {
            info!("{} excluded: custom environment required", runtime);
            return Ok(RuntimeCandidates::empty(runtime));
        }

        let devices = self.fetch_devices(&request.filter).await?;
        info!("{} offers {} eligible devices", self.name(), devices.len());

        let mut signals = Vec::with_capacity(devices.len());
        for device in devices {
            let mut metrics = DeviceMetrics::default();

            if request.availability {
                metrics.availability =
                    Some(self.fetch_availability(&device, request.filter.at).await?);
            }
            if let Some(workload) = &request.workload {
                metrics.cost = Some(self.fetch_cost(&device, workload).await?);
            }
            if let Some(requirements) = &request.privacy {
                let (retention, third_party) = self.privacy_flags(&device, requirements);
                metrics.data_retention = Some(retention);
                metrics.third_party_hosting = Some(third_party);
            }

            debug!("{} {}: {:?}", runtime, device.name, metrics);
            signals.push(DeviceSignals { device, metrics });
        }

        Ok(RuntimeCandidates::new(runtime, signals))
    }
}
