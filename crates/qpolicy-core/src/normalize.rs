//! Metric normalization.
//!
//! Turns raw provider data (queue lengths, execution windows, prices,
//! privacy requirements) into the comparable numbers stored in a
//! [`DeviceMetrics`](qpolicy_hal::DeviceMetrics) record.

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use qpolicy_analysis::ShotTally;
use qpolicy_hal::{ExecutionWindow, Flag, PrivacyRequirements, WorkloadProfile};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::{AvailabilityConfig, CostConfig, EngineConfig};

/// How a device is billed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceRule {
    /// Billed per second of simulation.
    PerSecond { price: f64 },
    /// Billed per task plus per shot.
    PerShot { price: f64 },
    /// No device-specific price known; only the task fee applies.
    Unpriced,
}

/// Which privacy answer raises a provider's exposure flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivacyPolarity {
    /// Flag when the caller's requirement is `true`.
    FlagWhenRequired,
    /// Flag when the caller's requirement is `false`.
    FlagWhenNotRequired,
}

impl PrivacyPolarity {
    /// `(data_retention, third_party_hosting)` flags for `requirements`.
    pub fn flags(self, requirements: &PrivacyRequirements) -> (Flag, Flag) {
        let raise = |requirement: bool| match self {
            PrivacyPolarity::FlagWhenRequired => Flag::from(requirement),
            PrivacyPolarity::FlagWhenNotRequired => Flag::from(!requirement),
        };
        (
            raise(requirements.data_retention),
            raise(requirements.third_party_qpu),
        )
    }
}

/// Converts raw provider signals into normalized metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricNormalizer {
    cost: CostConfig,
    availability: AvailabilityConfig,
}

impl Default for MetricNormalizer {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl MetricNormalizer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            cost: config.cost.clone(),
            availability: config.availability.clone(),
        }
    }

    /// Queue-based availability: pending jobs, used as-is. Lower is better.
    pub fn queue_availability(&self, pending_jobs: u32) -> f64 {
        f64::from(pending_jobs)
    }

    /// Whether a device name marks an always-available simulator.
    pub fn is_simulator_name(&self, name: &str) -> bool {
        self.availability
            .simulator_patterns
            .iter()
            .any(|pattern| name.contains(pattern.as_str()))
    }

    /// Durations in hours of every window open at `at`, in declaration order.
    ///
    /// A window is open when it applies to the day of `at` and the hour of
    /// `at` lies in `[start, end)`. A window past midnight stays open until
    /// its end hour on the following day.
    pub fn window_hours(&self, windows: &[ExecutionWindow], at: DateTime<Utc>) -> Vec<f64> {
        let weekday = at.weekday();
        let hour = at.hour();

        windows
            .iter()
            .filter(|w| is_open(w, weekday, hour))
            .map(window_duration)
            .collect()
    }

    /// Whether any window is open at `at`.
    pub fn has_open_window(&self, windows: &[ExecutionWindow], at: DateTime<Utc>) -> bool {
        !self.window_hours(windows, at).is_empty()
    }

    /// Time-windowed availability of a device: the fixed simulator value for
    /// simulators, otherwise the longest open window (0 when none is open).
    pub fn window_availability(
        &self,
        device_name: &str,
        windows: &[ExecutionWindow],
        at: DateTime<Utc>,
    ) -> f64 {
        if self.is_simulator_name(device_name) {
            return self.availability.simulator_hours;
        }
        let hours = self.window_hours(windows, at);
        trace!("{} open windows at {}: {:?}", device_name, at, hours);
        hours.into_iter().fold(0.0, f64::max)
    }

    /// Design-time cost of the counted program submissions.
    ///
    /// `task_fee × tasks + price × tasks × shots` for per-shot devices; the
    /// task count multiplies the shot term as well.
    pub fn program_cost(&self, tally: &ShotTally, rule: PriceRule) -> f64 {
        let tasks = tally.quantum_tasks as f64;
        let shots = tally.quantum_task_shots as f64;
        let fee = self.cost.task_fee * tasks;
        match rule {
            PriceRule::PerShot { price } => fee + price * tasks * shots,
            PriceRule::PerSecond { .. } | PriceRule::Unpriced => fee,
        }
    }

    /// Runtime cost of a hybrid job on a time-windowed device, including the
    /// classical compute it used.
    pub fn profile_cost(&self, profile: &WorkloadProfile, rule: PriceRule) -> f64 {
        let classical = self.classical_cost(profile);
        let tasks = profile.tasks as f64;
        let shots = profile.shots as f64;
        match rule {
            PriceRule::PerSecond { price } => price * profile.quantum_seconds + classical,
            PriceRule::PerShot { price } => {
                self.cost.task_fee * tasks + price * tasks * shots + classical
            }
            PriceRule::Unpriced => self.cost.task_fee * tasks + classical,
        }
    }

    /// Cost of classical compute for a job.
    pub fn classical_cost(&self, profile: &WorkloadProfile) -> f64 {
        profile.classical_seconds * self.cost.classical_rate_per_second
    }

    /// Queue-based runtime cost: free on the open plan, billed per second of
    /// total execution time on the premium plan.
    pub fn qiskit_cost(&self, profile: &WorkloadProfile, premium: bool) -> f64 {
        if premium {
            self.cost.qiskit_rate_per_second * (profile.classical_seconds + profile.quantum_seconds)
        } else {
            0.0
        }
    }
}

/// Whether `window` is open at `hour` on `day`. The part of a wrapping
/// window after midnight belongs to the day the window started on.
fn is_open(window: &ExecutionWindow, day: Weekday, hour: u32) -> bool {
    if window.wraps_midnight() {
        (hour >= window.start_hour && window.day.applies_on(day))
            || (hour < window.end_hour && window.day.applies_on(day.pred()))
    } else {
        window.day.applies_on(day) && window.start_hour <= hour && hour < window.end_hour
    }
}

fn window_duration(window: &ExecutionWindow) -> f64 {
    let end = if window.wraps_midnight() {
        window.end_hour + 24
    } else {
        window.end_hour
    };
    f64::from(end - window.start_hour)
}
