//! Scoring engine: weighted sums per device and ranking per runtime.

use qpolicy_hal::{DeviceInfo, DeviceSignals, Runtime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{PolicyError, PolicyResult};
use crate::policy::{MetricSlot, PolicySet, WeightVector};

/// Metrics in slot order `[cost, availability, retention, third_party]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricVector(pub [f64; 4]);

impl MetricVector {
    pub fn get(&self, slot: MetricSlot) -> f64 {
        self.0[slot.index()]
    }
}

/// A device with its metric vector and score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDevice {
    pub runtime: Runtime,
    pub device: DeviceInfo,
    pub metrics: MetricVector,
    pub score: i64,
}

/// Sort direction chosen for a runtime's ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankDirection {
    /// Lowest score first. Used when no score is negative.
    Ascending,
    /// Highest score first. Used when the minimum score is negative.
    Descending,
}

/// Ranked devices of one runtime. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuntimeResult {
    runtime: Runtime,
    ranked: Vec<ScoredDevice>,
    best_score: i64,
    direction: RankDirection,
}

impl RuntimeResult {
    pub fn runtime(&self) -> Runtime {
        self.runtime
    }

    /// Devices in ranking order, best first.
    pub fn ranked(&self) -> &[ScoredDevice] {
        &self.ranked
    }

    /// Score of the head of the ranking.
    pub fn best_score(&self) -> i64 {
        self.best_score
    }

    pub fn direction(&self) -> RankDirection {
        self.direction
    }

    /// The selected device.
    pub fn best(&self) -> &ScoredDevice {
        // `rank` refuses to build an empty result.
        &self.ranked[0]
    }

    pub fn into_best(self) -> ScoredDevice {
        let mut ranked = self.ranked;
        ranked.swap_remove(0)
    }
}

/// Weighted sum `Σ trunc(metric[i]) × weight[i]`.
pub fn score(metrics: &MetricVector, weights: &WeightVector) -> i64 {
    MetricSlot::ALL.into_iter().fold(0i64, |acc, slot| {
        let metric = metrics.get(slot).trunc() as i64;
        acc.saturating_add(metric.saturating_mul(weights.get(slot)))
    })
}

/// Build the metric vector of a device. Slots of inactive policies are zero;
/// a missing signal for an active policy fails the evaluation.
pub fn metric_vector(
    runtime: Runtime,
    signals: &DeviceSignals,
    policies: &PolicySet,
) -> PolicyResult<MetricVector> {
    let m = &signals.metrics;
    let mut vector = [0.0; 4];

    for slot in MetricSlot::ALL {
        let policy = slot.policy();
        if !policies.is_active(policy) {
            continue;
        }
        let value = match slot {
            MetricSlot::Cost => m.cost,
            MetricSlot::Availability => m.availability,
            MetricSlot::DataRetention => m.data_retention.map(|f| f.value() as f64),
            MetricSlot::ThirdPartyHosting => m.third_party_hosting.map(|f| f.value() as f64),
        };
        vector[slot.index()] = value.ok_or_else(|| PolicyError::MissingSignal {
            policy: policy.to_string(),
            runtime: runtime.to_string(),
            device: signals.device.name.clone(),
        })?;
    }

    Ok(MetricVector(vector))
}

/// Score and rank the devices of one runtime.
///
/// If the minimum score is negative the ranking is descending, otherwise
/// ascending. Equal scores keep provider order.
pub fn rank(
    runtime: Runtime,
    devices: &[DeviceSignals],
    policies: &PolicySet,
) -> PolicyResult<RuntimeResult> {
    let weights = policies.weights();

    let mut ranked = devices
        .iter()
        .map(|signals| {
            let metrics = metric_vector(runtime, signals, policies)?;
            let score = score(&metrics, &weights);
            debug!(
                "{} {}: metrics {:?} score {}",
                runtime, signals.device.name, metrics.0, score
            );
            Ok(ScoredDevice {
                runtime,
                device: signals.device.clone(),
                metrics,
                score,
            })
        })
        .collect::<PolicyResult<Vec<_>>>()?;

    let Some(min) = ranked.iter().map(|d| d.score).min() else {
        return Err(PolicyError::EmptyCandidateSet {
            runtime: runtime.to_string(),
        });
    };

    let direction = if min < 0 {
        RankDirection::Descending
    } else {
        RankDirection::Ascending
    };
    match direction {
        RankDirection::Ascending => ranked.sort_by(|a, b| a.score.cmp(&b.score)),
        RankDirection::Descending => ranked.sort_by(|a, b| b.score.cmp(&a.score)),
    }

    let best_score = ranked[0].score;
    info!(
        "{}: ranked {} devices {:?}, best {} ({})",
        runtime,
        ranked.len(),
        direction,
        ranked[0].device.name,
        best_score
    );

    Ok(RuntimeResult {
        runtime,
        ranked,
        best_score,
        direction,
    })
}
