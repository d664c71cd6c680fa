//! Evaluation entry point.

use qpolicy_hal::{Runtime, RuntimeCandidates};
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::error::{PolicyError, PolicyResult};
use crate::normalize::MetricNormalizer;
use crate::policy::{PolicySet, ResolutionPath};
use crate::scoring::{RuntimeResult, rank};
use crate::selector::{SelectionResult, SelectionStrategy, select};

/// Runs policy evaluations against gathered candidates.
///
/// Holds only read-only configuration; one evaluator may serve concurrent
/// requests.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    config: EngineConfig,
}

impl Evaluator {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Normalizer configured like this evaluator.
    pub fn normalizer(&self) -> MetricNormalizer {
        MetricNormalizer::new(&self.config)
    }

    /// Strategy used for `policies`. A configured strategy overrides the
    /// derived one on the multi-policy path only.
    pub fn strategy(&self, policies: &PolicySet) -> SelectionStrategy {
        match (policies.path, self.config.selection.strategy) {
            (ResolutionPath::MultiPolicy, Some(strategy)) => strategy,
            _ => SelectionStrategy::for_policies(policies),
        }
    }

    /// Score every eligible runtime and select the outcome.
    ///
    /// Runtimes excluded by the policies, or without any eligible device,
    /// drop out; if a single runtime is left its best device wins without
    /// comparison. With none left the evaluation fails.
    pub fn evaluate(
        &self,
        policies: &PolicySet,
        candidates: &[RuntimeCandidates],
    ) -> PolicyResult<SelectionResult> {
        info!(
            "Evaluating {} runtimes with active policies {:?}",
            candidates.len(),
            policies.active()
        );

        let mut eligible = candidates
            .iter()
            .filter(|c| {
                let keep = policies.is_eligible(c.runtime);
                if !keep {
                    info!("{} excluded by policy", c.runtime);
                }
                keep
            })
            .filter(|c| {
                if c.is_empty() {
                    warn!("{} has no eligible devices, excluding it", c.runtime);
                }
                !c.is_empty()
            })
            .collect::<Vec<_>>();
        eligible.sort_by_key(|c| c.runtime);
        eligible.dedup_by_key(|c| c.runtime);

        let mut results = eligible
            .into_iter()
            .map(|c| rank(c.runtime, &c.devices, policies))
            .collect::<PolicyResult<Vec<RuntimeResult>>>()?;

        match results.len() {
            0 => Err(PolicyError::EmptyCandidateSet {
                runtime: describe_runtimes(candidates),
            }),
            1 => {
                let only = results.remove(0);
                info!("Only {} is eligible, skipping comparison", only.runtime());
                Ok(SelectionResult::Winner(only.into_best()))
            }
            _ => {
                let second = results.remove(1);
                let first = results.remove(0);
                Ok(select(self.strategy(policies), first, second))
            }
        }
    }
}

/// Evaluate with the default configuration.
pub fn evaluate(
    policies: &PolicySet,
    candidates: &[RuntimeCandidates],
) -> PolicyResult<SelectionResult> {
    Evaluator::default().evaluate(policies, candidates)
}

fn describe_runtimes(candidates: &[RuntimeCandidates]) -> String {
    if candidates.is_empty() {
        return "any runtime".to_string();
    }
    candidates
        .iter()
        .map(|c| c.runtime)
        .map(Runtime::tag)
        .collect::<Vec<_>>()
        .join(", ")
}
