//! Runtime selection.
//!
//! The representative scores of the competing runtimes are compared under an
//! explicit [`SelectionStrategy`]. The strategy is chosen from the active
//! policies (or configured), never inferred from score signs.

use std::fmt;
use std::str::FromStr;

use qpolicy_hal::Runtime;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};
use tracing::info;

use crate::policy::{PolicyName, PolicySet, ResolutionPath};
use crate::scoring::{RuntimeResult, ScoredDevice};

/// How two runtime results are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// The higher best score wins; equal scores are a tie.
    HigherWins,
    /// The lower best score wins; equal scores are a tie.
    LowerWins,
    /// The higher best score wins and only its runtime tag is reported;
    /// equal scores are a tie.
    TieIsAmbiguous,
    /// No winner is declared; both runtimes' best devices are returned.
    ReturnBothOnAvailabilityOnly,
}

impl SelectionStrategy {
    /// Strategy implied by a policy set.
    ///
    /// | Path | Active policies | Strategy |
    /// |------|-----------------|----------|
    /// | legacy | any | `TieIsAmbiguous` |
    /// | multi-policy | availability only | `ReturnBothOnAvailabilityOnly` |
    /// | multi-policy | money among them | `LowerWins` |
    /// | multi-policy | otherwise | `HigherWins` |
    pub fn for_policies(policies: &PolicySet) -> Self {
        match policies.path {
            ResolutionPath::Legacy => SelectionStrategy::TieIsAmbiguous,
            ResolutionPath::MultiPolicy if policies.availability_only() => {
                SelectionStrategy::ReturnBothOnAvailabilityOnly
            }
            ResolutionPath::MultiPolicy if policies.is_active(PolicyName::Money) => {
                SelectionStrategy::LowerWins
            }
            ResolutionPath::MultiPolicy => SelectionStrategy::HigherWins,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SelectionStrategy::HigherWins => "higher_wins",
            SelectionStrategy::LowerWins => "lower_wins",
            SelectionStrategy::TieIsAmbiguous => "tie_is_ambiguous",
            SelectionStrategy::ReturnBothOnAvailabilityOnly => "return_both_on_availability_only",
        }
    }
}

impl fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "higher_wins" => Ok(SelectionStrategy::HigherWins),
            "lower_wins" => Ok(SelectionStrategy::LowerWins),
            "tie_is_ambiguous" => Ok(SelectionStrategy::TieIsAmbiguous),
            "return_both_on_availability_only" | "return_both" => {
                Ok(SelectionStrategy::ReturnBothOnAvailabilityOnly)
            }
            other => Err(format!("unknown selection strategy '{other}'")),
        }
    }
}

/// Outcome of an evaluation.
///
/// Serializes as the winning device object, a two-element array of
/// finalists, the string `"Tie"`, or a bare runtime tag.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionResult {
    /// A single winning device.
    Winner(ScoredDevice),
    /// Both runtimes' best devices, in runtime order.
    Finalists(Box<[ScoredDevice; 2]>),
    /// Equal best scores.
    Tie,
    /// The winning runtime only.
    Runtime(Runtime),
}

impl SelectionResult {
    /// Runtime that won, if one was declared.
    pub fn winning_runtime(&self) -> Option<Runtime> {
        match self {
            SelectionResult::Winner(device) => Some(device.runtime),
            SelectionResult::Runtime(runtime) => Some(*runtime),
            SelectionResult::Finalists(_) | SelectionResult::Tie => None,
        }
    }
}

impl Serialize for SelectionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SelectionResult::Winner(device) => device.serialize(serializer),
            SelectionResult::Finalists(pair) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                for device in pair.iter() {
                    seq.serialize_element(device)?;
                }
                seq.end()
            }
            SelectionResult::Tie => serializer.serialize_str("Tie"),
            SelectionResult::Runtime(runtime) => serializer.serialize_str(runtime.tag()),
        }
    }
}

/// Compare two runtime results, `first` preceding `second` in runtime order.
pub fn select(
    strategy: SelectionStrategy,
    first: RuntimeResult,
    second: RuntimeResult,
) -> SelectionResult {
    let (a, b) = (first.best_score(), second.best_score());
    info!(
        "Comparing {} ({}) with {} ({}) using {}",
        first.runtime(),
        a,
        second.runtime(),
        b,
        strategy
    );

    let outcome = match strategy {
        SelectionStrategy::ReturnBothOnAvailabilityOnly => SelectionResult::Finalists(Box::new([
            first.into_best(),
            second.into_best(),
        ])),
        _ if a == b => SelectionResult::Tie,
        SelectionStrategy::HigherWins => {
            SelectionResult::Winner((if a > b { first } else { second }).into_best())
        }
        SelectionStrategy::LowerWins => {
            SelectionResult::Winner((if a < b { first } else { second }).into_best())
        }
        SelectionStrategy::TieIsAmbiguous => {
            SelectionResult::Runtime(if a > b { first.runtime() } else { second.runtime() })
        }
    };

    info!("Selection outcome: {}", describe(&outcome));
    outcome
}

/// Short human readable description of an outcome.
pub fn describe(outcome: &SelectionResult) -> String {
    match outcome {
        SelectionResult::Winner(d) => format!("{} on {} (score {})", d.runtime, d.device.name, d.score),
        SelectionResult::Finalists(pair) => format!(
            "finalists {} on {} and {} on {}",
            pair[0].runtime, pair[0].device.name, pair[1].runtime, pair[1].device.name
        ),
        SelectionResult::Tie => "Tie".to_string(),
        SelectionResult::Runtime(r) => r.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{PolicyState, Weight};
    use crate::scoring::rank;
    use qpolicy_hal::{DeviceInfo, DeviceMetrics, DeviceSignals};

    fn availability_policies() -> PolicySet {
        PolicySet::new(ResolutionPath::MultiPolicy)
            .with(PolicyName::Availability, PolicyState::Active(Weight::new(1)))
    }

    fn result(runtime: Runtime, name: &str, availability: f64) -> RuntimeResult {
        let devices = [DeviceSignals {
            device: DeviceInfo::new(name, name, false),
            metrics: DeviceMetrics {
                availability: Some(availability),
                ..DeviceMetrics::default()
            },
        }];
        rank(runtime, &devices, &availability_policies()).unwrap()
    }

    #[test]
    fn test_strategy_for_policies() {
        let legacy = PolicySet::new(ResolutionPath::Legacy)
            .with(PolicyName::Availability, PolicyState::Active(Weight::new(1)));
        assert_eq!(
            SelectionStrategy::for_policies(&legacy),
            SelectionStrategy::TieIsAmbiguous
        );
        assert_eq!(
            SelectionStrategy::for_policies(&availability_policies()),
            SelectionStrategy::ReturnBothOnAvailabilityOnly
        );

        let money = availability_policies()
            .with(PolicyName::Money, PolicyState::Active(Weight::new(1)));
        assert_eq!(SelectionStrategy::for_policies(&money), SelectionStrategy::LowerWins);

        let privacy = PolicySet::new(ResolutionPath::MultiPolicy)
            .with(PolicyName::Privacy, PolicyState::Active(Weight::new(1)));
        assert_eq!(SelectionStrategy::for_policies(&privacy), SelectionStrategy::HigherWins);
    }

    #[test]
    fn test_higher_wins() {
        let outcome = select(
            SelectionStrategy::HigherWins,
            result(Runtime::Braket, "Lucy", 8.0),
            result(Runtime::Qiskit, "ibm_lagos", 3.0),
        );
        assert_eq!(outcome.winning_runtime(), Some(Runtime::Braket));
    }

    #[test]
    fn test_lower_wins() {
        let outcome = select(
            SelectionStrategy::LowerWins,
            result(Runtime::Braket, "Lucy", 8.0),
            result(Runtime::Qiskit, "ibm_lagos", 3.0),
        );
        match outcome {
            SelectionResult::Winner(d) => assert_eq!(d.device.name, "ibm_lagos"),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_tie_sentinel() {
        for strategy in [
            SelectionStrategy::HigherWins,
            SelectionStrategy::LowerWins,
            SelectionStrategy::TieIsAmbiguous,
        ] {
            let outcome = select(
                strategy,
                result(Runtime::Braket, "Lucy", 4.0),
                result(Runtime::Qiskit, "ibm_lagos", 4.0),
            );
            assert_eq!(outcome, SelectionResult::Tie);
            assert_eq!(serde_json::to_value(&outcome).unwrap(), "Tie");
        }
    }

    #[test]
    fn test_tie_is_ambiguous_reports_tag() {
        let outcome = select(
            SelectionStrategy::TieIsAmbiguous,
            result(Runtime::Braket, "Lucy", 1.0),
            result(Runtime::Qiskit, "ibm_lagos", 9.0),
        );
        assert_eq!(outcome, SelectionResult::Runtime(Runtime::Qiskit));
        assert_eq!(serde_json::to_value(&outcome).unwrap(), "Qiskit Runtime");
    }

    #[test]
    fn test_return_both_even_on_equal_scores() {
        let outcome = select(
            SelectionStrategy::ReturnBothOnAvailabilityOnly,
            result(Runtime::Braket, "Lucy", 4.0),
            result(Runtime::Qiskit, "ibm_lagos", 4.0),
        );
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 2);
        assert_eq!(json[0]["runtime"], "AWS Runtime");
        assert_eq!(json[1]["device"]["name"], "ibm_lagos");
        assert!(outcome.winning_runtime().is_none());
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!(
            "Lower-Wins".parse::<SelectionStrategy>().unwrap(),
            SelectionStrategy::LowerWins
        );
        assert!("best".parse::<SelectionStrategy>().is_err());
        assert_eq!(SelectionStrategy::TieIsAmbiguous.to_string(), "tie_is_ambiguous");
    }
}
