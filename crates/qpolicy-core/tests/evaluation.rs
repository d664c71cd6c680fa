//! End-to-end evaluations and scoring properties.

use proptest::prelude::*;
use qpolicy_core::{
    ErrorKind, Evaluator, MetricNormalizer, MetricVector, PolicyError, PolicyName, PolicySet,
    PolicyState, PriceRule, PrivacyPolarity, RankDirection, ResolutionPath, SelectionResult,
    Weight, WeightVector, evaluate, rank, score,
};
use qpolicy_analysis::tally_source;
use qpolicy_hal::{
    DeviceInfo, DeviceMetrics, DeviceSignals, ExecutionDay, ExecutionWindow, Flag, Runtime,
    RuntimeCandidates,
};
use serde_json::json;

fn availability_device(name: &str, availability: f64) -> DeviceSignals {
    DeviceSignals {
        device: DeviceInfo::new(name, name, false),
        metrics: DeviceMetrics {
            availability: Some(availability),
            ..DeviceMetrics::default()
        },
    }
}

#[test]
fn test_braket_program_cost_drives_money_policy() {
    let normalizer = MetricNormalizer::default();
    let tally = tally_source("for c in circuits:\n    device.run(c, shots=1000)\n").unwrap();

    let lucy = normalizer.program_cost(&tally, PriceRule::PerShot { price: 0.00035 });
    let sv1 = normalizer.program_cost(&tally, PriceRule::PerSecond { price: 0.075 });
    assert!((lucy - 0.65).abs() < 1e-9);
    assert!((sv1 - 0.3).abs() < 1e-9);

    let cost_device = |name: &str, cost: f64| DeviceSignals {
        device: DeviceInfo::new(name, name, name == "SV1"),
        metrics: DeviceMetrics {
            cost: Some(cost),
            ..DeviceMetrics::default()
        },
    };

    let policies = PolicySet::from_multi_policy(&json!({ "money": { "weight": 10 } })).unwrap();
    let candidates = vec![
        RuntimeCandidates::new(
            Runtime::Braket,
            vec![cost_device("Lucy", lucy), cost_device("SV1", sv1)],
        ),
        RuntimeCandidates::new(Runtime::Qiskit, vec![cost_device("ibm_lagos", 0.0)]),
    ];

    let result = rank(Runtime::Braket, &candidates[0].devices, &policies).unwrap();
    // trunc(0.65) and trunc(0.3) both score zero; provider order breaks the tie.
    assert_eq!(result.best().device.name, "Lucy");

    // Both runtimes best at zero.
    assert_eq!(evaluate(&policies, &candidates).unwrap(), SelectionResult::Tie);
}

#[test]
fn test_window_availability_feeds_ranking() {
    let normalizer = MetricNormalizer::default();
    let at = chrono::DateTime::parse_from_rfc3339("2024-03-05T10:30:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let windows = [
        ExecutionWindow::new(ExecutionDay::Weekday, 9, 17).unwrap(),
        ExecutionWindow::new(ExecutionDay::Everyday, 10, 12).unwrap(),
    ];

    let braket = RuntimeCandidates::new(
        Runtime::Braket,
        vec![
            availability_device("Aria 1", normalizer.window_availability("Aria 1", &windows, at)),
            availability_device("SV1", normalizer.window_availability("SV1", &[], at)),
        ],
    );
    let qiskit = RuntimeCandidates::new(
        Runtime::Qiskit,
        vec![
            availability_device("ibm_lagos", normalizer.queue_availability(40)),
            availability_device("ibm_perth", normalizer.queue_availability(7)),
        ],
    );

    let policies =
        PolicySet::from_multi_policy(&json!({ "availability": "{\"weight\": 1}" })).unwrap();
    match evaluate(&policies, &[braket, qiskit]).unwrap() {
        SelectionResult::Finalists(pair) => {
            assert_eq!(pair[0].device.name, "Aria 1");
            assert_eq!(pair[0].score, 8);
            assert_eq!(pair[1].device.name, "ibm_perth");
            assert_eq!(pair[1].score, 7);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn test_privacy_polarity_per_runtime() {
    let policies = PolicySet::from_multi_policy(&json!({
        "privacy": { "weight": 3, "dataRetention": true, "thirdPartyQPU": true }
    }))
    .unwrap();
    let requirements = policies.privacy_requirements.unwrap();

    let device = |name: &str, polarity: PrivacyPolarity| {
        let (retention, hosting) = polarity.flags(&requirements);
        DeviceSignals {
            device: DeviceInfo::new(name, name, false),
            metrics: DeviceMetrics {
                data_retention: Some(retention),
                third_party_hosting: Some(hosting),
                ..DeviceMetrics::default()
            },
        }
    };

    let candidates = vec![
        RuntimeCandidates::new(
            Runtime::Braket,
            vec![device("Lucy", PrivacyPolarity::FlagWhenRequired)],
        ),
        RuntimeCandidates::new(
            Runtime::Qiskit,
            vec![device("ibm_lagos", PrivacyPolarity::FlagWhenNotRequired)],
        ),
    ];

    match evaluate(&policies, &candidates).unwrap() {
        SelectionResult::Winner(best) => {
            assert_eq!(best.runtime, Runtime::Braket);
            assert_eq!(best.score, 6);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn test_legacy_request_end_to_end() {
    let forms = json!({
        "moneyPolicy": {},
        "availabilityPolicy": { "availabilityPolicy": { "weight": "2" } },
        "privacyPolicy": {},
        "customEnvironmentPolicy": {}
    });
    let policies = PolicySet::from_legacy(forms.as_object().unwrap()).unwrap();
    assert_eq!(policies.path, ResolutionPath::Legacy);
    assert!(policies.availability_only());

    let candidates = vec![
        RuntimeCandidates::new(Runtime::Braket, vec![availability_device("Lucy", 4.0)]),
        RuntimeCandidates::new(Runtime::Qiskit, vec![availability_device("ibm_lagos", 9.0)]),
    ];
    let outcome = evaluate(&policies, &candidates).unwrap();
    assert_eq!(outcome, SelectionResult::Runtime(Runtime::Qiskit));
    assert_eq!(serde_json::to_value(&outcome).unwrap(), "Qiskit Runtime");
}

#[test]
fn test_legacy_custom_environment_restricts_runtime() {
    let forms = json!({
        "availabilityPolicy": { "availabilityPolicy": { "weight": 1 } },
        "customEnvironmentPolicy": { "image": "jobs:latest", "region": "us-east-1" }
    });
    let policies = PolicySet::from_legacy(forms.as_object().unwrap()).unwrap();
    assert!(policies.custom_environment_required());

    let filter = policies.device_filter(chrono::Utc::now(), true);
    assert!(!filter.simulators_allowed);
    assert!(filter.custom_environment_required);

    let candidates = vec![
        RuntimeCandidates::new(Runtime::Braket, vec![availability_device("Lucy", 1.0)]),
        RuntimeCandidates::new(Runtime::Qiskit, vec![availability_device("ibm_lagos", 9.0)]),
    ];
    match evaluate(&policies, &candidates).unwrap() {
        SelectionResult::Winner(best) => assert_eq!(best.runtime, Runtime::Braket),
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn test_failures_are_classified() {
    let err = PolicySet::from_multi_policy(&json!({ "money": null })).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPolicy);

    let policies = PolicySet::new(ResolutionPath::MultiPolicy)
        .with(PolicyName::Money, PolicyState::Active(Weight::new(1)));
    let candidates = vec![RuntimeCandidates::new(
        Runtime::Qiskit,
        vec![availability_device("ibm_lagos", 2.0)],
    )];
    let err = Evaluator::default()
        .evaluate(&policies, &candidates)
        .unwrap_err();
    assert!(matches!(err, PolicyError::MissingSignal { .. }));
    assert_eq!(err.to_failure().kind, ErrorKind::MissingSignal);

    let err = tally_source("device.run(c, shots=n)\n")
        .map_err(PolicyError::from)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AmbiguousShotCount);
}

fn metric() -> impl Strategy<Value = f64> {
    -1_000.0f64..1_000.0
}

fn weight() -> impl Strategy<Value = i64> {
    0i64..100
}

proptest! {
    #[test]
    fn prop_score_is_weighted_sum(
        m in proptest::array::uniform4(metric()),
        w in proptest::array::uniform4(weight()),
    ) {
        let expected: i64 = m.iter().zip(w.iter()).map(|(m, w)| m.trunc() as i64 * w).sum();
        prop_assert_eq!(score(&MetricVector(m), &WeightVector(w)), expected);
    }

    #[test]
    fn prop_zero_weight_slot_is_ignored(
        m in proptest::array::uniform4(metric()),
        w in proptest::array::uniform4(weight()),
        slot in 0usize..4,
        replacement in metric(),
    ) {
        let mut weights = w;
        weights[slot] = 0;
        let mut changed = m;
        changed[slot] = replacement;
        prop_assert_eq!(
            score(&MetricVector(m), &WeightVector(weights)),
            score(&MetricVector(changed), &WeightVector(weights))
        );
    }

    #[test]
    fn prop_ranking_is_monotonic(values in proptest::collection::vec(-50.0f64..500.0, 1..12)) {
        let devices: Vec<_> = values
            .iter()
            .enumerate()
            .map(|(i, v)| availability_device(&format!("d{i}"), *v))
            .collect();
        let policies = PolicySet::new(ResolutionPath::MultiPolicy)
            .with(PolicyName::Availability, PolicyState::Active(Weight::new(1)));

        let result = rank(Runtime::Braket, &devices, &policies).unwrap();
        let scores: Vec<i64> = result.ranked().iter().map(|d| d.score).collect();
        prop_assert_eq!(scores.len(), values.len());

        match result.direction() {
            RankDirection::Ascending => {
                prop_assert!(scores.windows(2).all(|p| p[0] <= p[1]));
                prop_assert_eq!(result.best_score(), *scores.iter().min().unwrap());
            }
            RankDirection::Descending => {
                prop_assert!(scores.iter().any(|s| *s < 0));
                prop_assert!(scores.windows(2).all(|p| p[0] >= p[1]));
                prop_assert_eq!(result.best_score(), *scores.iter().max().unwrap());
            }
        }
    }

    #[test]
    fn prop_flags_follow_polarity(retention: bool, hosting: bool) {
        let req = qpolicy_hal::PrivacyRequirements {
            data_retention: retention,
            third_party_qpu: hosting,
        };
        let (a, b) = PrivacyPolarity::FlagWhenRequired.flags(&req);
        let (c, d) = PrivacyPolarity::FlagWhenNotRequired.flags(&req);
        prop_assert_eq!(a.value() + c.value(), 1);
        prop_assert_eq!(b.value() + d.value(), 1);
        prop_assert_eq!(a, Flag::from(retention));
    }
}
