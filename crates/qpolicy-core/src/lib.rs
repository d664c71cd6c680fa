//! qpolicy decision engine
//!
//! Chooses the runtime (and device) that best satisfies a weighted set of
//! user policies for a hybrid quantum-classical job.
//!
//! # Pipeline
//!
//! | Stage | Module | Output |
//! |-------|--------|--------|
//! | Resolve policies | [`policy`] | [`PolicySet`], [`WeightVector`] |
//! | Normalize provider data | [`normalize`] | [`DeviceMetrics`](qpolicy_hal::DeviceMetrics) |
//! | Score and rank | [`scoring`] | [`RuntimeResult`] per runtime |
//! | Select | [`selector`] | [`SelectionResult`] |
//!
//! [`Evaluator`] ties the stages together once the candidates of every
//! runtime have been gathered.
//!
//! # Example
//!
//! ```
//! use qpolicy_core::{PolicySet, SelectionResult, evaluate};
//! use qpolicy_hal::{DeviceInfo, DeviceMetrics, DeviceSignals, Runtime, RuntimeCandidates};
//! use serde_json::json;
//!
//! let policies = PolicySet::from_multi_policy(&json!({
//!     "availability": { "weight": 1 },
//!     "privacy": { "weight": 2, "dataRetention": false, "thirdPartyQPU": false },
//! }))
//! .unwrap();
//!
//! let device = |name: &str, availability: f64| DeviceSignals {
//!     device: DeviceInfo::new(name, name, false),
//!     metrics: DeviceMetrics {
//!         availability: Some(availability),
//!         data_retention: Some(false.into()),
//!         third_party_hosting: Some(false.into()),
//!         ..DeviceMetrics::default()
//!     },
//! };
//!
//! let candidates = vec![
//!     RuntimeCandidates::new(Runtime::Braket, vec![device("Lucy", 8.0)]),
//!     RuntimeCandidates::new(Runtime::Qiskit, vec![device("ibm_lagos", 3.0)]),
//! ];
//!
//! match evaluate(&policies, &candidates).unwrap() {
//!     SelectionResult::Winner(best) => assert_eq!(best.device.name, "Lucy"),
//!     other => panic!("unexpected outcome {other:?}"),
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod policy;
pub mod scoring;
pub mod selector;

pub use config::{
    AvailabilityConfig, ConfigError, CostConfig, EngineConfig, LoggingConfig, SelectionConfig,
};
pub use engine::{Evaluator, evaluate};
pub use error::{ErrorKind, Failure, PolicyError, PolicyResult};
pub use normalize::{MetricNormalizer, PriceRule, PrivacyPolarity};
pub use policy::{
    MetricSlot, PolicyName, PolicySet, PolicyState, ResolutionPath, Weight, WeightVector,
};
pub use scoring::{MetricVector, RankDirection, RuntimeResult, ScoredDevice, metric_vector, rank, score};
pub use selector::{SelectionResult, SelectionStrategy, describe, select};
