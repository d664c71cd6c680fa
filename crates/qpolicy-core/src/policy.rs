//! Policy weight resolution.
//!
//! Policies arrive as loosely typed JSON. They are resolved once, at the
//! boundary, into a [`PolicySet`] of explicit [`PolicyState`]s. Everything
//! downstream works on the typed set and its [`WeightVector`].
//!
//! Two request shapes are understood:
//!
//! - **Multi-policy** (`ResolutionPath::MultiPolicy`): keys `money`,
//!   `availability`, `privacy`, `customEnvironment`. A present, non-null
//!   value activates the policy. Values may be objects or JSON strings
//!   holding objects.
//! - **Legacy** (`ResolutionPath::Legacy`): form objects keyed
//!   `moneyPolicy`, `availabilityPolicy`, ... A policy is active when its
//!   form object has exactly one key.

use std::fmt;

use chrono::{DateTime, Utc};
use qpolicy_hal::{DeviceFilter, PrivacyRequirements, Runtime, SignalRequest, Workload, WorkloadProfile};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{PolicyError, PolicyResult};

/// A named evaluation criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PolicyName {
    Money,
    Availability,
    Privacy,
    CustomEnvironment,
}

impl PolicyName {
    pub const ALL: [PolicyName; 4] = [
        PolicyName::Money,
        PolicyName::Availability,
        PolicyName::Privacy,
        PolicyName::CustomEnvironment,
    ];

    /// Key in a multi-policy request.
    pub fn key(self) -> &'static str {
        match self {
            PolicyName::Money => "money",
            PolicyName::Availability => "availability",
            PolicyName::Privacy => "privacy",
            PolicyName::CustomEnvironment => "customEnvironment",
        }
    }

    /// Key of the form object in a legacy request.
    pub fn legacy_key(self) -> &'static str {
        match self {
            PolicyName::Money => "moneyPolicy",
            PolicyName::Availability => "availabilityPolicy",
            PolicyName::Privacy => "privacyPolicy",
            PolicyName::CustomEnvironment => "customEnvironmentPolicy",
        }
    }

    fn weight_key(self) -> &'static str {
        match self {
            PolicyName::Money => "moneyWeight",
            PolicyName::Availability => "availabilityWeight",
            PolicyName::Privacy => "privacyWeight",
            PolicyName::CustomEnvironment => "customEnvironmentWeight",
        }
    }

    /// Whether the policy contributes metric slots to the score.
    pub fn is_scored(self) -> bool {
        !matches!(self, PolicyName::CustomEnvironment)
    }
}

impl fmt::Display for PolicyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Non-negative policy weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Weight(u32);

impl Weight {
    pub const ZERO: Weight = Weight(0);

    pub fn new(value: u32) -> Self {
        Weight(value)
    }

    pub fn value(self) -> i64 {
        i64::from(self.0)
    }

    /// Read a weight from JSON. Fractions are truncated; negative or
    /// non-numeric weights are rejected.
    pub fn from_json(policy: PolicyName, value: &Value) -> PolicyResult<Self> {
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match number {
            Some(n) if n.is_finite() && n >= 0.0 && n <= f64::from(u32::MAX) => {
                Ok(Weight(n.trunc() as u32))
            }
            _ => Err(PolicyError::InvalidPolicy(format!(
                "weight of '{policy}' must be a non-negative number, got {value}"
            ))),
        }
    }
}

/// Resolution of a single policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyState {
    /// Not requested.
    #[default]
    Absent,
    /// Requested but explicitly switched off.
    Disabled,
    /// Requested with a weight.
    Active(Weight),
}

impl PolicyState {
    pub fn is_active(self) -> bool {
        matches!(self, PolicyState::Active(_))
    }

    /// Effective weight, zero unless active.
    pub fn weight(self) -> Weight {
        match self {
            PolicyState::Active(w) => w,
            PolicyState::Absent | PolicyState::Disabled => Weight::ZERO,
        }
    }
}

/// Which request shape a policy set was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPath {
    Legacy,
    MultiPolicy,
}

/// A slot of the fixed-shape metric and weight vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricSlot {
    Cost,
    Availability,
    DataRetention,
    ThirdPartyHosting,
}

impl MetricSlot {
    /// Slots in vector order.
    pub const ALL: [MetricSlot; 4] = [
        MetricSlot::Cost,
        MetricSlot::Availability,
        MetricSlot::DataRetention,
        MetricSlot::ThirdPartyHosting,
    ];

    /// The policy whose weight applies to this slot.
    pub fn policy(self) -> PolicyName {
        match self {
            MetricSlot::Cost => PolicyName::Money,
            MetricSlot::Availability => PolicyName::Availability,
            MetricSlot::DataRetention | MetricSlot::ThirdPartyHosting => PolicyName::Privacy,
        }
    }

    pub fn index(self) -> usize {
        match self {
            MetricSlot::Cost => 0,
            MetricSlot::Availability => 1,
            MetricSlot::DataRetention => 2,
            MetricSlot::ThirdPartyHosting => 3,
        }
    }
}

/// Weights in slot order `[cost, availability, retention, third_party]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightVector(pub [i64; 4]);

impl WeightVector {
    pub fn get(&self, slot: MetricSlot) -> i64 {
        self.0[slot.index()]
    }
}

/// Typed policy configuration of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicySet {
    pub money: PolicyState,
    pub availability: PolicyState,
    pub privacy: PolicyState,
    pub custom_environment: PolicyState,
    /// Requirements carried by an active privacy policy.
    pub privacy_requirements: Option<PrivacyRequirements>,
    /// Resource use carried by an active multi-policy money policy.
    pub workload: Option<WorkloadProfile>,
    pub path: ResolutionPath,
}

impl PolicySet {
    /// A set with every policy absent.
    pub fn new(path: ResolutionPath) -> Self {
        Self {
            money: PolicyState::Absent,
            availability: PolicyState::Absent,
            privacy: PolicyState::Absent,
            custom_environment: PolicyState::Absent,
            privacy_requirements: None,
            workload: None,
            path,
        }
    }

    /// Set the state of one policy.
    pub fn with(mut self, policy: PolicyName, state: PolicyState) -> Self {
        *self.state_mut(policy) = state;
        self
    }

    pub fn with_privacy_requirements(mut self, requirements: PrivacyRequirements) -> Self {
        self.privacy_requirements = Some(requirements);
        self
    }

    pub fn with_workload(mut self, workload: WorkloadProfile) -> Self {
        self.workload = Some(workload);
        self
    }

    pub fn state(&self, policy: PolicyName) -> PolicyState {
        match policy {
            PolicyName::Money => self.money,
            PolicyName::Availability => self.availability,
            PolicyName::Privacy => self.privacy,
            PolicyName::CustomEnvironment => self.custom_environment,
        }
    }

    fn state_mut(&mut self, policy: PolicyName) -> &mut PolicyState {
        match policy {
            PolicyName::Money => &mut self.money,
            PolicyName::Availability => &mut self.availability,
            PolicyName::Privacy => &mut self.privacy,
            PolicyName::CustomEnvironment => &mut self.custom_environment,
        }
    }

    pub fn is_active(&self, policy: PolicyName) -> bool {
        self.state(policy).is_active()
    }

    pub fn any_active(&self) -> bool {
        PolicyName::ALL.into_iter().any(|p| self.is_active(p))
    }

    /// Active policies, in declaration order.
    pub fn active(&self) -> Vec<PolicyName> {
        PolicyName::ALL
            .into_iter()
            .filter(|p| self.is_active(*p))
            .collect()
    }

    /// Weight vector aligned with the metric slots. Both privacy slots reuse
    /// the privacy weight.
    pub fn weights(&self) -> WeightVector {
        let mut weights = [0i64; 4];
        for slot in MetricSlot::ALL {
            weights[slot.index()] = self.state(slot.policy()).weight().value();
        }
        WeightVector(weights)
    }

    /// Whether programs need a customized execution environment.
    pub fn custom_environment_required(&self) -> bool {
        self.is_active(PolicyName::CustomEnvironment)
    }

    /// Only the availability policy is active.
    pub fn availability_only(&self) -> bool {
        self.is_active(PolicyName::Availability)
            && !self.is_active(PolicyName::Money)
            && !self.is_active(PolicyName::Privacy)
    }

    /// Whether a runtime may take part in this evaluation.
    ///
    /// A required custom environment excludes runtimes that cannot host one.
    /// On the legacy path an active money policy restricts the evaluation to
    /// the time-windowed runtime, the only one with per-shot pricing.
    pub fn is_eligible(&self, runtime: Runtime) -> bool {
        if self.custom_environment_required() && !runtime.supports_custom_environment() {
            return false;
        }
        if self.path == ResolutionPath::Legacy
            && self.is_active(PolicyName::Money)
            && runtime != Runtime::Braket
        {
            return false;
        }
        true
    }

    /// Discovery constraints for this policy set. On the legacy path a
    /// required custom environment also rules out simulators.
    pub fn device_filter(&self, at: DateTime<Utc>, simulators_allowed: bool) -> DeviceFilter {
        let legacy_custom = self.path == ResolutionPath::Legacy && self.custom_environment_required();
        DeviceFilter::new(at)
            .with_simulators(simulators_allowed && !legacy_custom)
            .with_custom_environment(self.custom_environment_required())
    }

    /// Signals the providers must gather. Only active policies ask for
    /// signals; a money policy without a workload leaves the cost signal
    /// missing.
    pub fn signal_request(&self, filter: DeviceFilter, workload: Option<Workload>) -> SignalRequest {
        let workload = workload.or(self.workload.map(Workload::Profile));
        SignalRequest {
            filter,
            availability: self.is_active(PolicyName::Availability),
            workload: workload.filter(|_| self.is_active(PolicyName::Money)),
            privacy: self
                .privacy_requirements
                .filter(|_| self.is_active(PolicyName::Privacy)),
        }
    }

    /// Resolve a multi-policy request object.
    pub fn from_multi_policy(request: &Value) -> PolicyResult<Self> {
        let request = request.as_object().ok_or_else(|| {
            PolicyError::InvalidPolicy("policy request must be a JSON object".to_string())
        })?;

        let mut set = PolicySet::new(ResolutionPath::MultiPolicy);
        for policy in PolicyName::ALL {
            let Some(body) = policy_body(policy, request.get(policy.key()))? else {
                continue;
            };
            let state = multi_policy_state(policy, &body)?;
            *set.state_mut(policy) = state;

            if !state.is_active() {
                continue;
            }
            if let PolicyBody::Object(map) = &body {
                match policy {
                    PolicyName::Privacy => {
                        set.privacy_requirements = Some(privacy_requirements(map)?);
                    }
                    PolicyName::Money => set.workload = workload_profile(map)?,
                    PolicyName::Availability | PolicyName::CustomEnvironment => {}
                }
            }
        }

        if !set.any_active() {
            return Err(PolicyError::InvalidPolicy(
                "no policy provided for evaluation".to_string(),
            ));
        }

        debug!("Resolved multi-policy set: active {:?}", set.active());
        Ok(set)
    }

    /// Resolve legacy form objects keyed by `moneyPolicy`,
    /// `availabilityPolicy`, `privacyPolicy` and `customEnvironmentPolicy`.
    pub fn from_legacy(forms: &Map<String, Value>) -> PolicyResult<Self> {
        let mut set = PolicySet::new(ResolutionPath::Legacy);

        let form = |policy: PolicyName| -> PolicyResult<Map<String, Value>> {
            match policy_body(policy, forms.get(policy.legacy_key()))? {
                Some(PolicyBody::Object(map)) => Ok(map),
                Some(PolicyBody::Flag(_)) => Err(PolicyError::InvalidPolicy(format!(
                    "'{}' must be an object",
                    policy.legacy_key()
                ))),
                None => Ok(Map::new()),
            }
        };

        let money = form(PolicyName::Money)?;
        let custom = form(PolicyName::CustomEnvironment)?;

        for policy in [
            PolicyName::Money,
            PolicyName::Availability,
            PolicyName::Privacy,
        ] {
            let map = form(policy)?;
            if map.len() != 1 {
                continue;
            }
            let inner = map
                .get(policy.legacy_key())
                .and_then(Value::as_object)
                .ok_or_else(|| {
                    PolicyError::InvalidPolicy(format!(
                        "'{}' form must hold a '{}' object",
                        policy.legacy_key(),
                        policy.legacy_key()
                    ))
                })?;
            let weight = inner.get("weight").ok_or_else(|| {
                PolicyError::InvalidPolicy(format!("'{}' has no weight", policy.legacy_key()))
            })?;
            *set.state_mut(policy) = PolicyState::Active(Weight::from_json(policy, weight)?);

            if policy == PolicyName::Privacy {
                set.privacy_requirements = Some(privacy_requirements(inner)?);
            }
        }

        if custom.len() > 1 || money.len() > 1 {
            set.custom_environment = PolicyState::Active(Weight::ZERO);
        }

        debug!("Resolved legacy policy set: active {:?}", set.active());
        Ok(set)
    }
}

/// A policy value after unwrapping JSON strings.
enum PolicyBody {
    Object(Map<String, Value>),
    Flag(bool),
}

fn policy_body(policy: PolicyName, value: Option<&Value>) -> PolicyResult<Option<PolicyBody>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) => {
            let parsed: Value = serde_json::from_str(raw).map_err(|e| {
                PolicyError::InvalidPolicy(format!("'{policy}' is not valid JSON: {e}"))
            })?;
            match parsed {
                Value::String(_) => Err(PolicyError::InvalidPolicy(format!(
                    "'{policy}' must be an object"
                ))),
                other => policy_body(policy, Some(&other)),
            }
        }
        Some(Value::Object(map)) => Ok(Some(PolicyBody::Object(map.clone()))),
        Some(Value::Bool(flag)) => Ok(Some(PolicyBody::Flag(*flag))),
        Some(other) => Err(PolicyError::InvalidPolicy(format!(
            "'{policy}' must be an object, got {other}"
        ))),
    }
}

fn multi_policy_state(policy: PolicyName, body: &PolicyBody) -> PolicyResult<PolicyState> {
    match body {
        PolicyBody::Flag(false) => Ok(PolicyState::Disabled),
        PolicyBody::Flag(true) if !policy.is_scored() => Ok(PolicyState::Active(Weight::ZERO)),
        PolicyBody::Flag(true) => Err(PolicyError::InvalidPolicy(format!(
            "'{policy}' needs a weight"
        ))),
        PolicyBody::Object(map) => {
            if map.get("active") == Some(&Value::Bool(false)) {
                return Ok(PolicyState::Disabled);
            }
            match map.get("weight").or_else(|| map.get(policy.weight_key())) {
                Some(weight) => Ok(PolicyState::Active(Weight::from_json(policy, weight)?)),
                None if !policy.is_scored() => Ok(PolicyState::Active(Weight::ZERO)),
                None => Err(PolicyError::InvalidPolicy(format!(
                    "'{policy}' has no weight"
                ))),
            }
        }
    }
}

fn privacy_requirements(map: &Map<String, Value>) -> PolicyResult<PrivacyRequirements> {
    let source = map
        .get("privacyPolicy")
        .and_then(Value::as_object)
        .unwrap_or(map);

    let flag = |key: &str| -> PolicyResult<bool> {
        match source.get(key) {
            Some(Value::Bool(b)) => Ok(*b),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Ok(true),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Ok(false),
            Some(other) => Err(PolicyError::InvalidPolicy(format!(
                "privacy '{key}' must be true or false, got {other}"
            ))),
            None => Err(PolicyError::InvalidPolicy(format!(
                "privacy policy has no '{key}'"
            ))),
        }
    };

    Ok(PrivacyRequirements {
        data_retention: flag("dataRetention")?,
        third_party_qpu: flag("thirdPartyQPU")?,
    })
}

const PROFILE_KEYS: [&str; 8] = [
    "classicalSeconds",
    "quantumSeconds",
    "shots",
    "tasks",
    "sumExecutionTimeClassical",
    "sumExecutionTimeQuantum",
    "sumNumberOfQuantumShots",
    "sumNumberOfQuantumTasks",
];

fn workload_profile(map: &Map<String, Value>) -> PolicyResult<Option<WorkloadProfile>> {
    let has_profile = map
        .keys()
        .any(|k| PROFILE_KEYS.contains(&k.as_str()) || k == "sumNumberOfQuantumTaks");
    if !has_profile {
        return Ok(None);
    }
    serde_json::from_value(Value::Object(map.clone()))
        .map(Some)
        .map_err(|e| PolicyError::InvalidPolicy(format!("money policy workload: {e}")))
}
