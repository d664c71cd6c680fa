//! Shared helpers for CLI commands.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Deserialize;
use serde_json::{Map, Value};

use qpolicy_adapter_braket::{BraketProvider, DeviceDocument};
use qpolicy_adapter_ibm::{BackendSnapshot, IbmProvider};
use qpolicy_analysis::{tally_bundle, tally_program};
use qpolicy_core::{EngineConfig, MetricNormalizer, PolicyError, PolicyResult, PolicySet};
use qpolicy_hal::{ProviderRegistry, Workload};

/// Output format of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// An evaluation request file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    /// Multi-policy object (`money`, `availability`, `privacy`,
    /// `customEnvironment`).
    #[serde(default)]
    pub policies: Option<Value>,
    /// Legacy form objects (`moneyPolicy`, `availabilityPolicy`, ...).
    #[serde(default)]
    pub legacy_policies: Option<Map<String, Value>>,
    #[serde(default = "default_simulators_allowed")]
    pub simulators_allowed: bool,
    /// Evaluation instant; now when absent.
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,
    /// Program to estimate shot costs from.
    #[serde(default)]
    pub program: Option<PathBuf>,
    /// Extracted program bundle to estimate shot costs from.
    #[serde(default)]
    pub bundle: Option<PathBuf>,
    #[serde(default)]
    pub braket_devices: Vec<DeviceDocument>,
    #[serde(default)]
    pub ibm_backends: Vec<BackendSnapshot>,
}

fn default_simulators_allowed() -> bool {
    true
}

impl EvaluationRequest {
    /// Resolve the policy set from whichever request shape is present.
    pub fn policy_set(&self) -> PolicyResult<PolicySet> {
        match (&self.policies, &self.legacy_policies) {
            (Some(policies), None) => PolicySet::from_multi_policy(policies),
            (None, Some(forms)) => PolicySet::from_legacy(forms),
            (Some(_), Some(_)) => Err(PolicyError::InvalidPolicy(
                "request has both 'policies' and 'legacyPolicies'".to_string(),
            )),
            (None, None) => Err(PolicyError::InvalidPolicy(
                "request has no policies".to_string(),
            )),
        }
    }

    pub fn at(&self) -> DateTime<Utc> {
        self.at.unwrap_or_else(Utc::now)
    }

    /// Statically counted workload of the referenced program or bundle.
    /// Relative paths resolve against `base`.
    pub fn program_workload(&self, base: &Path) -> PolicyResult<Option<Workload>> {
        let tally = match (&self.program, &self.bundle) {
            (Some(program), _) => tally_program(&base.join(program))?,
            (None, Some(bundle)) => tally_bundle(&base.join(bundle))?.total()?,
            (None, None) => return Ok(None),
        };
        Ok(Some(Workload::Program(tally)))
    }

    /// Registry holding one provider per runtime snapshot in the request.
    pub fn registry(&self, config: &EngineConfig) -> ProviderRegistry {
        let normalizer = MetricNormalizer::new(config);
        let mut registry = ProviderRegistry::new();
        registry.register(BraketProvider::new(
            self.braket_devices.clone(),
            normalizer.clone(),
        ));
        registry.register(IbmProvider::new(self.ibm_backends.clone(), normalizer));
        registry
    }
}

/// Load a request file. Returns the request and the directory relative
/// paths in it resolve against.
pub fn load_request(path: &Path) -> Result<(EvaluationRequest, PathBuf)> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }

    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read request: {}", path.display()))?;
    let request: EvaluationRequest = serde_json::from_str(&source)
        .with_context(|| format!("Invalid request: {}", path.display()))?;

    let base = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok((request, base))
}

/// Load engine configuration: `.env`, then the optional file, then
/// `QPOLICY_*` variables.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    EngineConfig::load(path).map_err(|e| anyhow::anyhow!("Failed to load configuration: {e}"))
}
