use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use tracing::error;

use crate::error::ScanError;
use crate::scanner::direction::RequestType;

/// Which guardrail backend a scanner talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScannerKind {
    /// Amazon Bedrock ApplyGuardrail
    #[default]
    BedrockGuardrail,
}

/// Backend connection defaults. Identity, version and region can each be
/// overridden at construction time (see [`resolve_param`]).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuardrailSettings {
    pub guardrail_id: Option<String>,
    pub guardrail_version: Option<String>,
    pub region: Option<String>,
    /// Base URL override (local gateways, VPC endpoints). Derived from the
    /// region when unset.
    pub endpoint: Option<String>,
    /// Per-request HTTP timeout. No timeout when unset.
    pub timeout_secs: Option<u64>,
}

/// Configuration for one scanner, read once at startup and never mutated.
#[derive(Debug, Clone, Deserialize)]
pub struct ScannerConfig {
    pub name: String,
    #[serde(default)]
    pub kind: ScannerKind,
    /// Request types this scanner applies to, in configured order, no duplicates.
    #[serde(default, deserialize_with = "dedup_request_types")]
    pub request_types: Vec<RequestType>,
    /// The request type this instance scans. Set by the registry from
    /// `request_types`; an unbound scanner classifies as output.
    #[serde(default)]
    pub scan_for_req_type: Option<RequestType>,
    #[serde(default = "default_true")]
    pub enforce_access_control: bool,
    #[serde(default = "default_true")]
    pub enable: bool,
    #[serde(default)]
    pub guardrail: GuardrailSettings,
}

impl ScannerConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ScannerKind::default(),
            request_types: Vec::new(),
            scan_for_req_type: None,
            enforce_access_control: true,
            enable: true,
            guardrail: GuardrailSettings::default(),
        }
    }

    /// A copy of this config bound to scan one request type.
    pub fn bound_to(&self, request_type: RequestType) -> Self {
        Self {
            scan_for_req_type: Some(request_type),
            ..self.clone()
        }
    }
}

fn default_true() -> bool {
    true
}

fn dedup_request_types<'de, D>(deserializer: D) -> std::result::Result<Vec<RequestType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<RequestType>::deserialize(deserializer)?;
    let mut unique = Vec::with_capacity(raw.len());
    for request_type in raw {
        if !unique.contains(&request_type) {
            unique.push(request_type);
        }
    }
    Ok(unique)
}

/// A key/value source whose values take precedence over config defaults.
pub trait OverrideSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// Overrides read from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvOverrides;

impl OverrideSource for EnvOverrides {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

impl OverrideSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// Resolve one required backend parameter: a non-empty override wins, then a
/// non-empty default; otherwise construction fails naming `field`.
pub fn resolve_param(
    overrides: &dyn OverrideSource,
    key: &str,
    default: Option<&str>,
    field: &str,
) -> std::result::Result<String, ScanError> {
    if let Some(value) = overrides.get(key).filter(|v| !v.is_empty()) {
        return Ok(value);
    }
    match default.filter(|v| !v.is_empty()) {
        Some(value) => Ok(value.to_string()),
        None => {
            error!(field, key, "Required guardrail parameter not configured");
            Err(ScanError::missing(field))
        }
    }
}

/// Load the scanner list from a JSON file (an array of scanner objects).
pub fn load_scanner_configs(path: &Path) -> Result<Vec<ScannerConfig>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scanner config at {}", path.display()))?;
    let configs: Vec<ScannerConfig> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse scanner config at {}", path.display()))?;
    Ok(configs)
}

/// Application settings loaded from environment variables.
///
/// The .env file is loaded at startup via dotenvy, so backend overrides
/// (BEDROCK_GUARDRAIL_ID etc.) can live there too.
pub struct Settings {
    /// Scanner definitions file (SHIELDSCAN_CONFIG, default ./scanners.json)
    pub scanners_path: PathBuf,
    /// Default number of messages scanned in parallel by `scan-batch`
    pub concurrency: usize,
}

impl Settings {
    pub fn load() -> Result<Self> {
        let scanners_path = env::var("SHIELDSCAN_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./scanners.json"));

        let concurrency = match env::var("SHIELDSCAN_CONCURRENCY") {
            Ok(raw) => raw
                .parse::<usize>()
                .with_context(|| format!("SHIELDSCAN_CONCURRENCY is not a number: {raw}"))?
                .max(1),
            Err(_) => 4,
        };

        Ok(Self {
            scanners_path,
            concurrency,
        })
    }
}
