// Resolved connection parameters for one Bedrock guardrail.
//
// Identity, version and region come from the scanner config with
// per-field overrides (normally the process environment). All three are
// required; resolution happens when the scanner is built, not on first scan.

use std::time::Duration;

use secrecy::SecretString;

use crate::config::{resolve_param, GuardrailSettings, OverrideSource};
use crate::error::ScanError;

pub const GUARDRAIL_ID_KEY: &str = "BEDROCK_GUARDRAIL_ID";
pub const GUARDRAIL_VERSION_KEY: &str = "BEDROCK_GUARDRAIL_VERSION";
pub const REGION_KEY: &str = "BEDROCK_REGION";
/// Bedrock API key, sent as a bearer token when present.
pub const API_KEY_KEY: &str = "AWS_BEARER_TOKEN_BEDROCK";

#[derive(Debug)]
pub struct GuardrailParams {
    pub guardrail_id: String,
    pub guardrail_version: String,
    pub region: String,
    pub endpoint: Option<String>,
    pub api_key: Option<SecretString>,
    pub timeout: Option<Duration>,
}

impl GuardrailParams {
    pub fn resolve(
        settings: &GuardrailSettings,
        overrides: &dyn OverrideSource,
    ) -> Result<Self, ScanError> {
        let guardrail_id = resolve_param(
            overrides,
            GUARDRAIL_ID_KEY,
            settings.guardrail_id.as_deref(),
            "Bedrock Guardrail ID",
        )?;
        let guardrail_version = resolve_param(
            overrides,
            GUARDRAIL_VERSION_KEY,
            settings.guardrail_version.as_deref(),
            "Bedrock Guardrail version",
        )?;
        let region = resolve_param(
            overrides,
            REGION_KEY,
            settings.region.as_deref(),
            "Bedrock Guardrail region",
        )?;

        let api_key = overrides
            .get(API_KEY_KEY)
            .filter(|key| !key.is_empty())
            .map(SecretString::from);

        Ok(Self {
            guardrail_id,
            guardrail_version,
            region,
            endpoint: settings.endpoint.clone().filter(|e| !e.is_empty()),
            api_key,
            timeout: settings.timeout_secs.map(Duration::from_secs),
        })
    }

    /// Base URL of the runtime API: the configured endpoint, or the regional default.
    pub fn endpoint_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://bedrock-runtime.{}.amazonaws.com", self.region),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn settings() -> GuardrailSettings {
        GuardrailSettings {
            guardrail_id: Some("gr-default".to_string()),
            guardrail_version: Some("1".to_string()),
            region: Some("us-east-1".to_string()),
            endpoint: None,
            timeout_secs: Some(5),
        }
    }

    #[test]
    fn test_resolve_from_defaults() {
        let params = GuardrailParams::resolve(&settings(), &HashMap::<String, String>::new()).unwrap();
        assert_eq!(params.guardrail_id, "gr-default");
        assert_eq!(params.guardrail_version, "1");
        assert_eq!(params.region, "us-east-1");
        assert!(params.api_key.is_none());
        assert_eq!(params.timeout, Some(Duration::from_secs(5)));
        assert_eq!(
            params.endpoint_url(),
            "https://bedrock-runtime.us-east-1.amazonaws.com"
        );
    }

    #[test]
    fn test_api_key_comes_from_overrides() {
        let overrides: HashMap<String, String> =
            [(API_KEY_KEY.to_string(), "secret-token".to_string())].into();
        let params = GuardrailParams::resolve(&settings(), &overrides).unwrap();
        let key = params.api_key.as_ref().unwrap();
        assert_eq!(key.expose_secret(), "secret-token");
        assert!(!format!("{params:?}").contains("secret-token"));
    }

    #[test]
    fn test_explicit_endpoint_wins_over_region() {
        let mut s = settings();
        s.endpoint = Some("http://127.0.0.1:8080".to_string());
        let params = GuardrailParams::resolve(&s, &HashMap::<String, String>::new()).unwrap();
        assert_eq!(params.endpoint_url(), "http://127.0.0.1:8080");
    }
}
