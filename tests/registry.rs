// Registry tests: construction from config and fan-out behavior.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use shieldscan::config::ScannerConfig;
use shieldscan::registry::ScannerRegistry;
use shieldscan::scanner::direction::{guardrail_source, GuardrailSource, RequestType};
use shieldscan::{ScanError, ScanResult, Scanner};

/// Scanner that returns a fixed verdict (or a backend failure).
struct FixedScanner {
    config: ScannerConfig,
    traits: Vec<&'static str>,
    fail: bool,
}

#[async_trait]
impl Scanner for FixedScanner {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn config(&self) -> &ScannerConfig {
        &self.config
    }

    async fn scan(&self, _message: &str) -> Result<ScanResult, ScanError> {
        if self.fail {
            return Err(ScanError::BackendUnavailable("throttled".to_string()));
        }
        let mut result = ScanResult::clean();
        for tag in &self.traits {
            result.traits.insert(tag.to_string());
            result.actions.insert("BLOCKED".to_string());
        }
        Ok(result)
    }
}

fn fixed(name: &str, request_type: RequestType, traits: Vec<&'static str>) -> Arc<dyn Scanner> {
    Arc::new(FixedScanner {
        config: ScannerConfig::new(name).bound_to(request_type),
        traits,
        fail: false,
    })
}

fn no_overrides() -> HashMap<String, String> {
    HashMap::new()
}

fn configs(json: &str) -> Vec<ScannerConfig> {
    serde_json::from_str(json).unwrap()
}

// ============================================================
// Construction
// ============================================================

#[test]
fn one_instance_per_request_type() {
    let configs = configs(
        r#"[{
            "name": "bedrock",
            "request_types": ["prompt", "reply", "rag"],
            "guardrail": {"guardrail_id": "gr-1", "guardrail_version": "1", "region": "us-east-1"}
        }]"#,
    );
    let registry = ScannerRegistry::from_configs(&configs, &no_overrides()).unwrap();
    assert_eq!(registry.len(), 3);

    let sources: Vec<GuardrailSource> = registry
        .scanners()
        .iter()
        .map(|s| guardrail_source(s.config().scan_for_req_type.as_ref()))
        .collect();
    assert_eq!(
        sources,
        vec![
            GuardrailSource::Input,
            GuardrailSource::Output,
            GuardrailSource::Input
        ]
    );
}

#[test]
fn disabled_scanners_are_skipped() {
    let configs = configs(
        r#"[{
            "name": "off",
            "enable": false,
            "request_types": ["prompt"]
        }]"#,
    );
    // Disabled scanners aren't built, so their missing parameters don't matter
    let registry = ScannerRegistry::from_configs(&configs, &no_overrides()).unwrap();
    assert!(registry.is_empty());
}

#[test]
fn missing_parameter_fails_the_whole_registry() {
    let configs = configs(
        r#"[
            {
                "name": "good",
                "request_types": ["prompt"],
                "guardrail": {"guardrail_id": "gr-1", "guardrail_version": "1", "region": "us-east-1"}
            },
            {
                "name": "bad",
                "request_types": ["reply"],
                "guardrail": {"guardrail_id": "gr-2", "guardrail_version": "1"}
            }
        ]"#,
    );
    let err = ScannerRegistry::from_configs(&configs, &no_overrides())
        .err()
        .unwrap();
    assert!(matches!(err, ScanError::Configuration(_)));
    assert!(err.to_string().contains("region"));
}

#[test]
fn overrides_apply_to_every_scanner() {
    let configs = configs(r#"[{"name": "bedrock", "request_types": ["prompt"]}]"#);
    let overrides: HashMap<String, String> = [
        ("BEDROCK_GUARDRAIL_ID", "gr-env"),
        ("BEDROCK_GUARDRAIL_VERSION", "2"),
        ("BEDROCK_REGION", "ap-south-1"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let registry = ScannerRegistry::from_configs(&configs, &overrides).unwrap();
    assert_eq!(registry.len(), 1);
}

// ============================================================
// Fan-out
// ============================================================

#[tokio::test]
async fn only_matching_request_type_runs() {
    let mut registry = ScannerRegistry::new();
    registry.register(fixed("prompt_scanner", RequestType::Prompt, vec!["HATE"]));
    registry.register(fixed("reply_scanner", RequestType::Reply, vec!["PII_EMAIL"]));

    let outcomes = registry.scan("text", &RequestType::Reply).await;
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].scanner, "reply_scanner");
    assert_eq!(outcomes[0].request_type, RequestType::Reply);
    assert!(outcomes[0].result.as_ref().unwrap().traits.contains("PII_EMAIL"));
}

#[tokio::test]
async fn failure_does_not_hide_other_results() {
    let mut registry = ScannerRegistry::new();
    registry.register(Arc::new(FixedScanner {
        config: ScannerConfig::new("flaky").bound_to(RequestType::Prompt),
        traits: vec![],
        fail: true,
    }));
    registry.register(fixed("steady", RequestType::Prompt, vec!["INSULTS"]));

    let outcomes = registry.scan("text", &RequestType::Prompt).await;
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].scanner, "flaky");
    assert!(matches!(
        outcomes[0].result,
        Err(ScanError::BackendUnavailable(_))
    ));
    assert!(outcomes[1].result.as_ref().unwrap().intervened());
}

#[tokio::test]
async fn enforcement_flag_controls_blocking() {
    let mut audit_config = ScannerConfig::new("audit_only").bound_to(RequestType::Prompt);
    audit_config.enforce_access_control = false;

    let mut registry = ScannerRegistry::new();
    registry.register(Arc::new(FixedScanner {
        config: audit_config,
        traits: vec!["HATE"],
        fail: false,
    }));
    registry.register(fixed("enforcing_clean", RequestType::Prompt, vec![]));

    let outcomes = registry.scan("text", &RequestType::Prompt).await;
    assert!(outcomes[0].result.as_ref().unwrap().intervened());
    assert!(!outcomes[0].enforced_intervention());
    assert!(!outcomes[1].enforced_intervention());

    registry.register(fixed("enforcing_hit", RequestType::Prompt, vec!["HATE"]));
    let outcomes = registry.scan("text", &RequestType::Prompt).await;
    assert!(outcomes[2].enforced_intervention());
}

#[tokio::test]
async fn no_scanners_for_type_yields_no_outcomes() {
    let mut registry = ScannerRegistry::new();
    registry.register(fixed("prompt_scanner", RequestType::Prompt, vec!["HATE"]));

    let outcomes = registry.scan("text", &RequestType::Rag).await;
    assert!(outcomes.is_empty());
}
