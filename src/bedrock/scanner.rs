// Bedrock guardrail scanner.
//
// Binds one ScannerConfig to one guardrail (id + version + region) and one
// direction. On intervention the raw assessments are converted into the typed
// findings tree and collapsed by the shared normalizer; a non-intervened
// response is a clean verdict, whatever findings it might carry.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::client::{ApplyGuardrailRequest, GuardrailClient, HttpGuardrailClient};
use super::params::GuardrailParams;
use crate::config::{OverrideSource, ScannerConfig};
use crate::error::ScanError;
use crate::output::truncate_chars;
use crate::scanner::assessment::{extract_assessment_info, PolicyEntry};
use crate::scanner::direction::{guardrail_source, GuardrailSource};
use crate::scanner::traits::{ScanResult, Scanner};

pub struct BedrockGuardrailScanner {
    config: ScannerConfig,
    params: GuardrailParams,
    source: GuardrailSource,
    client: Arc<dyn GuardrailClient>,
}

impl BedrockGuardrailScanner {
    /// Resolve guardrail parameters (overrides first, then config defaults)
    /// and connect an HTTP client. Fails immediately if any of identity,
    /// version or region is missing.
    pub fn new(config: ScannerConfig, overrides: &dyn OverrideSource) -> Result<Self, ScanError> {
        let mut params = GuardrailParams::resolve(&config.guardrail, overrides)?;
        // The key lives with the HTTP client from here on
        let api_key = params.api_key.take();
        let client = HttpGuardrailClient::new(&params.endpoint_url(), api_key, params.timeout)?;
        Ok(Self::with_client(config, params, Arc::new(client)))
    }

    /// Build a scanner over an existing client (alternative transports, tests).
    pub fn with_client(
        config: ScannerConfig,
        params: GuardrailParams,
        client: Arc<dyn GuardrailClient>,
    ) -> Self {
        let source = guardrail_source(config.scan_for_req_type.as_ref());
        Self {
            config,
            params,
            source,
            client,
        }
    }

    pub fn params(&self) -> &GuardrailParams {
        &self.params
    }

    /// Direction tag sent with every call from this scanner.
    pub fn source(&self) -> GuardrailSource {
        self.source
    }
}

#[async_trait]
impl Scanner for BedrockGuardrailScanner {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn config(&self) -> &ScannerConfig {
        &self.config
    }

    async fn scan(&self, message: &str) -> Result<ScanResult, ScanError> {
        debug!(
            scanner = self.config.name.as_str(),
            source = %self.source,
            request_type = ?self.config.scan_for_req_type,
            message_preview = %truncate_chars(message, 50),
            "Scanning message"
        );

        let request = ApplyGuardrailRequest::text(
            &self.params.guardrail_id,
            &self.params.guardrail_version,
            self.source,
            message,
        );
        let response = self.client.apply_guardrail(&request).await?;

        if !response.intervened() {
            debug!(scanner = self.config.name.as_str(), "No action required");
            return Ok(ScanResult::clean());
        }

        let assessments = response
            .assessments
            .iter()
            .map(PolicyEntry::from_value)
            .collect::<Result<Vec<_>, _>>()?;
        let (traits, actions) = extract_assessment_info(&assessments)?;
        let output_text = response.first_output_text();

        debug!(
            scanner = self.config.name.as_str(),
            traits = ?traits,
            actions = ?actions,
            has_output = output_text.is_some(),
            "Guardrail intervened"
        );

        Ok(ScanResult {
            traits,
            actions,
            output_text,
        })
    }
}
