// HTTP client for Bedrock's ApplyGuardrail operation.
//
// POST {endpoint}/guardrail/{id}/version/{version}/apply with a JSON body of
// `{source, content}`. Only the fields the scanner reads are modelled on the
// response side; assessments stay as raw JSON until the scanner converts them
// into the typed findings tree.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::ScanError;
use crate::scanner::direction::GuardrailSource;

/// Disposition reported when at least one policy fired.
pub const GUARDRAIL_INTERVENED: &str = "GUARDRAIL_INTERVENED";

/// Outbound contract to a guardrail backend. Implementations must be safe to
/// share across concurrent scans.
#[async_trait]
pub trait GuardrailClient: Send + Sync {
    async fn apply_guardrail(
        &self,
        request: &ApplyGuardrailRequest,
    ) -> Result<ApplyGuardrailResponse, ScanError>;
}

/// One ApplyGuardrail call. Identifier and version travel in the URL path.
#[derive(Debug, Clone, Serialize)]
pub struct ApplyGuardrailRequest {
    #[serde(skip)]
    pub guardrail_identifier: String,
    #[serde(skip)]
    pub guardrail_version: String,
    pub source: GuardrailSource,
    pub content: Vec<GuardrailContentBlock>,
}

impl ApplyGuardrailRequest {
    /// A request carrying `message` as a single text content block.
    pub fn text(
        guardrail_identifier: &str,
        guardrail_version: &str,
        source: GuardrailSource,
        message: &str,
    ) -> Self {
        Self {
            guardrail_identifier: guardrail_identifier.to_string(),
            guardrail_version: guardrail_version.to_string(),
            source,
            content: vec![GuardrailContentBlock {
                text: GuardrailTextBlock {
                    text: message.to_string(),
                },
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GuardrailContentBlock {
    pub text: GuardrailTextBlock,
}

#[derive(Debug, Clone, Serialize)]
pub struct GuardrailTextBlock {
    pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplyGuardrailResponse {
    /// `GUARDRAIL_INTERVENED` or `NONE`
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub outputs: Vec<GuardrailOutput>,
    #[serde(default)]
    pub assessments: Vec<Value>,
}

impl ApplyGuardrailResponse {
    pub fn intervened(&self) -> bool {
        self.action == GUARDRAIL_INTERVENED
    }

    /// Text of the first output entry, if the backend returned any.
    pub fn first_output_text(&self) -> Option<String> {
        self.outputs.first().and_then(|output| output.text.clone())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuardrailOutput {
    #[serde(default)]
    pub text: Option<String>,
}

/// reqwest-backed client. `reqwest::Client` pools connections internally and
/// is cheap to share, so one instance serves all concurrent scans.
#[derive(Debug)]
pub struct HttpGuardrailClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<SecretString>,
}

impl HttpGuardrailClient {
    pub fn new(
        base_url: &str,
        api_key: Option<SecretString>,
        timeout: Option<Duration>,
    ) -> Result<Self, ScanError> {
        let parsed = Url::parse(base_url).map_err(|e| {
            ScanError::Configuration(format!("Invalid guardrail endpoint {base_url}: {e}"))
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ScanError::Configuration(format!(
                "Guardrail endpoint {base_url} cannot be used as a base URL"
            )));
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("shieldscan/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ScanError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: parsed,
            api_key,
        })
    }

    /// Build the apply URL. Path segments are percent-encoded because
    /// identifiers may be full ARNs containing `/`.
    pub fn apply_url(&self, guardrail_id: &str, guardrail_version: &str) -> Result<Url, ScanError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ScanError::Configuration(format!(
                    "Guardrail endpoint {} cannot be used as a base URL",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["guardrail", guardrail_id, "version", guardrail_version, "apply"]);
        Ok(url)
    }
}

#[async_trait]
impl GuardrailClient for HttpGuardrailClient {
    async fn apply_guardrail(
        &self,
        request: &ApplyGuardrailRequest,
    ) -> Result<ApplyGuardrailResponse, ScanError> {
        let url = self.apply_url(&request.guardrail_identifier, &request.guardrail_version)?;

        let mut builder = self.client.post(url).json(request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key.expose_secret());
        }

        let response = builder.send().await.map_err(|e| {
            let reason = if e.is_timeout() { "timed out" } else { "failed" };
            ScanError::BackendUnavailable(format!("ApplyGuardrail request {reason}: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScanError::BackendUnavailable(format!(
                "ApplyGuardrail returned {status}: {body}"
            )));
        }

        let parsed = response.json::<ApplyGuardrailResponse>().await.map_err(|e| {
            ScanError::BackendUnavailable(format!("Failed to parse ApplyGuardrail response: {e}"))
        })?;

        debug!(
            action = parsed.action.as_str(),
            outputs = parsed.outputs.len(),
            assessments = parsed.assessments.len(),
            "ApplyGuardrail response received"
        );

        Ok(parsed)
    }
}
