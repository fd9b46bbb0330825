// Scan direction: whether a message came from the requester (input) or is
// being returned to them (output). Guardrail backends apply different policy
// rules per direction, so every call is tagged with one.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of message a scanner is bound to.
///
/// Unrecognized values are kept as `Other` rather than rejected, and are
/// classified as output like every other non-input type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RequestType {
    /// The user's prompt as submitted
    Prompt,
    /// The model's reply
    Reply,
    /// A prompt after context enrichment
    EnrichedPrompt,
    /// Retrieved documents injected into the prompt
    Rag,
    Other(String),
}

impl RequestType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Prompt => "prompt",
            Self::Reply => "reply",
            Self::EnrichedPrompt => "enriched_prompt",
            Self::Rag => "rag",
            Self::Other(value) => value.as_str(),
        }
    }

    /// True for the request types evaluated with input-direction rules.
    pub fn is_input(&self) -> bool {
        matches!(self, Self::Prompt | Self::EnrichedPrompt | Self::Rag)
    }
}

impl From<String> for RequestType {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prompt" => Self::Prompt,
            "reply" => Self::Reply,
            "enriched_prompt" => Self::EnrichedPrompt,
            "rag" => Self::Rag,
            _ => Self::Other(value.trim().to_string()),
        }
    }
}

impl From<&str> for RequestType {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<RequestType> for String {
    fn from(value: RequestType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction tag sent to the guardrail backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GuardrailSource {
    Input,
    Output,
}

impl GuardrailSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "INPUT",
            Self::Output => "OUTPUT",
        }
    }
}

impl fmt::Display for GuardrailSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify the request type a scanner is bound to.
///
/// `Prompt`, `EnrichedPrompt` and `Rag` are input; everything else, including
/// an unbound scanner, is output.
pub fn guardrail_source(request_type: Option<&RequestType>) -> GuardrailSource {
    match request_type {
        Some(request_type) if request_type.is_input() => GuardrailSource::Input,
        _ => GuardrailSource::Output,
    }
}
