// Scanner trait and its backend-agnostic verdict.
//
// Consumers (interception layers, the registry) only ever see ScanResult,
// so swapping one guardrail backend for another never touches them.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::config::ScannerConfig;
use crate::error::ScanError;

/// The normalized verdict for one scanned message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Normalized violation categories (e.g. `HATE_SPEECH`, `OFF_TOPIC`)
    pub traits: BTreeSet<String>,
    /// Remediation actions reported by the backend (e.g. `BLOCKED`, `ANONYMIZED`)
    pub actions: BTreeSet<String>,
    /// Replacement text when the backend redacted or rewrote the message
    pub output_text: Option<String>,
}

impl ScanResult {
    /// The "nothing found" verdict.
    pub fn clean() -> Self {
        Self::default()
    }

    /// Whether the backend flagged anything. Derived from `traits`, never stored.
    pub fn intervened(&self) -> bool {
        !self.traits.is_empty()
    }
}

impl Serialize for ScanResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ScanResult", 4)?;
        state.serialize_field("intervened", &self.intervened())?;
        state.serialize_field("traits", &self.traits)?;
        state.serialize_field("actions", &self.actions)?;
        state.serialize_field("output_text", &self.output_text)?;
        state.end()
    }
}

/// A content-safety scanner bound to one backend and one request type.
///
/// Implementations hold only immutable configuration and a reusable client
/// handle, so `scan` can be called concurrently from many tasks. Callers that
/// need a deadline wrap the future in `tokio::time::timeout`.
#[async_trait]
pub trait Scanner: Send + Sync {
    /// Configured scanner name.
    fn name(&self) -> &str;

    /// The configuration this scanner was built from.
    fn config(&self) -> &ScannerConfig;

    /// Evaluate a single message against the configured policy.
    async fn scan(&self, message: &str) -> Result<ScanResult, ScanError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_result_is_not_intervened() {
        let result = ScanResult::clean();
        assert!(!result.intervened());
        assert!(result.actions.is_empty());
        assert!(result.output_text.is_none());
    }

    #[test]
    fn test_intervened_follows_traits() {
        let mut result = ScanResult::clean();
        result.actions.insert("BLOCKED".to_string());
        // Actions alone don't make a verdict
        assert!(!result.intervened());
        result.traits.insert("HATE".to_string());
        assert!(result.intervened());
    }

    #[test]
    fn test_serialized_form_carries_intervened_flag() {
        let mut result = ScanResult::clean();
        result.traits.insert("PII_EMAIL".to_string());
        result.output_text = Some("[EMAIL]".to_string());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["intervened"], true);
        assert_eq!(json["traits"], serde_json::json!(["PII_EMAIL"]));
        assert_eq!(json["actions"], serde_json::json!([]));
        assert_eq!(json["output_text"], "[EMAIL]");
    }
}
