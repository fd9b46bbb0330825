// Output formatting: terminal display and JSON reports for scan outcomes.

pub mod terminal;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::registry::ScannerOutcome;
use crate::scanner::traits::ScanResult;

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// Counts characters, not bytes, so multi-byte text never splits mid-codepoint.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

/// Machine-readable report for `scan --json`.
#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub scanned_at: DateTime<Utc>,
    pub request_type: String,
    pub outcomes: Vec<OutcomeReport>,
}

#[derive(Debug, Serialize)]
pub struct OutcomeReport {
    pub scanner: String,
    pub enforce: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ScanResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&ScannerOutcome> for OutcomeReport {
    fn from(outcome: &ScannerOutcome) -> Self {
        let (result, error) = match &outcome.result {
            Ok(result) => (Some(result.clone()), None),
            Err(e) => (None, Some(e.to_string())),
        };
        Self {
            scanner: outcome.scanner.clone(),
            enforce: outcome.enforce,
            result,
            error,
        }
    }
}

impl ScanReport {
    pub fn new(request_type: &str, outcomes: &[ScannerOutcome]) -> Self {
        Self {
            scanned_at: Utc::now(),
            request_type: request_type.to_string(),
            outcomes: outcomes.iter().map(OutcomeReport::from).collect(),
        }
    }
}
