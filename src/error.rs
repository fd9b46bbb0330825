// Error taxonomy for the scanning subsystem.
//
// Every variant is surfaced to the immediate caller. A clean scan (no
// intervention) is a normal `ScanResult`, never an error.

use thiserror::Error;

/// Errors raised while building or running a scanner.
#[derive(Error, Debug)]
pub enum ScanError {
    /// A required backend parameter is missing after override resolution, or
    /// the backend connection could not be set up. Fatal at construction.
    #[error("Scanner configuration error: {0}")]
    Configuration(String),

    /// The guardrail backend could not be reached or answered with a failure.
    /// Per-call only; later calls on the same scanner may succeed.
    #[error("Guardrail backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The backend intervened but its findings break the tag-derivation contract.
    #[error("Malformed guardrail assessment: {0}")]
    MalformedAssessment(String),
}

impl ScanError {
    /// Configuration error for a parameter that resolved to nothing.
    pub fn missing(field: &str) -> Self {
        Self::Configuration(format!(
            "{field} not found in scanner properties or environment overrides"
        ))
    }
}
