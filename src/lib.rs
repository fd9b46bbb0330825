// shieldscan: pluggable content-safety scanning over guardrail backends
//
// This is the library root. `scanner` holds the backend-agnostic contract and
// the shared normalization logic; each backend lives in its own module.

pub mod bedrock;
pub mod config;
pub mod error;
pub mod output;
pub mod registry;
pub mod scanner;

pub use error::ScanError;
pub use scanner::{ScanResult, Scanner};
