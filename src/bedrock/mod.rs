// Amazon Bedrock guardrail backend.
//
// The scanner talks to Bedrock's ApplyGuardrail operation through the
// GuardrailClient trait, so tests (and alternative transports) can stand in
// for the HTTP client without touching the scan logic.

pub mod client;
pub mod params;
pub mod scanner;

pub use client::{GuardrailClient, HttpGuardrailClient};
pub use params::GuardrailParams;
pub use scanner::BedrockGuardrailScanner;
