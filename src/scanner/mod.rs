// Content-safety scanning: trait-based abstraction over guardrail backends.
//
// The Scanner trait is the only thing callers depend on. Each backend gets
// its own implementing type (see `crate::bedrock`); the helpers shared across
// backends (direction classification, assessment normalization) live here as
// free functions rather than on the trait.

pub mod assessment;
pub mod direction;
pub mod traits;

pub use assessment::{extract_assessment_info, normalize_tag};
pub use direction::{guardrail_source, GuardrailSource, RequestType};
pub use traits::{ScanResult, Scanner};
