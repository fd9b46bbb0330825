// Scanner registry: builds scanner instances from configuration and fans a
// message out to every scanner bound to its request type.
//
// One instance is created per (config, request type) pair so each carries a
// fixed direction. Scans run concurrently; failures are reported per scanner
// and never retried here.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::bedrock::BedrockGuardrailScanner;
use crate::config::{OverrideSource, ScannerConfig, ScannerKind};
use crate::error::ScanError;
use crate::scanner::direction::RequestType;
use crate::scanner::traits::{ScanResult, Scanner};

/// What one scanner said about one message.
#[derive(Debug)]
pub struct ScannerOutcome {
    pub scanner: String,
    pub request_type: RequestType,
    /// Whether the scanner's verdict should be enforced (vs. audit only)
    pub enforce: bool,
    pub result: Result<ScanResult, ScanError>,
}

impl ScannerOutcome {
    /// True when an enforcing scanner flagged the message.
    pub fn enforced_intervention(&self) -> bool {
        self.enforce && matches!(&self.result, Ok(result) if result.intervened())
    }
}

/// Build the concrete scanner for a (bound) config.
pub fn build_scanner(
    config: ScannerConfig,
    overrides: &dyn OverrideSource,
) -> Result<Arc<dyn Scanner>, ScanError> {
    match config.kind {
        ScannerKind::BedrockGuardrail => {
            Ok(Arc::new(BedrockGuardrailScanner::new(config, overrides)?))
        }
    }
}

#[derive(Default)]
pub struct ScannerRegistry {
    scanners: Vec<Arc<dyn Scanner>>,
}

impl ScannerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every enabled scanner, one per applicable request type.
    ///
    /// Any construction failure aborts the whole registry: a scanner with
    /// missing backend parameters must not go into service.
    pub fn from_configs(
        configs: &[ScannerConfig],
        overrides: &dyn OverrideSource,
    ) -> Result<Self, ScanError> {
        let mut registry = Self::new();

        for config in configs {
            if !config.enable {
                info!(scanner = config.name.as_str(), "Scanner disabled, skipping");
                continue;
            }
            if config.request_types.is_empty() {
                warn!(
                    scanner = config.name.as_str(),
                    "Scanner has no request types and will never run"
                );
                continue;
            }

            for request_type in &config.request_types {
                let scanner = build_scanner(config.bound_to(request_type.clone()), overrides)?;
                registry.register(scanner);
            }
        }

        info!(count = registry.len(), "Scanners registered");
        Ok(registry)
    }

    pub fn register(&mut self, scanner: Arc<dyn Scanner>) {
        self.scanners.push(scanner);
    }

    pub fn scanners(&self) -> &[Arc<dyn Scanner>] {
        &self.scanners
    }

    pub fn len(&self) -> usize {
        self.scanners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scanners.is_empty()
    }

    /// Scanners bound to `request_type`, in registration order.
    pub fn scanners_for<'a>(
        &'a self,
        request_type: &'a RequestType,
    ) -> impl Iterator<Item = &'a Arc<dyn Scanner>> + 'a {
        self.scanners
            .iter()
            .filter(move |s| s.config().scan_for_req_type.as_ref() == Some(request_type))
    }

    /// Run every scanner bound to `request_type` against `message`
    /// concurrently. Outcomes come back in registration order.
    pub async fn scan(&self, message: &str, request_type: &RequestType) -> Vec<ScannerOutcome> {
        let scans = self.scanners_for(request_type).map(|scanner| async move {
            let result = scanner.scan(message).await;
            if let Err(e) = &result {
                warn!(scanner = scanner.name(), error = %e, "Scan failed");
            }
            ScannerOutcome {
                scanner: scanner.name().to_string(),
                request_type: request_type.clone(),
                enforce: scanner.config().enforce_access_control,
                result,
            }
        });

        let outcomes = join_all(scans).await;
        debug!(
            request_type = %request_type,
            scanners = outcomes.len(),
            "Registry scan complete"
        );
        outcomes
    }
}
