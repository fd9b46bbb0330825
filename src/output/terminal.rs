// Colored terminal output for scan outcomes and scanner listings.
//
// main.rs display paths delegate here.

use std::collections::BTreeMap;

use colored::Colorize;

use crate::registry::{ScannerOutcome, ScannerRegistry};
use crate::scanner::direction::guardrail_source;

/// Display every scanner's verdict for one message.
pub fn display_outcomes(message: &str, outcomes: &[ScannerOutcome]) {
    println!(
        "\n{} \"{}\"",
        "Scanned:".bold(),
        super::truncate_chars(message, 80).dimmed()
    );

    if outcomes.is_empty() {
        println!("  No scanners are configured for this request type.");
        return;
    }

    for outcome in outcomes {
        let mode = if outcome.enforce { "enforce" } else { "audit" };
        match &outcome.result {
            Ok(result) if result.intervened() => {
                println!(
                    "  {} {} ({})",
                    "!!".red().bold(),
                    outcome.scanner.bold(),
                    mode.dimmed()
                );
                println!("     Traits:  {}", join(result.traits.iter()).red());
                if !result.actions.is_empty() {
                    println!("     Actions: {}", join(result.actions.iter()).yellow());
                }
                if let Some(text) = &result.output_text {
                    println!(
                        "     Output:  \"{}\"",
                        super::truncate_chars(text, 120).dimmed()
                    );
                }
            }
            Ok(_) => {
                println!(
                    "  {} {} ({})",
                    "ok".green(),
                    outcome.scanner.bold(),
                    mode.dimmed()
                );
            }
            Err(e) => {
                println!(
                    "  {} {} ({}): {}",
                    "error".bright_red(),
                    outcome.scanner.bold(),
                    mode.dimmed(),
                    e
                );
            }
        }
    }

    if outcomes.iter().any(ScannerOutcome::enforced_intervention) {
        println!("\n  {}", "Message would be blocked.".red().bold());
    }
    println!();
}

/// List registered scanners with their bound request type and direction.
pub fn display_scanners(registry: &ScannerRegistry) {
    if registry.is_empty() {
        println!("No scanners enabled. Check the scanner config file.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Scanners ({} instances) ===", registry.len()).bold()
    );
    println!(
        "  {:<28} {:<18} {:<8} {}",
        "Name".dimmed(),
        "Request type".dimmed(),
        "Source".dimmed(),
        "Mode".dimmed()
    );
    println!("  {}", "-".repeat(66).dimmed());

    for scanner in registry.scanners() {
        let config = scanner.config();
        let request_type = config
            .scan_for_req_type
            .as_ref()
            .map(|rt| rt.to_string())
            .unwrap_or_else(|| "-".to_string());
        let source = guardrail_source(config.scan_for_req_type.as_ref());
        let mode = if config.enforce_access_control {
            "enforce".normal()
        } else {
            "audit".yellow()
        };
        println!(
            "  {:<28} {:<18} {:<8} {}",
            config.name, request_type, source.as_str(), mode
        );
    }
    println!();
}

/// Tally of a `scan-batch` run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub messages: usize,
    pub intervened: usize,
    pub errors: usize,
    pub trait_counts: BTreeMap<String, usize>,
}

impl BatchSummary {
    /// Fold one message's outcomes into the tally.
    pub fn record(&mut self, outcomes: &[ScannerOutcome]) {
        self.messages += 1;
        let mut flagged = false;
        for outcome in outcomes {
            match &outcome.result {
                Ok(result) if result.intervened() => {
                    flagged = true;
                    for tag in &result.traits {
                        *self.trait_counts.entry(tag.clone()).or_default() += 1;
                    }
                }
                Ok(_) => {}
                Err(_) => self.errors += 1,
            }
        }
        if flagged {
            self.intervened += 1;
        }
    }

    pub fn display(&self) {
        println!("\n{}", "=== Batch Summary ===".bold());
        println!("  Messages scanned: {}", self.messages);
        println!(
            "  Intervened: {}",
            if self.intervened > 0 {
                self.intervened.to_string().red().to_string()
            } else {
                "0".green().to_string()
            }
        );
        if self.errors > 0 {
            println!("  Scanner errors: {}", self.errors.to_string().bright_red());
        }

        if !self.trait_counts.is_empty() {
            let mut ranked: Vec<_> = self.trait_counts.iter().collect();
            ranked.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
            println!("\n  Traits:");
            for (tag, count) in ranked {
                println!("    {:>5}  {}", count, tag);
            }
        }
        println!();
    }
}

fn join<'a>(values: impl Iterator<Item = &'a String>) -> String {
    values.map(String::as_str).collect::<Vec<_>>().join(", ")
}
