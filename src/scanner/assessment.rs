// Assessment normalization. Flattens a backend's nested findings tree into
// two sets: violation traits and remediation actions.
//
// Backends report findings grouped by policy category (topics, content
// filters, word lists, PII, ...) and each detector shapes its records a bit
// differently. Consumers only need the distinct labels and actions, so the
// tree is walked once and collapsed.

use std::collections::BTreeSet;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ScanError;

/// Generic marker some backends emit in place of the specific policy name.
pub const DENY_TAG: &str = "DENY";

/// One entry of the backend's assessment list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyEntry {
    pub categories: Vec<PolicyCategory>,
}

/// A policy category (e.g. `topicPolicy`) and the finding lists it reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyCategory {
    pub name: String,
    pub finding_lists: Vec<FindingList>,
}

/// A named list of findings within a category (e.g. `topics`, `piiEntities`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindingList {
    pub name: String,
    pub findings: Vec<FindingRecord>,
}

/// A single detected violation. Unknown fields (confidence, scores, regex
/// patterns, ...) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FindingRecord {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "match", default)]
    pub match_text: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
}

impl PolicyEntry {
    /// Build an entry from its JSON form: an object mapping category name to
    /// an object mapping list name to an array of finding objects.
    ///
    /// Members that don't have that shape (invocation metrics, coverage
    /// counters) carry no findings and are skipped.
    pub fn from_value(value: &Value) -> Result<Self, ScanError> {
        let Some(object) = value.as_object() else {
            return Ok(Self::default());
        };

        let mut categories = Vec::new();
        for (category_name, category) in object {
            let Some(lists) = category.as_object() else {
                continue;
            };

            let mut finding_lists = Vec::new();
            for (list_name, list) in lists {
                let Some(items) = list.as_array() else {
                    continue;
                };

                let findings = items
                    .iter()
                    .filter(|item| item.is_object())
                    .map(|item| {
                        FindingRecord::deserialize(item).map_err(|e| {
                            ScanError::MalformedAssessment(format!(
                                "unreadable finding in {category_name}.{list_name}: {e}"
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                finding_lists.push(FindingList {
                    name: list_name.clone(),
                    findings,
                });
            }

            if !finding_lists.is_empty() {
                categories.push(PolicyCategory {
                    name: category_name.clone(),
                    finding_lists,
                });
            }
        }

        Ok(Self { categories })
    }
}

/// Replace spaces with underscores and upper-case. Idempotent.
pub fn normalize_tag(raw: &str) -> String {
    raw.replace(' ', "_").to_uppercase()
}

/// The raw tag source: first non-empty of `type`, `name`, `match`, else "".
pub fn raw_tag(finding: &FindingRecord) -> &str {
    [&finding.kind, &finding.name, &finding.match_text]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .find(|value| !value.is_empty())
        .unwrap_or("")
}

/// Derive the normalized trait for one finding.
///
/// A `DENY` tag is replaced by the finding's own `name`; a `DENY` finding
/// without a name is a broken record and is reported as such.
pub fn finding_tag(finding: &FindingRecord) -> Result<String, ScanError> {
    let tag = normalize_tag(raw_tag(finding));
    if tag != DENY_TAG {
        return Ok(tag);
    }

    match finding.name.as_deref().filter(|name| !name.is_empty()) {
        Some(name) => Ok(normalize_tag(name)),
        None => Err(ScanError::MalformedAssessment(format!(
            "finding tagged {DENY_TAG} has no policy name"
        ))),
    }
}

/// Collapse every finding in the tree into (traits, actions).
///
/// All records are visited. Actions are kept verbatim; findings without an
/// action contribute only their trait.
pub fn extract_assessment_info(
    assessments: &[PolicyEntry],
) -> Result<(BTreeSet<String>, BTreeSet<String>), ScanError> {
    let mut traits = BTreeSet::new();
    let mut actions = BTreeSet::new();

    for entry in assessments {
        for category in &entry.categories {
            for list in &category.finding_lists {
                for finding in &list.findings {
                    let tag = finding_tag(finding).map_err(|e| match e {
                        ScanError::MalformedAssessment(msg) => ScanError::MalformedAssessment(
                            format!("{msg} (in {}.{})", category.name, list.name),
                        ),
                        other => other,
                    })?;
                    traits.insert(tag);

                    if let Some(action) = &finding.action {
                        actions.insert(action.clone());
                    }
                }
            }
        }
    }

    Ok((traits, actions))
}
