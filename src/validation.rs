// ✅ Artifact Validation - invariant checks before anything is written
//
// Critical issues fail the build: an artifact that lost a glyph, or put one
// glyph in two classes, would silently change what the detector matches.

use crate::artifact::Artifact;
use crate::glyph::Glyph;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ============================================================================
// ISSUES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Critical, // Artifact breaks an invariant
    Warning,  // Needs manual review
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub rule_name: String,
    pub record: Option<usize>,
    pub message: String,
}

impl ValidationIssue {
    fn critical(rule_name: &str, record: Option<usize>, message: String) -> Self {
        ValidationIssue {
            severity: Severity::Critical,
            rule_name: rule_name.to_string(),
            record,
            message,
        }
    }

    fn warning(rule_name: &str, record: Option<usize>, message: String) -> Self {
        ValidationIssue {
            severity: Severity::Warning,
            rule_name: rule_name.to_string(),
            record,
            message,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub records_checked: usize,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn critical_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Critical)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    pub fn passed(&self) -> bool {
        self.critical_count() == 0
    }

    pub fn issues_for(&self, rule_name: &str) -> Vec<&ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.rule_name == rule_name)
            .collect()
    }

    pub fn summary(&self) -> String {
        format!(
            "Records: {}, Critical: {}, Warnings: {}",
            self.records_checked,
            self.critical_count(),
            self.warning_count()
        )
    }

    /// Turn critical issues into an error
    pub fn into_result(self) -> anyhow::Result<ValidationReport> {
        if self.passed() {
            return Ok(self);
        }

        let details = self
            .issues
            .iter()
            .filter(|i| i.severity == Severity::Critical)
            .map(|i| format!("  [{}] {}", i.rule_name, i.message))
            .collect::<Vec<_>>()
            .join("\n");

        Err(anyhow::anyhow!(
            "Artifact failed validation ({}):\n{}",
            self.summary(),
            details
        ))
    }
}

// ============================================================================
// VALIDATOR
// ============================================================================

pub const RULE_NON_EMPTY: &str = "non_empty_class";
pub const RULE_UNIQUE_MEMBERS: &str = "unique_members";
pub const RULE_DISJOINT: &str = "disjoint_classes";
pub const RULE_NO_LOSS: &str = "no_loss";
pub const RULE_SINGLE_SCALAR: &str = "single_scalar";

#[derive(Debug, Default, Clone, Copy)]
pub struct ArtifactValidator;

impl ArtifactValidator {
    pub fn new() -> Self {
        ArtifactValidator
    }

    /// Structural checks only
    pub fn validate(&self, artifact: &Artifact) -> ValidationReport {
        let mut report = ValidationReport {
            records_checked: artifact.len(),
            issues: Vec::new(),
        };

        let mut first_record: HashMap<&Glyph, usize> = HashMap::new();

        for (position, record) in artifact.records().iter().enumerate() {
            if record.data.is_empty() {
                report.issues.push(ValidationIssue::critical(
                    RULE_NON_EMPTY,
                    Some(position),
                    format!("record {} has no members", position),
                ));
            }

            let mut in_record: HashSet<&Glyph> = HashSet::new();
            for glyph in &record.data {
                if !in_record.insert(glyph) {
                    report.issues.push(ValidationIssue::critical(
                        RULE_UNIQUE_MEMBERS,
                        Some(position),
                        format!("{} repeats inside record {}", glyph.notation(), position),
                    ));
                    continue;
                }

                if let Some(&other) = first_record.get(glyph) {
                    report.issues.push(ValidationIssue::critical(
                        RULE_DISJOINT,
                        Some(position),
                        format!(
                            "{} appears in records {} and {}",
                            glyph.notation(),
                            other,
                            position
                        ),
                    ));
                } else {
                    first_record.insert(glyph, position);
                }

                if glyph.is_sequence() {
                    report.issues.push(ValidationIssue::warning(
                        RULE_SINGLE_SCALAR,
                        Some(position),
                        format!(
                            "multi-codepoint sequence {} ({}) in record {}",
                            glyph.notation(),
                            glyph,
                            position
                        ),
                    ));
                }
            }
        }

        report
    }

    /// Structural checks plus: artifact members == input members
    pub fn validate_against_inputs<'a, I>(&self, artifact: &Artifact, inputs: I) -> ValidationReport
    where
        I: IntoIterator<Item = &'a Glyph>,
    {
        let mut report = self.validate(artifact);

        let expected: HashSet<&Glyph> = inputs.into_iter().collect();
        let actual: HashSet<&Glyph> = artifact.glyphs().collect();

        let mut missing: Vec<&&Glyph> = expected.difference(&actual).collect();
        missing.sort();
        for glyph in missing {
            report.issues.push(ValidationIssue::critical(
                RULE_NO_LOSS,
                None,
                format!("{} from the sources is missing", glyph.notation()),
            ));
        }

        let mut unexpected: Vec<&&Glyph> = actual.difference(&expected).collect();
        unexpected.sort();
        for glyph in unexpected {
            report.issues.push(ValidationIssue::critical(
                RULE_NO_LOSS,
                None,
                format!("{} is not in any source", glyph.notation()),
            ));
        }

        report
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::HomoglyphRecord;

    fn record(chars: &str) -> HomoglyphRecord {
        HomoglyphRecord {
            data: chars.chars().map(Glyph::from).collect(),
        }
    }

    #[test]
    fn test_clean_artifact_passes() {
        let artifact = Artifact::from_records(vec![record("Aa"), record("0O")]);
        let report = ArtifactValidator::new().validate(&artifact);

        assert!(report.passed());
        assert_eq!(report.records_checked, 2);
        assert!(report.issues.is_empty());
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn test_glyph_in_two_records_is_critical() {
        let artifact = Artifact::from_records(vec![record("ab"), record("bc")]);
        let report = ArtifactValidator::new().validate(&artifact);

        assert!(!report.passed());
        assert_eq!(report.issues_for(RULE_DISJOINT).len(), 1);
        assert!(report.into_result().is_err());
    }

    #[test]
    fn test_repeat_and_empty_are_critical() {
        let artifact = Artifact::from_records(vec![record("aa"), record("")]);
        let report = ArtifactValidator::new().validate(&artifact);

        assert_eq!(report.issues_for(RULE_UNIQUE_MEMBERS).len(), 1);
        assert_eq!(report.issues_for(RULE_NON_EMPTY).len(), 1);
        assert_eq!(report.critical_count(), 2);
    }

    #[test]
    fn test_sequence_is_only_a_warning() {
        let artifact = Artifact::from_records(vec![HomoglyphRecord {
            data: vec![
                Glyph::from('\u{2474}'),
                Glyph::from_chars(['(', '1', ')']).unwrap(),
            ],
        }]);
        let report = ArtifactValidator::new().validate(&artifact);

        assert!(report.passed());
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.issues_for(RULE_SINGLE_SCALAR).len(), 1);
    }

    #[test]
    fn test_no_loss_detects_missing_and_extra() {
        let artifact = Artifact::from_records(vec![record("ab")]);
        let inputs = vec![Glyph::from('a'), Glyph::from('c')];

        let report = ArtifactValidator::new().validate_against_inputs(&artifact, &inputs);
        let issues = report.issues_for(RULE_NO_LOSS);

        assert_eq!(issues.len(), 2);
        assert!(issues[0].message.contains("U+0063"));
        assert!(issues[1].message.contains("U+0062"));
    }
}
