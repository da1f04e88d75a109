// 🧾 Build Report - provenance and statistics for one pipeline run

use crate::artifact::Artifact;
use crate::glyph::{EquivalenceClass, Glyph};
use crate::parser::SourceKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStat {
    pub kind: SourceKind,
    pub path: Option<String>,
    pub classes: usize,
    /// Member occurrences, repeats included
    pub glyphs: usize,
    pub distinct_glyphs: usize,
}

impl SourceStat {
    pub fn from_classes(kind: SourceKind, classes: &[EquivalenceClass]) -> Self {
        let distinct: HashSet<&Glyph> = classes.iter().flat_map(|c| c.iter()).collect();
        SourceStat {
            kind,
            path: None,
            classes: classes.len(),
            glyphs: classes.iter().map(|c| c.len()).sum(),
            distinct_glyphs: distinct.len(),
        }
    }
}

/// Multi-codepoint member that needs a human look
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub record: usize,
    pub glyph: Glyph,
    pub codepoints: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    pub build_id: String,
    pub generated_at: DateTime<Utc>,
    pub generator_version: String,
    pub sources: Vec<SourceStat>,

    /// Class counts after each merge pass
    pub merge_passes: Vec<usize>,
    pub duplicates_removed: usize,

    pub final_classes: usize,
    pub final_glyphs: usize,
    pub artifact_sha256: String,
    pub review: Vec<ReviewEntry>,
}

impl BuildReport {
    pub fn new(
        sources: Vec<SourceStat>,
        merge_passes: Vec<usize>,
        duplicates_removed: usize,
        artifact: &Artifact,
    ) -> Self {
        BuildReport {
            build_id: uuid::Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
            generator_version: crate::VERSION.to_string(),
            sources,
            merge_passes,
            duplicates_removed,
            final_classes: artifact.len(),
            final_glyphs: artifact.glyph_count(),
            artifact_sha256: artifact.digest(),
            review: review_entries(artifact),
        }
    }

    pub fn source(&self, kind: SourceKind) -> Option<&SourceStat> {
        self.sources.iter().find(|s| s.kind == kind)
    }

    pub fn summary(&self) -> String {
        let sources = self
            .sources
            .iter()
            .map(|s| format!("{}={}", s.kind.code(), s.classes))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "Sources: [{}], Classes: {}, Glyphs: {}, Duplicates removed: {}, Review: {}, SHA-256: {}",
            sources,
            self.final_classes,
            self.final_glyphs,
            self.duplicates_removed,
            self.review.len(),
            &self.artifact_sha256[..12.min(self.artifact_sha256.len())]
        )
    }
}

/// Every sequence member of the artifact, in record order
pub fn review_entries(artifact: &Artifact) -> Vec<ReviewEntry> {
    artifact
        .records()
        .iter()
        .enumerate()
        .flat_map(|(position, record)| {
            record
                .data
                .iter()
                .filter(|g| g.is_sequence())
                .map(move |g| ReviewEntry {
                    record: position,
                    glyph: g.clone(),
                    codepoints: g.notation(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactBuilder;

    fn artifact() -> Artifact {
        ArtifactBuilder::new().build(vec![
            EquivalenceClass::from_chars(['A', 'a']),
            EquivalenceClass::new(vec![
                Glyph::from('\u{2474}'),
                Glyph::from_chars(['(', '1', ')']).unwrap(),
            ]),
        ])
    }

    #[test]
    fn test_source_stat_counts_repeats_and_distinct() {
        let classes = vec![
            EquivalenceClass::from_chars(['a', 'b', 'a']),
            EquivalenceClass::from_chars(['c']),
        ];
        let stat = SourceStat::from_classes(SourceKind::UnicodeConfusables, &classes);

        assert_eq!(stat.classes, 2);
        assert_eq!(stat.glyphs, 4);
        assert_eq!(stat.distinct_glyphs, 3);
    }

    #[test]
    fn test_report_fields() {
        let artifact = artifact();
        let report = BuildReport::new(vec![], vec![3, 2], 1, &artifact);

        assert_eq!(report.final_classes, 2);
        assert_eq!(report.final_glyphs, 4);
        assert_eq!(report.artifact_sha256, artifact.digest());
        assert_eq!(report.build_id.len(), 36);
        assert_eq!(report.generator_version, crate::VERSION);
    }

    #[test]
    fn test_review_lists_sequences_only() {
        let entries = review_entries(&artifact());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].record, 1);
        assert_eq!(entries[0].codepoints, "U+0028 U+0031 U+0029");
    }

    #[test]
    fn test_summary_and_json() {
        let report = BuildReport::new(
            vec![SourceStat::from_classes(SourceKind::CodeboxHomoglyph, &[])],
            vec![0],
            0,
            &artifact(),
        );

        assert!(report.summary().contains("codebox=0"));
        assert!(report.source(SourceKind::CodeboxHomoglyph).is_some());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["final_classes"], 2);
        assert_eq!(json["sources"][0]["kind"], "CodeboxHomoglyph");
    }
}
