// 🔄 Build Pipeline - parse → merge → merge → dedup → build → validate → sinks
//
// `build_artifact` is the pure core; `run` adds file IO around it.

use crate::artifact::{Artifact, ArtifactBuilder};
use crate::config::{BuildConfig, SourcePaths};
use crate::deduplication::Deduplicator;
use crate::glyph::{Glyph, SourceClassList};
use crate::merge::EquivalenceClassMerger;
use crate::parser::{get_parser, SourceKind};
use crate::report::{BuildReport, SourceStat};
use crate::sink::{self, ArtifactSink, JsonFileSink};
use crate::validation::{ArtifactValidator, ValidationReport};
use anyhow::Result;
use tracing::{info, warn};

/// Parsed class lists of the three sources
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceSet {
    pub codebox: SourceClassList,
    pub original: SourceClassList,
    pub confusables: SourceClassList,
}

impl SourceSet {
    pub fn get(&self, kind: SourceKind) -> &SourceClassList {
        match kind {
            SourceKind::CodeboxHomoglyph => &self.codebox,
            SourceKind::OriginalCharCodes => &self.original,
            SourceKind::UnicodeConfusables => &self.confusables,
        }
    }

    /// Every member of every input class, repeats included
    pub fn glyphs(&self) -> impl Iterator<Item = &Glyph> {
        self.codebox
            .iter()
            .chain(self.original.iter())
            .chain(self.confusables.iter())
            .flat_map(|class| class.iter())
    }
}

/// Merge order: codebox with original first, then the confusables on top
pub const MERGE_ORDER: [SourceKind; 3] = [
    SourceKind::CodeboxHomoglyph,
    SourceKind::OriginalCharCodes,
    SourceKind::UnicodeConfusables,
];

#[derive(Debug)]
pub struct BuildOutput {
    pub artifact: Artifact,
    pub report: BuildReport,
    pub validation: ValidationReport,
}

/// Read and parse the three source files
pub fn load_sources(paths: &SourcePaths) -> Result<SourceSet> {
    let load = |kind: SourceKind| get_parser(kind).parse(paths.path_for(kind));

    Ok(SourceSet {
        codebox: load(SourceKind::CodeboxHomoglyph)?,
        original: load(SourceKind::OriginalCharCodes)?,
        confusables: load(SourceKind::UnicodeConfusables)?,
    })
}

/// Turn parsed sources into a validated artifact
///
/// Fails only when the result breaks an invariant (glyph lost, duplicated,
/// or an empty class), which would indicate a bug rather than bad input.
pub fn build_artifact(sources: &SourceSet) -> Result<BuildOutput> {
    let merger = EquivalenceClassMerger::new();

    let stats: Vec<SourceStat> = MERGE_ORDER
        .iter()
        .map(|&kind| SourceStat::from_classes(kind, sources.get(kind)))
        .collect();
    for stat in &stats {
        info!(
            source = stat.kind.code(),
            classes = stat.classes,
            glyphs = stat.glyphs,
            "loaded source"
        );
    }

    let first_pass = merger.merge(&sources.codebox, &sources.original);
    info!(classes = first_pass.len(), "merged codebox + original");

    let second_pass = merger.merge(&first_pass, &sources.confusables);
    info!(classes = second_pass.len(), "merged confusables");

    let (classes, dedup) = Deduplicator::new().deduplicate_with_summary(&second_pass);
    info!(
        duplicates_removed = dedup.duplicates_removed,
        classes_changed = dedup.classes_changed,
        "deduplicated classes"
    );

    let artifact = ArtifactBuilder::new().build(classes);

    let validation =
        ArtifactValidator::new().validate_against_inputs(&artifact, sources.glyphs());
    let validation = validation.into_result()?;

    let report = BuildReport::new(
        stats,
        vec![first_pass.len(), second_pass.len()],
        dedup.duplicates_removed,
        &artifact,
    );

    for entry in &report.review {
        warn!(
            record = entry.record,
            codepoints = %entry.codepoints,
            "multi-codepoint sequence needs manual review"
        );
    }

    Ok(BuildOutput {
        artifact,
        report,
        validation,
    })
}

/// Configured sinks, JSON last
///
/// `run` stops at the first failing sink, so the published JSON is only
/// replaced once every other output has been stored.
pub fn sinks_for(config: &BuildConfig) -> Vec<Box<dyn ArtifactSink>> {
    let mut sinks: Vec<Box<dyn ArtifactSink>> = Vec::new();

    if let Some(path) = &config.output.sqlite {
        #[cfg(feature = "sqlite")]
        sinks.push(Box::new(sink::SqliteSink::new(path)));

        #[cfg(not(feature = "sqlite"))]
        warn!(path = %path.display(), "built without the sqlite feature, skipping database output");
    }

    sinks.push(Box::new(
        JsonFileSink::new(&config.output.json).with_indent(config.output.json_indent),
    ));
    sinks
}

/// Run the whole pipeline once
pub fn run(config: &BuildConfig) -> Result<BuildOutput> {
    let sources = load_sources(&config.sources)?;
    let mut output = build_artifact(&sources)?;

    for stat in output.report.sources.iter_mut() {
        stat.path = Some(config.sources.path_for(stat.kind).display().to_string());
    }

    for mut sink in sinks_for(config) {
        sink.write(&output.artifact, &output.report)?;
        info!(sink = %sink.describe(), "artifact written");
    }

    if let Some(path) = &config.output.report {
        sink::write_json(path, &output.report, 2)?;
        info!(path = %path.display(), "build report written");
    }

    info!("{}", output.report.summary());
    Ok(output)
}

// ============================================================================
// TESTS
// ============================================================================
