// Homoglyph Dictionary Builder - Core Library
// Exposes all modules for use in the CLI and tests

pub mod artifact;
pub mod config;
pub mod deduplication;
pub mod error;
pub mod glyph;
pub mod merge;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod sink;
pub mod validation;

#[cfg(feature = "sqlite")]
pub mod db;

// Re-export commonly used types
pub use artifact::{Artifact, ArtifactBuilder, ArtifactIndex, HomoglyphRecord};
pub use config::{BuildConfig, LoggingConfig, OutputConfig, SourcePaths};
pub use deduplication::{DeduplicationSummary, Deduplicator};
pub use error::ParseError;
pub use glyph::{
    decode_codepoint, decode_sequence, EmptyGlyphError, EquivalenceClass, Glyph,
    MergedClassList, SourceClassList,
};
pub use merge::EquivalenceClassMerger;
pub use parser::{get_parser, ClassParser, CodepointListParser, ConfusablesParser, SourceKind};
pub use pipeline::{build_artifact, load_sources, run, BuildOutput, SourceSet};
pub use report::{BuildReport, ReviewEntry, SourceStat};
pub use sink::{load_json_artifact, ArtifactSink, JsonFileSink};
pub use validation::{ArtifactValidator, Severity, ValidationIssue, ValidationReport};

#[cfg(feature = "sqlite")]
pub use sink::SqliteSink;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
