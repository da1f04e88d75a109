// 💾 Artifact sinks - where a finished build goes

use crate::artifact::Artifact;
use crate::report::BuildReport;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::io::{BufWriter, Write};
use tempfile::NamedTempFile;
use std::path::{Path, PathBuf};

/// Indent the published homoglyph.json has always used
pub const DEFAULT_JSON_INDENT: usize = 4;

/// ArtifactSink - persists one finished artifact
pub trait ArtifactSink {
    fn write(&mut self, artifact: &Artifact, report: &BuildReport) -> Result<()>;

    /// Where the artifact goes, for logs
    fn describe(&self) -> String;
}

// ============================================================================
// JSON FILE SINK
// ============================================================================

pub struct JsonFileSink {
    path: PathBuf,
    indent: usize,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileSink {
            path: path.into(),
            indent: DEFAULT_JSON_INDENT,
        }
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}

impl ArtifactSink for JsonFileSink {
    fn write(&mut self, artifact: &Artifact, _report: &BuildReport) -> Result<()> {
        write_json(&self.path, artifact, self.indent)
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}

/// Serialize any value as indented JSON, creating parent directories
///
/// The JSON goes to a temp file next to `path` which is then renamed over it,
/// so a failed write leaves the previous file intact.
pub fn write_json<T: Serialize>(path: &Path, value: &T, indent: usize) -> Result<()> {
    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            parent
        }
        None => Path::new("."),
    };

    let staged = NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temp file in: {}", parent.display()))?;
    let mut writer = BufWriter::new(staged);

    let indent_bytes = vec![b' '; indent];
    let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent_bytes);
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    value
        .serialize(&mut serializer)
        .with_context(|| format!("Failed to serialize {}", path.display()))?;
    writer.write_all(b"\n")?;

    let staged = writer
        .into_inner()
        .map_err(|e| e.into_error())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    staged
        .persist(path)
        .with_context(|| format!("Failed to replace file: {}", path.display()))?;
    Ok(())
}

/// Read a JSON artifact back
pub fn load_json_artifact(path: &Path) -> Result<Artifact> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    let artifact = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse artifact: {}", path.display()))?;
    Ok(artifact)
}

// ============================================================================
// SQLITE SINK
// ============================================================================

#[cfg(feature = "sqlite")]
pub struct SqliteSink {
    path: PathBuf,
}

#[cfg(feature = "sqlite")]
impl SqliteSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SqliteSink { path: path.into() }
    }
}

#[cfg(feature = "sqlite")]
impl ArtifactSink for SqliteSink {
    fn write(&mut self, artifact: &Artifact, report: &BuildReport) -> Result<()> {
        let mut conn = rusqlite::Connection::open(&self.path)
            .with_context(|| format!("Failed to open database: {}", self.path.display()))?;
        crate::db::setup_database(&conn)?;

        let inserted = crate::db::insert_artifact(&mut conn, artifact, report)?;
        tracing::debug!(build_id = %report.build_id, members = inserted, "stored build");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactBuilder;
    use crate::glyph::EquivalenceClass;

    fn artifact() -> Artifact {
        ArtifactBuilder::new().build(vec![EquivalenceClass::from_chars(['A', 'a'])])
    }

    #[test]
    fn test_json_sink_writes_indented_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("homoglyph.json");
        let artifact = artifact();
        let report = BuildReport::new(vec![], vec![1], 0, &artifact);

        let mut sink = JsonFileSink::new(&path);
        sink.write(&artifact, &report).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("[\n    {\n        \"data\": ["));
        assert_eq!(load_json_artifact(&path).unwrap(), artifact);
        assert!(sink.describe().starts_with("json:"));
    }

    #[test]
    fn test_json_indent_is_configurable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compact.json");
        write_json(&path, &artifact(), 2).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("[\n  {\n    \"data\""));
    }

    #[test]
    fn test_json_write_replaces_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("homoglyph.json");
        fs::write(&path, "stale").unwrap();

        write_json(&path, &artifact(), DEFAULT_JSON_INDENT).unwrap();

        assert_eq!(load_json_artifact(&path).unwrap(), artifact());
        let entries = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_failed_json_write_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("homoglyph.json");
        write_json(&path, &artifact(), DEFAULT_JSON_INDENT).unwrap();

        // A map with non-string keys cannot be serialized as JSON
        let mut bad = std::collections::BTreeMap::new();
        bad.insert(vec![1u8], 1u8);
        assert!(write_json(&path, &bad, DEFAULT_JSON_INDENT).is_err());

        assert_eq!(load_json_artifact(&path).unwrap(), artifact());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let err = load_json_artifact(Path::new("/nonexistent/homoglyph.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/homoglyph.json"));
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_sqlite_sink() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("homoglyph.db");
        let artifact = artifact();
        let report = BuildReport::new(vec![], vec![1], 0, &artifact);

        SqliteSink::new(&path).write(&artifact, &report).unwrap();

        let conn = rusqlite::Connection::open(&path).unwrap();
        let loaded = crate::db::load_artifact(&conn, &report.build_id).unwrap();
        assert_eq!(loaded, artifact);
    }
}
