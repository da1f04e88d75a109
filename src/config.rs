//! Build configuration
//!
//! Resolved from an optional TOML file, then overridden by command-line flags.
//! Without a file, every path is derived from a single data directory.

use crate::parser::SourceKind;
use crate::sink::DEFAULT_JSON_INDENT;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the published artifact
pub const DEFAULT_ARTIFACT_FILE: &str = "homoglyph.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildConfig {
    pub sources: SourcePaths,
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The three input files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcePaths {
    pub codebox: PathBuf,
    pub original: PathBuf,
    pub confusables: PathBuf,
}

impl SourcePaths {
    pub fn in_dir(dir: &Path) -> Self {
        SourcePaths {
            codebox: dir.join(SourceKind::CodeboxHomoglyph.default_file_name()),
            original: dir.join(SourceKind::OriginalCharCodes.default_file_name()),
            confusables: dir.join(SourceKind::UnicodeConfusables.default_file_name()),
        }
    }

    pub fn path_for(&self, kind: SourceKind) -> &Path {
        match kind {
            SourceKind::CodeboxHomoglyph => &self.codebox,
            SourceKind::OriginalCharCodes => &self.original,
            SourceKind::UnicodeConfusables => &self.confusables,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub json: PathBuf,
    #[serde(default = "default_json_indent")]
    pub json_indent: usize,
    #[serde(default)]
    pub sqlite: Option<PathBuf>,
    #[serde(default)]
    pub report: Option<PathBuf>,
}

fn default_json_indent() -> usize {
    DEFAULT_JSON_INDENT
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl BuildConfig {
    /// Conventional layout: sources and artifact side by side in `dir`
    pub fn with_data_dir(dir: &Path) -> Self {
        BuildConfig {
            sources: SourcePaths::in_dir(dir),
            output: OutputConfig {
                json: dir.join(DEFAULT_ARTIFACT_FILE),
                json_indent: DEFAULT_JSON_INDENT,
                sqlite: None,
                report: None,
            },
            logging: LoggingConfig::default(),
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse build config")
    }

    /// Relative paths in the file are resolved against the file's directory
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_data_dir(path, None)
    }

    /// Like [`BuildConfig::load`], but relative `[sources]` paths resolve
    /// against `data_dir` when one is given
    pub fn load_with_data_dir(path: &Path, data_dir: Option<&Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config = Self::from_toml_str(&text)
            .with_context(|| format!("Invalid config: {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.resolved_against(data_dir.unwrap_or(base), base))
    }

    fn resolved_against(mut self, sources_base: &Path, output_base: &Path) -> Self {
        let resolve = |p: &mut PathBuf, base: &Path| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };

        resolve(&mut self.sources.codebox, sources_base);
        resolve(&mut self.sources.original, sources_base);
        resolve(&mut self.sources.confusables, sources_base);

        resolve(&mut self.output.json, output_base);
        if let Some(p) = self.output.sqlite.as_mut() {
            resolve(p, output_base);
        }
        if let Some(p) = self.output.report.as_mut() {
            resolve(p, output_base);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_dir_defaults() {
        let config = BuildConfig::with_data_dir(Path::new("data"));
        assert_eq!(config.sources.codebox, Path::new("data/char_codes.txt"));
        assert_eq!(config.sources.original, Path::new("data/original_char_codes.txt"));
        assert_eq!(config.sources.confusables, Path::new("data/confusables.txt"));
        assert_eq!(config.output.json, Path::new("data/homoglyph.json"));
        assert_eq!(config.output.json_indent, 4);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_from_toml_with_defaults() {
        let config = BuildConfig::from_toml_str(
            r#"
            [sources]
            codebox = "/src/char_codes.txt"
            original = "/src/original_char_codes.txt"
            confusables = "/src/confusables.txt"

            [output]
            json = "/out/homoglyph.json"
            sqlite = "/out/homoglyph.db"
            "#,
        )
        .unwrap();

        assert_eq!(config.output.json_indent, DEFAULT_JSON_INDENT);
        assert_eq!(config.output.sqlite, Some(PathBuf::from("/out/homoglyph.db")));
        assert_eq!(config.output.report, None);
        assert_eq!(config.logging, LoggingConfig::default());
        assert_eq!(
            config.sources.path_for(SourceKind::UnicodeConfusables),
            Path::new("/src/confusables.txt")
        );
    }

    #[test]
    fn test_missing_section_is_error() {
        assert!(BuildConfig::from_toml_str("[output]\njson = \"x.json\"\n").is_err());
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("homoglyph.toml");
        std::fs::write(
            &path,
            "[sources]\ncodebox = \"a.txt\"\noriginal = \"/abs/b.txt\"\nconfusables = \"c.txt\"\n\
             [output]\njson = \"out/h.json\"\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();

        let config = BuildConfig::load(&path).unwrap();
        assert_eq!(config.sources.codebox, dir.path().join("a.txt"));
        assert_eq!(config.sources.original, Path::new("/abs/b.txt"));
        assert_eq!(config.output.json, dir.path().join("out/h.json"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_data_dir_overrides_relative_sources() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("homoglyph.toml");
        std::fs::write(
            &path,
            "[sources]\ncodebox = \"a.txt\"\noriginal = \"/abs/b.txt\"\nconfusables = \"c.txt\"\n\
             [output]\njson = \"h.json\"\n",
        )
        .unwrap();

        let config = BuildConfig::load_with_data_dir(&path, Some(Path::new("/data"))).unwrap();
        assert_eq!(config.sources.codebox, Path::new("/data/a.txt"));
        assert_eq!(config.sources.confusables, Path::new("/data/c.txt"));
        assert_eq!(config.sources.original, Path::new("/abs/b.txt"));
        assert_eq!(config.output.json, dir.path().join("h.json"));
    }
}
