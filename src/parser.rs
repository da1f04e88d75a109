// 🏗️ Parser Framework
// One trait, two formats, three homoglyph sources

use crate::error::ParseError;
use crate::glyph::{decode_codepoint, decode_sequence, EquivalenceClass, Glyph, SourceClassList};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Field delimiter of confusables.txt
pub const CONFUSABLES_DELIMITER: &str = ";\t";

// ============================================================================
// CORE TYPES
// ============================================================================

/// SourceKind - which dataset a class list was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// codebox homoglyph list (char_codes.txt)
    CodeboxHomoglyph,
    /// hand-maintained list (original_char_codes.txt)
    OriginalCharCodes,
    /// Unicode Consortium confusables.txt
    UnicodeConfusables,
}

impl SourceKind {
    /// Human-readable name for display
    pub fn name(&self) -> &str {
        match self {
            SourceKind::CodeboxHomoglyph => "codebox homoglyph",
            SourceKind::OriginalCharCodes => "original char codes",
            SourceKind::UnicodeConfusables => "unicode.org confusables",
        }
    }

    /// Short code for logs and reports
    pub fn code(&self) -> &str {
        match self {
            SourceKind::CodeboxHomoglyph => "codebox",
            SourceKind::OriginalCharCodes => "original",
            SourceKind::UnicodeConfusables => "confusables",
        }
    }

    /// Conventional file name inside the data directory
    pub fn default_file_name(&self) -> &str {
        match self {
            SourceKind::CodeboxHomoglyph => "char_codes.txt",
            SourceKind::OriginalCharCodes => "original_char_codes.txt",
            SourceKind::UnicodeConfusables => "confusables.txt",
        }
    }
}

// ============================================================================
// PARSER TRAIT
// ============================================================================

/// ClassParser - turns one source dataset into a list of equivalence classes
///
/// Implementors only decode text; reading the file and attaching path context
/// is shared through the provided methods.
pub trait ClassParser {
    /// Parse already-decoded source text
    fn parse_str(&self, input: &str) -> Result<SourceClassList, ParseError>;

    /// Source this parser was configured for
    fn source_kind(&self) -> SourceKind;

    /// Parse raw bytes, rejecting anything that is not UTF-8
    fn parse_bytes(&self, bytes: &[u8]) -> Result<SourceClassList, ParseError> {
        let text = std::str::from_utf8(bytes).map_err(|e| ParseError::InvalidEncoding {
            valid_up_to: e.valid_up_to(),
        })?;
        self.parse_str(text)
    }

    /// Read and parse a file
    fn parse(&self, file_path: &Path) -> Result<SourceClassList> {
        let bytes = std::fs::read(file_path)
            .with_context(|| format!("Failed to open file: {}", file_path.display()))?;

        let classes = self.parse_bytes(&bytes).with_context(|| {
            format!(
                "Failed to parse {} source {}",
                self.source_kind().name(),
                file_path.display()
            )
        })?;

        tracing::debug!(
            source = self.source_kind().code(),
            path = %file_path.display(),
            classes = classes.len(),
            "parsed source"
        );

        Ok(classes)
    }
}

// ============================================================================
// FACTORY FUNCTIONS
// ============================================================================

/// Get the parser for a source kind
pub fn get_parser(kind: SourceKind) -> Box<dyn ClassParser> {
    match kind {
        SourceKind::CodeboxHomoglyph | SourceKind::OriginalCharCodes => {
            Box::new(CodepointListParser::new(kind))
        }
        SourceKind::UnicodeConfusables => Box::new(ConfusablesParser::new()),
    }
}

// ============================================================================
// CODEPOINT LIST PARSER
// ============================================================================

/// Parser for the comma-separated code point lists
///
/// Format: one class per line, `41,61,FF21`, `#` lines are comments.
pub struct CodepointListParser {
    kind: SourceKind,
}

impl CodepointListParser {
    pub fn new(kind: SourceKind) -> Self {
        CodepointListParser { kind }
    }
}

impl ClassParser for CodepointListParser {
    fn parse_str(&self, input: &str) -> Result<SourceClassList, ParseError> {
        let input = input.strip_prefix(BYTE_ORDER_MARK).unwrap_or(input);
        let mut classes = Vec::new();

        for (offset, raw_line) in input.lines().enumerate() {
            let line_number = offset + 1;

            // Comment marker only counts in the first column
            if raw_line.starts_with('#') {
                continue;
            }

            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }

            let chars = line
                .split(',')
                .map(|token| decode_codepoint(token, line_number))
                .collect::<Result<Vec<char>, ParseError>>()?;

            classes.push(EquivalenceClass::from_chars(chars));
        }

        Ok(classes)
    }

    fn source_kind(&self) -> SourceKind {
        self.kind
    }
}

// ============================================================================
// CONFUSABLES PARSER
// ============================================================================

/// Parser for the Unicode Consortium confusables.txt
///
/// Data lines look like `0430 ;\t0061 ;\tMA\t# ( а → a ) ...`.
/// Every confused sequence is grouped under its canonical sequence.
pub struct ConfusablesParser;

impl ConfusablesParser {
    pub fn new() -> Self {
        ConfusablesParser
    }
}

impl Default for ConfusablesParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassParser for ConfusablesParser {
    fn parse_str(&self, input: &str) -> Result<SourceClassList, ParseError> {
        // canonical -> position in `groups`, so output follows first-seen key order
        let mut index: HashMap<Glyph, usize> = HashMap::new();
        let mut groups: Vec<EquivalenceClass> = Vec::new();

        for (offset, raw_line) in input.lines().enumerate() {
            let line_number = offset + 1;
            let line = raw_line.trim_start_matches(BYTE_ORDER_MARK).trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split(CONFUSABLES_DELIMITER).collect();
            if fields.len() < 2 {
                return Err(ParseError::MissingField {
                    line: line_number,
                    expected: 2,
                    found: fields.len(),
                });
            }

            // Anything after a further `;` or `#` in the canonical field is not code points
            let canonical_field = fields[1]
                .split(|c: char| c == ';' || c == '#')
                .next()
                .unwrap_or("");

            let confused = decode_sequence(fields[0], line_number)?;
            let canonical = decode_sequence(canonical_field, line_number)?;

            match index.get(&canonical) {
                Some(&slot) => groups[slot].push(confused),
                None => {
                    index.insert(canonical.clone(), groups.len());
                    groups.push(EquivalenceClass::new(vec![canonical, confused]));
                }
            }
        }

        Ok(groups)
    }

    fn source_kind(&self) -> SourceKind {
        SourceKind::UnicodeConfusables
    }
}

// ============================================================================
// TESTS
// ============================================================================
