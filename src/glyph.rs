// 🔤 Glyph Model - shared value types for every pipeline stage
// A Glyph is one decoded member of an equivalence class (normally one scalar value).

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

// ============================================================================
// GLYPH
// ============================================================================

/// One member of an equivalence class.
///
/// Almost always a single Unicode scalar value. The confusables format also
/// allows multi-code-point sequences; those are kept whole as opaque members
/// and reported by [`Glyph::is_sequence`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Glyph(String);

/// Raised when an artifact holds a member with no code points
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("glyph must hold at least one code point")]
pub struct EmptyGlyphError;

impl Glyph {
    /// Build a glyph from decoded scalars. Returns None for an empty sequence.
    pub fn from_chars<I: IntoIterator<Item = char>>(chars: I) -> Option<Self> {
        let text: String = chars.into_iter().collect();
        if text.is_empty() {
            None
        } else {
            Some(Glyph(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The single scalar this glyph holds, or None for a sequence
    pub fn as_char(&self) -> Option<char> {
        let mut chars = self.0.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }

    /// True when the glyph spans more than one code point
    pub fn is_sequence(&self) -> bool {
        self.as_char().is_none()
    }

    pub fn codepoints(&self) -> Vec<u32> {
        self.0.chars().map(|c| c as u32).collect()
    }

    /// `U+0041` / `U+0030 U+0338` notation for logs and reports
    pub fn notation(&self) -> String {
        self.codepoints()
            .iter()
            .map(|cp| format!("U+{:04X}", cp))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<char> for Glyph {
    fn from(c: char) -> Self {
        Glyph(c.to_string())
    }
}

impl TryFrom<String> for Glyph {
    type Error = EmptyGlyphError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        if text.is_empty() {
            Err(EmptyGlyphError)
        } else {
            Ok(Glyph(text))
        }
    }
}

impl From<Glyph> for String {
    fn from(glyph: Glyph) -> Self {
        glyph.0
    }
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// EQUIVALENCE CLASS
// ============================================================================

/// A group of mutually confusable glyphs.
///
/// Members are kept in first-seen order so every stage is deterministic.
/// Until [`EquivalenceClass::deduplicated`] runs, a member may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EquivalenceClass {
    members: Vec<Glyph>,
}

impl EquivalenceClass {
    pub fn new(members: Vec<Glyph>) -> Self {
        EquivalenceClass { members }
    }

    pub fn from_chars<I: IntoIterator<Item = char>>(chars: I) -> Self {
        EquivalenceClass {
            members: chars.into_iter().map(Glyph::from).collect(),
        }
    }

    pub fn members(&self) -> &[Glyph] {
        &self.members
    }

    pub fn into_members(self) -> Vec<Glyph> {
        self.members
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Glyph> {
        self.members.iter()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, glyph: &Glyph) -> bool {
        self.members.contains(glyph)
    }

    pub fn push(&mut self, glyph: Glyph) {
        self.members.push(glyph);
    }

    pub fn extend_from(&mut self, other: &EquivalenceClass) {
        self.members.extend(other.members.iter().cloned());
    }

    /// Copy with every repeated member dropped (first occurrence wins)
    pub fn deduplicated(&self) -> EquivalenceClass {
        let mut seen = HashSet::with_capacity(self.members.len());
        let members = self
            .members
            .iter()
            .filter(|g| seen.insert(*g))
            .cloned()
            .collect();
        EquivalenceClass { members }
    }

    pub fn has_duplicates(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.members.len());
        !self.members.iter().all(|g| seen.insert(g))
    }
}

impl<'a> IntoIterator for &'a EquivalenceClass {
    type Item = &'a Glyph;
    type IntoIter = std::slice::Iter<'a, Glyph>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

/// Classes as produced by one parser, in source-file order
pub type SourceClassList = Vec<EquivalenceClass>;

/// Result of merging two class lists (same shape as a source list)
pub type MergedClassList = Vec<EquivalenceClass>;

// ============================================================================
// HEX DECODING
// ============================================================================

/// Decode one hexadecimal code point token (`0041`, `1F600`)
pub fn decode_codepoint(token: &str, line: usize) -> Result<char, ParseError> {
    let token = token.trim();
    let invalid = || ParseError::InvalidHex {
        line,
        token: token.to_string(),
    };

    if token.is_empty() || !token.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let value = u32::from_str_radix(token, 16).map_err(|_| invalid())?;
    char::from_u32(value).ok_or(ParseError::InvalidCodepoint { line, value })
}

/// Decode a space-separated code point list (`0030 0338`) into one glyph
pub fn decode_sequence(field: &str, line: usize) -> Result<Glyph, ParseError> {
    let chars = field
        .split_whitespace()
        .map(|token| decode_codepoint(token, line))
        .collect::<Result<Vec<char>, ParseError>>()?;

    Glyph::from_chars(chars).ok_or(ParseError::EmptySequence { line })
}

// ============================================================================
// TESTS
// ============================================================================
