// 📦 Artifact - the final dictionary handed to the sinks
// Serialized shape: [{"data": ["A", "a", ...]}, ...]

use crate::glyph::{EquivalenceClass, Glyph};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// One equivalence class wrapped in the record shape the consumer reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomoglyphRecord {
    pub data: Vec<Glyph>,
}

impl HomoglyphRecord {
    pub fn contains(&self, glyph: &Glyph) -> bool {
        self.data.contains(glyph)
    }
}

/// Ordered sequence of records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Artifact {
    records: Vec<HomoglyphRecord>,
}

impl Artifact {
    pub fn from_records(records: Vec<HomoglyphRecord>) -> Self {
        Artifact { records }
    }

    pub fn records(&self) -> &[HomoglyphRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total members across all records
    pub fn glyph_count(&self) -> usize {
        self.records.iter().map(|r| r.data.len()).sum()
    }

    pub fn glyphs(&self) -> impl Iterator<Item = &Glyph> {
        self.records.iter().flat_map(|r| r.data.iter())
    }

    /// Hex SHA-256 over records and members in order
    ///
    /// Every record and member is length-prefixed, so moving a glyph across a
    /// record boundary changes the digest.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update((self.records.len() as u64).to_le_bytes());
        for record in &self.records {
            hasher.update((record.data.len() as u64).to_le_bytes());
            for glyph in &record.data {
                let bytes = glyph.as_str().as_bytes();
                hasher.update((bytes.len() as u64).to_le_bytes());
                hasher.update(bytes);
            }
        }
        format!("{:x}", hasher.finalize())
    }

    /// glyph -> record index for read-back lookups
    pub fn index(&self) -> ArtifactIndex<'_> {
        let mut positions = HashMap::with_capacity(self.glyph_count());
        for (position, record) in self.records.iter().enumerate() {
            for glyph in &record.data {
                positions.entry(glyph).or_insert(position);
            }
        }
        ArtifactIndex {
            artifact: self,
            positions,
        }
    }

    pub fn into_classes(self) -> Vec<EquivalenceClass> {
        self.records
            .into_iter()
            .map(|r| EquivalenceClass::new(r.data))
            .collect()
    }
}

/// Lookup table over a built artifact
pub struct ArtifactIndex<'a> {
    artifact: &'a Artifact,
    positions: HashMap<&'a Glyph, usize>,
}

impl<'a> ArtifactIndex<'a> {
    pub fn position_of(&self, glyph: &Glyph) -> Option<usize> {
        self.positions.get(glyph).copied()
    }

    /// The record a glyph belongs to
    pub fn class_of(&self, glyph: &Glyph) -> Option<&'a HomoglyphRecord> {
        self.position_of(glyph).map(|p| &self.artifact.records[p])
    }

    /// Whether two glyphs ended up in the same class
    pub fn are_confusable(&self, a: &Glyph, b: &Glyph) -> bool {
        match (self.position_of(a), self.position_of(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }
}

// ============================================================================
// ARTIFACT BUILDER
// ============================================================================

/// Wraps finalized classes into records; no semantic change.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArtifactBuilder;

impl ArtifactBuilder {
    pub fn new() -> Self {
        ArtifactBuilder
    }

    pub fn build(&self, classes: Vec<EquivalenceClass>) -> Artifact {
        Artifact::from_records(
            classes
                .into_iter()
                .map(|class| HomoglyphRecord {
                    data: class.into_members(),
                })
                .collect(),
        )
    }
}
