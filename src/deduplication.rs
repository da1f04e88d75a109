// 🔍 Deduplication Engine - each class becomes a set
// Class boundaries are never touched here, only repeated members inside one class.

use crate::glyph::EquivalenceClass;
use serde::{Deserialize, Serialize};

// ============================================================================
// DEDUPLICATION SUMMARY
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeduplicationSummary {
    /// Classes inspected
    pub classes: usize,

    /// Classes that contained at least one repeat
    pub classes_changed: usize,

    /// Repeated memberships removed in total
    pub duplicates_removed: usize,
}

// ============================================================================
// DEDUPLICATOR
// ============================================================================

#[derive(Debug, Default, Clone, Copy)]
pub struct Deduplicator;

impl Deduplicator {
    pub fn new() -> Self {
        Deduplicator
    }

    /// Drop repeated members, keeping the first occurrence of each
    pub fn deduplicate(&self, classes: &[EquivalenceClass]) -> Vec<EquivalenceClass> {
        self.deduplicate_with_summary(classes).0
    }

    /// Same as [`Deduplicator::deduplicate`], plus what was removed
    pub fn deduplicate_with_summary(
        &self,
        classes: &[EquivalenceClass],
    ) -> (Vec<EquivalenceClass>, DeduplicationSummary) {
        let mut summary = DeduplicationSummary {
            classes: classes.len(),
            ..Default::default()
        };

        let deduplicated = classes
            .iter()
            .map(|class| {
                let unique = class.deduplicated();
                let removed = class.len() - unique.len();
                if removed > 0 {
                    summary.classes_changed += 1;
                    summary.duplicates_removed += removed;
                }
                unique
            })
            .collect();

        (deduplicated, summary)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn class(chars: &str) -> EquivalenceClass {
        EquivalenceClass::from_chars(chars.chars())
    }

    #[test]
    fn test_removes_repeats_in_first_seen_order() {
        let dedup = Deduplicator::new();
        let result = dedup.deduplicate(&[class("abab"), class("c")]);
        assert_eq!(result, vec![class("ab"), class("c")]);
    }

    #[test]
    fn test_keeps_class_boundaries() {
        // The same glyph in two classes is a merge problem, not a dedup one
        let dedup = Deduplicator::new();
        let result = dedup.deduplicate(&[class("ab"), class("bc")]);
        assert_eq!(result, vec![class("ab"), class("bc")]);
    }

    #[test]
    fn test_idempotent() {
        let dedup = Deduplicator::new();
        let once = dedup.deduplicate(&[class("aab"), class("xyzzy"), class("")]);
        let twice = dedup.deduplicate(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_summary_counts() {
        let dedup = Deduplicator::new();
        let (_, summary) =
            dedup.deduplicate_with_summary(&[class("aaa"), class("bc"), class("cdcd")]);

        assert_eq!(
            summary,
            DeduplicationSummary {
                classes: 3,
                classes_changed: 2,
                duplicates_removed: 4,
            }
        );
    }
}
