//! Plain record types handed back to callers.

use serde::{Deserialize, Serialize};

/// Position of an entity within a token sequence.
///
/// Half-open and 0-indexed: `start..end` covers the tokens
/// `tokens[start]` through `tokens[end - 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    /// Index of the first token.
    pub start: usize,
    /// Index one past the last token.
    pub end: usize,
}

impl Range {
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of tokens covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the two ranges share at least one token.
    #[must_use]
    pub fn overlaps(&self, other: &Range) -> bool {
        !self.is_empty() && !other.is_empty() && self.start < other.end && other.start < self.end
    }

    /// The range as a slice index.
    #[must_use]
    pub fn as_std(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

impl From<std::ops::Range<usize>> for Range {
    fn from(r: std::ops::Range<usize>) -> Self {
        Self::new(r.start, r.end)
    }
}

/// A detected named entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Confidence reported by the model; larger is more confident.
    pub score: f64,
    /// Tag identifier, an index into the extractor's tag vocabulary.
    pub tag: usize,
    /// Tag label resolved through the vocabulary (e.g. `PERSON`).
    pub tag_name: String,
    /// The entity's tokens joined by single spaces.
    pub name: String,
    /// Where the entity sits in the token sequence.
    pub range: Range,
}

/// A binary relation between two entity mentions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    /// Identity of the detector that recognised the relation
    /// (e.g. `people.person.place_of_birth`).
    pub relationship: String,
    /// First argument of the relation.
    pub from: Range,
    /// Second argument of the relation.
    pub to: Range,
    /// Detector score, always above the scan threshold.
    pub score: f64,
}
