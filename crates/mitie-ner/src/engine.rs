//! # Engine seam
//!
//! The native entry points the sessions are built on. [`crate::Mitie`] is
//! the production implementation (feature `mitie`).
//!
//! Every associated handle type owns one native resource and releases it
//! in its `Drop` impl, so a handle is freed exactly once and on every exit
//! path.

use std::path::Path;

use crate::error::Result;

/// One raw record from an entity detection run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    /// Index of the first token of the entity.
    pub position: usize,
    /// Number of tokens in the entity.
    pub length: usize,
    /// Tag identifier in the model's vocabulary.
    pub tag: usize,
    pub score: f64,
}

/// The operations a named entity / relation engine provides.
pub trait Engine: Clone {
    /// A loaded entity model.
    type Model;
    /// A loaded binary relation detector.
    type Detector;
    /// A detection result together with the marshaled tokens it was
    /// computed over, kept so relation features can be extracted later.
    type Detections;
    /// Relation-mention features for one ordered pair of entities.
    type Features;

    /// Splits text into tokens.
    fn tokenize(&self, text: &str) -> Result<Vec<String>>;

    /// Splits text into tokens and the byte offset where each one starts.
    fn tokenize_with_offsets(&self, text: &str) -> Result<(Vec<String>, Vec<usize>)>;

    /// Loads an entity model from disk.
    fn load_model(&self, path: &Path) -> Result<Self::Model>;

    /// The model's tag vocabulary, in identifier order.
    fn tags(&self, model: &Self::Model) -> Vec<String>;

    /// Runs entity detection over `tokens`.
    fn extract_entities(&self, model: &Self::Model, tokens: &[String]) -> Result<Self::Detections>;

    /// Reads every record out of a detection result, in engine order.
    fn detections(&self, detections: &Self::Detections) -> Vec<Detection>;

    /// Loads a binary relation detector from disk.
    fn load_detector(&self, path: &Path) -> Result<Self::Detector>;

    /// The detector's relation name.
    fn detector_name(&self, detector: &Self::Detector) -> String;

    /// Computes relation features for the ordered pair `(from, to)` of token
    /// ranges over the tokens retained in `detections`.
    fn extract_relation(
        &self,
        model: &Self::Model,
        detections: &Self::Detections,
        from: crate::Range,
        to: crate::Range,
    ) -> Result<Self::Features>;

    /// Scores `features` with `detector`. A positive score means the pair is
    /// an instance of the detector's relation.
    fn classify(&self, detector: &Self::Detector, features: &Self::Features) -> Result<f64>;
}
