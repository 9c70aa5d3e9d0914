/// File extension of MITIE binary relation detector models.
pub const DETECTOR_EXTENSION: &str = "svm";

/// Configuration for loading relation detectors and scanning extractions.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationConfig {
    /// Extension (without the dot) that marks detector files when loading a
    /// whole directory.
    pub detector_extension: String,
    /// A detector score must be strictly greater than this to yield a
    /// relation. Never negative.
    pub score_threshold: f64,
}

impl Default for RelationConfig {
    fn default() -> Self {
        Self {
            detector_extension: DETECTOR_EXTENSION.to_string(),
            score_threshold: 0.0,
        }
    }
}

impl RelationConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the extension used to recognise detector files.
    pub fn with_detector_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        self.detector_extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Set the score a detection must exceed. Negative values are clamped
    /// to `0.0`.
    pub fn with_score_threshold(mut self, threshold: f64) -> Self {
        self.score_threshold = if threshold.is_nan() {
            0.0
        } else {
            threshold.max(0.0)
        };
        self
    }
}
