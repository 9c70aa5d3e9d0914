use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while talking to the extraction engine.
#[derive(Debug, Error)]
pub enum NerError {
    /// A model or relation detector file could not be loaded.
    ///
    /// The native library does not say why (missing file, unreadable,
    /// malformed), so neither does this variant.
    #[error("unable to open model file {}", path.display())]
    CannotOpen {
        /// The path that failed to load.
        path: PathBuf,
    },

    /// The native library could not allocate a result.
    #[error("could not allocate memory")]
    OutOfMemory,

    /// A relation detector was run on features produced by a different
    /// entity model than the one it was trained with.
    #[error("an incompatible NER model was used with the relation detector")]
    IncompatibleModel,

    /// Text or a token contained a NUL byte and cannot be passed to C.
    #[error("input contains an interior NUL byte at position {position}")]
    InteriorNul {
        /// Byte position of the NUL within the offending string.
        position: usize,
    },

    /// The engine reported a detection that does not fit the tokens or the
    /// tag vocabulary it was run with.
    #[error("malformed detection #{index}: {reason}")]
    MalformedDetection {
        /// Index of the detection in the engine's result.
        index: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// A token index is too large for the native library's index type.
    #[error("token index {value} does not fit the native index type")]
    IndexOverflow {
        /// The index that could not be converted.
        value: usize,
    },

    /// A detector directory could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<std::ffi::NulError> for NerError {
    fn from(err: std::ffi::NulError) -> Self {
        NerError::InteriorNul {
            position: err.nul_position(),
        }
    }
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, NerError>;
