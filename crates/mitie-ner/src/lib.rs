//! # mitie-ner
//!
//! Safe bindings for the [MITIE](https://github.com/mit-nlp/MITIE) named
//! entity extractor and binary relation detectors.
//!
//! The native library is linked when the `mitie` feature is enabled. Set
//! `MITIE_LIB_DIR` if `libmitie` is not on the default search path.
//!
//! ## Quick Start
//!
//! ```no_run
//! # #[cfg(feature = "mitie")]
//! # fn main() -> mitie_ner::Result<()> {
//! use mitie_ner::{Extractor, open_all_in_directory, tokenize};
//!
//! let ext = Extractor::open("MITIE-models/english/ner_model.dat")?;
//! let tokens = tokenize("Benjamin Franklin was born in Boston.")?;
//!
//! for entity in ext.extract(&tokens)? {
//!     println!("{} {}", entity.tag_name, entity.name);
//! }
//!
//! let detectors = open_all_in_directory("MITIE-models/english/binary_relations")?;
//! let extraction = ext.open_extraction(tokens)?;
//! for rel in extraction.detect(&detectors)? {
//!     println!("{} {:?} -> {:?}", rel.relationship, rel.from, rel.to);
//! }
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "mitie"))]
//! # fn main() {}
//! ```
//!
//! Native handles are released when their owner is dropped. An
//! [`Extraction`] borrows its [`Extractor`], so the model cannot be released
//! while relation detection may still need it.
pub mod config;
pub mod engine;
pub mod error;
pub mod extractor;
#[cfg_attr(not(feature = "mitie"), allow(dead_code))]
mod marshal;
#[cfg(feature = "mitie")]
mod native;
pub mod relation;
pub mod types;

#[cfg(test)]
mod testing;

pub use config::{DETECTOR_EXTENSION, RelationConfig};
pub use engine::{Detection, Engine};
pub use error::{NerError, Result};
pub use extractor::{Extraction, Extractor};
#[cfg(feature = "mitie")]
pub use native::Mitie;
#[cfg(feature = "mitie")]
pub use relation::open_all_in_directory;
pub use relation::{Detector, detect, open_all_in_directory_with};
pub use types::{Entity, Range, Relation};

/// Splits `text` into tokens with the MITIE tokenizer.
///
/// Empty text yields no tokens.
///
/// # Errors
///
/// [`NerError::InteriorNul`] if `text` contains a NUL byte,
/// [`NerError::OutOfMemory`] if the tokenizer cannot allocate its result.
#[cfg(feature = "mitie")]
pub fn tokenize(text: &str) -> Result<Vec<String>> {
    Mitie.tokenize(text)
}

/// Like [`tokenize`], also returning the byte offset in `text` where each
/// token starts.
#[cfg(feature = "mitie")]
pub fn tokenize_with_offsets(text: &str) -> Result<(Vec<String>, Vec<usize>)> {
    Mitie.tokenize_with_offsets(text)
}
