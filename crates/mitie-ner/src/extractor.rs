//! # Extractor sessions
//!
//! An [`Extractor`] owns one loaded entity model. Running it over a token
//! sequence yields either plain [`Entity`] records ([`Extractor::extract`])
//! or an [`Extraction`] that keeps the native detection state alive for
//! relation detection ([`Extractor::open_extraction`]).

use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::engine::{Detection, Engine};
use crate::error::{NerError, Result};
use crate::types::{Entity, Range};

/// Detects named entities with a loaded model.
pub struct Extractor<E: Engine> {
    engine: E,
    model: E::Model,
    tags: Vec<String>,
}

#[cfg(feature = "mitie")]
impl Extractor<crate::Mitie> {
    /// Loads a MITIE model, e.g. `MITIE-models/english/ner_model.dat`.
    ///
    /// # Errors
    ///
    /// [`NerError::CannotOpen`] if the file is missing, unreadable or not a
    /// model.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(crate::Mitie, path)
    }
}

impl<E: Engine> Extractor<E> {
    /// Loads a model through the given engine.
    pub fn open_with(engine: E, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let model = engine.load_model(path)?;
        let tags = engine.tags(&model);
        debug!(path = %path.display(), tags = tags.len(), "opened entity extractor");
        Ok(Self {
            engine,
            model,
            tags,
        })
    }

    /// The tags this model can assign, e.g. `PERSON` or `LOCATION`.
    ///
    /// [`Entity::tag`] indexes into this slice.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Resolves a tag identifier to its label.
    pub fn tag_name(&self, tag: usize) -> Option<&str> {
        self.tags.get(tag).map(String::as_str)
    }

    /// Finds the entities in `tokens`.
    ///
    /// All native memory used for the run is released before returning.
    ///
    /// # Errors
    ///
    /// [`NerError::OutOfMemory`] if the engine cannot allocate its result,
    /// [`NerError::InteriorNul`] if a token contains a NUL byte.
    pub fn extract<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Vec<Entity>> {
        let tokens = tokens.iter().map(|t| t.as_ref().to_string());
        Ok(self.open_extraction(tokens)?.into_entities())
    }

    /// Finds the entities in `tokens` and keeps the native detection state
    /// so relations between them can be detected afterwards.
    pub fn open_extraction<I, S>(&self, tokens: I) -> Result<Extraction<'_, E>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        let detections = self.engine.extract_entities(&self.model, &tokens)?;
        let entities = self
            .engine
            .detections(&detections)
            .into_iter()
            .enumerate()
            .map(|(index, det)| self.entity(index, det, &tokens))
            .collect::<Result<Vec<_>>>()?;
        debug!(
            tokens = tokens.len(),
            entities = entities.len(),
            "extraction opened"
        );
        Ok(Extraction {
            extractor: self,
            tokens,
            entities,
            detections,
        })
    }

    /// Releases the model.
    pub fn close(self) {
        debug!(tags = self.tags.len(), "closing entity extractor");
    }

    pub(crate) fn engine(&self) -> &E {
        &self.engine
    }

    pub(crate) fn model(&self) -> &E::Model {
        &self.model
    }

    fn entity(&self, index: usize, det: Detection, tokens: &[String]) -> Result<Entity> {
        let malformed = |reason: String| NerError::MalformedDetection { index, reason };

        let end = det
            .position
            .checked_add(det.length)
            .filter(|&end| det.length > 0 && end <= tokens.len())
            .ok_or_else(|| {
                malformed(format!(
                    "range {}+{} outside {} tokens",
                    det.position,
                    det.length,
                    tokens.len()
                ))
            })?;
        let tag_name = self.tag_name(det.tag).ok_or_else(|| {
            malformed(format!(
                "tag {} outside vocabulary of {}",
                det.tag,
                self.tags.len()
            ))
        })?;

        Ok(Entity {
            score: det.score,
            tag: det.tag,
            tag_name: tag_name.to_string(),
            name: tokens[det.position..end].join(" "),
            range: Range::new(det.position, end),
        })
    }
}

impl<E: Engine> fmt::Debug for Extractor<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extractor")
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}

/// The retained result of one extraction run.
///
/// Holds the tokens, the detected entities and the native detection state
/// needed by [`Extraction::detect`]. The native state is released when the
/// extraction is dropped or closed; because the extraction borrows its
/// [`Extractor`], the model outlives it.
pub struct Extraction<'a, E: Engine> {
    extractor: &'a Extractor<E>,
    tokens: Vec<String>,
    entities: Vec<Entity>,
    detections: E::Detections,
}

impl<'a, E: Engine> Extraction<'a, E> {
    /// The token sequence the extraction ran over.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Detected entities in the order the engine reported them.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// The extractor that produced this extraction.
    pub fn extractor(&self) -> &'a Extractor<E> {
        self.extractor
    }

    /// Releases the native state and keeps only the entities.
    pub fn into_entities(self) -> Vec<Entity> {
        self.entities
    }

    /// Releases the native state.
    pub fn close(self) {}

    pub(crate) fn detections(&self) -> &E::Detections {
        &self.detections
    }
}

impl<E: Engine> fmt::Debug for Extraction<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extraction")
            .field("tokens", &self.tokens.len())
            .field("entities", &self.entities)
            .finish_non_exhaustive()
    }
}
