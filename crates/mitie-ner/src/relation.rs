//! # Binary relation detection
//!
//! A [`Detector`] recognises one kind of relation between two entity
//! mentions, e.g. `people.person.place_of_birth`. Detection runs over a
//! live [`Extraction`]:
//!
//! ```text
//! for each adjacent entity pair (i, i+1), in both argument orders:
//!     skip if the two ranges overlap
//!     extract relation features once
//!     classify the features with every detector
//! ```
//!
//! Only index-adjacent entities are paired. Relations have an ordering to
//! their arguments, so each pair is tried both ways.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};

use crate::config::RelationConfig;
use crate::engine::Engine;
use crate::error::Result;
use crate::extractor::Extraction;
use crate::types::{Entity, Relation};

/// A loaded binary relation detector.
pub struct Detector<E: Engine> {
    handle: E::Detector,
    name: String,
    path: PathBuf,
}

#[cfg(feature = "mitie")]
impl Detector<crate::Mitie> {
    /// Loads a MITIE relation detector (`.svm` file).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(&crate::Mitie, path)
    }
}

impl<E: Engine> Detector<E> {
    /// Loads a detector through the given engine.
    ///
    /// # Errors
    ///
    /// [`crate::NerError::CannotOpen`] if the file cannot be loaded.
    pub fn open_with(engine: &E, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let handle = engine.load_detector(path)?;
        let name = engine.detector_name(&handle);
        debug!(path = %path.display(), relation = %name, "opened relation detector");
        Ok(Self {
            handle,
            name,
            path: path.to_path_buf(),
        })
    }

    /// The name of the relation this detector recognises.
    pub fn identity(&self) -> &str {
        &self.name
    }

    /// The file the detector was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Releases the detector.
    pub fn close(self) {
        debug!(relation = %self.name, "closing relation detector");
    }
}

impl<E: Engine> fmt::Display for Detector<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl<E: Engine> fmt::Debug for Detector<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Detector")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Loads every MITIE relation detector (`*.svm`) directly inside `dir`.
#[cfg(feature = "mitie")]
pub fn open_all_in_directory(dir: impl AsRef<Path>) -> Result<Vec<Detector<crate::Mitie>>> {
    open_all_in_directory_with(&crate::Mitie, dir, &RelationConfig::default())
}

/// A file named exactly `.svm` counts as having the extension, even though
/// [`Path::extension`] treats it as a hidden file with none.
fn has_extension(path: &Path, ext: &str) -> bool {
    match path.extension() {
        Some(found) => found == ext,
        None => path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.strip_prefix('.'))
            .is_some_and(|rest| rest == ext),
    }
}

/// Loads every detector directly inside `dir` whose file extension is
/// `config.detector_extension`, in file name order.
///
/// Sub-directories are not searched. If any detector fails to load, the
/// ones already loaded are released and the error is returned.
pub fn open_all_in_directory_with<E: Engine>(
    engine: &E,
    dir: impl AsRef<Path>,
    config: &RelationConfig,
) -> Result<Vec<Detector<E>>> {
    let dir = dir.as_ref();
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !has_extension(&path, &config.detector_extension) {
            continue;
        }
        if !path.is_file() {
            trace!(path = %path.display(), "skipping non-file entry");
            continue;
        }
        paths.push(path);
    }
    paths.sort();

    let mut detectors = Vec::with_capacity(paths.len());
    for path in paths {
        match Detector::open_with(engine, &path) {
            Ok(det) => detectors.push(det),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    loaded = detectors.len(),
                    "failed to load relation detector, releasing batch"
                );
                return Err(e);
            }
        }
    }
    debug!(dir = %dir.display(), count = detectors.len(), "loaded relation detectors");
    Ok(detectors)
}

/// Detects binary relations between the entities of `extraction`.
///
/// Equivalent to [`Extraction::detect`].
pub fn detect<E: Engine>(
    extraction: &Extraction<'_, E>,
    detectors: &[Detector<E>],
) -> Result<Vec<Relation>> {
    extraction.detect(detectors)
}

impl<E: Engine> Extraction<'_, E> {
    /// Detects binary relations between adjacent entities.
    ///
    /// Every detector must have been trained against the model of the
    /// extractor that produced this extraction.
    ///
    /// # Errors
    ///
    /// [`crate::NerError::OutOfMemory`] if relation features cannot be
    /// allocated, [`crate::NerError::IncompatibleModel`] if a detector does
    /// not match the model. No relations are returned on error.
    pub fn detect(&self, detectors: &[Detector<E>]) -> Result<Vec<Relation>> {
        self.detect_with(detectors, &RelationConfig::default())
    }

    /// Like [`Extraction::detect`], keeping only scores above
    /// `config.score_threshold`.
    pub fn detect_with(
        &self,
        detectors: &[Detector<E>],
        config: &RelationConfig,
    ) -> Result<Vec<Relation>> {
        let mut relations = Vec::new();
        for pair in self.entities().windows(2) {
            self.detect_pair(detectors, &pair[0], &pair[1], config, &mut relations)?;
            self.detect_pair(detectors, &pair[1], &pair[0], config, &mut relations)?;
        }
        debug!(
            entities = self.entities().len(),
            detectors = detectors.len(),
            relations = relations.len(),
            "relation scan finished"
        );
        Ok(relations)
    }

    fn detect_pair(
        &self,
        detectors: &[Detector<E>],
        from: &Entity,
        to: &Entity,
        config: &RelationConfig,
        out: &mut Vec<Relation>,
    ) -> Result<()> {
        if from.range.overlaps(&to.range) {
            trace!(from = %from.name, to = %to.name, "skipping overlapping pair");
            return Ok(());
        }

        let extractor = self.extractor();
        let engine = extractor.engine();
        let features =
            engine.extract_relation(extractor.model(), self.detections(), from.range, to.range)?;

        for detector in detectors {
            let score = engine.classify(&detector.handle, &features)?;
            trace!(
                relation = %detector.name,
                from = %from.name,
                to = %to.name,
                score,
                "classified"
            );
            if score > config.score_threshold {
                out.push(Relation {
                    relationship: detector.name.clone(),
                    from: from.range,
                    to: to.range,
                    score,
                });
            }
        }
        Ok(())
    }
}
