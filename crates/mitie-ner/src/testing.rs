//! In-memory engine used by the unit tests.
//!
//! Models are files whose content is a model id registered on the engine.
//! Detector files hold two lines: the relation name and the id of the model
//! they were trained against. Every handle the engine hands out is counted
//! so tests can assert that nothing leaks and nothing is freed twice.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::engine::{Detection, Engine};
use crate::error::{NerError, Result};
use crate::types::Range;

pub const TAGS: [&str; 4] = ["PERSON", "LOCATION", "ORGANIZATION", "MISC"];

pub const PARAGRAPH: &str = "A Pegasus Airlines plane landed at an Istanbul airport Friday \
after a passenger wanted the plane to land in Sochi , Russia . \
From wikipedia we learn that Josiah Franklin 's son , Benjamin Franklin was born in Boston .";

#[derive(Debug, Clone)]
struct ModelSpec {
    tags: Vec<String>,
    gazetteer: Vec<(Vec<String>, usize, f64)>,
}

#[derive(Debug, Default)]
struct State {
    live: AtomicUsize,
    allocated: AtomicUsize,
    feature_extractions: AtomicUsize,
    classifications: AtomicUsize,
    live_features: AtomicUsize,
    peak_live_features: AtomicUsize,
    models: Mutex<HashMap<String, ModelSpec>>,
    scores: Mutex<HashMap<String, Vec<(String, String, f64)>>>,
    raw_detections: Mutex<Option<Vec<Detection>>>,
    fail_extract: Mutex<bool>,
    fail_features_after: Mutex<Option<usize>>,
}

/// One counted native allocation.
#[derive(Debug)]
struct Tracked(Arc<State>);

impl Tracked {
    fn new(state: &Arc<State>) -> Self {
        state.live.fetch_add(1, Ordering::SeqCst);
        state.allocated.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(state))
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        let before = self.0.live.fetch_sub(1, Ordering::SeqCst);
        assert!(before > 0, "native handle released twice");
    }
}

/// Relation features currently held, with the high-water mark.
#[derive(Debug)]
struct FeatureSlot(Arc<State>);

impl FeatureSlot {
    fn new(state: &Arc<State>) -> Self {
        let live = state.live_features.fetch_add(1, Ordering::SeqCst) + 1;
        state.peak_live_features.fetch_max(live, Ordering::SeqCst);
        Self(Arc::clone(state))
    }
}

impl Drop for FeatureSlot {
    fn drop(&mut self) {
        self.0.live_features.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug)]
pub struct FakeModel {
    id: String,
    spec: ModelSpec,
    _handle: Tracked,
}

#[derive(Debug)]
pub struct FakeDetector {
    name: String,
    model_id: String,
    _handle: Tracked,
}

#[derive(Debug)]
pub struct FakeDetections {
    tokens: Vec<String>,
    detections: Vec<Detection>,
    _result: Tracked,
    _token_array: Tracked,
}

#[derive(Debug)]
pub struct FakeFeatures {
    model_id: String,
    from: String,
    to: String,
    _handle: Tracked,
    _slot: FeatureSlot,
}

#[derive(Debug, Clone, Default)]
pub struct FakeEngine {
    state: Arc<State>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a model id with its tags and the phrases it recognises as
    /// `(phrase, tag, score)`.
    pub fn with_model(self, id: &str, tags: &[&str], gazetteer: &[(&str, usize, f64)]) -> Self {
        let spec = ModelSpec {
            tags: tags.iter().map(|t| t.to_string()).collect(),
            gazetteer: gazetteer
                .iter()
                .map(|(phrase, tag, score)| {
                    let words = phrase.split_whitespace().map(str::to_string).collect();
                    (words, *tag, *score)
                })
                .collect(),
        };
        self.state.models.lock().unwrap().insert(id.to_string(), spec);
        self
    }

    /// Sets the score a detector gives the ordered pair `(from, to)` of
    /// entity names. Unlisted pairs score `-1.0`.
    pub fn with_score(self, detector: &str, from: &str, to: &str, score: f64) -> Self {
        self.state
            .scores
            .lock()
            .unwrap()
            .entry(detector.to_string())
            .or_default()
            .push((from.to_string(), to.to_string(), score));
        self
    }

    /// Makes every extraction report exactly these detections.
    pub fn with_raw_detections(self, detections: Vec<Detection>) -> Self {
        *self.state.raw_detections.lock().unwrap() = Some(detections);
        self
    }

    pub fn fail_extraction(&self) {
        *self.state.fail_extract.lock().unwrap() = true;
    }

    /// Lets `n` relation feature extractions succeed, then reports
    /// allocation failure.
    pub fn fail_features_after(&self, n: usize) {
        *self.state.fail_features_after.lock().unwrap() = Some(n);
    }

    /// Native handles currently alive.
    pub fn live(&self) -> usize {
        self.state.live.load(Ordering::SeqCst)
    }

    /// Native handles ever allocated.
    pub fn allocated(&self) -> usize {
        self.state.allocated.load(Ordering::SeqCst)
    }

    pub fn feature_extractions(&self) -> usize {
        self.state.feature_extractions.load(Ordering::SeqCst)
    }

    pub fn classifications(&self) -> usize {
        self.state.classifications.load(Ordering::SeqCst)
    }

    /// Relation features currently held.
    pub fn live_features(&self) -> usize {
        self.state.live_features.load(Ordering::SeqCst)
    }

    /// Most relation features ever held at once.
    pub fn peak_live_features(&self) -> usize {
        self.state.peak_live_features.load(Ordering::SeqCst)
    }

    fn find_entities(spec: &ModelSpec, tokens: &[String]) -> Vec<Detection> {
        let mut out = Vec::new();
        let mut i = 0;
        'scan: while i < tokens.len() {
            for (words, tag, score) in &spec.gazetteer {
                let end = i + words.len();
                if !words.is_empty() && end <= tokens.len() && tokens[i..end] == words[..] {
                    out.push(Detection {
                        position: i,
                        length: words.len(),
                        tag: *tag,
                        score: *score,
                    });
                    i = end;
                    continue 'scan;
                }
            }
            i += 1;
        }
        out
    }
}

impl Engine for FakeEngine {
    type Model = FakeModel;
    type Detector = FakeDetector;
    type Detections = FakeDetections;
    type Features = FakeFeatures;

    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        self.tokenize_with_offsets(text).map(|(tokens, _)| tokens)
    }

    fn tokenize_with_offsets(&self, text: &str) -> Result<(Vec<String>, Vec<usize>)> {
        let mut tokens = Vec::new();
        let mut offsets = Vec::new();
        let mut start = None;
        for (idx, c) in text.char_indices() {
            match (c.is_whitespace(), start) {
                (true, Some(s)) => {
                    tokens.push(text[s..idx].to_string());
                    offsets.push(s);
                    start = None;
                }
                (false, None) => start = Some(idx),
                _ => {}
            }
        }
        if let Some(s) = start {
            tokens.push(text[s..].to_string());
            offsets.push(s);
        }
        Ok((tokens, offsets))
    }

    fn load_model(&self, path: &Path) -> Result<Self::Model> {
        let cannot_open = || NerError::CannotOpen {
            path: path.to_path_buf(),
        };
        let id = fs::read_to_string(path).map_err(|_| cannot_open())?;
        let id = id.trim().to_string();
        let spec = self
            .state
            .models
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(cannot_open)?;
        Ok(FakeModel {
            id,
            spec,
            _handle: Tracked::new(&self.state),
        })
    }

    fn tags(&self, model: &Self::Model) -> Vec<String> {
        model.spec.tags.clone()
    }

    fn extract_entities(&self, model: &Self::Model, tokens: &[String]) -> Result<Self::Detections> {
        // The token array is marshaled before the native call.
        let token_array = Tracked::new(&self.state);
        if *self.state.fail_extract.lock().unwrap() {
            return Err(NerError::OutOfMemory);
        }
        let detections = match self.state.raw_detections.lock().unwrap().clone() {
            Some(raw) => raw,
            None => Self::find_entities(&model.spec, tokens),
        };
        Ok(FakeDetections {
            tokens: tokens.to_vec(),
            detections,
            _result: Tracked::new(&self.state),
            _token_array: token_array,
        })
    }

    fn detections(&self, detections: &Self::Detections) -> Vec<Detection> {
        detections.detections.clone()
    }

    fn load_detector(&self, path: &Path) -> Result<Self::Detector> {
        let cannot_open = || NerError::CannotOpen {
            path: path.to_path_buf(),
        };
        let contents = fs::read_to_string(path).map_err(|_| cannot_open())?;
        let mut lines = contents.lines().map(str::trim);
        match (lines.next(), lines.next()) {
            (Some(name), Some(model_id)) if !name.is_empty() && !model_id.is_empty() => {
                Ok(FakeDetector {
                    name: name.to_string(),
                    model_id: model_id.to_string(),
                    _handle: Tracked::new(&self.state),
                })
            }
            _ => Err(cannot_open()),
        }
    }

    fn detector_name(&self, detector: &Self::Detector) -> String {
        detector.name.clone()
    }

    fn extract_relation(
        &self,
        model: &Self::Model,
        detections: &Self::Detections,
        from: Range,
        to: Range,
    ) -> Result<Self::Features> {
        let done = self.state.feature_extractions.load(Ordering::SeqCst);
        if let Some(limit) = *self.state.fail_features_after.lock().unwrap() {
            if done >= limit {
                return Err(NerError::OutOfMemory);
            }
        }
        self.state.feature_extractions.fetch_add(1, Ordering::SeqCst);
        Ok(FakeFeatures {
            model_id: model.id.clone(),
            from: detections.tokens[from.as_std()].join(" "),
            to: detections.tokens[to.as_std()].join(" "),
            _handle: Tracked::new(&self.state),
            _slot: FeatureSlot::new(&self.state),
        })
    }

    fn classify(&self, detector: &Self::Detector, features: &Self::Features) -> Result<f64> {
        self.state.classifications.fetch_add(1, Ordering::SeqCst);
        if detector.model_id != features.model_id {
            return Err(NerError::IncompatibleModel);
        }
        let scores = self.state.scores.lock().unwrap();
        let score = scores
            .get(&detector.name)
            .and_then(|pairs| {
                pairs
                    .iter()
                    .find(|(from, to, _)| *from == features.from && *to == features.to)
            })
            .map_or(-1.0, |(_, _, score)| *score);
        Ok(score)
    }
}

/// Writes `contents` to `dir/name` and returns the path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// An engine with an English-like model over [`PARAGRAPH`] and a
/// place-of-birth detector, plus a directory holding their files.
pub struct Fixture {
    pub dir: tempfile::TempDir,
    pub engine: FakeEngine,
    pub model_path: PathBuf,
    pub detector_path: PathBuf,
}

pub const PLACE_OF_BIRTH: &str = "people.person.place_of_birth";

pub fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let engine = FakeEngine::new()
        .with_model(
            "english",
            &TAGS,
            &[
                ("Pegasus Airlines", 2, 1.2),
                ("Istanbul", 1, 0.9),
                ("Sochi", 1, 0.8),
                ("Russia", 1, 1.1),
                ("Josiah Franklin", 0, 0.7),
                ("Benjamin Franklin", 0, 1.3),
                ("Boston", 1, 1.0),
            ],
        )
        .with_score(PLACE_OF_BIRTH, "Benjamin Franklin", "Boston", 0.8)
        .with_score(PLACE_OF_BIRTH, "Boston", "Benjamin Franklin", -0.4)
        .with_score(PLACE_OF_BIRTH, "Sochi", "Russia", 0.0);
    let model_path = write_file(dir.path(), "ner_model.dat", "english");
    let detector_path = write_file(
        dir.path(),
        "place_of_birth.svm",
        &format!("{PLACE_OF_BIRTH}\nenglish\n"),
    );
    Fixture {
        dir,
        engine,
        model_path,
        detector_path,
    }
}

pub fn paragraph_tokens(engine: &FakeEngine) -> Vec<String> {
    engine.tokenize(PARAGRAPH).unwrap()
}
