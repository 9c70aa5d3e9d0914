//! # MITIE engine
//!
//! [`Engine`] implementation over the MITIE C library via `mitie-ner-sys`.

use std::ffi::{CStr, CString, c_char, c_ulong, c_void};
use std::fmt;
use std::path::Path;
use std::ptr::{self, NonNull};

use mitie_ner_sys as sys;
use tracing::{debug, trace};

use crate::engine::{Detection, Engine};
use crate::error::{NerError, Result};
use crate::marshal::{self, TokenArray};
use crate::types::Range;

/// The MITIE native library.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mitie;

/// An object allocated by MITIE, released with `mitie_free` on drop.
pub struct Owned<T> {
    ptr: NonNull<T>,
}

impl<T> Owned<T> {
    /// Takes ownership of `ptr`; `None` if it is null.
    fn from_raw(ptr: *mut T) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr })
    }

    fn as_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }
}

impl<T> Drop for Owned<T> {
    fn drop(&mut self) {
        // SAFETY: the pointer came from MITIE, is non-null and is released
        // only here.
        unsafe { sys::mitie_free(self.ptr.as_ptr().cast::<c_void>()) }
    }
}

impl<T> fmt::Debug for Owned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Owned").field(&self.ptr).finish()
    }
}

// SAFETY: MITIE objects have no thread affinity. `Owned` is deliberately
// not `Sync`; callers sharing one across threads must lock it themselves.
unsafe impl<T> Send for Owned<T> {}

/// Detections plus the token array they were computed over.
#[derive(Debug)]
pub struct MitieDetections {
    dets: Owned<sys::mitie_named_entity_detections>,
    tokens: TokenArray,
}

fn c_path(path: &Path) -> Result<CString> {
    path.to_str()
        .and_then(|s| CString::new(s).ok())
        .ok_or_else(|| NerError::CannotOpen {
            path: path.to_path_buf(),
        })
}

/// # Safety
///
/// `p` must be null or a valid C string.
unsafe fn owned_string(p: *const c_char) -> String {
    if p.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(p) }.to_string_lossy().into_owned()
}

/// Converts a token index to the native index type, which is narrower than
/// `usize` on LLP64 targets.
fn ulong(n: usize) -> Result<c_ulong> {
    c_ulong::try_from(n).map_err(|_| NerError::IndexOverflow { value: n })
}

impl Engine for Mitie {
    type Model = Owned<sys::mitie_named_entity_extractor>;
    type Detector = Owned<sys::mitie_binary_relation_detector>;
    type Detections = MitieDetections;
    type Features = Owned<sys::mitie_binary_relation>;

    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        let text = CString::new(text)?;
        // SAFETY: `text` is a valid C string for the duration of the call.
        let raw = unsafe { sys::mitie_tokenize(text.as_ptr()) };
        let tokens = Owned::from_raw(raw).ok_or(NerError::OutOfMemory)?;
        // SAFETY: MITIE returns a null-terminated array of C strings.
        Ok(unsafe { marshal::collect_strings(tokens.as_ptr() as *const *const c_char) })
    }

    fn tokenize_with_offsets(&self, text: &str) -> Result<(Vec<String>, Vec<usize>)> {
        let text = CString::new(text)?;
        let mut raw_offsets: *mut c_ulong = ptr::null_mut();
        // SAFETY: `text` is a valid C string and `raw_offsets` a valid out
        // pointer.
        let raw = unsafe { sys::mitie_tokenize_with_offsets(text.as_ptr(), &mut raw_offsets) };
        let offsets = Owned::from_raw(raw_offsets);
        let tokens = Owned::from_raw(raw).ok_or(NerError::OutOfMemory)?;
        let offsets_ptr = offsets
            .as_ref()
            .map_or(ptr::null(), |o| o.as_ptr() as *const c_ulong);
        // SAFETY: MITIE fills one offset per token.
        let (tokens, offsets_out) = unsafe {
            marshal::collect_strings_with_offsets(
                tokens.as_ptr() as *const *const c_char,
                offsets_ptr,
            )
        };
        if !tokens.is_empty() && offsets.is_none() {
            return Err(NerError::OutOfMemory);
        }
        Ok((tokens, offsets_out))
    }

    fn load_model(&self, path: &Path) -> Result<Self::Model> {
        let c = c_path(path)?;
        // SAFETY: `c` is a valid C string.
        let raw = unsafe { sys::mitie_load_named_entity_extractor(c.as_ptr()) };
        Owned::from_raw(raw).ok_or_else(|| NerError::CannotOpen {
            path: path.to_path_buf(),
        })
    }

    fn tags(&self, model: &Self::Model) -> Vec<String> {
        let ner = model.as_ptr() as *const sys::mitie_named_entity_extractor;
        // SAFETY: `ner` is a live extractor; tag strings are owned by it and
        // copied before it can be released.
        let n = unsafe { sys::mitie_get_num_possible_ner_tags(ner) };
        (0..n)
            .map(|i| unsafe { owned_string(sys::mitie_get_named_entity_tagstr(ner, i)) })
            .collect()
    }

    fn extract_entities(&self, model: &Self::Model, tokens: &[String]) -> Result<Self::Detections> {
        let tokens = TokenArray::new(tokens)?;
        // SAFETY: both pointers are live; the array is null-terminated.
        let raw = unsafe { sys::mitie_extract_entities(model.as_ptr(), tokens.as_ptr()) };
        let dets = Owned::from_raw(raw).ok_or(NerError::OutOfMemory)?;
        trace!(tokens = tokens.len(), "native entity extraction finished");
        Ok(MitieDetections { dets, tokens })
    }

    fn detections(&self, detections: &Self::Detections) -> Vec<Detection> {
        let dets = detections.dets.as_ptr() as *const sys::mitie_named_entity_detections;
        // SAFETY: `dets` is live and every index is below the reported count.
        let n = unsafe { sys::mitie_ner_get_num_detections(dets) };
        (0..n)
            .map(|i| unsafe {
                Detection {
                    position: sys::mitie_ner_get_detection_position(dets, i) as usize,
                    length: sys::mitie_ner_get_detection_length(dets, i) as usize,
                    tag: sys::mitie_ner_get_detection_tag(dets, i) as usize,
                    score: sys::mitie_ner_get_detection_score(dets, i),
                }
            })
            .collect()
    }

    fn load_detector(&self, path: &Path) -> Result<Self::Detector> {
        let c = c_path(path)?;
        // SAFETY: `c` is a valid C string.
        let raw = unsafe { sys::mitie_load_binary_relation_detector(c.as_ptr()) };
        let detector = Owned::from_raw(raw).ok_or_else(|| NerError::CannotOpen {
            path: path.to_path_buf(),
        })?;
        debug!(path = %path.display(), "loaded native relation detector");
        Ok(detector)
    }

    fn detector_name(&self, detector: &Self::Detector) -> String {
        // SAFETY: the detector is live and owns the returned string.
        unsafe { owned_string(sys::mitie_binary_relation_detector_name_string(detector.as_ptr())) }
    }

    fn extract_relation(
        &self,
        model: &Self::Model,
        detections: &Self::Detections,
        from: Range,
        to: Range,
    ) -> Result<Self::Features> {
        let (from_start, from_len) = (ulong(from.start)?, ulong(from.len())?);
        let (to_start, to_len) = (ulong(to.start)?, ulong(to.len())?);
        // SAFETY: the model and the retained token array are both live.
        let raw = unsafe {
            sys::mitie_extract_binary_relation(
                model.as_ptr(),
                detections.tokens.as_ptr(),
                from_start,
                from_len,
                to_start,
                to_len,
            )
        };
        Owned::from_raw(raw).ok_or(NerError::OutOfMemory)
    }

    fn classify(&self, detector: &Self::Detector, features: &Self::Features) -> Result<f64> {
        let mut score = 0.0;
        // SAFETY: both handles are live and `score` is a valid out pointer.
        let status = unsafe {
            sys::mitie_classify_binary_relation(detector.as_ptr(), features.as_ptr(), &mut score)
        };
        if status != 0 {
            return Err(NerError::IncompatibleModel);
        }
        Ok(score)
    }
}
