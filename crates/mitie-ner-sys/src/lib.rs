//! # mitie-ner-sys
//!
//! Raw declarations for the subset of the MITIE C API (`mitie.h`) used by
//! `mitie-ner`: tokenization, named entity extraction and binary relation
//! detection. Everything here is `unsafe`; use the `mitie-ner` crate for a
//! safe interface.
//!
//! Every pointer returned by a `mitie_*` function that allocates must be
//! released with [`mitie_free`], including the token arrays returned by the
//! tokenizers and the offsets buffer of [`mitie_tokenize_with_offsets`].
#![allow(non_camel_case_types)]

use std::ffi::{c_char, c_double, c_int, c_ulong, c_void};
use std::marker::{PhantomData, PhantomPinned};

macro_rules! opaque {
    ($($(#[$meta:meta])* $name:ident;)*) => {
        $(
            $(#[$meta])*
            #[repr(C)]
            pub struct $name {
                _data: [u8; 0],
                _marker: PhantomData<(*mut u8, PhantomPinned)>,
            }
        )*
    };
}

opaque! {
    /// A loaded named entity extractor (NER model).
    mitie_named_entity_extractor;
    /// The output of one `mitie_extract_entities` call.
    mitie_named_entity_detections;
    /// A loaded binary relation detector.
    mitie_binary_relation_detector;
    /// Features describing one ordered pair of entity mentions.
    mitie_binary_relation;
}

unsafe extern "C" {
    /// Releases any object allocated by this API. Null is a no-op.
    pub fn mitie_free(object: *mut c_void);

    /// Splits `text` into a null-terminated array of tokens.
    pub fn mitie_tokenize(text: *const c_char) -> *mut *mut c_char;

    /// Like [`mitie_tokenize`] but also stores, in `token_offsets`, a newly
    /// allocated array holding the byte offset of each token in `text`.
    pub fn mitie_tokenize_with_offsets(
        text: *const c_char,
        token_offsets: *mut *mut c_ulong,
    ) -> *mut *mut c_char;

    pub fn mitie_load_named_entity_extractor(
        filename: *const c_char,
    ) -> *mut mitie_named_entity_extractor;

    pub fn mitie_get_num_possible_ner_tags(ner: *const mitie_named_entity_extractor) -> c_ulong;

    /// Returns a string owned by `ner`; valid while `ner` lives.
    pub fn mitie_get_named_entity_tagstr(
        ner: *const mitie_named_entity_extractor,
        idx: c_ulong,
    ) -> *const c_char;

    /// Runs entity detection over a null-terminated token array. Returns null
    /// when memory cannot be allocated.
    pub fn mitie_extract_entities(
        ner: *const mitie_named_entity_extractor,
        tokens: *mut *mut c_char,
    ) -> *mut mitie_named_entity_detections;

    pub fn mitie_ner_get_num_detections(dets: *const mitie_named_entity_detections) -> c_ulong;

    pub fn mitie_ner_get_detection_position(
        dets: *const mitie_named_entity_detections,
        idx: c_ulong,
    ) -> c_ulong;

    pub fn mitie_ner_get_detection_length(
        dets: *const mitie_named_entity_detections,
        idx: c_ulong,
    ) -> c_ulong;

    pub fn mitie_ner_get_detection_tag(
        dets: *const mitie_named_entity_detections,
        idx: c_ulong,
    ) -> c_ulong;

    pub fn mitie_ner_get_detection_tagstr(
        dets: *const mitie_named_entity_detections,
        idx: c_ulong,
    ) -> *const c_char;

    pub fn mitie_ner_get_detection_score(
        dets: *const mitie_named_entity_detections,
        idx: c_ulong,
    ) -> c_double;

    pub fn mitie_load_binary_relation_detector(
        filename: *const c_char,
    ) -> *mut mitie_binary_relation_detector;

    /// Returns a string owned by `detector`; valid while `detector` lives.
    pub fn mitie_binary_relation_detector_name_string(
        detector: *const mitie_binary_relation_detector,
    ) -> *const c_char;

    /// Returns nonzero if the two token ranges overlap.
    pub fn mitie_entities_overlap(
        arg1_start: c_ulong,
        arg1_length: c_ulong,
        arg2_start: c_ulong,
        arg2_length: c_ulong,
    ) -> c_int;

    /// Extracts relation features for the ordered argument pair. Returns null
    /// when memory cannot be allocated.
    pub fn mitie_extract_binary_relation(
        ner: *const mitie_named_entity_extractor,
        tokens: *mut *mut c_char,
        arg1_start: c_ulong,
        arg1_length: c_ulong,
        arg2_start: c_ulong,
        arg2_length: c_ulong,
    ) -> *mut mitie_binary_relation;

    /// Stores the detector's score for `relation` in `score`. Returns nonzero
    /// when the detector was trained with a different NER model than the one
    /// that produced `relation`.
    pub fn mitie_classify_binary_relation(
        detector: *const mitie_binary_relation_detector,
        relation: *const mitie_binary_relation,
        score: *mut c_double,
    ) -> c_int;
}
