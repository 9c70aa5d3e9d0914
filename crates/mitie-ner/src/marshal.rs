//! Conversions between Rust strings and the C string arrays the native
//! library speaks.

use std::ffi::{CStr, CString, c_char};
use std::fmt;
use std::ptr;

use crate::error::Result;

/// A null-terminated `char**` built from Rust tokens.
///
/// The strings are owned by this value and stay at a fixed address for its
/// whole life, so the pointer returned by [`TokenArray::as_ptr`] can be
/// handed to native code that reads it again later.
pub struct TokenArray {
    _strings: Vec<CString>,
    ptrs: Vec<*const c_char>,
}

impl TokenArray {
    /// Marshals `tokens`. Fails if any token contains a NUL byte.
    pub fn new<S: AsRef<str>>(tokens: &[S]) -> Result<Self> {
        let strings = tokens
            .iter()
            .map(|t| CString::new(t.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let mut ptrs: Vec<*const c_char> = strings.iter().map(|s| s.as_ptr()).collect();
        ptrs.push(ptr::null());
        Ok(Self {
            _strings: strings,
            ptrs,
        })
    }

    /// Number of tokens, not counting the terminator.
    pub fn len(&self) -> usize {
        self.ptrs.len() - 1
    }

    /// The array in the `char**` shape the C API declares. The native side
    /// only reads through it.
    pub fn as_ptr(&self) -> *mut *mut c_char {
        self.ptrs.as_ptr() as *mut *mut c_char
    }
}

impl fmt::Debug for TokenArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenArray").field("len", &self.len()).finish()
    }
}

// SAFETY: the raw pointers only point into `_strings`, which moves with the
// array and is never mutated.
unsafe impl Send for TokenArray {}

/// Copies a null-terminated array of C strings into owned Rust strings.
///
/// Invalid UTF-8 is replaced with U+FFFD.
///
/// # Safety
///
/// `array` must be non-null and point to a sequence of valid C string
/// pointers terminated by a null pointer.
pub unsafe fn collect_strings(array: *const *const c_char) -> Vec<String> {
    let mut out = Vec::new();
    let mut i = 0;
    loop {
        // SAFETY: the caller guarantees the array is null-terminated, and we
        // stop at the terminator.
        let p = unsafe { *array.add(i) };
        if p.is_null() {
            break;
        }
        out.push(unsafe { CStr::from_ptr(p) }.to_string_lossy().into_owned());
        i += 1;
    }
    out
}

/// Like [`collect_strings`], additionally reading one offset per token from
/// the parallel `offsets` array.
///
/// # Safety
///
/// As for [`collect_strings`]; in addition, when the token array is not
/// empty `offsets` must be non-null and hold at least as many elements as
/// there are tokens.
pub unsafe fn collect_strings_with_offsets<O>(
    array: *const *const c_char,
    offsets: *const O,
) -> (Vec<String>, Vec<usize>)
where
    O: Copy + TryInto<usize>,
{
    let tokens = unsafe { collect_strings(array) };
    let offsets = (0..tokens.len())
        // SAFETY: the caller guarantees one offset per token.
        .map(|i| unsafe { *offsets.add(i) })
        .map(|o| o.try_into().unwrap_or(usize::MAX))
        .collect();
    (tokens, offsets)
}
