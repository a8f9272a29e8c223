//! `SecureSecret`: an owned secret that zeroes its memory.
//!
//! The backing buffer is only reachable through `reveal` (which hands
//! out a `Zeroizing<String>`) or the scoped `with_revealed` accessor.
//! Old content is wiped before new content is written into the buffer,
//! and the whole buffer is wiped when the holder is dropped.

use std::fmt;

use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Capacity reserved up front so typical secrets never reallocate
/// (a reallocation would leave a stale copy behind on the heap).
const RESERVED_CAPACITY: usize = 512;

/// A secret string that is zeroed on reassignment, `clear` and drop.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct SecureSecret {
    text: String,
}

impl SecureSecret {
    /// Create an empty secret.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy `plain` into a freshly reserved buffer.
    pub fn from_plain_text(plain: &str) -> Self {
        let mut text = String::with_capacity(plain.len().max(RESERVED_CAPACITY));
        text.push_str(plain);
        Self { text }
    }

    /// Replace the content, wiping the previous value first.
    pub fn assign(&mut self, plain: &str) {
        self.text.zeroize();
        if self.text.capacity() < plain.len() {
            // The old buffer is already zeroed; let it go.
            self.text = String::with_capacity(plain.len().max(RESERVED_CAPACITY));
        }
        self.text.push_str(plain);
    }

    /// Return a short-lived plain-text copy that is wiped when dropped.
    pub fn reveal(&self) -> Zeroizing<String> {
        Zeroizing::new(self.text.clone())
    }

    /// Borrow the plain text for the duration of `f` without copying it.
    pub fn with_revealed<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        f(&self.text)
    }

    /// Move the secret out, leaving an empty holder behind.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    /// Length in UTF-16 code units, the unit native length caps use.
    pub fn utf16_len(&self) -> usize {
        self.text.encode_utf16().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Wipe the content. Calling this repeatedly is harmless.
    pub fn clear(&mut self) {
        self.text.zeroize();
    }

    /// Wipe the content; the holder should not be reused afterwards.
    pub fn dispose(&mut self) {
        self.clear();
    }
}

impl From<&str> for SecureSecret {
    fn from(plain: &str) -> Self {
        Self::from_plain_text(plain)
    }
}

impl PartialEq for SecureSecret {
    fn eq(&self, other: &Self) -> bool {
        self.text.as_bytes().ct_eq(other.text.as_bytes()).into()
    }
}

impl Eq for SecureSecret {}

impl fmt::Debug for SecureSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecureSecret(***)")
    }
}
