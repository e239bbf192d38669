//! Append-only scratch buffer with in-place left-compaction.
//!
//! `GrowBuf` owns a contiguous byte region and a `written` watermark. Bytes
//! `[0, written)` are meaningful; storage beyond the watermark is reusable
//! scratch. Growth is geometric, so repeated appends are amortized O(1).
//!
//! Views returned by [`GrowBuf::subarray`] and [`GrowBuf::as_slice`] are
//! invalidated by the next `grow`, `set`, or `compact`; callers must finish
//! with a view before mutating the buffer again.

use crate::error::SplitError;

const INITIAL_CAPACITY: usize = 1024;

/// Growable byte region with a written-bytes watermark.
#[derive(Debug)]
pub struct GrowBuf {
    data: Vec<u8>,
    written: usize,
}

impl Default for GrowBuf {
    fn default() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }
}

impl GrowBuf {
    /// A buffer with at least `capacity` bytes of storage and zero written.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity.max(1)],
            written: 0,
        }
    }

    /// Bytes written so far.
    #[must_use]
    pub fn written(&self) -> usize {
        self.written
    }

    /// Current storage size.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Ensures storage for at least `target` bytes, preserving `[0, written)`.
    ///
    /// Reallocation doubles the current capacity when that exceeds `target`.
    pub fn grow(&mut self, target: usize) {
        if self.data.len() < target {
            let new_cap = target.max(self.data.len() * 2);
            self.data.resize(new_cap, 0);
        }
    }

    /// Writes `src` at offset `off`, growing as needed, and advances the
    /// watermark to at least `off + src.len()`.
    pub fn set(&mut self, src: &[u8], off: usize) {
        let end = off + src.len();
        self.grow(end);
        self.data[off..end].copy_from_slice(src);
        self.written = self.written.max(end);
    }

    /// Appends `src` at the watermark.
    pub fn extend(&mut self, src: &[u8]) {
        self.set(src, self.written);
    }

    /// Exposes `n` writable bytes past the watermark, growing as needed.
    ///
    /// Pair with [`GrowBuf::commit`] once the bytes are actually filled.
    pub fn space(&mut self, n: usize) -> &mut [u8] {
        self.grow(self.written + n);
        let start = self.written;
        &mut self.data[start..start + n]
    }

    /// Advances the watermark over `n` bytes previously exposed by
    /// [`GrowBuf::space`].
    pub fn commit(&mut self, n: usize) {
        debug_assert!(self.written + n <= self.data.len());
        self.written += n;
    }

    /// Logically shifts `[lo, hi)` to the front and drops everything else.
    ///
    /// After the call the watermark is `hi - lo`. `lo > hi` or `hi` past the
    /// watermark is a programmer error and panics in debug builds; release
    /// builds clamp.
    pub fn compact(&mut self, lo: usize, hi: usize) {
        debug_assert!(lo <= hi && hi <= self.written);
        let hi = hi.min(self.written);
        let lo = lo.min(hi);
        self.data.copy_within(lo..hi, 0);
        self.written = hi - lo;
    }

    /// A non-owning view of `[lo, hi)`.
    ///
    /// # Errors
    ///
    /// [`SplitError::Range`] if `lo > hi` or `hi` exceeds the watermark.
    pub fn subarray(&self, lo: usize, hi: usize) -> Result<&[u8], SplitError> {
        if lo > hi || hi > self.written {
            return Err(SplitError::Range {
                start: lo,
                end: hi,
                written: self.written,
            });
        }
        Ok(&self.data[lo..hi])
    }

    /// The written region `[0, written)`.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.written]
    }

    /// Resets the watermark; storage is retained.
    pub fn clear(&mut self) {
        self.written = 0;
    }
}
