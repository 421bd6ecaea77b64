//! Leftover bytes of a partially consumed frame.

/// Grow-only buffer holding the undelivered tail of the last frame.
///
/// # Invariants
/// - `cursor <= len <= storage.len()`
/// - `storage` only grows (to the largest frame seen) until [`release`].
///
/// [`release`]: CarryBuffer::release
#[derive(Debug, Default)]
pub struct CarryBuffer {
    storage: Vec<u8>,
    cursor: usize,
    len: usize,
}

impl CarryBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: vec![0; capacity],
            cursor: 0,
            len: 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cursor == self.len
    }

    /// Bytes still waiting to be drained.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.len - self.cursor
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Copy up to `dest.len()` pending bytes into `dest`.
    ///
    /// Returns the number of bytes copied; 0 when empty.
    pub fn drain(&mut self, dest: &mut [u8]) -> usize {
        let count = dest.len().min(self.remaining());
        if count == 0 {
            return 0;
        }
        dest[..count].copy_from_slice(&self.storage[self.cursor..self.cursor + count]);
        self.cursor += count;
        self.check_invariants();
        count
    }

    /// Replace the content with `bytes`, growing storage if needed.
    ///
    /// Unread content is discarded; callers drain before refilling.
    pub fn refill(&mut self, bytes: &[u8]) {
        if bytes.len() > self.storage.len() {
            self.storage.resize(bytes.len(), 0);
        }
        self.storage[..bytes.len()].copy_from_slice(bytes);
        self.len = bytes.len();
        self.cursor = 0;
        self.check_invariants();
    }

    /// Forget pending bytes, keep storage.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.len = 0;
    }

    /// Forget pending bytes and free storage.
    pub fn release(&mut self) {
        self.reset();
        self.storage = Vec::new();
    }

    fn check_invariants(&self) {
        debug_assert!(self.cursor <= self.len, "carry cursor past length");
        debug_assert!(self.len <= self.storage.len(), "carry length past storage");
    }
}
