//! Deterministic PRNG for reproducible property loops.

/// xorshift64 generator.
///
/// Seeds are fixed per test so a failing case reproduces exactly; print the
/// seed and iteration in assertion messages.
#[derive(Clone, Debug)]
pub struct Xorshift64(u64);

impl Xorshift64 {
    /// A zero seed would stay zero forever and is replaced by a constant.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self(if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed })
    }

    pub fn next_u64(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    /// Value in `[min, max)`; `min` when the range is empty.
    pub fn range_u64(&mut self, min: u64, max: u64) -> u64 {
        if max <= min {
            return min;
        }
        min + self.next_u64() % (max - min)
    }

    /// Value in `[min, max)`; `min` when the range is empty.
    pub fn range_usize(&mut self, min: usize, max: usize) -> usize {
        self.range_u64(min as u64, max as u64) as usize
    }

    /// `true` with probability `percent / 100`.
    pub fn chance(&mut self, percent: u64) -> bool {
        self.range_u64(0, 100) < percent
    }
}
