//! Adapter configuration.

/// How [`StreamAdapter::length`](crate::StreamAdapter::length) is resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LengthMode {
    /// Cache the length if the source reports a duration at initialization,
    /// otherwise ask the source again on every call.
    #[default]
    Auto,
    /// Never cache; ask the source on every call. For sources whose
    /// duration changes while they are read.
    Dynamic,
}

/// Configuration for [`StreamAdapter`](crate::StreamAdapter).
///
/// ```
/// use sitar_decode::{AdapterConfig, LengthMode};
///
/// let config = AdapterConfig::default()
///     .with_length_mode(LengthMode::Dynamic)
///     .with_initial_carry_capacity(16 * 1024);
/// assert_eq!(config.length_mode, LengthMode::Dynamic);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdapterConfig {
    pub length_mode: LengthMode,
    /// Bytes preallocated for the carry buffer. It still grows to the
    /// largest frame.
    pub initial_carry_capacity: usize,
}

impl AdapterConfig {
    #[must_use]
    pub fn with_length_mode(mut self, mode: LengthMode) -> Self {
        self.length_mode = mode;
        self
    }

    #[must_use]
    pub fn with_initial_carry_capacity(mut self, capacity: usize) -> Self {
        self.initial_carry_capacity = capacity;
        self
    }
}
