use std::{fmt, num::NonZeroU64};

use crate::error::FormatError;

/// Sample encoding of the decoded stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SampleEncoding {
    #[default]
    Pcm,
    IeeeFloat,
}

/// Sample layout of the decoded byte stream.
///
/// Immutable once negotiated. `block_align` and `bytes_per_second` are
/// derived, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Format {
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub channels: u16,
    pub encoding: SampleEncoding,
    /// Speaker mask for extensible formats.
    pub channel_mask: Option<u32>,
}

impl Format {
    /// Integer PCM layout.
    #[must_use]
    pub const fn pcm(sample_rate: u32, bits_per_sample: u16, channels: u16) -> Self {
        Self {
            sample_rate,
            bits_per_sample,
            channels,
            encoding: SampleEncoding::Pcm,
            channel_mask: None,
        }
    }

    /// 32-bit IEEE float layout.
    #[must_use]
    pub const fn float(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            bits_per_sample: 32,
            channels,
            encoding: SampleEncoding::IeeeFloat,
            channel_mask: None,
        }
    }

    #[must_use]
    pub const fn with_channel_mask(mut self, mask: u32) -> Self {
        self.channel_mask = Some(mask);
        self
    }

    /// Bytes of one multi-channel sample frame.
    #[must_use]
    pub const fn block_align(&self) -> u32 {
        self.channels as u32 * self.bits_per_sample as u32 / 8
    }

    #[must_use]
    pub const fn bytes_per_second(&self) -> u64 {
        self.sample_rate as u64 * self.block_align() as u64
    }

    /// Check the derived invariants the adapter relies on.
    pub fn validate(&self) -> Result<(), FormatError> {
        if self.block_align() == 0 {
            return Err(FormatError::ZeroBlockAlign {
                channels: self.channels,
                bits: self.bits_per_sample,
            });
        }
        if self.sample_rate == 0 {
            return Err(FormatError::ZeroSampleRate);
        }
        Ok(())
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Hz, {} bit, {} channels",
            self.sample_rate, self.bits_per_sample, self.channels
        )
    }
}

/// Major type a source reports for its selected stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MajorType {
    Audio,
    Video,
    Other(String),
}

impl fmt::Display for MajorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Audio => f.write_str("audio"),
            Self::Video => f.write_str("video"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// What a source negotiated: major type plus output layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaType {
    pub major: MajorType,
    pub format: Format,
}

impl MediaType {
    #[must_use]
    pub fn audio(format: Format) -> Self {
        Self {
            major: MajorType::Audio,
            format,
        }
    }
}

/// Native time resolution of a source, in units per second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimeBase(NonZeroU64);

impl TimeBase {
    /// 100-nanosecond units, the resolution of most platform media stacks.
    pub const HUNDRED_NANOS: Self = Self::from_const(10_000_000);
    pub const MICROS: Self = Self::from_const(1_000_000);
    pub const NANOS: Self = Self::from_const(1_000_000_000);

    const fn from_const(units_per_second: u64) -> Self {
        match NonZeroU64::new(units_per_second) {
            Some(units) => Self(units),
            None => panic!("time base must be non-zero"),
        }
    }

    #[must_use]
    pub const fn new(units_per_second: NonZeroU64) -> Self {
        Self(units_per_second)
    }

    /// Time base with one unit per sample frame (`1 / sample_rate`).
    #[must_use]
    pub fn per_sample(format: &Format) -> Option<Self> {
        NonZeroU64::new(u64::from(format.sample_rate)).map(Self)
    }

    #[must_use]
    pub const fn units_per_second(&self) -> u64 {
        self.0.get()
    }
}

impl Default for TimeBase {
    fn default() -> Self {
        Self::HUNDRED_NANOS
    }
}

/// Completion state attached to a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrameStatus {
    #[default]
    Data,
    EndOfStream,
    Error,
}

/// One decoded frame as produced by a source.
///
/// Ownership moves to the adapter, which copies the bytes out and drops it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    pub bytes: Vec<u8>,
    /// Presentation time in the source's [`TimeBase`].
    pub timestamp: Option<u64>,
    pub status: FrameStatus,
}

impl Frame {
    #[must_use]
    pub fn data(bytes: Vec<u8>, timestamp: Option<u64>) -> Self {
        Self {
            bytes,
            timestamp,
            status: FrameStatus::Data,
        }
    }

    #[must_use]
    pub fn end_of_stream() -> Self {
        Self {
            status: FrameStatus::EndOfStream,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn error() -> Self {
        Self {
            status: FrameStatus::Error,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
