//! Deterministic in-memory [`FrameSource`].
//!
//! The stream is `total_len` bytes of a known pattern (see
//! [`pattern_byte`]), cut into frames whose sizes cycle through a list.
//! Any byte the adapter returns can therefore be checked against its offset.

use std::{
    ops::Range,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use sitar_decode::{Format, Frame, FrameSource, MediaType, SourceError, SourceResult, TimeBase};
use sitar_platform::Mutex;
use tracing::trace;

/// Byte at stream offset `offset`. 251 is prime, so the pattern never lines
/// up with block or frame sizes.
#[must_use]
pub fn pattern_byte(offset: u64) -> u8 {
    (offset % 251) as u8
}

#[must_use]
pub fn pattern_bytes(range: Range<u64>) -> Vec<u8> {
    range.map(pattern_byte).collect()
}

/// Timestamp behavior of produced frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Stamps {
    /// Frame start, rounded up to the next time unit so it converts back to
    /// the exact byte offset.
    #[default]
    Exact,
    /// Frame start, truncated to the time unit at or before it, as most
    /// 100 ns decoders report.
    Truncated,
    /// No frame carries a timestamp.
    Missing,
}

/// Where an approximate seek lands relative to its target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SeekLanding {
    #[default]
    Exact,
    /// Round down to a multiple of the given byte count, like a codec that
    /// can only restart on packet boundaries.
    Before(u64),
    /// Land the given number of bytes past the target.
    After(u64),
}

/// Injected decoder failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Failure {
    /// Frame with [`FrameStatus::Error`](sitar_decode::FrameStatus::Error).
    Flag,
    /// `Err` from `read_frame`.
    Error,
}

/// Call counters shared with the test after the source moves into an adapter.
#[derive(Clone, Debug, Default)]
pub struct SourceCounters {
    reads: Arc<AtomicUsize>,
    seeks: Arc<Mutex<Vec<u64>>>,
}

impl SourceCounters {
    /// `read_frame` calls so far.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Acquire)
    }

    /// Time arguments of every `seek_approximate` call.
    #[must_use]
    pub fn seeks(&self) -> Vec<u64> {
        self.seeks.lock().clone()
    }
}

/// Builder-style synthetic decoder.
#[derive(Debug)]
pub struct SyntheticSource {
    format: Format,
    time_base: TimeBase,
    total_len: u64,
    frame_sizes: Vec<usize>,
    stamps: Stamps,
    landing: SeekLanding,
    failure: Option<(usize, Failure)>,
    can_seek: bool,
    report_duration: bool,
    cursor: u64,
    next_size: usize,
    delivered_frames: usize,
    counters: SourceCounters,
}

impl SyntheticSource {
    /// `total_len` bytes in `frame_size` frames, 100 ns timestamps.
    #[must_use]
    pub fn new(format: Format, total_len: u64, frame_size: usize) -> Self {
        Self {
            format,
            time_base: TimeBase::HUNDRED_NANOS,
            total_len,
            frame_sizes: vec![frame_size],
            stamps: Stamps::Exact,
            landing: SeekLanding::Exact,
            failure: None,
            can_seek: true,
            report_duration: true,
            cursor: 0,
            next_size: 0,
            delivered_frames: 0,
            counters: SourceCounters::default(),
        }
    }

    /// Frame sizes cycle through `sizes`; zero-sized frames are allowed.
    #[must_use]
    pub fn with_frame_sizes(mut self, sizes: Vec<usize>) -> Self {
        assert!(sizes.iter().any(|s| *s > 0), "frame sizes must not all be zero");
        self.frame_sizes = sizes;
        self
    }

    #[must_use]
    pub fn with_time_base(mut self, time_base: TimeBase) -> Self {
        self.time_base = time_base;
        self
    }

    #[must_use]
    pub fn with_stamps(mut self, stamps: Stamps) -> Self {
        self.stamps = stamps;
        self
    }

    #[must_use]
    pub fn with_seek_landing(mut self, landing: SeekLanding) -> Self {
        self.landing = landing;
        self
    }

    /// Fail instead of producing data frame number `frame` (0-based).
    #[must_use]
    pub fn failing_at(mut self, frame: usize, failure: Failure) -> Self {
        self.failure = Some((frame, failure));
        self
    }

    #[must_use]
    pub fn with_can_seek(mut self, can_seek: bool) -> Self {
        self.can_seek = can_seek;
        self
    }

    #[must_use]
    pub fn with_duration_reported(mut self, report: bool) -> Self {
        self.report_duration = report;
        self
    }

    /// Counters that keep working after the source is moved.
    #[must_use]
    pub fn counters(&self) -> SourceCounters {
        self.counters.clone()
    }

    fn bytes_per_second(&self) -> u128 {
        u128::from(self.format.bytes_per_second())
    }

    fn units(&self) -> u128 {
        u128::from(self.time_base.units_per_second())
    }

    /// Smallest time that maps back to at least `bytes`.
    fn time_of(&self, bytes: u64) -> u64 {
        let num = u128::from(bytes) * self.units();
        num.div_ceil(self.bytes_per_second()) as u64
    }

    fn truncated_time_of(&self, bytes: u64) -> u64 {
        (u128::from(bytes) * self.units() / self.bytes_per_second()) as u64
    }

    /// Smallest block-aligned offset whose time is at least `time`.
    fn offset_of(&self, time: u64) -> u64 {
        let raw = (u128::from(time) * self.bytes_per_second()).div_ceil(self.units()) as u64;
        let block = u64::from(self.format.block_align());
        raw.div_ceil(block) * block
    }
}

impl FrameSource for SyntheticSource {
    fn media_type(&self) -> SourceResult<MediaType> {
        Ok(MediaType::audio(self.format))
    }

    fn read_frame(&mut self) -> SourceResult<Frame> {
        self.counters.reads.fetch_add(1, Ordering::AcqRel);

        if self.cursor >= self.total_len {
            return Ok(Frame::end_of_stream());
        }
        if let Some((at, failure)) = self.failure
            && at == self.delivered_frames
        {
            self.failure = None;
            return match failure {
                Failure::Flag => Ok(Frame::error()),
                Failure::Error => Err(SourceError::Backend("synthetic decoder failure".into())),
            };
        }

        let size = self.frame_sizes[self.next_size % self.frame_sizes.len()];
        self.next_size += 1;
        let end = (self.cursor + size as u64).min(self.total_len);
        let timestamp = match self.stamps {
            Stamps::Exact => Some(self.time_of(self.cursor)),
            Stamps::Truncated => Some(self.truncated_time_of(self.cursor)),
            Stamps::Missing => None,
        };
        let frame = Frame::data(pattern_bytes(self.cursor..end), timestamp);
        self.cursor = end;
        self.delivered_frames += 1;
        Ok(frame)
    }

    fn seek_approximate(&mut self, time: u64) -> SourceResult<()> {
        self.counters.seeks.lock().push(time);

        let target = self.offset_of(time);
        let landed = match self.landing {
            SeekLanding::Exact => target,
            SeekLanding::Before(step) if step > 0 => target / step * step,
            SeekLanding::Before(_) => target,
            SeekLanding::After(extra) => target + extra,
        }
        .min(self.total_len);
        trace!(time, target, landed, "synthetic seek");

        self.cursor = landed;
        self.next_size = 0;
        Ok(())
    }

    fn try_duration(&self) -> Option<u64> {
        self.report_duration.then(|| self.time_of(self.total_len))
    }

    fn can_seek(&self) -> bool {
        self.can_seek
    }

    fn time_base(&self) -> TimeBase {
        self.time_base
    }
}
