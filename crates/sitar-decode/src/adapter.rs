//! Byte-addressed stream over a timestamp-addressed frame source.
//!
//! The source yields variably sized frames and can only seek approximately
//! by time. [`StreamAdapter`] turns that into a byte stream that reads in
//! arbitrary chunks and seeks to block-aligned byte offsets:
//!
//! - leftover bytes of a frame wait in a [`CarryBuffer`] for the next read;
//! - the byte position is tracked here, since the source only knows time;
//! - a seek is optimistic: the position is set immediately and corrected
//!   when the first frame after the seek reveals where the source actually
//!   landed. Leading bytes before the requested offset are discarded.

use std::time::Duration;

use sitar_platform::Mutex;
use tracing::{debug, trace, warn};

use crate::{
    carry::CarryBuffer,
    config::{AdapterConfig, LengthMode},
    convert::TimeByteConverter,
    error::{AdapterError, AdapterResult, SourceError},
    traits::FrameSource,
    types::{Format, FrameStatus, MajorType},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Ready,
    /// Source reported end of stream. Reads return 0 until the next seek.
    Exhausted,
    /// A decode failure was surfaced. Reads return 0 forever.
    Faulted,
    Closed,
}

struct Inner<S> {
    source: Option<S>,
    converter: TimeByteConverter,
    length_mode: LengthMode,
    fixed_length: Option<u64>,
    carry: CarryBuffer,
    position: u64,
    /// Block-aligned byte offset requested by the last seek, until the first
    /// frame after it arrives.
    pending_seek: Option<u64>,
    /// Leading bytes still to discard after a reconciled seek.
    skip: u64,
    state: State,
}

/// Byte stream over a [`FrameSource`].
///
/// One lock guards all state, so at most one operation runs at a time;
/// concurrent callers block. Calls into the source happen under the lock.
///
/// ```
/// # use sitar_decode::{AdapterResult, FrameSource, StreamAdapter};
/// # fn pump<S: FrameSource>(source: S) -> AdapterResult<Vec<u8>> {
/// let adapter = StreamAdapter::new(source)?;
/// let mut out = Vec::new();
/// let mut buf = [0u8; 4096];
/// loop {
///     let n = adapter.read(&mut buf)?;
///     if n == 0 {
///         break;
///     }
///     out.extend_from_slice(&buf[..n]);
/// }
/// adapter.close();
/// # Ok(out)
/// # }
/// ```
pub struct StreamAdapter<S: FrameSource> {
    inner: Mutex<Inner<S>>,
    format: Format,
}

impl<S: FrameSource> StreamAdapter<S> {
    /// Initialize with the default [`AdapterConfig`].
    pub fn new(source: S) -> AdapterResult<Self> {
        Self::with_config(source, AdapterConfig::default())
    }

    /// Negotiate the format and, if possible, the fixed length.
    ///
    /// The source is dropped if initialization fails.
    pub fn with_config(source: S, config: AdapterConfig) -> AdapterResult<Self> {
        let media_type = source.media_type().map_err(AdapterError::Construction)?;
        if media_type.major != MajorType::Audio {
            return Err(AdapterError::FormatMismatch {
                major: media_type.major,
            });
        }

        let format = media_type.format;
        format.validate().map_err(AdapterError::InvalidFormat)?;

        let converter = TimeByteConverter::new(format, source.time_base());
        let fixed_length = match config.length_mode {
            LengthMode::Auto => source.try_duration().map(|d| converter.to_bytes(d)),
            LengthMode::Dynamic => None,
        };

        debug!(
            %format,
            units_per_second = converter.time_base().units_per_second(),
            fixed_length,
            "stream adapter initialized"
        );

        Ok(Self {
            inner: Mutex::new(Inner {
                source: Some(source),
                converter,
                length_mode: config.length_mode,
                fixed_length,
                carry: CarryBuffer::with_capacity(config.initial_carry_capacity),
                position: 0,
                pending_seek: None,
                skip: 0,
                state: State::Ready,
            }),
            format,
        })
    }

    /// Negotiated output layout.
    pub fn format(&self) -> Format {
        self.format
    }

    /// Fill `buf` from the stream.
    ///
    /// Returns bytes read, `0` only for an empty `buf` or at end of stream.
    /// After a decode failure every call returns `0`.
    pub fn read(&self, buf: &mut [u8]) -> AdapterResult<usize> {
        self.inner.lock().read(buf)
    }

    /// Read at most `count` bytes into `buf[offset..offset + count]`.
    pub fn read_into(&self, buf: &mut [u8], offset: usize, count: usize) -> AdapterResult<usize> {
        let end = offset
            .checked_add(count)
            .filter(|end| *end <= buf.len())
            .ok_or(AdapterError::InvalidRange {
                offset,
                count,
                len: buf.len(),
            })?;
        self.read(&mut buf[offset..end])
    }

    /// Move to `position`, rounded down to the block alignment.
    pub fn seek(&self, position: u64) -> AdapterResult<()> {
        self.inner.lock().seek(position)
    }

    /// Current byte position; 0 once closed.
    pub fn position(&self) -> u64 {
        let inner = self.inner.lock();
        match inner.state {
            State::Closed => 0,
            _ => inner.position,
        }
    }

    /// Same as [`seek`](Self::seek).
    pub fn set_position(&self, position: u64) -> AdapterResult<()> {
        self.seek(position)
    }

    /// Total length in bytes, 0 when unknown or closed.
    ///
    /// Durations reported by codecs and containers can be imprecise; the
    /// value is only as good as the source's.
    pub fn length(&self) -> u64 {
        self.inner.lock().length()
    }

    pub fn can_seek(&self) -> bool {
        let inner = self.inner.lock();
        inner.source.as_ref().is_some_and(FrameSource::can_seek)
    }

    /// Position as playback time.
    pub fn position_time(&self) -> Duration {
        let position = self.position();
        self.inner.lock().converter.to_duration(position)
    }

    /// Length as playback time.
    pub fn length_time(&self) -> Duration {
        let length = self.length();
        self.inner.lock().converter.to_duration(length)
    }

    /// Release the source and buffers. Idempotent.
    ///
    /// Must not race an in-flight `read`/`seek` from another thread; such a
    /// call waits for the lock and then closes.
    pub fn close(&self) {
        self.inner.lock().close();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().state == State::Closed
    }

    /// Whether a decode failure has been surfaced.
    pub fn is_faulted(&self) -> bool {
        self.inner.lock().state == State::Faulted
    }
}

impl<S: FrameSource> Inner<S> {
    fn read(&mut self, buf: &mut [u8]) -> AdapterResult<usize> {
        match self.state {
            State::Closed => return Err(AdapterError::Closed),
            State::Exhausted | State::Faulted => return Ok(0),
            State::Ready => {}
        }
        if buf.is_empty() {
            return Ok(0);
        }

        let mut total = self.carry.drain(buf);

        while total < buf.len() {
            let Some(source) = self.source.as_mut() else {
                return Err(AdapterError::Closed);
            };

            let frame = match source.read_frame() {
                Ok(frame) => frame,
                Err(err) => return Err(self.fault(total, err)),
            };
            trace!(
                len = frame.len(),
                timestamp = frame.timestamp,
                status = ?frame.status,
                "frame fetched"
            );

            match frame.status {
                FrameStatus::Data => {}
                FrameStatus::EndOfStream => {
                    debug!(position = self.position.saturating_add(total as u64), "end of stream");
                    self.state = State::Exhausted;
                    break;
                }
                FrameStatus::Error => return Err(self.fault(total, SourceError::FrameFailed)),
            }

            if let Some(requested) = self.pending_seek.take() {
                self.reconcile(requested, frame.timestamp);
            }

            let mut bytes = frame.bytes.as_slice();
            if self.skip > 0 {
                let skipped = bytes.len().min(usize::try_from(self.skip).unwrap_or(usize::MAX));
                bytes = &bytes[skipped..];
                self.skip -= skipped as u64;
                self.position = self.position.saturating_add(skipped as u64);
            }
            if bytes.is_empty() {
                continue;
            }

            self.carry.refill(bytes);
            total += self.carry.drain(&mut buf[total..]);
        }

        self.position = self.position.saturating_add(total as u64);
        Ok(total)
    }

    /// Correct the optimistic seek position with the first real timestamp.
    fn reconcile(&mut self, requested: u64, timestamp: Option<u64>) {
        let Some(timestamp) = timestamp else {
            warn!(
                requested,
                "first frame after seek has no timestamp; keeping requested position"
            );
            return;
        };

        // Nearest frame, not floor: truncated stamps must not skip a block.
        let actual = self.converter.to_frame_offset(timestamp);
        // A frame past the target is accepted as is; never skip backwards.
        self.skip = requested.saturating_sub(actual);
        self.position = actual;
        debug!(requested, actual, skip = self.skip, "seek reconciled");
    }

    fn fault(&mut self, delivered: usize, source: SourceError) -> AdapterError {
        self.position = self.position.saturating_add(delivered as u64);
        self.state = State::Faulted;
        self.pending_seek = None;
        self.skip = 0;
        self.carry.release();
        warn!(
            delivered,
            position = self.position,
            error = %source,
            "decode failed; adapter faulted"
        );
        AdapterError::Decode { delivered, source }
    }

    fn seek(&mut self, position: u64) -> AdapterResult<()> {
        match self.state {
            State::Closed => return Err(AdapterError::Closed),
            State::Faulted => return Err(AdapterError::Faulted),
            State::Ready | State::Exhausted => {}
        }
        let Some(source) = self.source.as_mut() else {
            return Err(AdapterError::Closed);
        };
        if !source.can_seek() {
            return Err(AdapterError::SeekUnsupported);
        }

        let aligned = self.converter.align_down(position);
        let time = self.converter.to_time(aligned);
        source.seek_approximate(time).map_err(AdapterError::Seek)?;

        self.carry.reset();
        self.position = aligned;
        self.pending_seek = Some(aligned);
        self.skip = 0;
        self.state = State::Ready;
        debug!(requested = position, aligned, time, "seek issued");
        Ok(())
    }

    fn length(&self) -> u64 {
        if self.state == State::Closed {
            return 0;
        }
        if let Some(length) = self.fixed_length {
            return length;
        }
        self.source
            .as_ref()
            .and_then(FrameSource::try_duration)
            .map_or(0, |d| self.converter.to_bytes(d))
    }

    fn close(&mut self) {
        if self.state == State::Closed {
            return;
        }
        self.source = None;
        self.carry.release();
        self.pending_seek = None;
        self.skip = 0;
        self.state = State::Closed;
        debug!(
            position = self.position,
            length_mode = ?self.length_mode,
            "stream adapter closed"
        );
    }
}
