//! Collaborator interface the adapter pulls frames from.

use sitar_platform::MaybeSend;
#[cfg(any(test, feature = "test-utils"))]
use unimock::unimock;

use crate::{
    error::SourceResult,
    types::{Frame, MediaType, TimeBase},
};

/// Timestamp-addressed producer of decoded frames.
///
/// Implemented by decoder backends (platform media stacks, software codecs)
/// and by test doubles. All calls may block on I/O; the adapter never
/// times them out.
#[cfg_attr(any(test, feature = "test-utils"), unimock(api = FrameSourceMock))]
pub trait FrameSource: MaybeSend + 'static {
    /// Negotiated major type and output layout.
    ///
    /// # Errors
    ///
    /// [`SourceError::NotNegotiated`](crate::SourceError::NotNegotiated)
    /// if no output type has been agreed yet.
    fn media_type(&self) -> SourceResult<MediaType>;

    /// Next frame in presentation order.
    ///
    /// End of stream and decoder failures are reported either through the
    /// frame's [`FrameStatus`](crate::FrameStatus) or as `Err`.
    fn read_frame(&mut self) -> SourceResult<Frame>;

    /// Reposition near `time` (in [`time_base`](FrameSource::time_base)
    /// units). Best effort: the next frame may start before or after it.
    fn seek_approximate(&mut self, time: u64) -> SourceResult<()>;

    /// Total duration in time units, if the source knows it.
    fn try_duration(&self) -> Option<u64>;

    fn can_seek(&self) -> bool;

    /// Resolution of timestamps, durations and seek targets.
    fn time_base(&self) -> TimeBase {
        TimeBase::HUNDRED_NANOS
    }
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn media_type(&self) -> SourceResult<MediaType> {
        (**self).media_type()
    }

    fn read_frame(&mut self) -> SourceResult<Frame> {
        (**self).read_frame()
    }

    fn seek_approximate(&mut self, time: u64) -> SourceResult<()> {
        (**self).seek_approximate(time)
    }

    fn try_duration(&self) -> Option<u64> {
        (**self).try_duration()
    }

    fn can_seek(&self) -> bool {
        (**self).can_seek()
    }

    fn time_base(&self) -> TimeBase {
        (**self).time_base()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_source_is_object_safe() {
        fn _accepts_boxed(_: Box<dyn FrameSource>) {}
    }
}
