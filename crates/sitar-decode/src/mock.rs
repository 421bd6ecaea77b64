use std::{collections::VecDeque, sync::Arc};

use unimock::{MockFn, Unimock, matching};

pub use crate::traits::FrameSourceMock;
use crate::{
    error::SourceResult,
    types::{Format, Frame, MajorType, MediaType, TimeBase},
};

/// Minimal mutex wrapper with infallible `lock()` for tests.
pub struct MockLog<T> {
    inner: std::sync::Mutex<T>,
}

impl<T> MockLog<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: std::sync::Mutex::new(value),
        }
    }

    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn lock(&self) -> std::sync::MutexGuard<'_, T> {
        self.inner
            .lock()
            .expect("frame source mock log mutex should not be poisoned")
    }
}

/// Shared call logs of a scripted source.
#[derive(Clone)]
pub struct FrameSourceLogs {
    read_count: Arc<MockLog<usize>>,
    seek_log: Arc<MockLog<Vec<u64>>>,
}

impl FrameSourceLogs {
    /// Number of `read_frame()` calls so far.
    #[must_use]
    pub fn read_count(&self) -> usize {
        *self.read_count.lock()
    }

    /// Time arguments of every `seek_approximate()` call.
    #[must_use]
    pub fn seeks(&self) -> Vec<u64> {
        self.seek_log.lock().clone()
    }
}

/// Builder for a unimock-backed [`FrameSource`](crate::FrameSource).
///
/// `read_frame()` yields the scripted results in order, then end of stream
/// forever. `seek_approximate()` logs its argument and consumes the scripted
/// seek results (`Ok` once they run out).
pub struct ScriptedSource {
    media_type: MediaType,
    time_base: TimeBase,
    frames: Vec<SourceResult<Frame>>,
    seek_results: Vec<SourceResult<()>>,
    duration: Option<u64>,
    can_seek: bool,
}

impl ScriptedSource {
    #[must_use]
    pub fn new(format: Format) -> Self {
        Self {
            media_type: MediaType::audio(format),
            time_base: TimeBase::HUNDRED_NANOS,
            frames: Vec::new(),
            seek_results: Vec::new(),
            duration: None,
            can_seek: true,
        }
    }

    #[must_use]
    pub fn with_time_base(mut self, time_base: TimeBase) -> Self {
        self.time_base = time_base;
        self
    }

    #[must_use]
    pub fn with_frames(mut self, frames: Vec<SourceResult<Frame>>) -> Self {
        self.frames = frames;
        self
    }

    #[must_use]
    pub fn with_seek_results(mut self, results: Vec<SourceResult<()>>) -> Self {
        self.seek_results = results;
        self
    }

    #[must_use]
    pub fn with_duration(mut self, duration: Option<u64>) -> Self {
        self.duration = duration;
        self
    }

    #[must_use]
    pub fn with_can_seek(mut self, can_seek: bool) -> Self {
        self.can_seek = can_seek;
        self
    }

    #[must_use]
    pub fn build(self) -> (Unimock, FrameSourceLogs) {
        let frame_queue = Arc::new(MockLog::new(VecDeque::from(self.frames)));
        let seek_queue = Arc::new(MockLog::new(VecDeque::from(self.seek_results)));
        let read_count = Arc::new(MockLog::new(0usize));
        let seek_log = Arc::new(MockLog::new(Vec::new()));

        let read_count_for_read = Arc::clone(&read_count);
        let seek_log_for_seek = Arc::clone(&seek_log);
        let media_type = self.media_type;

        let mock = Unimock::new((
            FrameSourceMock::media_type
                .each_call(matching!())
                .answers_arc(Arc::new(move |_| Ok(media_type.clone())))
                .at_least_times(0),
            FrameSourceMock::read_frame
                .each_call(matching!())
                .answers_arc(Arc::new(move |_| {
                    *read_count_for_read.lock() += 1;
                    frame_queue
                        .lock()
                        .pop_front()
                        .unwrap_or_else(|| Ok(Frame::end_of_stream()))
                }))
                .at_least_times(0),
            FrameSourceMock::seek_approximate
                .each_call(matching!(_))
                .answers_arc(Arc::new(move |_, time| {
                    seek_log_for_seek.lock().push(time);
                    seek_queue.lock().pop_front().unwrap_or(Ok(()))
                }))
                .at_least_times(0),
            FrameSourceMock::try_duration
                .each_call(matching!())
                .returns(self.duration)
                .at_least_times(0),
            FrameSourceMock::can_seek
                .each_call(matching!())
                .returns(self.can_seek)
                .at_least_times(0),
            FrameSourceMock::time_base
                .each_call(matching!())
                .returns(self.time_base)
                .at_least_times(0),
        ))
        .no_verify_in_drop();

        (
            mock,
            FrameSourceLogs {
                read_count,
                seek_log,
            },
        )
    }
}

/// Source whose only answer is a media type of `major`.
///
/// Any other call panics, so it proves initialization stops at the
/// major-type check.
#[must_use]
pub fn media_type_only_source(major: MajorType, format: Format) -> Unimock {
    let media_type = MediaType { major, format };
    Unimock::new(
        FrameSourceMock::media_type
            .each_call(matching!())
            .answers_arc(Arc::new(move |_| Ok(media_type.clone())))
            .once(),
    )
}
