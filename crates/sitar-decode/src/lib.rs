#![forbid(unsafe_code)]

//! Streaming adapter that turns a timestamp-addressed source of decoded
//! audio frames into a seekable, byte-addressed PCM stream.
//!
//! A [`FrameSource`] is any decoder that yields variably sized frames with
//! optional presentation timestamps and seeks approximately by time.
//! [`StreamAdapter`] serves arbitrary-sized reads from it, seeks by byte
//! offset and corrects imprecise seeks from the first frame's timestamp.

mod adapter;
mod carry;
mod config;
mod convert;
mod error;
mod io;
mod traits;
mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use adapter::StreamAdapter;
pub use carry::CarryBuffer;
pub use config::{AdapterConfig, LengthMode};
pub use convert::{TimeByteConverter, align_down, bytes_to_duration, duration_to_bytes};
pub use error::{AdapterError, AdapterResult, FormatError, SourceError, SourceResult};
pub use traits::FrameSource;
pub use types::{Format, Frame, FrameStatus, MajorType, MediaType, SampleEncoding, TimeBase};
