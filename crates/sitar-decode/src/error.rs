//! Error types for the frame-to-byte adapter.

use std::io;

use thiserror::Error;

use crate::types::MajorType;

/// Failures reported by a [`FrameSource`](crate::FrameSource).
///
/// Backend-specific errors (codec, container, platform) are boxed into
/// `Backend` so the adapter stays backend-agnostic.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("media type not negotiated")]
    NotNegotiated,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("frame flagged as failed by the source")]
    FrameFailed,

    #[error("seek failed: {0}")]
    SeekFailed(String),

    #[error("source error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Result type for [`FrameSource`](crate::FrameSource) calls.
pub type SourceResult<T> = Result<T, SourceError>;

/// Negotiated layout the adapter cannot address by byte.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("block alignment is zero ({channels} channels, {bits} bits)")]
    ZeroBlockAlign { channels: u16, bits: u16 },

    #[error("sample rate is zero")]
    ZeroSampleRate,
}

/// Errors raised by [`StreamAdapter`](crate::StreamAdapter).
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("cannot construct adapter: {0}")]
    Construction(#[source] SourceError),

    #[error("expected audio major type, source reported {major}")]
    FormatMismatch { major: MajorType },

    #[error("invalid format: {0}")]
    InvalidFormat(#[source] FormatError),

    /// Fatal for the instance. `delivered` bytes were copied into the
    /// caller's buffer before the failure and count towards the position.
    #[error("decode failed after {delivered} bytes: {source}")]
    Decode {
        delivered: usize,
        #[source]
        source: SourceError,
    },

    #[error("seek failed: {0}")]
    Seek(#[source] SourceError),

    #[error("adapter is closed")]
    Closed,

    #[error("seeking is not supported by the source")]
    SeekUnsupported,

    #[error("adapter faulted by an earlier decode failure")]
    Faulted,

    #[error("range {offset}+{count} exceeds buffer of {len} bytes")]
    InvalidRange {
        offset: usize,
        count: usize,
        len: usize,
    },
}

/// Result type for adapter operations.
pub type AdapterResult<T> = Result<T, AdapterError>;

impl From<AdapterError> for io::Error {
    fn from(err: AdapterError) -> Self {
        let kind = match &err {
            AdapterError::Closed => io::ErrorKind::BrokenPipe,
            AdapterError::SeekUnsupported => io::ErrorKind::Unsupported,
            AdapterError::InvalidRange { .. } => io::ErrorKind::InvalidInput,
            _ => io::ErrorKind::Other,
        };
        Self::new(kind, err)
    }
}
