//! `std::io` views of [`StreamAdapter`].
//!
//! Implemented for both the adapter and a shared reference to it, so an
//! `Arc<StreamAdapter<_>>` can be read through `&*arc` from any thread.

use std::io::{self, Read, Seek, SeekFrom};

use tracing::warn;

use crate::{adapter::StreamAdapter, error::AdapterError, traits::FrameSource};

fn read_io<S: FrameSource>(adapter: &StreamAdapter<S>, buf: &mut [u8]) -> io::Result<usize> {
    match StreamAdapter::read(adapter, buf) {
        Ok(n) => Ok(n),
        // Bytes already copied are returned; the next read reports EOF.
        Err(AdapterError::Decode { delivered, source }) if delivered > 0 => {
            warn!(delivered, error = %source, "decode failed mid-read; returning partial data");
            Ok(delivered)
        }
        Err(err) => Err(err.into()),
    }
}

fn seek_io<S: FrameSource>(adapter: &StreamAdapter<S>, pos: SeekFrom) -> io::Result<u64> {
    let target = match pos {
        SeekFrom::Start(offset) => Some(offset),
        SeekFrom::Current(delta) => adapter.position().checked_add_signed(delta),
        SeekFrom::End(delta) => adapter.length().checked_add_signed(delta),
    }
    .ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "invalid seek to a negative or overflowing position",
        )
    })?;

    StreamAdapter::seek(adapter, target)?;
    Ok(adapter.position())
}

impl<S: FrameSource> Read for &StreamAdapter<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        read_io(self, buf)
    }
}

impl<S: FrameSource> Read for StreamAdapter<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        read_io(self, buf)
    }
}

impl<S: FrameSource> Seek for &StreamAdapter<S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        seek_io(self, pos)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.position())
    }
}

impl<S: FrameSource> Seek for StreamAdapter<S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        seek_io(self, pos)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.position())
    }
}
