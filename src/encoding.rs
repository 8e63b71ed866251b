// Copyright (c) Sienna Satterwhite, sink-encoder Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use std::{
    fmt::Debug,
    sync::Arc,
};

use bytes::{
    BufMut,
    Bytes,
    BytesMut,
};
use tracing::instrument;

use crate::{
    data::Data,
    errs::EncodeError,
};

/// Serializes opaque [`Data`] into a caller-owned buffer in two phases.
///
/// Callers ask for [`get_size`](SinkEncoder::get_size) first, allocate a
/// buffer of exactly that many bytes, then hand it to
/// [`encode`](SinkEncoder::encode). For an unmodified value the size
/// reported by the first call is always the number of bytes the second call
/// writes. Neither call mutates the value, and implementations must be safe
/// to call from many threads at once on independent value/buffer pairs.
///
/// On failure the buffer contents are unspecified and must not be
/// transmitted.
pub trait SinkEncoder: Debug + Send + Sync {
    /// A short, stable name for the wire format, used in logs and errors.
    fn name(&self) -> &'static str;

    /// The exact number of bytes [`encode`](SinkEncoder::encode) will write
    /// for `data`.
    fn get_size(&self, data: &dyn Data) -> Result<usize, EncodeError>;

    /// Write the encoded form of `data` into the front of `buf`.
    ///
    /// Exactly [`get_size`](SinkEncoder::get_size) bytes are written. A
    /// larger `buf` is accepted and everything past those bytes is left as
    /// it was; callers that need the written length use `get_size`.
    ///
    /// Fails with [`EncodeError::BufferTooSmall`] before writing anything if
    /// `buf` cannot hold the whole encoding.
    fn encode(&self, data: &dyn Data, buf: &mut [u8]) -> Result<(), EncodeError>;

    /// Run both phases against a freshly allocated, exactly-sized buffer.
    #[instrument(level = "trace", skip(self))]
    fn encode_to_bytes(&self, data: &dyn Data) -> Result<Bytes, EncodeError> {
        let size = self.get_size(data)?;
        let mut buf = BytesMut::zeroed(size);
        self.encode(data, &mut buf)?;
        Ok(buf.freeze())
    }
}

impl<E: SinkEncoder + ?Sized> SinkEncoder for Arc<E> {
    #[inline]
    fn name(&self) -> &'static str {
        (**self).name()
    }

    #[inline]
    fn get_size(&self, data: &dyn Data) -> Result<usize, EncodeError> {
        (**self).get_size(data)
    }

    #[inline]
    fn encode(&self, data: &dyn Data, buf: &mut [u8]) -> Result<(), EncodeError> {
        (**self).encode(data, buf)
    }
}

impl<E: SinkEncoder + ?Sized> SinkEncoder for Box<E> {
    #[inline]
    fn name(&self) -> &'static str {
        (**self).name()
    }

    #[inline]
    fn get_size(&self, data: &dyn Data) -> Result<usize, EncodeError> {
        (**self).get_size(data)
    }

    #[inline]
    fn encode(&self, data: &dyn Data, buf: &mut [u8]) -> Result<(), EncodeError> {
        (**self).encode(data, buf)
    }
}

/// A cursor over a fixed destination slice. Every `put_*` checks the
/// remaining capacity first, so a writer can never overrun its slice.
#[derive(Debug)]
pub struct SliceWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> SliceWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        SliceWriter { buf, pos: 0 }
    }

    /// Create a writer after checking that `buf` can hold `required` bytes,
    /// so an undersized buffer is rejected before anything is written.
    #[inline]
    pub fn with_required(buf: &'a mut [u8], required: usize) -> Result<Self, EncodeError> {
        if buf.len() < required {
            return Err(EncodeError::BufferTooSmall {
                required,
                available: buf.len(),
            });
        }
        Ok(SliceWriter::new(buf))
    }

    #[inline]
    fn check(&self, len: usize) -> Result<(), EncodeError> {
        if len > self.remaining() {
            return Err(EncodeError::BufferTooSmall {
                required: self.pos.saturating_add(len),
                available: self.buf.len(),
            });
        }
        Ok(())
    }

    #[inline]
    pub fn put_u8(&mut self, n: u8) -> Result<(), EncodeError> {
        self.check(size_of::<u8>())?;
        let mut dst = &mut self.buf[self.pos..];
        dst.put_u8(n);
        self.pos += size_of::<u8>();
        Ok(())
    }

    /// Big-endian.
    #[inline]
    pub fn put_u32(&mut self, n: u32) -> Result<(), EncodeError> {
        self.check(size_of::<u32>())?;
        let mut dst = &mut self.buf[self.pos..];
        dst.put_u32(n);
        self.pos += size_of::<u32>();
        Ok(())
    }

    #[inline]
    pub fn put_u32_le(&mut self, n: u32) -> Result<(), EncodeError> {
        self.check(size_of::<u32>())?;
        let mut dst = &mut self.buf[self.pos..];
        dst.put_u32_le(n);
        self.pos += size_of::<u32>();
        Ok(())
    }

    /// Big-endian.
    #[inline]
    pub fn put_u64(&mut self, n: u64) -> Result<(), EncodeError> {
        self.check(size_of::<u64>())?;
        let mut dst = &mut self.buf[self.pos..];
        dst.put_u64(n);
        self.pos += size_of::<u64>();
        Ok(())
    }

    #[inline]
    pub fn put_slice(&mut self, src: &[u8]) -> Result<(), EncodeError> {
        self.check(src.len())?;
        self.buf[self.pos..self.pos + src.len()].copy_from_slice(src);
        self.pos += src.len();
        Ok(())
    }

    /// Hand out the next `len` bytes for an inner encoder to fill in place.
    #[inline]
    pub fn reserve(&mut self, len: usize) -> Result<&mut [u8], EncodeError> {
        self.check(len)?;
        let start = self.pos;
        self.pos += len;
        Ok(&mut self.buf[start..start + len])
    }

    #[inline]
    pub fn written(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }
}
